//! SQLite-backed rental store.
//!
//! Uses `rusqlite` with the `bundled` feature so no system SQLite
//! library is required.  All async trait methods are thin wrappers
//! around synchronous rusqlite calls executed under a `Mutex`.
//!
//! Column names keep the camelCase spelling of the rental schema
//! (`carName`, `customerChoosenCarFrom`, ...).  Every statement binds its
//! values; dynamic UPDATEs only ever interpolate whitelisted column names.

use std::sync::Mutex;

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};

use super::rental::{RentalStore, StoreFuture};
use crate::models::{Booking, Car, CarImageKeys, CarPatch, ImageKeys, NewBooking, NewCar};

/// Current schema version. Bumped when migrations are added.
const SCHEMA_VERSION: i64 = 1;

const CAR_COLUMNS: &str = "id, carName, carDescription, carSlogan, carCurrency, carRent,
    carManufactureYear, carBrandName, carModelName, carFuelType, carMileage, carGearSystem,
    carSeatingCapacity, carStorageCapacity, carStatus, carAvailableDate,
    carImageMain, carImageSub1, carImageSub2, carImageSub3";

/// Booking columns without `id`; shared by both booking tables.
const BOOKING_FIELDS: &str = "customerName, customerMobile, customerEmail, customerGender,
    customerAddress, customerPAN, customerChoosenCar, customerChoosenCarFrom,
    customerChoosenCarTo, customerImage";

/// Rental store backed by a single SQLite database file.
pub struct SqliteRentalStore {
    /// The database connection, guarded by a mutex for Send + Sync.
    conn: Mutex<Connection>,
}

impl SqliteRentalStore {
    /// Open (or create) the database at `path` and initialize the schema.
    ///
    /// Passing `":memory:"` creates an in-memory database (useful for tests).
    pub fn new(path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.apply_pragmas()?;
        store.init_db()?;
        Ok(store)
    }

    /// Apply recommended SQLite pragmas for performance and safety.
    fn apply_pragmas(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA busy_timeout = 5000;
            ",
        )?;
        Ok(())
    }

    /// Create the required tables if they do not already exist.
    /// Idempotent, so it runs on every startup.
    fn init_db(&self) -> anyhow::Result<()> {
        let conn = self.conn.lock().expect("mutex poisoned");
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_version (
                version    INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS cars (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                carName             TEXT NOT NULL DEFAULT '',
                carDescription      TEXT NOT NULL DEFAULT '',
                carSlogan           TEXT NOT NULL DEFAULT '',
                carCurrency         TEXT NOT NULL DEFAULT '',
                carRent             TEXT NOT NULL DEFAULT '',
                carManufactureYear  TEXT NOT NULL DEFAULT '',
                carBrandName        TEXT NOT NULL DEFAULT '',
                carModelName        TEXT NOT NULL DEFAULT '',
                carFuelType         TEXT NOT NULL DEFAULT '',
                carMileage          TEXT NOT NULL DEFAULT '',
                carGearSystem       TEXT NOT NULL DEFAULT '',
                carSeatingCapacity  TEXT NOT NULL DEFAULT '',
                carStorageCapacity  TEXT NOT NULL DEFAULT '',
                carStatus           TEXT NOT NULL DEFAULT '',
                carAvailableDate    TEXT NOT NULL DEFAULT '',
                carImageMain        TEXT NOT NULL DEFAULT '',
                carImageSub1        TEXT NOT NULL DEFAULT '',
                carImageSub2        TEXT NOT NULL DEFAULT '',
                carImageSub3        TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS bookings (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                customerName            TEXT NOT NULL DEFAULT '',
                customerMobile          TEXT NOT NULL DEFAULT '',
                customerEmail           TEXT NOT NULL DEFAULT '',
                customerGender          TEXT NOT NULL DEFAULT '',
                customerAddress         TEXT NOT NULL DEFAULT '',
                customerPAN             TEXT NOT NULL DEFAULT '',
                customerChoosenCar      TEXT NOT NULL DEFAULT '',
                customerChoosenCarFrom  TEXT NOT NULL DEFAULT '',
                customerChoosenCarTo    TEXT NOT NULL DEFAULT '',
                customerImage           TEXT NOT NULL DEFAULT ''
            );

            -- Same shape as bookings; the terminal state of a booking.
            CREATE TABLE IF NOT EXISTS bookings_completed (
                id                      INTEGER PRIMARY KEY AUTOINCREMENT,
                customerName            TEXT NOT NULL DEFAULT '',
                customerMobile          TEXT NOT NULL DEFAULT '',
                customerEmail           TEXT NOT NULL DEFAULT '',
                customerGender          TEXT NOT NULL DEFAULT '',
                customerAddress         TEXT NOT NULL DEFAULT '',
                customerPAN             TEXT NOT NULL DEFAULT '',
                customerChoosenCar      TEXT NOT NULL DEFAULT '',
                customerChoosenCarFrom  TEXT NOT NULL DEFAULT '',
                customerChoosenCarTo    TEXT NOT NULL DEFAULT '',
                customerImage           TEXT NOT NULL DEFAULT ''
            );
            ",
        )?;

        let existing: Option<i64> = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| {
                row.get(0)
            })
            .optional()?
            .flatten();

        if existing.map_or(true, |v| v < SCHEMA_VERSION) {
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                params![SCHEMA_VERSION, chrono::Utc::now().to_rfc3339()],
            )?;
        }

        Ok(())
    }
}

fn map_car_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Car> {
    Ok(Car {
        id: row.get(0)?,
        car_name: row.get(1)?,
        car_description: row.get(2)?,
        car_slogan: row.get(3)?,
        car_currency: row.get(4)?,
        car_rent: row.get(5)?,
        car_manufacture_year: row.get(6)?,
        car_brand_name: row.get(7)?,
        car_model_name: row.get(8)?,
        car_fuel_type: row.get(9)?,
        car_mileage: row.get(10)?,
        car_gear_system: row.get(11)?,
        car_seating_capacity: row.get(12)?,
        car_storage_capacity: row.get(13)?,
        car_status: row.get(14)?,
        car_available_date: row.get(15)?,
        car_image_main: row.get(16)?,
        car_image_sub1: row.get(17)?,
        car_image_sub2: row.get(18)?,
        car_image_sub3: row.get(19)?,
    })
}

fn map_booking_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        customer_mobile: row.get(2)?,
        customer_email: row.get(3)?,
        customer_gender: row.get(4)?,
        customer_address: row.get(5)?,
        customer_pan: row.get(6)?,
        customer_choosen_car: row.get(7)?,
        customer_choosen_car_from: row.get(8)?,
        customer_choosen_car_to: row.get(9)?,
        customer_image: row.get(10)?,
    })
}

fn select_car(conn: &Connection, id: i64) -> rusqlite::Result<Option<Car>> {
    conn.query_row(
        &format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = ?1"),
        params![id],
        map_car_row,
    )
    .optional()
}

fn select_bookings(conn: &Connection, table: &str) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT id, {BOOKING_FIELDS} FROM {table} ORDER BY id"
    ))?;
    let rows = stmt.query_map([], map_booking_row)?;
    rows.collect()
}

impl RentalStore for SqliteRentalStore {
    // ── Cars ────────────────────────────────────────────────────────

    fn list_cars(&self) -> StoreFuture<'_, Vec<Car>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            let mut stmt = conn.prepare(&format!("SELECT {CAR_COLUMNS} FROM cars ORDER BY id"))?;
            let rows = stmt.query_map([], map_car_row)?;
            let mut cars = Vec::new();
            for row in rows {
                cars.push(row?);
            }
            Ok(cars)
        })
    }

    fn get_car(&self, id: i64) -> StoreFuture<'_, Option<Car>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            Ok(select_car(&conn, id)?)
        })
    }

    fn insert_car(&self, fields: NewCar, images: CarImageKeys) -> StoreFuture<'_, Car> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            conn.execute(
                "INSERT INTO cars
                    (carName, carDescription, carSlogan, carCurrency, carRent,
                     carManufactureYear, carBrandName, carModelName, carFuelType, carMileage,
                     carGearSystem, carSeatingCapacity, carStorageCapacity, carStatus,
                     carAvailableDate, carImageMain, carImageSub1, carImageSub2, carImageSub3)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                         ?16, ?17, ?18, ?19)",
                params![
                    fields.car_name,
                    fields.car_description,
                    fields.car_slogan,
                    fields.car_currency,
                    fields.car_rent,
                    fields.car_manufacture_year,
                    fields.car_brand_name,
                    fields.car_model_name,
                    fields.car_fuel_type,
                    fields.car_mileage,
                    fields.car_gear_system,
                    fields.car_seating_capacity,
                    fields.car_storage_capacity,
                    fields.car_status,
                    fields.car_available_date,
                    images.main,
                    images.sub1,
                    images.sub2,
                    images.sub3,
                ],
            )?;
            let id = conn.last_insert_rowid();
            Ok(Car::from_parts(id, fields, images))
        })
    }

    fn update_car(
        &self,
        id: i64,
        patch: CarPatch,
        images: ImageKeys,
    ) -> StoreFuture<'_, Option<Car>> {
        Box::pin(async move {
            let mut conn = self.conn.lock().expect("mutex poisoned");
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut assignments = Vec::new();
            let mut values = Vec::new();
            for (field, value) in patch.supplied() {
                values.push(Value::Text(value.to_string()));
                assignments.push(format!("{} = ?{}", field.field_name(), values.len()));
            }
            for (slot, key) in images.iter() {
                values.push(Value::Text(key.clone()));
                assignments.push(format!("{} = ?{}", slot.field_name(), values.len()));
            }

            if !assignments.is_empty() {
                values.push(Value::Integer(id));
                let sql = format!(
                    "UPDATE cars SET {} WHERE id = ?{}",
                    assignments.join(", "),
                    values.len()
                );
                let changed = tx.execute(&sql, params_from_iter(values))?;
                if changed == 0 {
                    return Ok(None);
                }
            }

            let car = select_car(&tx, id)?;
            tx.commit()?;
            Ok(car)
        })
    }

    fn delete_car(&self, id: i64) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            let removed = conn.execute("DELETE FROM cars WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
    }

    // ── Bookings ────────────────────────────────────────────────────

    fn insert_booking(&self, fields: NewBooking, image_key: String) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            conn.execute(
                &format!(
                    "INSERT INTO bookings ({BOOKING_FIELDS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                params![
                    fields.customer_name,
                    fields.customer_mobile,
                    fields.customer_email,
                    fields.customer_gender,
                    fields.customer_address,
                    fields.customer_pan,
                    fields.customer_choosen_car,
                    fields.customer_choosen_car_from,
                    fields.customer_choosen_car_to,
                    image_key,
                ],
            )?;
            let id = conn.last_insert_rowid();
            Ok(Booking::from_parts(id, fields, image_key))
        })
    }

    fn list_bookings(&self) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            Ok(select_bookings(&conn, "bookings")?)
        })
    }

    fn list_completed_bookings(&self) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            Ok(select_bookings(&conn, "bookings_completed")?)
        })
    }

    fn archive_booking(&self, id: i64) -> StoreFuture<'_, Option<Booking>> {
        Box::pin(async move {
            let mut conn = self.conn.lock().expect("mutex poisoned");
            // Dropping `tx` without commit rolls back.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let copied = tx.execute(
                &format!(
                    "INSERT INTO bookings_completed ({BOOKING_FIELDS})
                     SELECT {BOOKING_FIELDS} FROM bookings WHERE id = ?1"
                ),
                params![id],
            )?;
            if copied == 0 {
                return Ok(None);
            }
            let completed_id = tx.last_insert_rowid();

            let removed = tx.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
            if removed != 1 {
                anyhow::bail!("archive of booking {id} removed {removed} rows, expected 1");
            }

            let completed = tx.query_row(
                &format!("SELECT id, {BOOKING_FIELDS} FROM bookings_completed WHERE id = ?1"),
                params![completed_id],
                map_booking_row,
            )?;

            tx.commit()?;
            Ok(Some(completed))
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let conn = self.conn.lock().expect("mutex poisoned");
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
    }
}
