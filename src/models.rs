//! Rental records.
//!
//! Field names serialize in the camelCase form the rental front-end has
//! always consumed (`carName`, `customerChoosenCarFrom`, ...).  Every
//! descriptive value is an opaque string: years, mileage and capacities
//! are stored exactly as submitted.

use bytes::Bytes;
use garde::Validate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ── Image slots ────────────────────────────────────────────────────

/// One of the four fixed image positions on a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Main,
    Sub1,
    Sub2,
    Sub3,
}

impl ImageSlot {
    /// All slots in storage order.
    pub const ALL: [ImageSlot; 4] = [
        ImageSlot::Main,
        ImageSlot::Sub1,
        ImageSlot::Sub2,
        ImageSlot::Sub3,
    ];

    /// Multipart part name and database column for this slot.
    pub fn field_name(self) -> &'static str {
        match self {
            ImageSlot::Main => "carImageMain",
            ImageSlot::Sub1 => "carImageSub1",
            ImageSlot::Sub2 => "carImageSub2",
            ImageSlot::Sub3 => "carImageSub3",
        }
    }

    fn index(self) -> usize {
        match self {
            ImageSlot::Main => 0,
            ImageSlot::Sub1 => 1,
            ImageSlot::Sub2 => 2,
            ImageSlot::Sub3 => 3,
        }
    }
}

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied file name.
    pub file_name: String,
    /// File contents.
    pub data: Bytes,
}

/// Per-slot values, indexed by [`ImageSlot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotMap<T> {
    slots: [Option<T>; 4],
}

impl<T> Default for SlotMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotMap<T> {
    /// An empty map.
    pub fn new() -> Self {
        Self {
            slots: [None, None, None, None],
        }
    }

    /// Store `value` in `slot`, returning the previous value.
    pub fn insert(&mut self, slot: ImageSlot, value: T) -> Option<T> {
        self.slots[slot.index()].replace(value)
    }

    pub fn get(&self, slot: ImageSlot) -> Option<&T> {
        self.slots[slot.index()].as_ref()
    }

    pub fn contains(&self, slot: ImageSlot) -> bool {
        self.get(slot).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Slots that hold no value, in slot order.
    pub fn missing(&self) -> Vec<ImageSlot> {
        ImageSlot::ALL
            .into_iter()
            .filter(|slot| !self.contains(*slot))
            .collect()
    }

    /// Present entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ImageSlot, &T)> {
        ImageSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|v| (slot, v)))
    }
}

/// Images supplied with a create or edit request.
pub type CarImages = SlotMap<ImageUpload>;

/// Stored-object keys per slot.
pub type ImageKeys = SlotMap<String>;

/// Keys for all four slots of a newly created car.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarImageKeys {
    pub main: String,
    pub sub1: String,
    pub sub2: String,
    pub sub3: String,
}

impl CarImageKeys {
    /// Build from a complete [`ImageKeys`]; `None` if any slot is empty.
    pub fn from_slots(keys: &ImageKeys) -> Option<Self> {
        Some(Self {
            main: keys.get(ImageSlot::Main)?.clone(),
            sub1: keys.get(ImageSlot::Sub1)?.clone(),
            sub2: keys.get(ImageSlot::Sub2)?.clone(),
            sub3: keys.get(ImageSlot::Sub3)?.clone(),
        })
    }
}

// ── Cars ───────────────────────────────────────────────────────────

/// A car listing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: i64,
    pub car_name: String,
    pub car_description: String,
    pub car_slogan: String,
    pub car_currency: String,
    pub car_rent: String,
    pub car_manufacture_year: String,
    pub car_brand_name: String,
    pub car_model_name: String,
    pub car_fuel_type: String,
    pub car_mileage: String,
    pub car_gear_system: String,
    pub car_seating_capacity: String,
    pub car_storage_capacity: String,
    pub car_status: String,
    pub car_available_date: String,
    pub car_image_main: String,
    pub car_image_sub1: String,
    pub car_image_sub2: String,
    pub car_image_sub3: String,
}

impl Car {
    /// Assemble a row from its id, descriptive fields and image keys.
    pub fn from_parts(id: i64, fields: NewCar, images: CarImageKeys) -> Self {
        Self {
            id,
            car_name: fields.car_name,
            car_description: fields.car_description,
            car_slogan: fields.car_slogan,
            car_currency: fields.car_currency,
            car_rent: fields.car_rent,
            car_manufacture_year: fields.car_manufacture_year,
            car_brand_name: fields.car_brand_name,
            car_model_name: fields.car_model_name,
            car_fuel_type: fields.car_fuel_type,
            car_mileage: fields.car_mileage,
            car_gear_system: fields.car_gear_system,
            car_seating_capacity: fields.car_seating_capacity,
            car_storage_capacity: fields.car_storage_capacity,
            car_status: fields.car_status,
            car_available_date: fields.car_available_date,
            car_image_main: images.main,
            car_image_sub1: images.sub1,
            car_image_sub2: images.sub2,
            car_image_sub3: images.sub3,
        }
    }

    /// Mutable access to a descriptive column.
    pub fn field_mut(&mut self, field: CarField) -> &mut String {
        match field {
            CarField::Name => &mut self.car_name,
            CarField::Description => &mut self.car_description,
            CarField::Slogan => &mut self.car_slogan,
            CarField::Currency => &mut self.car_currency,
            CarField::Rent => &mut self.car_rent,
            CarField::ManufactureYear => &mut self.car_manufacture_year,
            CarField::BrandName => &mut self.car_brand_name,
            CarField::ModelName => &mut self.car_model_name,
            CarField::FuelType => &mut self.car_fuel_type,
            CarField::Mileage => &mut self.car_mileage,
            CarField::GearSystem => &mut self.car_gear_system,
            CarField::SeatingCapacity => &mut self.car_seating_capacity,
            CarField::StorageCapacity => &mut self.car_storage_capacity,
            CarField::Status => &mut self.car_status,
            CarField::AvailableDate => &mut self.car_available_date,
        }
    }

    /// Mutable access to an image reference.
    pub fn image_mut(&mut self, slot: ImageSlot) -> &mut String {
        match slot {
            ImageSlot::Main => &mut self.car_image_main,
            ImageSlot::Sub1 => &mut self.car_image_sub1,
            ImageSlot::Sub2 => &mut self.car_image_sub2,
            ImageSlot::Sub3 => &mut self.car_image_sub3,
        }
    }

    /// Apply a partial update: only supplied values change.
    pub fn apply(&mut self, patch: &CarPatch, images: &ImageKeys) {
        for (field, value) in patch.supplied() {
            *self.field_mut(field) = value.to_string();
        }
        for (slot, key) in images.iter() {
            *self.image_mut(slot) = key.clone();
        }
    }
}

/// Descriptive (non-image) car columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarField {
    Name,
    Description,
    Slogan,
    Currency,
    Rent,
    ManufactureYear,
    BrandName,
    ModelName,
    FuelType,
    Mileage,
    GearSystem,
    SeatingCapacity,
    StorageCapacity,
    Status,
    AvailableDate,
}

impl CarField {
    /// All descriptive columns in table order.
    pub const ALL: [CarField; 15] = [
        CarField::Name,
        CarField::Description,
        CarField::Slogan,
        CarField::Currency,
        CarField::Rent,
        CarField::ManufactureYear,
        CarField::BrandName,
        CarField::ModelName,
        CarField::FuelType,
        CarField::Mileage,
        CarField::GearSystem,
        CarField::SeatingCapacity,
        CarField::StorageCapacity,
        CarField::Status,
        CarField::AvailableDate,
    ];

    /// Form field name and database column.
    pub fn field_name(self) -> &'static str {
        match self {
            CarField::Name => "carName",
            CarField::Description => "carDescription",
            CarField::Slogan => "carSlogan",
            CarField::Currency => "carCurrency",
            CarField::Rent => "carRent",
            CarField::ManufactureYear => "carManufactureYear",
            CarField::BrandName => "carBrandName",
            CarField::ModelName => "carModelName",
            CarField::FuelType => "carFuelType",
            CarField::Mileage => "carMileage",
            CarField::GearSystem => "carGearSystem",
            CarField::SeatingCapacity => "carSeatingCapacity",
            CarField::StorageCapacity => "carStorageCapacity",
            CarField::Status => "carStatus",
            CarField::AvailableDate => "carAvailableDate",
        }
    }
}

/// Descriptive fields of a car to be inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    #[garde(length(min = 1, max = 255))]
    pub car_name: String,
    #[garde(skip)]
    pub car_description: String,
    #[garde(length(max = 255))]
    pub car_slogan: String,
    #[garde(length(max = 10))]
    pub car_currency: String,
    #[garde(length(max = 255))]
    pub car_rent: String,
    #[garde(length(max = 255))]
    pub car_manufacture_year: String,
    #[garde(length(max = 255))]
    pub car_brand_name: String,
    #[garde(length(max = 255))]
    pub car_model_name: String,
    #[garde(length(max = 100))]
    pub car_fuel_type: String,
    #[garde(length(max = 255))]
    pub car_mileage: String,
    #[garde(length(max = 100))]
    pub car_gear_system: String,
    #[garde(length(max = 255))]
    pub car_seating_capacity: String,
    #[garde(length(max = 255))]
    pub car_storage_capacity: String,
    #[garde(length(max = 255))]
    pub car_status: String,
    #[garde(length(max = 255))]
    pub car_available_date: String,
}

impl NewCar {
    /// Mutable access to a descriptive column.
    pub fn field_mut(&mut self, field: CarField) -> &mut String {
        match field {
            CarField::Name => &mut self.car_name,
            CarField::Description => &mut self.car_description,
            CarField::Slogan => &mut self.car_slogan,
            CarField::Currency => &mut self.car_currency,
            CarField::Rent => &mut self.car_rent,
            CarField::ManufactureYear => &mut self.car_manufacture_year,
            CarField::BrandName => &mut self.car_brand_name,
            CarField::ModelName => &mut self.car_model_name,
            CarField::FuelType => &mut self.car_fuel_type,
            CarField::Mileage => &mut self.car_mileage,
            CarField::GearSystem => &mut self.car_gear_system,
            CarField::SeatingCapacity => &mut self.car_seating_capacity,
            CarField::StorageCapacity => &mut self.car_storage_capacity,
            CarField::Status => &mut self.car_status,
            CarField::AvailableDate => &mut self.car_available_date,
        }
    }
}

/// Partial update of a car's descriptive fields.  `None` leaves the
/// column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarPatch {
    #[garde(length(min = 1, max = 255))]
    pub car_name: Option<String>,
    #[garde(skip)]
    pub car_description: Option<String>,
    #[garde(length(max = 255))]
    pub car_slogan: Option<String>,
    #[garde(length(max = 10))]
    pub car_currency: Option<String>,
    #[garde(length(max = 255))]
    pub car_rent: Option<String>,
    #[garde(length(max = 255))]
    pub car_manufacture_year: Option<String>,
    #[garde(length(max = 255))]
    pub car_brand_name: Option<String>,
    #[garde(length(max = 255))]
    pub car_model_name: Option<String>,
    #[garde(length(max = 100))]
    pub car_fuel_type: Option<String>,
    #[garde(length(max = 255))]
    pub car_mileage: Option<String>,
    #[garde(length(max = 100))]
    pub car_gear_system: Option<String>,
    #[garde(length(max = 255))]
    pub car_seating_capacity: Option<String>,
    #[garde(length(max = 255))]
    pub car_storage_capacity: Option<String>,
    #[garde(length(max = 255))]
    pub car_status: Option<String>,
    #[garde(length(max = 255))]
    pub car_available_date: Option<String>,
}

impl CarPatch {
    /// Slot for a descriptive column.
    pub fn field_mut(&mut self, field: CarField) -> &mut Option<String> {
        match field {
            CarField::Name => &mut self.car_name,
            CarField::Description => &mut self.car_description,
            CarField::Slogan => &mut self.car_slogan,
            CarField::Currency => &mut self.car_currency,
            CarField::Rent => &mut self.car_rent,
            CarField::ManufactureYear => &mut self.car_manufacture_year,
            CarField::BrandName => &mut self.car_brand_name,
            CarField::ModelName => &mut self.car_model_name,
            CarField::FuelType => &mut self.car_fuel_type,
            CarField::Mileage => &mut self.car_mileage,
            CarField::GearSystem => &mut self.car_gear_system,
            CarField::SeatingCapacity => &mut self.car_seating_capacity,
            CarField::StorageCapacity => &mut self.car_storage_capacity,
            CarField::Status => &mut self.car_status,
            CarField::AvailableDate => &mut self.car_available_date,
        }
    }

    fn field(&self, field: CarField) -> Option<&str> {
        let value = match field {
            CarField::Name => &self.car_name,
            CarField::Description => &self.car_description,
            CarField::Slogan => &self.car_slogan,
            CarField::Currency => &self.car_currency,
            CarField::Rent => &self.car_rent,
            CarField::ManufactureYear => &self.car_manufacture_year,
            CarField::BrandName => &self.car_brand_name,
            CarField::ModelName => &self.car_model_name,
            CarField::FuelType => &self.car_fuel_type,
            CarField::Mileage => &self.car_mileage,
            CarField::GearSystem => &self.car_gear_system,
            CarField::SeatingCapacity => &self.car_seating_capacity,
            CarField::StorageCapacity => &self.car_storage_capacity,
            CarField::Status => &self.car_status,
            CarField::AvailableDate => &self.car_available_date,
        };
        value.as_deref()
    }

    /// Supplied columns in table order.
    pub fn supplied(&self) -> Vec<(CarField, &str)> {
        CarField::ALL
            .into_iter()
            .filter_map(|f| self.field(f).map(|v| (f, v)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.supplied().is_empty()
    }
}

// ── Bookings ───────────────────────────────────────────────────────

/// A customer booking.  Active and completed bookings share this shape;
/// they differ only in the table they live in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub customer_name: String,
    pub customer_mobile: String,
    pub customer_email: String,
    pub customer_gender: String,
    pub customer_address: String,
    #[serde(rename = "customerPAN")]
    pub customer_pan: String,
    pub customer_choosen_car: String,
    pub customer_choosen_car_from: String,
    pub customer_choosen_car_to: String,
    pub customer_image: String,
}

impl Booking {
    /// Assemble a row from its id, customer fields and image key.
    pub fn from_parts(id: i64, fields: NewBooking, image_key: String) -> Self {
        Self {
            id,
            customer_name: fields.customer_name,
            customer_mobile: fields.customer_mobile,
            customer_email: fields.customer_email,
            customer_gender: fields.customer_gender,
            customer_address: fields.customer_address,
            customer_pan: fields.customer_pan,
            customer_choosen_car: fields.customer_choosen_car,
            customer_choosen_car_from: fields.customer_choosen_car_from,
            customer_choosen_car_to: fields.customer_choosen_car_to,
            customer_image: image_key,
        }
    }

    /// True when every field except `id` matches `other`.
    pub fn same_fields(&self, other: &Booking) -> bool {
        Booking { id: other.id, ..self.clone() } == *other
    }
}

/// A completed (archived) booking.
pub type CompletedBooking = Booking;

/// Customer fields of a booking to be created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[garde(length(min = 1, max = 255))]
    pub customer_name: String,
    #[garde(length(min = 1, max = 20))]
    pub customer_mobile: String,
    #[garde(length(min = 1, max = 255))]
    pub customer_email: String,
    #[garde(length(max = 10))]
    pub customer_gender: String,
    #[garde(length(max = 255))]
    pub customer_address: String,
    #[serde(rename = "customerPAN")]
    #[garde(length(max = 255))]
    pub customer_pan: String,
    #[garde(length(min = 1, max = 255))]
    pub customer_choosen_car: String,
    #[garde(length(min = 1, max = 255))]
    pub customer_choosen_car_from: String,
    #[garde(length(min = 1, max = 255))]
    pub customer_choosen_car_to: String,
}

impl NewBooking {
    /// Form field names in table order.
    pub const FIELDS: [&'static str; 9] = [
        "customerName",
        "customerMobile",
        "customerEmail",
        "customerGender",
        "customerAddress",
        "customerPAN",
        "customerChoosenCar",
        "customerChoosenCarFrom",
        "customerChoosenCarTo",
    ];

    /// Multipart part name carrying the customer image.
    pub const IMAGE_FIELD: &'static str = "customerImage";

    /// Mutable slot for a form field, `None` for unknown names.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        let slot = match name {
            "customerName" => &mut self.customer_name,
            "customerMobile" => &mut self.customer_mobile,
            "customerEmail" => &mut self.customer_email,
            "customerGender" => &mut self.customer_gender,
            "customerAddress" => &mut self.customer_address,
            "customerPAN" => &mut self.customer_pan,
            "customerChoosenCar" => &mut self.customer_choosen_car,
            "customerChoosenCarFrom" => &mut self.customer_choosen_car_from,
            "customerChoosenCarTo" => &mut self.customer_choosen_car_to,
            _ => return None,
        };
        Some(slot)
    }
}

/// `{message}` body returned by mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
