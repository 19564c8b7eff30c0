//! In-memory rental store.
//!
//! Stores all rows in memory with no persistence. Useful for testing
//! and ephemeral deployments. Uses `RwLock<Inner>` for thread-safe access;
//! archiving takes the write lock for the whole move, so it is atomic with
//! respect to every other operation.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::rental::{RentalStore, StoreFuture};
use crate::models::{Booking, Car, CarImageKeys, CarPatch, ImageKeys, NewBooking, NewCar};

#[derive(Debug, Default)]
struct Inner {
    cars: BTreeMap<i64, Car>,
    bookings: BTreeMap<i64, Booking>,
    completed: BTreeMap<i64, Booking>,
    next_car_id: i64,
    next_booking_id: i64,
    next_completed_id: i64,
}

/// Allocate the next id from a counter. Ids start at 1 and are never reused.
fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

pub struct MemoryRentalStore {
    inner: RwLock<Inner>,
}

impl MemoryRentalStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for MemoryRentalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RentalStore for MemoryRentalStore {
    fn list_cars(&self) -> StoreFuture<'_, Vec<Car>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.cars.values().cloned().collect())
        })
    }

    fn get_car(&self, id: i64) -> StoreFuture<'_, Option<Car>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.cars.get(&id).cloned())
        })
    }

    fn insert_car(&self, fields: NewCar, images: CarImageKeys) -> StoreFuture<'_, Car> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            let id = next_id(&mut inner.next_car_id);
            let car = Car::from_parts(id, fields, images);
            inner.cars.insert(id, car.clone());
            Ok(car)
        })
    }

    fn update_car(
        &self,
        id: i64,
        patch: CarPatch,
        images: ImageKeys,
    ) -> StoreFuture<'_, Option<Car>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            Ok(inner.cars.get_mut(&id).map(|car| {
                car.apply(&patch, &images);
                car.clone()
            }))
        })
    }

    fn delete_car(&self, id: i64) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            Ok(inner.cars.remove(&id).is_some())
        })
    }

    fn insert_booking(&self, fields: NewBooking, image_key: String) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            let id = next_id(&mut inner.next_booking_id);
            let booking = Booking::from_parts(id, fields, image_key);
            inner.bookings.insert(id, booking.clone());
            Ok(booking)
        })
    }

    fn list_bookings(&self) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.bookings.values().cloned().collect())
        })
    }

    fn list_completed_bookings(&self) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let inner = self.inner.read().expect("rwlock poisoned");
            Ok(inner.completed.values().cloned().collect())
        })
    }

    fn archive_booking(&self, id: i64) -> StoreFuture<'_, Option<Booking>> {
        Box::pin(async move {
            let mut inner = self.inner.write().expect("rwlock poisoned");
            let Some(booking) = inner.bookings.remove(&id) else {
                return Ok(None);
            };
            let completed_id = next_id(&mut inner.next_completed_id);
            let completed = Booking {
                id: completed_id,
                ..booking
            };
            inner.completed.insert(completed_id, completed.clone());
            Ok(Some(completed))
        })
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let _inner = self.inner.read().expect("rwlock poisoned");
            Ok(())
        })
    }
}
