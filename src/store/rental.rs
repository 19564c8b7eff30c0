//! Abstract rental store trait.
//!
//! Any relational backend must implement [`RentalStore`].  The trait
//! uses `async_trait`-style methods (manual desugaring with pinned
//! futures) so it can be used with both SQLite and future remote stores.

use std::future::Future;
use std::pin::Pin;

use crate::models::{Booking, Car, CarImageKeys, CarPatch, ImageKeys, NewBooking, NewCar};

/// Boxed future returned by every store method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>;

/// Async rental store contract.
///
/// Implementors own three collections: `cars`, `bookings` and
/// `bookings_completed`.  Ids are generated by the store and never reused
/// within a collection.
pub trait RentalStore: Send + Sync + 'static {
    // ── Cars ────────────────────────────────────────────────────────

    /// List all cars ordered by id.
    fn list_cars(&self) -> StoreFuture<'_, Vec<Car>>;

    /// Get a car by id.
    fn get_car(&self, id: i64) -> StoreFuture<'_, Option<Car>>;

    /// Insert a car and return the stored row.
    fn insert_car(&self, fields: NewCar, images: CarImageKeys) -> StoreFuture<'_, Car>;

    /// Overwrite only the supplied columns of a car.
    ///
    /// Returns the updated row, or `None` if no car has this id.
    fn update_car(
        &self,
        id: i64,
        patch: CarPatch,
        images: ImageKeys,
    ) -> StoreFuture<'_, Option<Car>>;

    /// Delete a car.  Returns whether a row was removed.
    fn delete_car(&self, id: i64) -> StoreFuture<'_, bool>;

    // ── Bookings ────────────────────────────────────────────────────

    /// Insert an active booking and return the stored row.
    fn insert_booking(&self, fields: NewBooking, image_key: String) -> StoreFuture<'_, Booking>;

    /// List active bookings ordered by id.
    fn list_bookings(&self) -> StoreFuture<'_, Vec<Booking>>;

    /// List completed bookings ordered by id.
    fn list_completed_bookings(&self) -> StoreFuture<'_, Vec<Booking>>;

    /// Move an active booking into the completed collection.
    ///
    /// The copy and the removal happen atomically.  Returns the completed
    /// row (with its new id), or `None` if no active booking has this id,
    /// in which case neither collection changes.
    fn archive_booking(&self, id: i64) -> StoreFuture<'_, Option<Booking>>;

    // ── Health ──────────────────────────────────────────────────────

    /// Cheap round-trip used by the health probe.
    fn ping(&self) -> StoreFuture<'_, ()>;
}
