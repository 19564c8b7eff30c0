//! Booking lifecycle: create with a customer image, list, archive.
//!
//! A booking is `Active` while it lives in `bookings` and `Archived` once
//! moved to `bookings_completed`.  There is no way back.

use std::sync::Arc;

use garde::Validate;
use tracing::info;

use super::{observe, validation_failure, ImageStore};
use crate::errors::RentalError;
use crate::models::{Booking, CompletedBooking, ImageUpload, NewBooking};
use crate::storage::backend::StorageBackend;
use crate::store::rental::RentalStore;

/// Booking operations.
#[derive(Clone)]
pub struct BookingLifecycle {
    store: Arc<dyn RentalStore>,
    images: ImageStore,
}

impl BookingLifecycle {
    pub fn new(
        store: Arc<dyn RentalStore>,
        storage: Arc<dyn StorageBackend>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            images: ImageStore::new(storage, key_prefix.into()),
        }
    }

    /// Validate, store the customer image, then insert the booking.
    pub async fn create_booking(
        &self,
        fields: NewBooking,
        image: Option<ImageUpload>,
    ) -> Result<Booking, RentalError> {
        observe("create_booking", self.create_booking_inner(fields, image).await)
    }

    async fn create_booking_inner(
        &self,
        fields: NewBooking,
        image: Option<ImageUpload>,
    ) -> Result<Booking, RentalError> {
        fields.validate().map_err(validation_failure)?;
        let Some(image) = image else {
            return Err(RentalError::validation(format!(
                "Missing required image: {}",
                NewBooking::IMAGE_FIELD
            )));
        };

        let key = self.images.upload(&image).await?;

        match self.store.insert_booking(fields, key.clone()).await {
            Ok(booking) => {
                info!(
                    "Created booking {} for {} ({})",
                    booking.id, booking.customer_name, booking.customer_choosen_car
                );
                Ok(booking)
            }
            Err(e) => {
                self.images.discard(&[key]).await;
                Err(RentalError::Database(e))
            }
        }
    }

    pub async fn list_active_bookings(&self) -> Result<Vec<Booking>, RentalError> {
        let result = self.store.list_bookings().await.map_err(RentalError::Database);
        observe("list_active_bookings", result)
    }

    pub async fn list_completed_bookings(&self) -> Result<Vec<CompletedBooking>, RentalError> {
        let result = self
            .store
            .list_completed_bookings()
            .await
            .map_err(RentalError::Database);
        observe("list_completed_bookings", result)
    }

    /// Move booking `id` to the completed collection in one transaction.
    pub async fn archive_booking(&self, id: i64) -> Result<CompletedBooking, RentalError> {
        let result = match self.store.archive_booking(id).await {
            Ok(Some(completed)) => {
                info!("Archived booking {} as completed booking {}", id, completed.id);
                Ok(completed)
            }
            Ok(None) => Err(RentalError::NotFound {
                entity: "Booking",
                id,
            }),
            Err(e) => Err(RentalError::Database(e)),
        };
        observe("archive_booking", result)
    }
}
