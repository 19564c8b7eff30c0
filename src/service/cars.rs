//! Car catalog: CRUD over car listings and their four image slots.

use std::sync::Arc;

use garde::Validate;
use tracing::info;

use super::{observe, validation_failure, ImageStore};
use crate::errors::RentalError;
use crate::models::{Car, CarImageKeys, CarImages, CarPatch, ImageKeys, NewCar};
use crate::storage::backend::StorageBackend;
use crate::store::rental::RentalStore;

/// Car listing operations.
#[derive(Clone)]
pub struct CarCatalog {
    store: Arc<dyn RentalStore>,
    images: ImageStore,
}

impl CarCatalog {
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

    /// Every car, ordered by id.
    pub async fn list_cars(&self) -> Result<Vec<Car>, RentalError> {
        let result = self.store.list_cars().await.map_err(RentalError::Database);
        observe("list_cars", result)
    }

    /// Zero or one car with `id`.  A missing id is an empty list, not an error.
    pub async fn get_car(&self, id: i64) -> Result<Vec<Car>, RentalError> {
        let result = self
            .store
            .get_car(id)
            .await
            .map(|car| car.into_iter().collect())
            .map_err(RentalError::Database);
        observe("get_car", result)
    }

    /// Store all four images, then insert the row.
    ///
    /// Nothing is uploaded unless every field and every slot is valid.  If
    /// an upload or the insert fails, images stored so far are removed.
    pub async fn create_car(&self, fields: NewCar, images: CarImages) -> Result<Car, RentalError> {
        observe("create_car", self.create_car_inner(fields, images).await)
    }

    async fn create_car_inner(
        &self,
        fields: NewCar,
        images: CarImages,
    ) -> Result<Car, RentalError> {
        fields.validate().map_err(validation_failure)?;

        let missing = images.missing();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|slot| slot.field_name()).collect();
            return Err(RentalError::validation(format!(
                "Missing required image(s): {}",
                names.join(", ")
            )));
        }

        let keys = self.upload_all(&images).await?;
        let Some(slot_keys) = CarImageKeys::from_slots(&keys) else {
            self.images.discard(&collect_keys(&keys)).await;
            return Err(RentalError::validation("All four car images are required"));
        };

        match self.store.insert_car(fields, slot_keys).await {
            Ok(car) => {
                info!("Created car {} ({})", car.id, car.car_name);
                Ok(car)
            }
            Err(e) => {
                self.images.discard(&collect_keys(&keys)).await;
                Err(RentalError::Database(e))
            }
        }
    }

    /// Apply a partial update.  Supplied images are stored first; the row
    /// is then changed in one statement.  Replaced objects are kept.
    pub async fn edit_car(
        &self,
        id: i64,
        patch: CarPatch,
        images: CarImages,
    ) -> Result<Car, RentalError> {
        observe("edit_car", self.edit_car_inner(id, patch, images).await)
    }

    async fn edit_car_inner(
        &self,
        id: i64,
        patch: CarPatch,
        images: CarImages,
    ) -> Result<Car, RentalError> {
        patch.validate().map_err(validation_failure)?;

        let not_found = RentalError::NotFound { entity: "Car", id };

        // Avoid storing images for a car that is not there.
        if !images.is_empty() {
            let existing = self.store.get_car(id).await.map_err(RentalError::Database)?;
            if existing.is_none() {
                return Err(not_found);
            }
        }

        let keys = self.upload_all(&images).await?;

        match self.store.update_car(id, patch, keys.clone()).await {
            Ok(Some(car)) => {
                info!("Updated car {}", id);
                Ok(car)
            }
            Ok(None) => {
                self.images.discard(&collect_keys(&keys)).await;
                Err(not_found)
            }
            Err(e) => {
                self.images.discard(&collect_keys(&keys)).await;
                Err(RentalError::Database(e))
            }
        }
    }

    /// Hard delete.  Image objects are left in storage.
    pub async fn delete_car(&self, id: i64) -> Result<(), RentalError> {
        let result = match self.store.delete_car(id).await {
            Ok(true) => {
                info!("Deleted car {}", id);
                Ok(())
            }
            Ok(false) => Err(RentalError::NotFound { entity: "Car", id }),
            Err(e) => Err(RentalError::Database(e)),
        };
        observe("delete_car", result)
    }

    /// Upload every supplied slot in slot order.  On failure, slots already
    /// stored are removed before the error is returned.
    async fn upload_all(&self, images: &CarImages) -> Result<ImageKeys, RentalError> {
        let mut keys = ImageKeys::new();
        for (slot, image) in images.iter() {
            match self.images.upload(image).await {
                Ok(key) => {
                    keys.insert(slot, key);
                }
                Err(e) => {
                    self.images.discard(&collect_keys(&keys)).await;
                    return Err(e);
                }
            }
        }
        Ok(keys)
    }
}

fn collect_keys(keys: &ImageKeys) -> Vec<String> {
    keys.iter().map(|(_, key)| key.clone()).collect()
}
