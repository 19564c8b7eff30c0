//! Car catalog and booking lifecycle services.
//!
//! Services sit between the HTTP handlers and the two stores.  They
//! validate input, push images to object storage, write rows, and turn
//! every failure into a [`RentalError`].

pub mod bookings;
pub mod cars;

pub use bookings::BookingLifecycle;
pub use cars::CarCatalog;

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::RentalError;
use crate::models::ImageUpload;
use crate::storage::backend::StorageBackend;
use crate::storage::object_key;

/// Writes uploaded images under freshly generated keys.
#[derive(Clone)]
pub(crate) struct ImageStore {
    backend: Arc<dyn StorageBackend>,
    key_prefix: String,
}

impl ImageStore {
    pub(crate) fn new(backend: Arc<dyn StorageBackend>, key_prefix: String) -> Self {
        Self {
            backend,
            key_prefix,
        }
    }

    /// Store one image and return its key.
    pub(crate) async fn upload(&self, image: &ImageUpload) -> Result<String, RentalError> {
        let key = object_key(&self.key_prefix, &image.file_name);
        self.backend
            .put(&key, image.data.clone())
            .await
            .map_err(RentalError::ObjectStorage)?;
        crate::metrics::record_upload(image.data.len());
        info!("Stored image {} ({} bytes)", key, image.data.len());
        Ok(key)
    }

    /// Best-effort removal of objects no row will reference.
    pub(crate) async fn discard(&self, keys: &[String]) {
        for key in keys {
            match self.backend.delete(key).await {
                Ok(()) => info!("Removed orphaned image {}", key),
                Err(e) => warn!("Failed to remove orphaned image {}: {:#}", key, e),
            }
        }
    }
}

/// Record the outcome of a service operation and pass it through.
pub(crate) fn observe<T>(
    operation: &'static str,
    result: Result<T, RentalError>,
) -> Result<T, RentalError> {
    let status = match &result {
        Ok(_) => "ok",
        Err(e) => e.code(),
    };
    crate::metrics::record_operation(operation, status);
    result
}

/// Turn a `garde` report into a single validation error naming the
/// offending form fields.
pub(crate) fn validation_failure(report: garde::Report) -> RentalError {
    let details: Vec<String> = report
        .iter()
        .map(|(path, error)| format!("{}: {}", form_field_name(&path.to_string()), error))
        .collect();
    RentalError::validation(details.join("; "))
}

/// `car_image_main` -> `carImageMain`; `customer_pan` keeps its
/// upper-case wire spelling.
fn form_field_name(rust_name: &str) -> String {
    if rust_name == "customer_pan" {
        return "customerPAN".to_string();
    }
    let mut out = String::with_capacity(rust_name.len());
    let mut upper = false;
    for c in rust_name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
