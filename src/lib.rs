//! Gearshift library -- car rental backend.
//!
//! This crate provides the car catalog and booking services, a relational
//! store for their rows, pluggable object storage for their images, and the
//! axum HTTP layer in front of them.

use std::sync::Arc;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod server;
pub mod service;
pub mod storage;
pub mod store;

use crate::config::Config;
use crate::service::{BookingLifecycle, CarCatalog};
use crate::storage::backend::StorageBackend;
use crate::store::rental::RentalStore;

/// Shared application state passed to all handlers via `axum::extract::State`.
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Relational store (SQLite or in-memory).
    pub store: Arc<dyn RentalStore>,
    /// Object storage backend for images (local disk, memory or S3).
    pub storage: Arc<dyn StorageBackend>,
    /// Car listing operations.
    pub cars: CarCatalog,
    /// Booking operations.
    pub bookings: BookingLifecycle,
}

impl AppState {
    /// Build both services over the given stores.
    pub fn new(
        config: Config,
        store: Arc<dyn RentalStore>,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let prefix = config.storage.key_prefix.clone();
        Self {
            cars: CarCatalog::new(store.clone(), storage.clone(), prefix.clone()),
            bookings: BookingLifecycle::new(store.clone(), storage.clone(), prefix),
            config,
            store,
            storage,
        }
    }
}
