//! Relational storage layer.
//!
//! The rental store keeps car listings, active bookings and completed
//! bookings.  The [`rental::RentalStore`] trait defines the interface;
//! [`sqlite::SqliteRentalStore`] is the default implementation and
//! [`memory::MemoryRentalStore`] serves ephemeral deployments and tests.

pub mod memory;
pub mod rental;
pub mod sqlite;
