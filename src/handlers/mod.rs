//! HTTP handlers for the rental API.
//!
//! Handlers decode the request, call the matching service, and render the
//! result.  Every failure is a [`crate::errors::RentalError`].

pub mod bookings;
pub mod cars;
pub mod form;
pub mod uploads;
