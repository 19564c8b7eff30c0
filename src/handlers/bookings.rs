//! Booking endpoints.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;

use super::form::{multipart_rejection, parse_id, read_form};
use crate::errors::{ErrorBody, RentalError};
use crate::models::{Booking, MessageBody, NewBooking};
use crate::AppState;

/// Multipart body of `POST /api/v1/book-car`.
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    #[serde(flatten)]
    fields: NewBooking,
    #[schema(value_type = String, format = Binary)]
    customer_image: Vec<u8>,
}

/// `POST /api/v1/book-car`
#[utoipa::path(
    post,
    path = "/api/v1/book-car",
    tag = "Bookings",
    operation_id = "BookCar",
    request_body(content = BookingForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Booking created", body = MessageBody),
        (status = 400, description = "Missing field or customer image", body = ErrorBody),
        (status = 413, description = "Body over the upload limit", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody),
        (status = 502, description = "Image storage failure", body = ErrorBody)
    )
)]
pub async fn book_car(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageBody>, RentalError> {
    let multipart = multipart.map_err(multipart_rejection)?;
    let limit = state.config.server.max_upload_size;
    let mut form = read_form(multipart, &[NewBooking::IMAGE_FIELD], limit).await?;
    let fields = form.new_booking()?;
    let image = form.booking_image();
    state.bookings.create_booking(fields, image).await?;
    Ok(Json(MessageBody::new("Booking Successfully")))
}

/// `GET /api/v1/book_car` -- active bookings.
#[utoipa::path(
    get,
    path = "/api/v1/book_car",
    tag = "Bookings",
    operation_id = "ListBookings",
    responses(
        (status = 200, description = "Active bookings", body = [Booking]),
        (status = 500, description = "Database failure", body = ErrorBody)
    )
)]
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Booking>>, RentalError> {
    Ok(Json(state.bookings.list_active_bookings().await?))
}

/// `DELETE /api/v1/delete-booking/{id}` -- archive the booking.
#[utoipa::path(
    delete,
    path = "/api/v1/delete-booking/{id}",
    tag = "Bookings",
    operation_id = "ArchiveBooking",
    params(("id" = i64, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking moved to completed bookings", body = MessageBody),
        (status = 400, description = "Id is not a positive integer", body = ErrorBody),
        (status = 404, description = "No active booking with this id", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody)
    )
)]
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, RentalError> {
    let id = parse_id(&id)?;
    state.bookings.archive_booking(id).await?;
    Ok(Json(MessageBody::new("Record Moved To Bookings Completed")))
}

/// `GET /api/v1/bookings_completed`
#[utoipa::path(
    get,
    path = "/api/v1/bookings_completed",
    tag = "Bookings",
    operation_id = "ListCompletedBookings",
    responses(
        (status = 200, description = "Archived bookings", body = [Booking]),
        (status = 500, description = "Database failure", body = ErrorBody)
    )
)]
pub async fn bookings_completed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Booking>>, RentalError> {
    Ok(Json(state.bookings.list_completed_bookings().await?))
}
