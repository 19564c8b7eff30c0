//! Serves stored images so persisted keys can be turned into URLs.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_TYPE, ETAG};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::errors::{ErrorBody, RentalError};
use crate::storage::content_type_for;
use crate::AppState;

/// `GET /uploads/{key}` -- the bytes stored under `key`.
#[utoipa::path(
    get,
    path = "/uploads/{key}",
    tag = "Uploads",
    operation_id = "GetUpload",
    params(("key" = String, Path, description = "Stored-object key, e.g. gearshift-images/1700000000000-1a2b3c4d-car.jpg")),
    responses(
        (status = 200, description = "Image bytes"),
        (status = 404, description = "No image under this key", body = ErrorBody),
        (status = 502, description = "Image storage failure", body = ErrorBody)
    )
)]
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, RentalError> {
    let missing = || RentalError::MissingObject { key: key.clone() };

    if key.is_empty() || key.split('/').any(|segment| segment == ".." || segment == ".") {
        return Err(missing());
    }

    let object = state
        .storage
        .get(&key)
        .await
        .map_err(RentalError::ObjectStorage)?
        .ok_or_else(missing)?;

    let mut response = (StatusCode::OK, object.data).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type_for(&key)));
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", object.content_hash)) {
        headers.insert(ETAG, etag);
    }
    Ok(response)
}
