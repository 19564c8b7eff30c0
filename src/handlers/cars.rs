//! Car catalog endpoints.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use super::form::{car_image_fields, multipart_rejection, parse_id, read_form};
use crate::errors::{ErrorBody, RentalError};
use crate::models::{Car, CarImages, CarPatch, MessageBody, NewCar};
use crate::AppState;

/// Multipart body of `POST /api/v1/insert-car`: every car field plus the
/// four image files.
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct CarForm {
    #[serde(flatten)]
    fields: NewCar,
    #[schema(value_type = String, format = Binary)]
    car_image_main: Vec<u8>,
    #[schema(value_type = String, format = Binary)]
    car_image_sub1: Vec<u8>,
    #[schema(value_type = String, format = Binary)]
    car_image_sub2: Vec<u8>,
    #[schema(value_type = String, format = Binary)]
    car_image_sub3: Vec<u8>,
}

/// Multipart body of `PATCH /api/v1/edit-car/{id}`: any subset of the car
/// fields and image files.
#[derive(Deserialize, ToSchema)]
#[allow(dead_code)]
#[serde(rename_all = "camelCase")]
pub struct CarEditForm {
    #[serde(flatten)]
    fields: CarPatch,
    #[schema(value_type = Option<String>, format = Binary)]
    car_image_main: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    car_image_sub1: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    car_image_sub2: Option<Vec<u8>>,
    #[schema(value_type = Option<String>, format = Binary)]
    car_image_sub3: Option<Vec<u8>>,
}

/// `GET /api/v1/all-cars`
#[utoipa::path(
    get,
    path = "/api/v1/all-cars",
    tag = "Cars",
    operation_id = "ListCars",
    responses(
        (status = 200, description = "Every car", body = [Car]),
        (status = 500, description = "Database failure", body = ErrorBody)
    )
)]
pub async fn list_cars(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Car>>, RentalError> {
    Ok(Json(state.cars.list_cars().await?))
}

/// `GET /api/v1/single-car/{id}` -- zero or one car, always as an array.
#[utoipa::path(
    get,
    path = "/api/v1/single-car/{id}",
    tag = "Cars",
    operation_id = "GetCar",
    params(("id" = i64, Path, description = "Car id")),
    responses(
        (status = 200, description = "Matching car, or an empty array", body = [Car]),
        (status = 400, description = "Id is not a positive integer", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody)
    )
)]
pub async fn single_car(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Car>>, RentalError> {
    let id = parse_id(&id)?;
    Ok(Json(state.cars.get_car(id).await?))
}

/// `POST /api/v1/insert-car`
#[utoipa::path(
    post,
    path = "/api/v1/insert-car",
    tag = "Cars",
    operation_id = "InsertCar",
    request_body(content = CarForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Car created", body = MessageBody),
        (status = 400, description = "Missing field or image", body = ErrorBody),
        (status = 413, description = "Body over the upload limit", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody),
        (status = 502, description = "Image storage failure", body = ErrorBody)
    )
)]
pub async fn insert_car(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageBody>, RentalError> {
    let multipart = multipart.map_err(multipart_rejection)?;
    let limit = state.config.server.max_upload_size;
    let mut form = read_form(multipart, &car_image_fields(), limit).await?;
    let fields = form.new_car()?;
    let images = form.car_images();
    state.cars.create_car(fields, images).await?;
    Ok(Json(MessageBody::new("Inserted Data Successfully")))
}

/// `PATCH /api/v1/edit-car/{id}` -- partial update from a multipart form,
/// a url-encoded form or a JSON object.  Responds with the updated row.
#[utoipa::path(
    patch,
    path = "/api/v1/edit-car/{id}",
    tag = "Cars",
    operation_id = "EditCar",
    params(("id" = i64, Path, description = "Car id")),
    request_body(
        content = CarEditForm,
        content_type = "multipart/form-data",
        description = "Fields to change. A url-encoded form or JSON object of car fields is also accepted."
    ),
    responses(
        (status = 200, description = "Updated car", body = [Car]),
        (status = 400, description = "Invalid id or field", body = ErrorBody),
        (status = 404, description = "No car with this id", body = ErrorBody),
        (status = 413, description = "Body over the upload limit", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody),
        (status = 502, description = "Image storage failure", body = ErrorBody)
    )
)]
pub async fn edit_car(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    req: Request,
) -> Result<Json<Vec<Car>>, RentalError> {
    let id = parse_id(&id)?;

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let (patch, images) = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &state)
            .await
            .map_err(multipart_rejection)?;
        let limit = state.config.server.max_upload_size;
        let mut form = read_form(multipart, &car_image_fields(), limit).await?;
        (form.car_patch(), form.car_images())
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(patch) = Form::<CarPatch>::from_request(req, &state)
            .await
            .map_err(|e| RentalError::validation(e.body_text()))?;
        (patch, CarImages::new())
    } else if content_type.starts_with("application/json") {
        let Json(patch) = Json::<CarPatch>::from_request(req, &state)
            .await
            .map_err(|e| RentalError::validation(e.body_text()))?;
        (patch, CarImages::new())
    } else {
        return Err(RentalError::validation(
            "Expected multipart/form-data, application/x-www-form-urlencoded or application/json",
        ));
    };

    let car = state.cars.edit_car(id, patch, images).await?;
    Ok(Json(vec![car]))
}

/// `DELETE /api/v1/delete-car/{id}`
#[utoipa::path(
    delete,
    path = "/api/v1/delete-car/{id}",
    tag = "Cars",
    operation_id = "DeleteCar",
    params(("id" = i64, Path, description = "Car id")),
    responses(
        (status = 200, description = "Car deleted", body = MessageBody),
        (status = 400, description = "Id is not a positive integer", body = ErrorBody),
        (status = 404, description = "No car with this id", body = ErrorBody),
        (status = 500, description = "Database failure", body = ErrorBody)
    )
)]
pub async fn delete_car(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, RentalError> {
    let id = parse_id(&id)?;
    state.cars.delete_car(id).await?;
    Ok(Json(MessageBody::new("Deleted Data Successfully")))
}
