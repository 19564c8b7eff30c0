//! Axum router construction for the rental API.
//!
//! The [`app`] function wires every endpoint to its handler, mounts the
//! Swagger UI, and applies CORS, request-id and metrics middleware.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::errors::{generate_request_id, ErrorBody};
use crate::handlers::{bookings, cars, uploads};
use crate::metrics::{metrics_handler, metrics_middleware};
use crate::AppState;

/// Header carrying the per-response request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// -- OpenAPI specification ----------------------------------------------------

/// OpenAPI documentation for the Gearshift rental API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gearshift Car Rental API",
        version = "0.1.0",
        description = "Car listings, bookings and their images"
    ),
    paths(
        health_check,
        cars::list_cars,
        cars::single_car,
        cars::insert_car,
        cars::edit_car,
        cars::delete_car,
        bookings::book_car,
        bookings::list_bookings,
        bookings::delete_booking,
        bookings::bookings_completed,
        uploads::get_upload,
    ),
    components(schemas(
        crate::models::Car,
        crate::models::CarPatch,
        crate::models::NewCar,
        crate::models::Booking,
        crate::models::NewBooking,
        crate::models::MessageBody,
        ErrorBody,
    )),
    tags(
        (name = "Health", description = "Liveness and database reachability"),
        (name = "Cars", description = "Car catalog"),
        (name = "Bookings", description = "Customer bookings and their archive"),
        (name = "Uploads", description = "Stored images"),
    )
)]
struct ApiDoc;

/// Build the axum [`Router`] with every rental route.
///
/// The returned router is ready to be passed to `axum::serve`.
pub fn app(state: Arc<AppState>) -> Router {
    let openapi = ApiDoc::openapi();
    let max_upload_size = state.config.server.max_upload_size;
    let cors = cors_layer(&state.config.cors);

    let mut router = Router::new()
        .route("/health", get(health_check))
        // Cars
        .route("/api/v1/all-cars", get(cars::list_cars))
        .route("/api/v1/single-car/:id", get(cars::single_car))
        .route("/api/v1/insert-car", post(cars::insert_car))
        .route("/api/v1/edit-car/:id", patch(cars::edit_car))
        .route("/api/v1/delete-car/:id", delete(cars::delete_car))
        // Bookings
        .route("/api/v1/book-car", post(bookings::book_car))
        .route("/api/v1/book_car", get(bookings::list_bookings))
        .route("/api/v1/delete-booking/:id", delete(bookings::delete_booking))
        .route("/api/v1/bookings_completed", get(bookings::bookings_completed))
        // Stored images (wildcard key captures slashes)
        .route("/uploads/*key", get(uploads::get_upload))
        // Swagger UI and the OpenAPI document
        .merge(SwaggerUi::new("/gearshift-api-docs").url("/openapi.json", openapi));

    if state.config.observability.metrics {
        router = router.route("/metrics", get(metrics_handler));
    }

    let router = router
        .with_state(state.clone())
        // Layer ordering: inner layers run first, outer layers wrap them.
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(common_headers_middleware));

    if state.config.observability.metrics {
        // Outermost so it captures the full request lifecycle.
        router.layer(middleware::from_fn(metrics_middleware))
    } else {
        router
    }
}

/// CORS policy from the configured allow-list.  Credentials are allowed,
/// so origins must be listed explicitly.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) if origin != "*" => Some(value),
            _ => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .expose_headers([header::HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
}

// -- Common headers middleware -----------------------------------------------

/// Middleware that adds common response headers to every response:
/// - `x-request-id`: 16-character uppercase hex string
/// - `Date`: RFC 7231 formatted timestamp
/// - `Server`: `Gearshift`
async fn common_headers_middleware(req: Request<axum::body::Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    if !headers.contains_key(REQUEST_ID_HEADER) {
        if let Ok(value) = HeaderValue::from_str(&generate_request_id()) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
    }

    let date = httpdate::fmt_http_date(std::time::SystemTime::now());
    if let Ok(value) = HeaderValue::from_str(&date) {
        headers.insert(header::DATE, value);
    }
    headers.insert(header::SERVER, HeaderValue::from_static("Gearshift"));

    response
}

// -- Health check ------------------------------------------------------------

/// `GET /health` -- `{"status": "ok"}` once the database answers.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "HealthCheck",
    responses(
        (status = 200, description = "Service and database are up"),
        (status = 503, description = "Database unreachable", body = ErrorBody)
    )
)]
async fn health_check(State(state): State<Arc<AppState>>) -> Response {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(e) => {
            warn!("Health check failed: {:#}", e);
            let body = ErrorBody {
                error: "StoreError".to_string(),
                message: "Database unavailable".to_string(),
            };
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}
