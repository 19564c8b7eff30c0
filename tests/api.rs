//! Router-level tests: every request goes through the full axum stack
//! (middleware, extractors, handlers, services) over in-memory stores.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use gearshift::config::Config;
use gearshift::models::{Booking, Car, CarImageKeys, CarPatch, ImageKeys, NewBooking, NewCar};
use gearshift::storage::backend::StorageBackend;
use gearshift::storage::memory::MemoryBackend;
use gearshift::store::memory::MemoryRentalStore;
use gearshift::store::rental::{RentalStore, StoreFuture};
use gearshift::store::sqlite::SqliteRentalStore;
use gearshift::AppState;

const BOUNDARY: &str = "----gearshift-api-test";

const CAR_FIELDS: [(&str, &str); 15] = [
    ("carName", "Innova Crysta"),
    ("carDescription", "Seven seats, \"plenty\" of room; it's big"),
    ("carSlogan", "Family first"),
    ("carCurrency", "INR"),
    ("carRent", "3500"),
    ("carManufactureYear", "2022"),
    ("carBrandName", "Toyota"),
    ("carModelName", "ZX"),
    ("carFuelType", "Diesel"),
    ("carMileage", "14"),
    ("carGearSystem", "Automatic"),
    ("carSeatingCapacity", "7"),
    ("carStorageCapacity", "300"),
    ("carStatus", "1"),
    ("carAvailableDate", "2025-06-01"),
];

const BOOKING_FIELDS: [(&str, &str); 9] = [
    ("customerName", "Arjun"),
    ("customerMobile", "9000000001"),
    ("customerEmail", "arjun@example.com"),
    ("customerGender", "Male"),
    ("customerAddress", "Chennai"),
    ("customerPAN", "ABCDE1234F"),
    ("customerChoosenCar", "Innova Crysta"),
    ("customerChoosenCarFrom", "2025-06-10"),
    ("customerChoosenCarTo", "2025-06-12"),
];

const IMAGE_SLOTS: [&str; 4] = ["carImageMain", "carImageSub1", "carImageSub2", "carImageSub3"];

// ── Harness ─────────────────────────────────────────────────────────

struct TestApp {
    router: Router,
    store: Arc<dyn RentalStore>,
    storage: Arc<MemoryBackend>,
}

fn test_app_with(store: Arc<dyn RentalStore>) -> TestApp {
    test_app_with_config(Config::default(), store)
}

fn test_app_with_config(config: Config, store: Arc<dyn RentalStore>) -> TestApp {
    let storage = Arc::new(MemoryBackend::default());
    let state = Arc::new(AppState::new(config, store.clone(), storage.clone()));
    TestApp {
        router: gearshift::server::app(state),
        store,
        storage,
    }
}

fn test_app() -> TestApp {
    test_app_with(Arc::new(MemoryRentalStore::new()))
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

impl TestApp {
    async fn send(&self, req: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        Reply {
            status,
            headers,
            body,
        }
    }

    async fn get(&self, uri: &str) -> Reply {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn delete(&self, uri: &str) -> Reply {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn multipart(&self, method: Method, uri: &str, form: &Form) -> Reply {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(form.encode()))
                .unwrap(),
        )
        .await
    }

    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn patch_json(&self, uri: &str, value: Value) -> Reply {
        self.send(
            Request::builder()
                .method(Method::PATCH)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Insert a car with all four images and return its row.
    async fn create_car(&self) -> Value {
        let reply = self
            .multipart(Method::POST, "/api/v1/insert-car", &full_car_form())
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let cars = self.get("/api/v1/all-cars").await.json();
        cars.as_array().unwrap().last().unwrap().clone()
    }

    async fn create_booking(&self) -> Value {
        let reply = self
            .multipart(Method::POST, "/api/v1/book-car", &full_booking_form())
            .await;
        assert_eq!(reply.status, StatusCode::OK);
        let bookings = self.get("/api/v1/book_car").await.json();
        bookings.as_array().unwrap().last().unwrap().clone()
    }
}

#[derive(Default)]
struct Form {
    parts: Vec<(String, Option<String>, Vec<u8>)>,
}

impl Form {
    fn text(mut self, name: &str, value: &str) -> Self {
        self.parts
            .push((name.to_string(), None, value.as_bytes().to_vec()));
        self
    }

    fn file(mut self, name: &str, file_name: &str, data: &[u8]) -> Self {
        self.parts
            .push((name.to_string(), Some(file_name.to_string()), data.to_vec()));
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (name, file_name, data) in &self.parts {
            out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: image/jpeg\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            out.extend_from_slice(data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        out
    }
}

fn car_text_form() -> Form {
    CAR_FIELDS
        .iter()
        .fold(Form::default(), |form, (name, value)| form.text(name, value))
}

fn full_car_form() -> Form {
    IMAGE_SLOTS.iter().fold(car_text_form(), |form, slot| {
        form.file(slot, &format!("{slot}.jpg"), format!("data:{slot}").as_bytes())
    })
}

fn full_booking_form() -> Form {
    BOOKING_FIELDS
        .iter()
        .fold(Form::default(), |form, (name, value)| form.text(name, value))
        .file("customerImage", "arjun.png", b"customer photo")
}

/// Relational store that is down.
struct UnreachableStore;

fn refused<T: Send + 'static>() -> StoreFuture<'static, T> {
    Box::pin(async { Err::<T, _>(anyhow::anyhow!("connection refused")) })
}

impl RentalStore for UnreachableStore {
    fn list_cars(&self) -> StoreFuture<'_, Vec<Car>> {
        refused()
    }
    fn get_car(&self, _id: i64) -> StoreFuture<'_, Option<Car>> {
        refused()
    }
    fn insert_car(&self, _fields: NewCar, _images: CarImageKeys) -> StoreFuture<'_, Car> {
        refused()
    }
    fn update_car(
        &self,
        _id: i64,
        _patch: CarPatch,
        _images: ImageKeys,
    ) -> StoreFuture<'_, Option<Car>> {
        refused()
    }
    fn delete_car(&self, _id: i64) -> StoreFuture<'_, bool> {
        refused()
    }
    fn insert_booking(&self, _fields: NewBooking, _key: String) -> StoreFuture<'_, Booking> {
        refused()
    }
    fn list_bookings(&self) -> StoreFuture<'_, Vec<Booking>> {
        refused()
    }
    fn list_completed_bookings(&self) -> StoreFuture<'_, Vec<Booking>> {
        refused()
    }
    fn archive_booking(&self, _id: i64) -> StoreFuture<'_, Option<Booking>> {
        refused()
    }
    fn ping(&self) -> StoreFuture<'_, ()> {
        refused()
    }
}

fn without_id(mut row: Value) -> Value {
    row.as_object_mut().unwrap().remove("id");
    row
}

// ── Cars ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_car_then_fetch_returns_keys_in_slot_order() {
    let app = test_app();
    let reply = app
        .multipart(Method::POST, "/api/v1/insert-car", &full_car_form())
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "message": "Inserted Data Successfully" }));

    let all = app.get("/api/v1/all-cars").await.json();
    let id = all[0]["id"].as_i64().unwrap();

    let single = app.get(&format!("/api/v1/single-car/{id}")).await;
    assert_eq!(single.status, StatusCode::OK);
    let rows = single.json();
    assert_eq!(rows.as_array().unwrap().len(), 1);
    let car = &rows[0];

    for (name, value) in CAR_FIELDS {
        assert_eq!(car[name], value, "field {name}");
    }
    for slot in IMAGE_SLOTS {
        let key = car[slot].as_str().unwrap();
        assert!(key.starts_with("gearshift-images/"), "{key}");
        assert!(key.ends_with(&format!("-{slot}.jpg")), "{key}");

        let stored = app.storage.get(key).await.unwrap().unwrap();
        assert_eq!(stored.data, format!("data:{slot}").into_bytes());
    }
}

#[tokio::test]
async fn test_create_car_missing_image_is_rejected_without_side_effects() {
    let app = test_app();
    let form = IMAGE_SLOTS[..3].iter().fold(car_text_form(), |form, slot| {
        form.file(slot, &format!("{slot}.jpg"), b"jpeg")
    });

    let reply = app.multipart(Method::POST, "/api/v1/insert-car", &form).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let body = reply.json();
    assert_eq!(body["error"], "ValidationError");
    assert!(body["message"].as_str().unwrap().contains("carImageSub3"));

    assert!(app.store.list_cars().await.unwrap().is_empty());
    assert!(app.storage.is_empty().await);
}

#[tokio::test]
async fn test_create_car_missing_text_field_is_rejected() {
    let app = test_app();
    let form = IMAGE_SLOTS
        .iter()
        .fold(Form::default().text("carName", "Solo"), |form, slot| {
            form.file(slot, "x.jpg", b"jpeg")
        });

    let reply = app.multipart(Method::POST, "/api/v1/insert-car", &form).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["message"]
        .as_str()
        .unwrap()
        .contains("carSlogan"));
    assert!(app.storage.is_empty().await);
}

#[tokio::test]
async fn test_create_car_rejects_unknown_file_part() {
    let app = test_app();
    let form = full_car_form().file("carImageSub4", "extra.jpg", b"jpeg");
    let reply = app.multipart(Method::POST, "/api/v1/insert-car", &form).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(app.storage.is_empty().await);
}

#[tokio::test]
async fn test_edit_only_rent_leaves_everything_else() {
    let app = test_app();
    let before = app.create_car().await;
    let id = before["id"].as_i64().unwrap();

    let reply = app
        .multipart(
            Method::PATCH,
            &format!("/api/v1/edit-car/{id}"),
            &Form::default().text("carRent", "3999"),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let mut expected = before.clone();
    expected["carRent"] = json!("3999");
    assert_eq!(reply.json(), json!([expected.clone()]));

    let after = app.get(&format!("/api/v1/single-car/{id}")).await.json();
    assert_eq!(after, json!([expected]));
}

#[tokio::test]
async fn test_edit_two_fields_by_json_round_trip() {
    let app = test_app();
    let before = app.create_car().await;
    let id = before["id"].as_i64().unwrap();

    let reply = app
        .patch_json(
            &format!("/api/v1/edit-car/{id}"),
            json!({ "carSlogan": "Go further", "carStatus": "0", "unknownField": "ignored" }),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let after = app.get(&format!("/api/v1/single-car/{id}")).await.json();
    let mut expected = before;
    expected["carSlogan"] = json!("Go further");
    expected["carStatus"] = json!("0");
    assert_eq!(after, json!([expected]));
}

#[tokio::test]
async fn test_edit_replaces_single_image_slot() {
    let app = test_app();
    let before = app.create_car().await;
    let id = before["id"].as_i64().unwrap();

    let reply = app
        .multipart(
            Method::PATCH,
            &format!("/api/v1/edit-car/{id}"),
            &Form::default().file("carImageSub2", "rear.jpg", b"rear view"),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let rows = reply.json();
    let car = &rows[0];
    assert!(car["carImageSub2"].as_str().unwrap().ends_with("-rear.jpg"));
    for slot in ["carImageMain", "carImageSub1", "carImageSub3"] {
        assert_eq!(car[slot], before[slot]);
    }
    assert_eq!(car["carName"], before["carName"]);
}

#[tokio::test]
async fn test_edit_missing_car_is_not_found() {
    let app = test_app();
    let reply = app
        .multipart(
            Method::PATCH,
            "/api/v1/edit-car/77",
            &Form::default().text("carRent", "1"),
        )
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["error"], "NotFound");
}

#[tokio::test]
async fn test_edit_rejects_other_content_types() {
    let app = test_app();
    let car = app.create_car().await;
    let reply = app
        .send(
            Request::builder()
                .method(Method::PATCH)
                .uri(format!("/api/v1/edit-car/{}", car["id"]))
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("carRent=1"))
                .unwrap(),
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "ValidationError");
}

#[tokio::test]
async fn test_edit_only_rent_by_urlencoded_form() {
    let app = test_app();
    let before = app.create_car().await;
    let id = before["id"].as_i64().unwrap();

    let reply = app
        .send_raw(
            Method::PATCH,
            &format!("/api/v1/edit-car/{id}"),
            Some("application/x-www-form-urlencoded"),
            "carRent=4100",
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);

    let mut expected = before;
    expected["carRent"] = json!("4100");
    let after = app.get(&format!("/api/v1/single-car/{id}")).await.json();
    assert_eq!(after, json!([expected]));

    let missing = app
        .send_raw(
            Method::PATCH,
            "/api/v1/edit-car/9999",
            Some("application/x-www-form-urlencoded"),
            "carRent=1",
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.json()["error"], "NotFound");
}

#[tokio::test]
async fn test_create_endpoints_require_multipart_body() {
    let app = test_app();

    let reply = app
        .send_raw(
            Method::POST,
            "/api/v1/insert-car",
            Some("application/json"),
            r#"{"carName":"Thar"}"#,
        )
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()["error"], "ValidationError");

    let reply = app
        .send_raw(Method::POST, "/api/v1/book-car", None, "customerName=Arjun")
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let body = reply.json();
    assert_eq!(body["error"], "ValidationError");
    assert!(body["message"].is_string());

    assert!(app.store.list_cars().await.unwrap().is_empty());
    assert!(app.store.list_bookings().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_names_the_limit() {
    let mut config = Config::default();
    config.server.max_upload_size = 1024;
    let app = test_app_with_config(config, Arc::new(MemoryRentalStore::new()));

    let form = IMAGE_SLOTS.iter().fold(car_text_form(), |form, slot| {
        form.file(slot, "big.jpg", &[0u8; 4096])
    });
    let reply = app.multipart(Method::POST, "/api/v1/insert-car", &form).await;
    assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
    let body = reply.json();
    assert_eq!(body["error"], "ValidationError");
    assert!(body["message"].as_str().unwrap().contains("1024"), "{body}");

    assert!(app.store.list_cars().await.unwrap().is_empty());
    assert!(app.storage.is_empty().await);
}

#[tokio::test]
async fn test_single_car_missing_is_empty_array() {
    let app = test_app();
    let reply = app.get("/api/v1/single-car/12345").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!([]));
}

#[tokio::test]
async fn test_invalid_ids_are_validation_errors() {
    let app = test_app();
    for uri in [
        "/api/v1/single-car/abc",
        "/api/v1/single-car/0",
        "/api/v1/single-car/1%20OR%201=1",
    ] {
        let reply = app.get(uri).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(reply.json()["error"], "ValidationError");
    }
    let reply = app.delete("/api/v1/delete-booking/-1").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_car() {
    let app = test_app();
    let car = app.create_car().await;
    let uri = format!("/api/v1/delete-car/{}", car["id"]);

    let reply = app.delete(&uri).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "message": "Deleted Data Successfully" }));
    assert_eq!(app.get("/api/v1/all-cars").await.json(), json!([]));

    let again = app.delete(&uri).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

// ── Bookings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_book_car_and_list() {
    let app = test_app();
    let reply = app
        .multipart(Method::POST, "/api/v1/book-car", &full_booking_form())
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "message": "Booking Successfully" }));

    let bookings = app.get("/api/v1/book_car").await.json();
    let booking = &bookings[0];
    for (name, value) in BOOKING_FIELDS {
        assert_eq!(booking[name], value, "field {name}");
    }
    let key = booking["customerImage"].as_str().unwrap();
    assert!(key.ends_with("-arjun.png"));

    let image = app.get(&format!("/uploads/{key}")).await;
    assert_eq!(image.status, StatusCode::OK);
    assert_eq!(image.body, b"customer photo");
    assert_eq!(image.headers[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn test_book_car_without_image_is_rejected() {
    let app = test_app();
    let form = BOOKING_FIELDS
        .iter()
        .fold(Form::default(), |form, (name, value)| form.text(name, value));
    let reply = app.multipart(Method::POST, "/api/v1/book-car", &form).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()["message"]
        .as_str()
        .unwrap()
        .contains("customerImage"));
    assert_eq!(app.get("/api/v1/book_car").await.json(), json!([]));
}

#[tokio::test]
async fn test_archive_moves_booking_to_completed() {
    let app = test_app();
    let booking = app.create_booking().await;
    let id = booking["id"].as_i64().unwrap();

    let reply = app.delete(&format!("/api/v1/delete-booking/{id}")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.json(),
        json!({ "message": "Record Moved To Bookings Completed" })
    );

    let active = app.get("/api/v1/book_car").await.json();
    assert!(active
        .as_array()
        .unwrap()
        .iter()
        .all(|b| b["id"].as_i64() != Some(id)));

    let completed = app.get("/api/v1/bookings_completed").await.json();
    let completed = completed.as_array().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(without_id(completed[0].clone()), without_id(booking));
}

#[tokio::test]
async fn test_archive_missing_booking_is_not_found_and_changes_nothing() {
    let app = test_app();
    let booking = app.create_booking().await;
    let missing = booking["id"].as_i64().unwrap() + 1000;

    let reply = app.delete(&format!("/api/v1/delete-booking/{missing}")).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["error"], "NotFound");

    assert_eq!(app.get("/api/v1/book_car").await.json(), json!([booking]));
    assert_eq!(app.get("/api/v1/bookings_completed").await.json(), json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_archive_moves_exactly_once() {
    let app = test_app_with(Arc::new(SqliteRentalStore::new(":memory:").unwrap()));
    let booking = app.create_booking().await;
    let uri = format!("/api/v1/delete-booking/{}", booking["id"]);

    let (a, b) = tokio::join!(app.delete(&uri), app.delete(&uri));
    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::NOT_FOUND]);

    assert_eq!(app.get("/api/v1/book_car").await.json(), json!([]));
    let completed = app.get("/api/v1/bookings_completed").await.json();
    assert_eq!(completed.as_array().unwrap().len(), 1);
}

// ── Infrastructure ──────────────────────────────────────────────────

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let reply = app.get("/health").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json(), json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_health_reports_store_outage() {
    let app = test_app_with(Arc::new(UnreachableStore));
    let reply = app.get("/health").await;
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        reply.json(),
        json!({ "error": "StoreError", "message": "Database unavailable" })
    );

    let reply = app.get("/api/v1/all-cars").await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.json()["error"], "StoreError");
}

#[tokio::test]
async fn test_common_headers() {
    let app = test_app();
    let reply = app.get("/api/v1/all-cars").await;
    let request_id = reply.headers["x-request-id"].to_str().unwrap();
    assert_eq!(request_id.len(), 16);
    assert!(reply.headers.contains_key(header::DATE));

    // Errors carry them too.
    let reply = app.get("/api/v1/single-car/nope").await;
    assert!(reply.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_allows_configured_origin_only() {
    let app = test_app();
    let preflight = |origin: &str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/v1/all-cars")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap()
    };

    let allowed = Config::default().cors.allowed_origins[0].clone();
    let reply = app.send(preflight(&allowed)).await;
    assert_eq!(
        reply.headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        allowed.as_str()
    );
    assert_eq!(reply.headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

    let reply = app.send(preflight("https://evil.example")).await;
    assert!(!reply
        .headers
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_missing_upload_is_not_found() {
    let app = test_app();
    let reply = app.get("/uploads/gearshift-images/nothing.jpg").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json()["error"], "NotFound");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = test_app();
    let reply = app.get("/openapi.json").await;
    assert_eq!(reply.status, StatusCode::OK);
    let doc = reply.json();
    for path in [
        "/api/v1/all-cars",
        "/api/v1/single-car/{id}",
        "/api/v1/edit-car/{id}",
        "/api/v1/delete-booking/{id}",
        "/api/v1/bookings_completed",
    ] {
        assert!(doc["paths"].get(path).is_some(), "{path} missing");
    }
}
