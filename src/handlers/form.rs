//! `multipart/form-data` decoding for car and booking submissions.
//!
//! Text parts are collected by name.  File parts are accepted only under
//! the names the caller lists, at most once each.  A file input left
//! empty by the browser (no file name, no bytes) counts as absent.

use std::collections::HashMap;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::errors::RentalError;
use crate::models::{CarField, CarImages, CarPatch, ImageSlot, ImageUpload, NewBooking, NewCar};

/// Decoded form: text values and uploaded files, keyed by part name.
#[derive(Debug, Default)]
pub struct FormData {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, ImageUpload>,
}

/// A request that is not `multipart/form-data` at all.
pub fn multipart_rejection(rejection: MultipartRejection) -> RentalError {
    RentalError::validation(rejection.body_text())
}

fn multipart_failure(err: MultipartError, upload_limit: usize) -> RentalError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return RentalError::TooLarge {
            limit: upload_limit,
        };
    }
    RentalError::validation(format!("Malformed multipart body: {}", err.body_text()))
}

/// Drain `multipart`, accepting file parts only under `file_fields`.
/// `upload_limit` is the body limit in force, reported when it is hit.
pub async fn read_form(
    mut multipart: Multipart,
    file_fields: &[&str],
    upload_limit: usize,
) -> Result<FormData, RentalError> {
    let mut form = FormData::default();
    let failure = |err: MultipartError| multipart_failure(err, upload_limit);

    while let Some(field) = multipart.next_field().await.map_err(failure)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let data = field.bytes().await.map_err(failure)?;
                if file_name.is_empty() && data.is_empty() {
                    continue;
                }
                if !file_fields.contains(&name.as_str()) {
                    return Err(RentalError::validation(format!(
                        "Unexpected file field: {name}"
                    )));
                }
                if form.files.contains_key(&name) {
                    return Err(RentalError::validation(format!(
                        "File field {name} was supplied more than once"
                    )));
                }
                form.files.insert(
                    name,
                    ImageUpload { file_name, data },
                );
            }
            None => {
                let value = field.text().await.map_err(failure)?;
                form.fields.insert(name, value);
            }
        }
    }

    Ok(form)
}

/// Part names of the four car image slots.
pub fn car_image_fields() -> [&'static str; 4] {
    ImageSlot::ALL.map(ImageSlot::field_name)
}

impl FormData {
    /// Every descriptive car field, all required.
    pub fn new_car(&mut self) -> Result<NewCar, RentalError> {
        let mut car = NewCar::default();
        let mut missing = Vec::new();
        for field in CarField::ALL {
            match self.fields.remove(field.field_name()) {
                Some(value) => *car.field_mut(field) = value,
                None => missing.push(field.field_name()),
            }
        }
        if !missing.is_empty() {
            return Err(RentalError::validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )));
        }
        Ok(car)
    }

    /// Only the descriptive car fields present in the form.
    pub fn car_patch(&mut self) -> CarPatch {
        let mut patch = CarPatch::default();
        for field in CarField::ALL {
            if let Some(value) = self.fields.remove(field.field_name()) {
                *patch.field_mut(field) = Some(value);
            }
        }
        patch
    }

    /// Uploaded car images by slot.
    pub fn car_images(&mut self) -> CarImages {
        let mut images = CarImages::new();
        for slot in ImageSlot::ALL {
            if let Some(upload) = self.files.remove(slot.field_name()) {
                images.insert(slot, upload);
            }
        }
        images
    }

    /// Every booking field, all required.
    pub fn new_booking(&mut self) -> Result<NewBooking, RentalError> {
        let mut booking = NewBooking::default();
        let mut missing = Vec::new();
        for name in NewBooking::FIELDS {
            match (self.fields.remove(name), booking.field_mut(name)) {
                (Some(value), Some(slot)) => *slot = value,
                _ => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(RentalError::validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )));
        }
        Ok(booking)
    }

    /// The customer image, if one was uploaded.
    pub fn booking_image(&mut self) -> Option<ImageUpload> {
        self.files.remove(NewBooking::IMAGE_FIELD)
    }
}

/// Parse a path id.  Only positive integers name a row.
pub fn parse_id(raw: &str) -> Result<i64, RentalError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(RentalError::validation(format!(
            "Invalid id {raw:?}: expected a positive integer"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;

    const BOUNDARY: &str = "gearshift-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut out = Vec::new();
        for part in parts {
            out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    out.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(name, file_name, data) => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: image/jpeg\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(data);
                    out.extend_from_slice(b"\r\n");
                }
            }
        }
        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        out
    }

    async fn decode(parts: &[Part<'_>], file_fields: &[&str]) -> Result<FormData, RentalError> {
        let req = Request::builder()
            .method("POST")
            .uri("/")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body(parts)))
            .unwrap();
        let multipart = Multipart::from_request(req, &()).await.unwrap();
        read_form(multipart, file_fields, 10 * 1024 * 1024).await
    }

    #[tokio::test]
    async fn test_reads_text_and_files() {
        let mut form = decode(
            &[
                Part::Text("carName", "Thar"),
                Part::Text("carRent", "4000"),
                Part::File("carImageMain", "thar.jpg", b"jpeg"),
            ],
            &car_image_fields(),
        )
        .await
        .unwrap();

        let patch = form.car_patch();
        assert_eq!(patch.car_name.as_deref(), Some("Thar"));
        assert_eq!(patch.car_rent.as_deref(), Some("4000"));
        assert!(patch.car_slogan.is_none());

        let images = form.car_images();
        let main = images.get(ImageSlot::Main).unwrap();
        assert_eq!(main.file_name, "thar.jpg");
        assert_eq!(&main.data[..], b"jpeg");
        assert!(!images.contains(ImageSlot::Sub1));
    }

    #[tokio::test]
    async fn test_unknown_file_field_rejected() {
        let err = decode(&[Part::File("carImageSub9", "x.jpg", b"x")], &car_image_fields())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ValidationError");
        assert!(err.to_string().contains("carImageSub9"));
    }

    #[tokio::test]
    async fn test_duplicate_file_field_rejected() {
        let err = decode(
            &[
                Part::File("carImageMain", "a.jpg", b"a"),
                Part::File("carImageMain", "b.jpg", b"b"),
            ],
            &car_image_fields(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[tokio::test]
    async fn test_empty_file_input_is_absent() {
        let mut form = decode(&[Part::File("carImageMain", "", b"")], &car_image_fields())
            .await
            .unwrap();
        assert!(form.car_images().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_text_fields_ignored() {
        let mut form = decode(
            &[Part::Text("submit", "Save"), Part::Text("carStatus", "0")],
            &car_image_fields(),
        )
        .await
        .unwrap();
        let patch = form.car_patch();
        assert_eq!(patch.supplied().len(), 1);
    }

    #[tokio::test]
    async fn test_new_car_lists_missing_fields() {
        let mut form = decode(&[Part::Text("carName", "Thar")], &car_image_fields())
            .await
            .unwrap();
        let err = form.new_car().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("carDescription"));
        assert!(message.contains("carAvailableDate"));
        assert!(!message.contains("carName"));
    }

    #[tokio::test]
    async fn test_new_booking_and_image() {
        let mut parts: Vec<Part<'_>> = NewBooking::FIELDS
            .into_iter()
            .map(|name| Part::Text(name, "v"))
            .collect();
        parts.push(Part::File("customerImage", "me.png", b"png"));

        let mut form = decode(&parts, &[NewBooking::IMAGE_FIELD]).await.unwrap();
        let booking = form.new_booking().unwrap();
        assert_eq!(booking.customer_pan, "v");
        assert_eq!(booking.customer_choosen_car_to, "v");
        assert_eq!(form.booking_image().unwrap().file_name, "me.png");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("12").unwrap(), 12);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-3").is_err());
        assert!(parse_id("abc").is_err());
        assert!(parse_id("1;DROP TABLE cars").is_err());
    }
}
