//! Axum request handlers for all service endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::protocol::{
    CreateRecordRequest, ErrorResponse, HealthResponse, RecordAck, RecordList,
    UpdateRecordRequest,
};
use common::ServiceError;
use tracing::warn;
use uuid::Uuid;

use super::state::AppState;
use crate::records::{Attribute, NewRecord, RecordError, RecordPatch};

/// `POST /records` — encrypt and store a new record.
pub async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<CreateRecordRequest>,
) -> Response {
    let image = match decode_image(&req.image) {
        Ok(bytes) => bytes,
        Err(e) => return error_response(e),
    };
    let new = NewRecord {
        full_name: req.full_name,
        date_of_birth: req.date_of_birth,
        address: req.address,
        phone_number: req.phone_number,
        email: req.email,
        image,
    };

    match state.records.create(new).await {
        Ok(record) => {
            let ack = RecordAck {
                id: record.id,
                image_url: record.image_url,
                updated_fields: [
                    Attribute::FullName,
                    Attribute::DateOfBirth,
                    Attribute::Address,
                    Attribute::PhoneNumber,
                    Attribute::Email,
                    Attribute::Image,
                ]
                .iter()
                .map(|a| a.as_str().to_owned())
                .collect(),
            };
            (StatusCode::CREATED, Json(ack)).into_response()
        }
        Err(e) => record_error_response(e),
    }
}

/// `GET /records` — every record with its text attributes decrypted.
pub async fn list_records(State(state): State<AppState>) -> Response {
    match state.records.list().await {
        Ok(records) => (StatusCode::OK, Json(RecordList { records })).into_response(),
        Err(e) => record_error_response(e),
    }
}

/// `GET /records/:id` — one decrypted record; the portrait is written to the
/// decrypted-portrait directory and its path returned as `imagePath`.
pub async fn get_record(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.records.get(id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => record_error_response(e),
    }
}

/// `PUT /records/:id` — re-encrypt the attributes present in the body.
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRecordRequest>,
) -> Response {
    let image = match req.image.as_deref().map(decode_image).transpose() {
        Ok(image) => image,
        Err(e) => return error_response(e),
    };
    let patch = RecordPatch {
        full_name: req.full_name,
        date_of_birth: req.date_of_birth,
        address: req.address,
        phone_number: req.phone_number,
        email: req.email,
        image,
    };

    match state.records.update(id, patch).await {
        Ok((record, written)) => {
            let ack = RecordAck {
                id: record.id,
                image_url: record.image_url,
                updated_fields: written.iter().map(|a| a.as_str().to_owned()).collect(),
            };
            (StatusCode::OK, Json(ack)).into_response()
        }
        Err(e) => record_error_response(e),
    }
}

/// `DELETE /records/:id` — remove a record and its portrait files.
pub async fn delete_record(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.records.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => record_error_response(e),
    }
}

/// `GET /health` — liveness check.
///
/// The key is loaded before the listener binds, so a responding server is
/// always ready.
pub async fn health(State(state): State<AppState>) -> Response {
    let body = HealthResponse {
        status: "ok".into(),
        records: state.records.store().len().await,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn decode_image(encoded: &str) -> Result<Vec<u8>, ServiceError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| ServiceError::BadRequest("image is not valid base64".into()))
}

fn record_error_response(err: RecordError) -> Response {
    error_response(err.into())
}

/// Render a [`ServiceError`] as a JSON error body.
///
/// Server-side failures are logged in full and answered with a generic
/// message; client errors echo their description.
fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status.is_server_error() {
        warn!(error = %err, "request failed");
        "internal server error".to_owned()
    } else {
        err.to_string()
    };
    (status, Json(ErrorResponse::new(err.code(), message))).into_response()
}
