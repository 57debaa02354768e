//! Request and response types exchanged over the public HTTP API.
//!
//! Field names are camelCase on the wire (`fullName`, `dateOfBirth`, ...).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Record endpoints
// ---------------------------------------------------------------------------

/// Request body for `POST /records`.
///
/// Every field is required. `image` carries the portrait as standard base64.
/// An absent field deserialises as empty and is rejected by validation, so a
/// caller gets the same 400 for a missing field as for a blank one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRecordRequest {
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    /// Standard base64 encoding of the portrait bytes.
    pub image: String,
}

/// Request body for `PUT /records/:id`.
///
/// Only the fields present are replaced; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Standard base64 encoding of a replacement portrait.
    #[serde(default)]
    pub image: Option<String>,
}

/// Response body for `POST /records` and `PUT /records/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAck {
    pub id: Uuid,
    pub image_url: String,
    /// Names of the attributes written by this request.
    pub updated_fields: Vec<String>,
}

/// A record with its sensitive attributes decrypted.
///
/// `image_path` is set only by `GET /records/:id`, which writes the decrypted
/// portrait to a local file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: Uuid,
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Response body for `GET /records`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordList {
    pub records: Vec<RecordView>,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status, always `"ok"` once the server is listening.
    pub status: String,
    /// Number of records currently stored.
    pub records: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_uses_camel_case() {
        let req: CreateRecordRequest = serde_json::from_value(json!({
            "fullName": "Jane Doe",
            "dateOfBirth": "1990-01-01",
            "address": "1 Main St",
            "phoneNumber": "555-0100",
            "email": "jane@example.com",
            "image": "AAEC"
        }))
        .unwrap();
        assert_eq!(req.full_name, "Jane Doe");
        assert_eq!(req.phone_number, "555-0100");
    }

    #[test]
    fn create_request_missing_field_is_empty() {
        let req: CreateRecordRequest = serde_json::from_value(json!({
            "fullName": "Jane Doe",
            "image": "AAEC"
        }))
        .unwrap();
        assert!(req.email.is_empty());
        assert!(req.address.is_empty());
    }

    #[test]
    fn update_request_fields_are_optional() {
        let req: UpdateRecordRequest = serde_json::from_value(json!({"email": "new@example.com"})).unwrap();
        assert_eq!(req.email.as_deref(), Some("new@example.com"));
        assert!(req.full_name.is_none());
        assert!(req.image.is_none());
    }

    #[test]
    fn record_view_omits_absent_image_path() {
        let view = RecordView {
            id: Uuid::nil(),
            full_name: "a".into(),
            date_of_birth: "b".into(),
            address: "c".into(),
            phone_number: "d".into(),
            email: "e".into(),
            image_url: "/images/x".into(),
            image_path: None,
        };
        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("imagePath").is_none());
        assert_eq!(value["imageUrl"], "/images/x");
    }

    #[test]
    fn error_response_new() {
        let e = ErrorResponse::new("bad_request", "email must not be empty");
        assert_eq!(e.code, "bad_request");
        assert!(e.message.contains("email"));
    }

    #[test]
    fn health_response_serde() {
        let h = HealthResponse {
            status: "ok".into(),
            records: 3,
        };
        let json = serde_json::to_string(&h).unwrap();
        let decoded: HealthResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.records, 3);
    }
}
