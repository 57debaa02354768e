//! Axum router construction.

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// `max_body_bytes` bounds request bodies; portraits travel base64-encoded
/// inside the JSON body, so it must exceed the largest accepted image by 4/3.
pub fn build(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route(
            "/records",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/records/:id",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use common::protocol::{ErrorResponse, HealthResponse, RecordAck, RecordList, RecordView};
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::crypto::{FieldCipher, KeyMaterial, KEY_LEN};
    use crate::images::DirectoryImageHost;
    use crate::records::{RecordService, RecordStore};

    struct Harness {
        app: Router,
        dir: TempDir,
    }

    fn harness() -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let images = DirectoryImageHost::create(dir.path().join("images"), "/images").unwrap();
        let decrypted = dir.path().join("decrypted");
        std::fs::create_dir_all(&decrypted).unwrap();
        let cipher = FieldCipher::new(KeyMaterial::from_bytes(&[0u8; KEY_LEN]).unwrap());
        let records = RecordService::new(cipher, RecordStore::new(), Arc::new(images), decrypted);
        Harness {
            app: build(AppState::new(records), 1024 * 1024),
            dir,
        }
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json<T: DeserializeOwned>(resp: Response) -> T {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn jane() -> serde_json::Value {
        json!({
            "fullName": "Jane Doe",
            "dateOfBirth": "1990-01-01",
            "address": "1 Main St",
            "phoneNumber": "555-0100",
            "email": "jane@example.com",
            "image": "iVBORw0KGgo="
        })
    }

    async fn create_jane(app: &Router) -> RecordAck {
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/records", jane()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        read_json(resp).await
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let h = harness();
        let resp = h.app.oneshot(empty_request("GET", "/unknown")).await.unwrap();
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn health_reports_record_count() {
        let h = harness();
        create_jane(&h.app).await;
        let resp = h.app.oneshot(empty_request("GET", "/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: HealthResponse = read_json(resp).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.records, 1);
    }

    #[tokio::test]
    async fn create_then_list_returns_plaintext() {
        let h = harness();
        let ack = create_jane(&h.app).await;
        assert_eq!(ack.updated_fields.len(), 6);
        assert_eq!(ack.image_url, format!("/images/{}", ack.id));

        let resp = h.app.oneshot(empty_request("GET", "/records")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let list: RecordList = read_json(resp).await;
        assert_eq!(list.records.len(), 1);
        assert_eq!(list.records[0].full_name, "Jane Doe");
        assert_eq!(list.records[0].address, "1 Main St");
    }

    #[tokio::test]
    async fn get_single_restores_portrait() {
        let h = harness();
        let ack = create_jane(&h.app).await;
        let resp = h
            .app
            .oneshot(empty_request("GET", &format!("/records/{}", ack.id)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let view: RecordView = read_json(resp).await;
        let path = view.image_path.expect("single read returns image path");
        assert_eq!(
            std::fs::read(path).unwrap(),
            b"\x89PNG\r\n\x1a\n".to_vec()
        );
    }

    #[tokio::test]
    async fn create_with_missing_field_is_400() {
        let h = harness();
        let mut body = jane();
        body["email"] = json!("");
        let resp = h.app.oneshot(json_request("POST", "/records", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_with_absent_field_is_400_json() {
        let h = harness();
        let mut body = jane();
        body.as_object_mut().unwrap().remove("email");
        let resp = h.app.oneshot(json_request("POST", "/records", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let err: ErrorResponse = read_json(resp).await;
        assert_eq!(err.code, "bad_request");
        assert!(err.message.contains("email"));
    }

    #[tokio::test]
    async fn create_without_image_is_400() {
        let h = harness();
        let mut body = jane();
        body.as_object_mut().unwrap().remove("image");
        let resp = h.app.oneshot(json_request("POST", "/records", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn create_with_bad_base64_is_400() {
        let h = harness();
        let mut body = jane();
        body["image"] = json!("not base64!");
        let resp = h.app.oneshot(json_request("POST", "/records", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn partial_update_reports_written_fields() {
        let h = harness();
        let ack = create_jane(&h.app).await;
        let uri = format!("/records/{}", ack.id);

        let resp = h
            .app
            .clone()
            .oneshot(json_request("PUT", &uri, json!({"phoneNumber": "555-0199"})))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let update: RecordAck = read_json(resp).await;
        assert_eq!(update.updated_fields, vec!["phoneNumber".to_string()]);

        let resp = h.app.oneshot(empty_request("GET", &uri)).await.unwrap();
        let view: RecordView = read_json(resp).await;
        assert_eq!(view.phone_number, "555-0199");
        assert_eq!(view.full_name, "Jane Doe");
    }

    #[tokio::test]
    async fn delete_then_get_is_404() {
        let h = harness();
        let ack = create_jane(&h.app).await;
        let uri = format!("/records/{}", ack.id);

        let resp = h.app.clone().oneshot(empty_request("GET", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let decrypted = h.dir.path().join("decrypted").join(ack.id.to_string());
        let hosted = h.dir.path().join("images").join(ack.id.to_string());
        assert!(decrypted.exists());
        assert!(hosted.exists());

        let resp = h.app.clone().oneshot(empty_request("DELETE", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(!decrypted.exists());
        assert!(!hosted.exists());

        let resp = h.app.oneshot(empty_request("GET", &uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let h = harness();
        let mut body = jane();
        body["image"] = json!("A".repeat(2 * 1024 * 1024));
        let resp = h.app.oneshot(json_request("POST", "/records", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
