//! JSON endpoints customers post to.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::info;

use helpdesk_db::MessageRepository;
use helpdesk_db::models::NewMessage;
use helpdesk_types::api::{NewMessageRequest, OutboundMessageRequest, REQUIRED_MESSAGE_KEYS, StatusResponse};
use helpdesk_types::models::utc_timestamp;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::with_db;

pub const NO_JSON: &str = "No JSON data received";
pub const INVALID_FORMAT: &str = "Invalid message data format";
pub const MISSING_FIELDS: &str = "Missing required fields in the request body";

/// POST /api/message — store a customer message. A caller-supplied timestamp
/// is kept verbatim; otherwise the current UTC time is used.
pub async fn post_message(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req: NewMessageRequest = parse_payload(payload, false, INVALID_FORMAT)?;

    let message = NewMessage {
        userid: req.user_id,
        timestamp: req.timestamp.unwrap_or_else(utc_timestamp),
        message_body: req.message_body,
    };
    let id = with_db(&state, move |db| db.insert_message(&message)).await?;

    info!("Stored API message {} from customer {}", id, req.user_id);
    Ok((
        StatusCode::CREATED,
        Json(StatusResponse::new("Message received successfully")),
    ))
}

/// POST /api/send_message — outbound message to a customer. Delivery is a
/// log line; nothing is stored.
pub async fn send_message(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req: OutboundMessageRequest = parse_payload(payload, true, MISSING_FIELDS)?;

    info!("Sending message to user ID {}: {}", req.user_id, req.message_body);

    Ok(Json(StatusResponse::new("Message sent successfully")))
}

/// Require a JSON object carrying every required key, then decode it. With
/// `empty_is_missing`, `{}` counts as no body at all.
fn parse_payload<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
    empty_is_missing: bool,
    missing_keys: &'static str,
) -> Result<T, ApiError> {
    let map: Map<String, Value> = match payload {
        Ok(Json(Value::Object(map))) if !(empty_is_missing && map.is_empty()) => map,
        _ => return Err(ApiError::BadRequest(NO_JSON)),
    };

    if !REQUIRED_MESSAGE_KEYS.iter().all(|key| map.contains_key(*key)) {
        return Err(ApiError::BadRequest(missing_keys));
    }

    serde_json::from_value(Value::Object(map)).map_err(|_| ApiError::BadRequest(INVALID_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_types::api::ErrorResponse;

    use crate::router;
    use crate::test_support::{body_string, json_request, send, test_state};

    async fn error_of(resp: axum::response::Response) -> String {
        let body: ErrorResponse = serde_json::from_str(&body_string(resp).await).unwrap();
        body.error
    }

    #[tokio::test]
    async fn api_message_is_stored() {
        let state = test_state();
        let app = router(state.clone());

        let resp = send(&app, json_request("/api/message", r#"{"user_id": 7, "message_body": "hi"}"#)).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: StatusResponse = serde_json::from_str(&body_string(resp).await).unwrap();
        assert_eq!(body.message, "Message received successfully");

        let rows = state.db.list_messages().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].userid, 7);
        assert_eq!(rows[0].message_body, "hi");
        assert!(!rows[0].timestamp.is_empty());
    }

    #[tokio::test]
    async fn api_message_keeps_caller_timestamp() {
        let state = test_state();
        let app = router(state.clone());

        let resp = send(
            &app,
            json_request(
                "/api/message",
                r#"{"user_id": 1, "message_body": "late", "timestamp": "2020-05-05 10:00:00"}"#,
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(state.db.list_messages().unwrap()[0].timestamp, "2020-05-05 10:00:00");
    }

    #[tokio::test]
    async fn api_message_without_body_is_rejected() {
        let state = test_state();
        let app = router(state.clone());

        let resp = send(&app, json_request("/api/message", r#"{"user_id": 7}"#)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, INVALID_FORMAT);
        assert!(state.db.list_messages().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let app = router(test_state());

        let resp = send(&app, json_request("/api/message", "{not json")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, NO_JSON);

        let resp = send(&app, json_request("/api/send_message", "{}")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, NO_JSON);
    }

    #[tokio::test]
    async fn empty_object_is_a_format_error_on_api_message() {
        let state = test_state();
        let app = router(state.clone());

        let resp = send(&app, json_request("/api/message", "{}")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, INVALID_FORMAT);
        assert!(state.db.list_messages().unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_object_json_is_treated_as_no_data() {
        let app = router(test_state());

        for uri in ["/api/message", "/api/send_message"] {
            for body in ["[1]", r#""x""#, "null", "42"] {
                let resp = send(&app, json_request(uri, body)).await;
                assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
                assert_eq!(error_of(resp).await, NO_JSON, "{uri} {body}");
            }
        }
    }

    #[tokio::test]
    async fn missing_content_type_is_treated_as_no_data() {
        let state = test_state();
        let app = router(state.clone());

        for uri in ["/api/message", "/api/send_message"] {
            let req = axum::http::Request::post(uri)
                .body(axum::body::Body::from(r#"{"user_id": 7, "message_body": "hi"}"#))
                .unwrap();
            let resp = send(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(error_of(resp).await, NO_JSON, "{uri}");
        }
        assert!(state.db.list_messages().unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrongly_typed_user_id_is_rejected() {
        let app = router(test_state());
        let resp = send(
            &app,
            json_request("/api/message", r#"{"user_id": "seven", "message_body": "hi"}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, INVALID_FORMAT);
    }

    #[tokio::test]
    async fn outbound_send_is_acknowledged_not_stored() {
        let state = test_state();
        let app = router(state.clone());

        let resp = send(
            &app,
            json_request("/api/send_message", r#"{"user_id": 7, "message_body": "on its way"}"#),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(state.db.list_messages().unwrap().is_empty());

        let resp = send(&app, json_request("/api/send_message", r#"{"user_id": 7}"#)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_of(resp).await, MISSING_FIELDS);
    }
}
