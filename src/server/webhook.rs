//! Webhook endpoint handler.
//!
//! Accepts GitLab webhook deliveries, verifies the shared-secret token, and
//! routes parsed events. Message delivery happens asynchronously in spawned
//! send tasks; the handler responds as soon as routing is decided.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::chat::ChatDispatcher;
use crate::webhooks::{ParseError, parse_webhook, verify_token};

/// Header name for the GitLab event type.
const HEADER_EVENT: &str = "x-gitlab-event";
/// Header name for the GitLab shared-secret token.
const HEADER_TOKEN: &str = "x-gitlab-token";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// The shared-secret token did not match.
    #[error("invalid token")]
    InvalidToken,

    /// Invalid JSON body.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidToken => StatusCode::UNAUTHORIZED,
            WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Headers:
///   - `X-Gitlab-Event`: Event type (e.g. "Push Hook"), required
///   - `X-Gitlab-Token`: Shared secret, required unless the configured
///     secret is empty
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 200 OK: Event routed (or ignored as an unknown/irrelevant kind)
/// - 400 Bad Request: Missing header or malformed JSON
/// - 401 Unauthorized: Token mismatch
pub async fn webhook_handler<D: ChatDispatcher>(
    State(app_state): State<AppState<D>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    // Verify the token before any parsing.
    let token = headers.get(HEADER_TOKEN).and_then(|v| v.to_str().ok());
    if !verify_token(token, app_state.secret()) {
        warn!("Invalid webhook token");
        return Err(WebhookError::InvalidToken);
    }

    let event_type = headers
        .get(HEADER_EVENT)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingHeader(HEADER_EVENT))?;

    debug!(event_type = %event_type, "Received webhook");

    let Some(event) = parse_webhook(event_type, &body)? else {
        debug!(event_type = %event_type, "Ignoring webhook");
        return Ok((StatusCode::OK, "Ignored"));
    };

    app_state.router().route(&event).await;

    Ok((StatusCode::OK, "OK"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ChatDispatcher, ChatError};
    use crate::router::{EventRouter, RoutingTable};
    use crate::server::build_router;
    use crate::types::{GroupId, ProjectPath};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::RwLock;
    use tower::ServiceExt;

    #[derive(Clone, Default)]
    struct RecordingDispatcher {
        sent: Arc<Mutex<Vec<(GroupId, String)>>>,
    }

    impl RecordingDispatcher {
        fn sent(&self) -> Vec<(GroupId, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl ChatDispatcher for RecordingDispatcher {
        async fn send_group_message(&self, group: GroupId, text: &str) -> Result<(), ChatError> {
            self.sent.lock().unwrap().push((group, text.to_string()));
            Ok(())
        }
    }

    fn test_app(
        secret: &str,
        routes: RoutingTable,
    ) -> (axum::Router, RecordingDispatcher) {
        let dispatcher = RecordingDispatcher::default();
        let router = EventRouter::new(Arc::new(RwLock::new(routes)), dispatcher.clone());
        let app = build_router(AppState::new(secret, router), "/");
        (app, dispatcher)
    }

    fn tag_push_request(secret: Option<&str>, event: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json");
        if let Some(secret) = secret {
            builder = builder.header("x-gitlab-token", secret);
        }
        if let Some(event) = event {
            builder = builder.header("x-gitlab-event", event);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    const TAG_PUSH_BODY: &str = r#"{
        "ref": "refs/tags/v1.0.0",
        "user_name": "Alice",
        "project": { "path_with_namespace": "group/project" }
    }"#;

    async fn wait_for_sends(dispatcher: &RecordingDispatcher, n: usize) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while dispatcher.sent().len() < n {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("timed out waiting for sends");
    }

    #[tokio::test]
    async fn valid_webhook_returns_200_and_dispatches() {
        let routes = RoutingTable::from([(
            ProjectPath::new("group/project"),
            vec![GroupId(10), GroupId(20)],
        )]);
        let (app, dispatcher) = test_app("s3cret", routes);

        let request = tag_push_request(Some("s3cret"), Some("Tag Push Hook"), TAG_PUSH_BODY);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        wait_for_sends(&dispatcher, 2).await;

        let sent = dispatcher.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].1.contains("v1.0.0"));
    }

    #[tokio::test]
    async fn wrong_token_returns_401() {
        let (app, dispatcher) = test_app("s3cret", RoutingTable::new());

        let request = tag_push_request(Some("wrong"), Some("Tag Push Hook"), TAG_PUSH_BODY);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(dispatcher.sent().is_empty());
    }

    #[tokio::test]
    async fn missing_token_returns_401_when_secret_configured() {
        let (app, _) = test_app("s3cret", RoutingTable::new());

        let request = tag_push_request(None, Some("Tag Push Hook"), TAG_PUSH_BODY);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_secret_skips_verification() {
        let routes = RoutingTable::from([(ProjectPath::new("group/project"), vec![GroupId(1)])]);
        let (app, dispatcher) = test_app("", routes);

        let request = tag_push_request(None, Some("Tag Push Hook"), TAG_PUSH_BODY);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        wait_for_sends(&dispatcher, 1).await;
    }

    #[tokio::test]
    async fn missing_event_header_returns_400() {
        let (app, _) = test_app("s3cret", RoutingTable::new());

        let request = tag_push_request(Some("s3cret"), None, TAG_PUSH_BODY);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_returns_400() {
        let (app, _) = test_app("s3cret", RoutingTable::new());

        let request = tag_push_request(Some("s3cret"), Some("Push Hook"), "not json");
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_event_type_returns_200_ignored() {
        let (app, dispatcher) = test_app("s3cret", RoutingTable::new());

        let request = tag_push_request(Some("s3cret"), Some("Pipeline Hook"), "{}");
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Ignored");
        assert!(dispatcher.sent().is_empty());
    }

    #[tokio::test]
    async fn unmapped_project_returns_200_with_zero_sends() {
        let routes = RoutingTable::from([(ProjectPath::new("other/project"), vec![GroupId(1)])]);
        let (app, dispatcher) = test_app("s3cret", routes);

        let request = tag_push_request(Some("s3cret"), Some("Tag Push Hook"), TAG_PUSH_BODY);
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(dispatcher.sent().is_empty());
    }

    #[tokio::test]
    async fn health_returns_200() {
        let (app, _) = test_app("s3cret", RoutingTable::new());

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn webhook_can_be_mounted_on_custom_path() {
        let routes = RoutingTable::from([(ProjectPath::new("group/project"), vec![GroupId(1)])]);
        let dispatcher = RecordingDispatcher::default();
        let router = EventRouter::new(Arc::new(RwLock::new(routes)), dispatcher.clone());
        let app = build_router(AppState::new("", router), "/gitlab/hook");

        let request = Request::builder()
            .method("POST")
            .uri("/gitlab/hook")
            .header("content-type", "application/json")
            .header("x-gitlab-event", "Tag Push Hook")
            .body(Body::from(TAG_PUSH_BODY.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        wait_for_sends(&dispatcher, 1).await;
    }
}
