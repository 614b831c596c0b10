//! HTTP server for the relay.
//!
//! This module implements the HTTP server that:
//! - Accepts webhooks from GitLab, verifies the shared-secret token, and
//!   hands parsed events to the router
//! - Provides a health check for liveness probes
//!
//! # Endpoints
//!
//! - `POST <path>` - Accepts GitLab webhook deliveries (path configurable,
//!   default `/`)
//! - `GET /health` - Returns 200 if the server is running

use std::sync::Arc;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::webhook_handler;

use crate::chat::ChatDispatcher;
use crate::router::EventRouter;

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
pub struct AppState<D: ChatDispatcher> {
    inner: Arc<AppStateInner<D>>,
}

impl<D: ChatDispatcher> Clone for AppState<D> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<D: ChatDispatcher> {
    /// Shared secret expected in the `X-Gitlab-Token` header.
    /// Empty means verification is disabled.
    secret: String,

    /// The event router.
    router: EventRouter<D>,
}

impl<D: ChatDispatcher> AppState<D> {
    /// Creates a new `AppState` with the given secret and router.
    pub fn new(secret: impl Into<String>, router: EventRouter<D>) -> Self {
        AppState {
            inner: Arc::new(AppStateInner {
                secret: secret.into(),
                router,
            }),
        }
    }

    /// Returns the configured webhook secret.
    pub fn secret(&self) -> &str {
        &self.inner.secret
    }

    /// Returns the event router.
    pub fn router(&self) -> &EventRouter<D> {
        &self.inner.router
    }
}

/// Builds the axum Router with the webhook endpoint at `path`.
pub fn build_router<D: ChatDispatcher>(app_state: AppState<D>, path: &str) -> axum::Router {
    use axum::routing::{get, post};

    axum::Router::new()
        .route(path, post(webhook_handler::<D>))
        .route("/health", get(health_handler))
        .with_state(app_state)
}
