//! OneBot HTTP client for group messages.
//!
//! Talks to a OneBot-compatible HTTP API (the common protocol for QQ-style
//! bots): `POST <api_url>/send_group_msg` with a JSON body of
//! `{"group_id": ..., "message": ...}` and an optional bearer access token.
//!
//! Delivery semantics beyond a single request (retries, rate limits) are the
//! platform's concern, not ours.

use serde::Serialize;
use tracing::debug;

use crate::types::GroupId;

use super::{ChatDispatcher, ChatError};

/// A OneBot HTTP API client.
#[derive(Clone)]
pub struct OneBotClient {
    http: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
}

#[derive(Serialize)]
struct SendGroupMsg<'a> {
    group_id: i64,
    message: &'a str,
}

impl OneBotClient {
    /// Creates a client for the given API base URL.
    ///
    /// `access_token` is sent as a bearer token when set; pass `None` for
    /// unauthenticated endpoints.
    pub fn new(api_url: impl Into<String>, access_token: Option<String>) -> Self {
        OneBotClient {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            access_token,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/send_group_msg", self.api_url.trim_end_matches('/'))
    }
}

impl ChatDispatcher for OneBotClient {
    async fn send_group_message(&self, group: GroupId, text: &str) -> Result<(), ChatError> {
        let body = SendGroupMsg {
            group_id: group.0,
            message: text,
        };

        let mut request = self.http.post(self.endpoint()).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::ApiStatus { group, status });
        }

        debug!(group = %group, "Delivered group message");
        Ok(())
    }
}

impl std::fmt::Debug for OneBotClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneBotClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = OneBotClient::new("http://127.0.0.1:5700/", None);
        assert_eq!(client.endpoint(), "http://127.0.0.1:5700/send_group_msg");

        let client = OneBotClient::new("http://127.0.0.1:5700", None);
        assert_eq!(client.endpoint(), "http://127.0.0.1:5700/send_group_msg");
    }

    #[test]
    fn send_group_msg_wire_format() {
        let body = SendGroupMsg {
            group_id: 123456,
            message: "hello",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "group_id": 123456, "message": "hello" })
        );
    }

    #[test]
    fn debug_does_not_leak_token() {
        let client = OneBotClient::new("http://x", Some("secret-token".to_string()));
        let debugged = format!("{client:?}");
        assert!(!debugged.contains("secret-token"));
    }
}
