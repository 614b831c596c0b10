//! Outbound chat delivery.
//!
//! The router only needs one capability from the messaging platform: send a
//! text message to a chat group. [`ChatDispatcher`] captures that seam so the
//! router can be tested against a recording mock, with [`OneBotClient`] as the
//! production implementation.

use std::future::Future;

use thiserror::Error;

use crate::types::GroupId;

pub mod onebot;

pub use onebot::OneBotClient;

/// Errors that can occur when delivering a chat message.
///
/// The router treats delivery as fire-and-forget; these errors are logged by
/// the send task and never propagated further.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The HTTP request to the chat API failed.
    #[error("chat API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The chat API answered with a non-success status.
    #[error("chat API returned status {status} for group {group}")]
    ApiStatus {
        group: GroupId,
        status: reqwest::StatusCode,
    },
}

/// Sends text messages to chat groups.
///
/// Implementations must be cheap to clone; the router clones the dispatcher
/// into one spawned task per (event, group) pair.
pub trait ChatDispatcher: Clone + Send + Sync + 'static {
    /// Sends `text` to the given group.
    fn send_group_message(
        &self,
        group: GroupId,
        text: &str,
    ) -> impl Future<Output = Result<(), ChatError>> + Send;
}
