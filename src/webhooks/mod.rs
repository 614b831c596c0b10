//! Webhook handling for GitLab events.
//!
//! This module provides:
//! - Token verification for webhook deliveries (`X-Gitlab-Token`)
//! - Typed event definitions and the payload parser

pub mod events;
pub mod parser;
pub mod token;

pub use events::{
    GitLabEvent, IssueEvent, MergeRequestEvent, NoteEvent, NoteableType, ObjectAction, PushCommit,
    PushEvent, TagPushEvent,
};
pub use parser::{ParseError, parse_webhook};
pub use token::verify_token;
