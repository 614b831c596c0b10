//! GitLab Relay - forwards GitLab webhook events to chat groups.
//!
//! This library receives GitLab webhook callbacks, formats human-readable
//! summaries of repository events (pushes, tag pushes, issues, comments,
//! merge requests), and relays them to the chat groups configured for each
//! project.

pub mod chat;
pub mod config;
pub mod messages;
pub mod registry;
pub mod router;
pub mod server;
pub mod types;
pub mod webhooks;
