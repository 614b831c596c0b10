//! Core domain types for the relay.

pub mod ids;

pub use ids::{CommitHash, GroupId, Iid, ProjectPath};
