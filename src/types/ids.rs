//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different identifier kinds (e.g.
//! using a chat group ID where a project path is expected) and make the code
//! more self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A GitLab project identified by its path with namespace
/// (e.g. "group/subgroup/project").
///
/// This is the routing key: events are relayed only for projects that appear
/// in the configured routing table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectPath(pub String);

impl ProjectPath {
    pub fn new(s: impl Into<String>) -> Self {
        ProjectPath(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProjectPath {
    fn from(s: String) -> Self {
        ProjectPath(s)
    }
}

impl From<&str> for ProjectPath {
    fn from(s: &str) -> Self {
        ProjectPath(s.to_string())
    }
}

/// A chat-group identifier on the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GroupId {
    fn from(n: i64) -> Self {
        GroupId(n)
    }
}

/// A git commit hash (hex characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitHash(pub String);

impl CommitHash {
    /// Creates a new CommitHash from a string.
    ///
    /// Note: this does not validate the format.
    pub fn new(s: impl Into<String>) -> Self {
        CommitHash(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the hash is a non-empty run of '0' characters.
    ///
    /// GitLab uses an all-zero "after" hash in push payloads to mark
    /// branch or tag deletions.
    pub fn is_all_zeros(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b == b'0')
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CommitHash {
    fn from(s: String) -> Self {
        CommitHash(s)
    }
}

impl From<&str> for CommitHash {
    fn from(s: &str) -> Self {
        CommitHash(s.to_string())
    }
}

/// An issue or merge-request number within a project (GitLab "iid").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iid(pub u64);

impl fmt::Display for Iid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Iid {
    fn from(n: u64) -> Self {
        Iid(n)
    }
}
