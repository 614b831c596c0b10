//! GitLab webhook event types.
//!
//! This module defines typed representations of the GitLab webhook events the
//! relay handles. Each variant corresponds to a GitLab hook with the fields we
//! need for message formatting and routing.
//!
//! # Event Types
//!
//! - `Push Hook` - commits pushed to a branch
//! - `Tag Push Hook` - a tag created or deleted
//! - `Issue Hook` - issue opened/closed/updated
//! - `Note Hook` - a comment on a commit, merge request, issue, or snippet
//! - `Merge Request Hook` - merge request lifecycle

use serde::{Deserialize, Serialize};

use crate::types::{CommitHash, Iid, ProjectPath};

/// A parsed GitLab webhook event.
///
/// This enum contains only the event types the relay cares about. Unknown or
/// irrelevant hooks are represented by returning `None` from the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitLabEvent {
    /// Commits were pushed to a branch.
    Push(PushEvent),

    /// A tag was pushed (created or deleted).
    TagPush(TagPushEvent),

    /// An issue was opened, closed, reopened, or updated.
    Issue(IssueEvent),

    /// A comment ("note") was left on a commit, merge request, issue,
    /// or snippet.
    Note(NoteEvent),

    /// A merge request was opened, closed, merged, or updated.
    MergeRequest(MergeRequestEvent),
}

impl GitLabEvent {
    /// Returns the project this event belongs to (the routing key).
    pub fn project(&self) -> &ProjectPath {
        match self {
            GitLabEvent::Push(e) => &e.project,
            GitLabEvent::TagPush(e) => &e.project,
            GitLabEvent::Issue(e) => &e.project,
            GitLabEvent::Note(e) => &e.project,
            GitLabEvent::MergeRequest(e) => &e.project,
        }
    }
}

/// A single commit within a push payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushCommit {
    /// The commit hash.
    pub id: CommitHash,

    /// The full commit message.
    pub message: String,

    /// URL of the commit on the GitLab instance.
    pub url: String,
}

/// A branch push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// The project the push belongs to.
    pub project: ProjectPath,

    /// The full git ref that was pushed (e.g. "refs/heads/main").
    pub git_ref: String,

    /// The "after" hash of the push.
    ///
    /// All zeros means the ref was deleted; such pushes are not announced.
    pub after: CommitHash,

    /// Name of the user who pushed.
    pub user_name: String,

    /// The commits contained in the push, oldest first.
    pub commits: Vec<PushCommit>,
}

/// A tag push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPushEvent {
    /// The project the tag belongs to.
    pub project: ProjectPath,

    /// The full git ref of the tag (e.g. "refs/tags/v1.0.0").
    pub git_ref: String,

    /// Name of the user who pushed the tag.
    pub user_name: String,
}

/// Action performed on an issue or merge request.
///
/// GitLab reports these in `object_attributes.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectAction {
    /// Newly opened.
    Open,
    /// Closed.
    Close,
    /// Reopened after being closed.
    Reopen,
    /// Title, description, or other attributes changed.
    Update,
    /// Merged (merge requests only).
    Merge,
}

/// An issue event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEvent {
    /// The project the issue belongs to.
    pub project: ProjectPath,

    /// The action that triggered this event. Only `Open` is announced.
    pub action: ObjectAction,

    /// The issue number within the project.
    pub iid: Iid,

    /// The issue title.
    pub title: String,

    /// The issue description (may be empty).
    pub description: String,

    /// Name of the user who performed the action.
    pub user_name: String,

    /// URL of the issue.
    pub url: String,
}

/// What a comment ("note") is attached to.
///
/// GitLab reports this in `object_attributes.noteable_type` using
/// PascalCase names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteableType {
    /// A comment on a commit.
    Commit,
    /// A comment on a merge request.
    MergeRequest,
    /// A comment on an issue.
    Issue,
    /// A comment on a snippet. Not announced.
    Snippet,
}

/// A comment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// The project the comment belongs to.
    pub project: ProjectPath,

    /// What the comment is attached to.
    pub noteable_type: NoteableType,

    /// The merge-request or issue number the comment is attached to,
    /// when applicable. `None` for commit and snippet comments.
    pub noteable_iid: Option<Iid>,

    /// The comment body.
    pub note: String,

    /// Name of the comment author.
    pub user_name: String,

    /// URL of the comment.
    pub url: String,
}

/// A merge request event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestEvent {
    /// The project the merge request was opened against.
    pub project: ProjectPath,

    /// The action that triggered this event. Only `Open` is announced.
    pub action: ObjectAction,

    /// The merge request number within the target project.
    pub iid: Iid,

    /// The merge request title.
    pub title: String,

    /// The branch the changes come from.
    pub source_branch: String,

    /// The branch the changes are merged into.
    pub target_branch: String,

    /// Path with namespace of the source project (differs from the target
    /// for cross-fork merge requests).
    pub source_project: ProjectPath,

    /// Path with namespace of the target project.
    pub target_project: ProjectPath,

    /// Name of the user who performed the action.
    pub user_name: String,

    /// URL of the merge request.
    pub url: String,
}
