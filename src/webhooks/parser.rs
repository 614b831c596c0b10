//! GitLab webhook payload parser.
//!
//! This module parses raw webhook JSON payloads into typed [`GitLabEvent`]
//! values. The parser is designed to be robust against unknown fields and
//! event types.
//!
//! # Parsing Strategy
//!
//! 1. The event type is determined from the `X-Gitlab-Event` header
//! 2. The payload is parsed according to the event type
//! 3. Unknown event types return `Ok(None)` (ignored, not error)
//! 4. Known event types with an action or noteable type the relay does not
//!    announce also return `Ok(None)`
//! 5. Malformed payloads return `Err` with details

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CommitHash, Iid, ProjectPath};

use super::events::{
    GitLabEvent, IssueEvent, MergeRequestEvent, NoteEvent, NoteableType, ObjectAction, PushCommit,
    PushEvent, TagPushEvent,
};

/// Header value GitLab sends for branch pushes.
pub const PUSH_HOOK: &str = "Push Hook";
/// Header value GitLab sends for tag pushes.
pub const TAG_PUSH_HOOK: &str = "Tag Push Hook";
/// Header value GitLab sends for issue events.
pub const ISSUE_HOOK: &str = "Issue Hook";
/// Header value GitLab sends for comments.
pub const NOTE_HOOK: &str = "Note Hook";
/// Header value GitLab sends for merge request events.
pub const MERGE_REQUEST_HOOK: &str = "Merge Request Hook";

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Parses a webhook payload into a typed event.
///
/// # Arguments
///
/// * `event_type` - The value of the `X-Gitlab-Event` header
/// * `payload` - The raw JSON payload bytes
///
/// # Returns
///
/// * `Ok(Some(event))` - Successfully parsed a known event type
/// * `Ok(None)` - Unknown event type, or a known type the relay ignores
/// * `Err(e)` - Malformed payload or missing required fields
pub fn parse_webhook(event_type: &str, payload: &[u8]) -> Result<Option<GitLabEvent>, ParseError> {
    match event_type {
        PUSH_HOOK => parse_push(payload).map(|e| Some(GitLabEvent::Push(e))),
        TAG_PUSH_HOOK => parse_tag_push(payload).map(|e| Some(GitLabEvent::TagPush(e))),
        ISSUE_HOOK => parse_issue(payload).map(|opt| opt.map(GitLabEvent::Issue)),
        NOTE_HOOK => parse_note(payload).map(|opt| opt.map(GitLabEvent::Note)),
        MERGE_REQUEST_HOOK => {
            parse_merge_request(payload).map(|opt| opt.map(GitLabEvent::MergeRequest))
        }
        // Unknown hooks (Pipeline Hook, Wiki Page Hook, ...) are ignored
        _ => Ok(None),
    }
}

/// Maps a GitLab `object_attributes.action` string to a typed action.
///
/// Returns `None` for actions the relay does not handle (e.g. "approved");
/// the whole event is then ignored.
fn parse_action(action: &str) -> Option<ObjectAction> {
    match action {
        "open" => Some(ObjectAction::Open),
        "close" => Some(ObjectAction::Close),
        "reopen" => Some(ObjectAction::Reopen),
        "update" => Some(ObjectAction::Update),
        "merge" => Some(ObjectAction::Merge),
        _ => None,
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitLab's webhook JSON structure. We use Option<T> liberally to
// handle missing fields gracefully, then validate required fields explicitly.
// ============================================================================

/// Minimal project info present in all webhook payloads.
#[derive(Debug, Deserialize)]
struct RawProject {
    path_with_namespace: String,
}

/// Minimal user info.
#[derive(Debug, Deserialize)]
struct RawUser {
    name: String,
}

// ============================================================================
// Push Hook / Tag Push Hook
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    after: String,
    user_name: String,
    project: RawProject,
    #[serde(default)]
    commits: Vec<RawCommit>,
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    id: String,
    message: String,
    url: String,
}

fn parse_push(payload: &[u8]) -> Result<PushEvent, ParseError> {
    let raw: RawPushPayload = serde_json::from_slice(payload)?;

    Ok(PushEvent {
        project: ProjectPath::new(raw.project.path_with_namespace),
        git_ref: raw.git_ref,
        after: CommitHash::new(raw.after),
        user_name: raw.user_name,
        commits: raw
            .commits
            .into_iter()
            .map(|c| PushCommit {
                id: CommitHash::new(c.id),
                message: c.message,
                url: c.url,
            })
            .collect(),
    })
}

#[derive(Debug, Deserialize)]
struct RawTagPushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
    user_name: String,
    project: RawProject,
}

fn parse_tag_push(payload: &[u8]) -> Result<TagPushEvent, ParseError> {
    let raw: RawTagPushPayload = serde_json::from_slice(payload)?;

    Ok(TagPushEvent {
        project: ProjectPath::new(raw.project.path_with_namespace),
        git_ref: raw.git_ref,
        user_name: raw.user_name,
    })
}

// ============================================================================
// Issue Hook
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawIssuePayload {
    user: RawUser,
    project: RawProject,
    object_attributes: RawIssueAttributes,
}

#[derive(Debug, Deserialize)]
struct RawIssueAttributes {
    iid: u64,
    title: String,
    description: Option<String>,
    url: String,
    action: String,
}

fn parse_issue(payload: &[u8]) -> Result<Option<IssueEvent>, ParseError> {
    let raw: RawIssuePayload = serde_json::from_slice(payload)?;

    let Some(action) = parse_action(&raw.object_attributes.action) else {
        return Ok(None);
    };

    Ok(Some(IssueEvent {
        project: ProjectPath::new(raw.project.path_with_namespace),
        action,
        iid: Iid(raw.object_attributes.iid),
        title: raw.object_attributes.title,
        description: raw.object_attributes.description.unwrap_or_default(),
        user_name: raw.user.name,
        url: raw.object_attributes.url,
    }))
}

// ============================================================================
// Note Hook
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawNotePayload {
    user: RawUser,
    project: RawProject,
    object_attributes: RawNoteAttributes,
    merge_request: Option<RawIidHolder>,
    issue: Option<RawIidHolder>,
}

#[derive(Debug, Deserialize)]
struct RawNoteAttributes {
    note: Option<String>,
    noteable_type: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawIidHolder {
    iid: u64,
}

fn parse_note(payload: &[u8]) -> Result<Option<NoteEvent>, ParseError> {
    let raw: RawNotePayload = serde_json::from_slice(payload)?;

    let noteable_type = match raw.object_attributes.noteable_type.as_str() {
        "Commit" => NoteableType::Commit,
        "MergeRequest" => NoteableType::MergeRequest,
        "Issue" => NoteableType::Issue,
        "Snippet" => NoteableType::Snippet,
        // Future noteable types are ignored, not an error
        _ => return Ok(None),
    };

    let noteable_iid = match noteable_type {
        NoteableType::MergeRequest => raw.merge_request.map(|mr| Iid(mr.iid)),
        NoteableType::Issue => raw.issue.map(|i| Iid(i.iid)),
        NoteableType::Commit | NoteableType::Snippet => None,
    };

    Ok(Some(NoteEvent {
        project: ProjectPath::new(raw.project.path_with_namespace),
        noteable_type,
        noteable_iid,
        note: raw.object_attributes.note.unwrap_or_default(),
        user_name: raw.user.name,
        url: raw.object_attributes.url,
    }))
}

// ============================================================================
// Merge Request Hook
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawMergeRequestPayload {
    user: RawUser,
    project: RawProject,
    object_attributes: RawMergeRequestAttributes,
}

#[derive(Debug, Deserialize)]
struct RawMergeRequestAttributes {
    iid: u64,
    title: String,
    source_branch: String,
    target_branch: String,
    source: RawProject,
    target: RawProject,
    url: String,
    action: String,
}

fn parse_merge_request(payload: &[u8]) -> Result<Option<MergeRequestEvent>, ParseError> {
    let raw: RawMergeRequestPayload = serde_json::from_slice(payload)?;

    let Some(action) = parse_action(&raw.object_attributes.action) else {
        return Ok(None);
    };

    Ok(Some(MergeRequestEvent {
        project: ProjectPath::new(raw.project.path_with_namespace),
        action,
        iid: Iid(raw.object_attributes.iid),
        title: raw.object_attributes.title,
        source_branch: raw.object_attributes.source_branch,
        target_branch: raw.object_attributes.target_branch,
        source_project: ProjectPath::new(raw.object_attributes.source.path_with_namespace),
        target_project: ProjectPath::new(raw.object_attributes.target.path_with_namespace),
        user_name: raw.user.name,
        url: raw.object_attributes.url,
    }))
}
