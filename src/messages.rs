//! Message formatting for GitLab events.
//!
//! One pure function per event kind, mapping an event to a display string or
//! to `None` (suppressed). The router sends the returned text verbatim to
//! every destination group.
//!
//! # Suppression rules
//!
//! | Kind | Suppressed when |
//! |------|-----------------|
//! | Push | the "after" hash is all zeros (ref deletion) |
//! | TagPush | never |
//! | Issue | action is not "open" |
//! | Note | noteable type outside {Commit, MergeRequest, Issue} |
//! | MergeRequest | action is not "open" |
//!
//! All free-text fields (commit messages, descriptions, comment bodies) have
//! blank-line runs collapsed to a single newline to keep chat messages
//! compact.

use regex::Regex;
use std::sync::LazyLock;

use crate::webhooks::{
    GitLabEvent, IssueEvent, MergeRequestEvent, NoteEvent, NoteableType, ObjectAction, PushEvent,
    TagPushEvent,
};

/// Length of the "refs/tags/" prefix stripped from tag refs.
const TAG_REF_PREFIX_LEN: usize = 10;

/// Matches a run of two or more newlines with optional interior whitespace.
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank-run pattern is valid"));

/// Collapses runs of blank lines into a single newline.
///
/// A "run" is two or more newlines, optionally separated by other
/// whitespace. Leading and trailing whitespace is trimmed first.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text.trim(), "\n").into_owned()
}

/// Formats any event, dispatching to the kind-specific formatter.
///
/// Returns `None` when the event should not be announced.
pub fn format_event(event: &GitLabEvent) -> Option<String> {
    match event {
        GitLabEvent::Push(e) => format_push(e),
        GitLabEvent::TagPush(e) => Some(format_tag_push(e)),
        GitLabEvent::Issue(e) => format_issue(e),
        GitLabEvent::Note(e) => format_note(e),
        GitLabEvent::MergeRequest(e) => format_merge_request(e),
    }
}

/// Formats a branch push: three header lines plus one line per commit.
///
/// Pushes whose "after" hash is all zeros are ref deletions and yield no
/// message.
pub fn format_push(event: &PushEvent) -> Option<String> {
    if event.after.is_all_zeros() {
        return None;
    }

    let mut lines = vec![
        format!("[{}] new push", event.project),
        format!("ref: {}", event.git_ref),
        format!("by: {}", event.user_name),
    ];
    lines.extend(
        event
            .commits
            .iter()
            .map(|c| collapse_blank_lines(&c.message)),
    );

    Some(lines.join("\n"))
}

/// Formats a tag push as a single line.
///
/// The displayed tag name is the ref with its fixed-length "refs/tags/"
/// prefix stripped.
pub fn format_tag_push(event: &TagPushEvent) -> String {
    let tag = event.git_ref.get(TAG_REF_PREFIX_LEN..).unwrap_or("");
    format!("[{}] new tag {} by {}", event.project, tag, event.user_name)
}

/// Formats a newly opened issue as a five-line message.
///
/// Actions other than "open" (close, reopen, update) yield no message.
pub fn format_issue(event: &IssueEvent) -> Option<String> {
    if event.action != ObjectAction::Open {
        return None;
    }

    Some(format!(
        "[{}] new issue #{}\ntitle: {}\nby: {}\n{}\n{}",
        event.project,
        event.iid,
        event.title,
        event.user_name,
        event.url,
        collapse_blank_lines(&event.description),
    ))
}

/// Formats a comment.
///
/// Only comments on commits, merge requests, and issues are announced; the
/// header names the merge-request or issue number when one is known.
pub fn format_note(event: &NoteEvent) -> Option<String> {
    let header = match (event.noteable_type, event.noteable_iid) {
        (NoteableType::Commit, _) => format!("[{}] new comment on commit", event.project),
        (NoteableType::MergeRequest, Some(iid)) => {
            format!("[{}] new comment on merge request !{}", event.project, iid)
        }
        (NoteableType::MergeRequest, None) => {
            format!("[{}] new comment on merge request", event.project)
        }
        (NoteableType::Issue, Some(iid)) => {
            format!("[{}] new comment on issue #{}", event.project, iid)
        }
        (NoteableType::Issue, None) => format!("[{}] new comment on issue", event.project),
        (NoteableType::Snippet, _) => return None,
    };

    Some(format!(
        "{}\nby: {}\n{}\n{}",
        header,
        event.user_name,
        event.url,
        collapse_blank_lines(&event.note),
    ))
}

/// Formats a newly opened merge request.
///
/// The second line summarizes the branches as
/// `<target path>/<target branch> <- <source path>/<source branch>`.
/// Actions other than "open" yield no message.
pub fn format_merge_request(event: &MergeRequestEvent) -> Option<String> {
    if event.action != ObjectAction::Open {
        return None;
    }

    Some(format!(
        "[{}] new merge request !{}\n{}/{} <- {}/{}\nby: {}\n{}\n{}",
        event.project,
        event.iid,
        event.target_project,
        event.target_branch,
        event.source_project,
        event.source_branch,
        event.user_name,
        event.url,
        collapse_blank_lines(&event.title),
    ))
}
