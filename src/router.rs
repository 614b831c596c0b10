//! Event routing: project lookup, formatting, and fan-out to chat groups.
//!
//! The router is the only component with decision logic. For each event it
//! resolves the configured destination groups for the event's project, asks
//! the formatter for a message, and spawns one independent send per group.
//!
//! Delivery is fire-and-forget: the router does not wait for sends to finish,
//! does not order them across groups, and does not observe failures beyond a
//! warning log in the send task.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::chat::ChatDispatcher;
use crate::messages::format_event;
use crate::types::{GroupId, ProjectPath};
use crate::webhooks::GitLabEvent;

/// The project-to-groups mapping.
///
/// Built from configuration at startup; the listener registry may merge
/// additional routes into it when several configurations share one listener.
/// It is never written after startup registration completes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RoutingTable {
    routes: HashMap<ProjectPath, Vec<GroupId>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        RoutingTable::default()
    }

    /// Adds destination groups for a project, skipping duplicates.
    pub fn insert(&mut self, project: ProjectPath, groups: impl IntoIterator<Item = GroupId>) {
        let entry = self.routes.entry(project).or_default();
        for group in groups {
            if !entry.contains(&group) {
                entry.push(group);
            }
        }
    }

    /// Returns the destination groups for a project, if any are configured.
    pub fn groups_for(&self, project: &ProjectPath) -> Option<&[GroupId]> {
        self.routes.get(project).map(Vec::as_slice)
    }

    /// Merges another table into this one, deduplicating per project.
    pub fn merge(&mut self, other: RoutingTable) {
        for (project, groups) in other.routes {
            self.insert(project, groups);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }
}

impl<const N: usize> From<[(ProjectPath, Vec<GroupId>); N]> for RoutingTable {
    fn from(entries: [(ProjectPath, Vec<GroupId>); N]) -> Self {
        let mut table = RoutingTable::new();
        for (project, groups) in entries {
            table.insert(project, groups);
        }
        table
    }
}

/// Routes parsed events to chat groups.
#[derive(Clone)]
pub struct EventRouter<D: ChatDispatcher> {
    routes: Arc<RwLock<RoutingTable>>,
    dispatcher: D,
}

impl<D: ChatDispatcher> EventRouter<D> {
    pub fn new(routes: Arc<RwLock<RoutingTable>>, dispatcher: D) -> Self {
        EventRouter { routes, dispatcher }
    }

    /// Returns the shared routing table handle.
    pub fn routes(&self) -> &Arc<RwLock<RoutingTable>> {
        &self.routes
    }

    /// Routes one event.
    ///
    /// Events for unmapped projects and events whose formatter yields no
    /// message are dropped silently. Otherwise one send task is spawned per
    /// destination group; this method returns without awaiting them.
    pub async fn route(&self, event: &GitLabEvent) {
        let project = event.project();

        let groups: Vec<GroupId> = {
            let table = self.routes.read().await;
            match table.groups_for(project) {
                Some(groups) if !groups.is_empty() => groups.to_vec(),
                _ => {
                    debug!(project = %project, "No groups configured, dropping event");
                    return;
                }
            }
        };

        let Some(text) = format_event(event) else {
            debug!(project = %project, "Formatter suppressed event");
            return;
        };

        info!(
            project = %project,
            groups = groups.len(),
            "Relaying event"
        );

        for group in groups {
            let dispatcher = self.dispatcher.clone();
            let text = text.clone();
            tokio::spawn(async move {
                if let Err(e) = dispatcher.send_group_message(group, &text).await {
                    warn!(group = %group, error = %e, "Failed to deliver message");
                }
            });
        }
    }
}
