//! Process-wide listener registry.
//!
//! Listeners are keyed by the `(path, secret, port)` triple. The first
//! registration for a key binds the port and spawns a serve task; later
//! registrations for the same key merge their routes into the existing
//! listener's routing table instead of binding a second listener on the same
//! port. The registry is owned by the composition root and torn down at
//! shutdown.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::chat::ChatDispatcher;
use crate::router::{EventRouter, RoutingTable};
use crate::server::{AppState, build_router};

/// Identifies a shared listener.
///
/// Registrations with equal keys share one HTTP listener and one receiver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerKey {
    pub port: u16,
    pub path: String,
    pub secret: String,
}

impl ListenerKey {
    pub fn new(port: u16, path: impl Into<String>, secret: impl Into<String>) -> Self {
        ListenerKey {
            port,
            path: path.into(),
            secret: secret.into(),
        }
    }
}

/// Errors that can occur when registering a listener.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The configured port could not be bound. This is startup-fatal.
    #[error("failed to bind port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

struct ListenerEntry {
    addr: SocketAddr,
    routes: Arc<RwLock<RoutingTable>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Registry of live HTTP listeners, keyed by [`ListenerKey`].
pub struct ListenerRegistry<D: ChatDispatcher> {
    listeners: Mutex<HashMap<ListenerKey, ListenerEntry>>,
    dispatcher: D,
}

impl<D: ChatDispatcher> ListenerRegistry<D> {
    pub fn new(dispatcher: D) -> Self {
        ListenerRegistry {
            listeners: Mutex::new(HashMap::new()),
            dispatcher,
        }
    }

    /// Registers routes under a listener key, binding a listener for the key
    /// if none exists yet.
    ///
    /// Idempotent per key: a second registration with the same key does not
    /// bind a second listener; its routes are merged into the existing
    /// routing table. Returns the bound address.
    pub async fn register(
        &self,
        key: ListenerKey,
        routes: RoutingTable,
    ) -> Result<SocketAddr, RegistryError> {
        let mut listeners = self.listeners.lock().await;

        if let Some(entry) = listeners.get(&key) {
            entry.routes.write().await.merge(routes);
            info!(port = key.port, path = %key.path, "Merged routes into existing listener");
            return Ok(entry.addr);
        }

        let bind_addr = SocketAddr::from(([0, 0, 0, 0], key.port));
        let listener =
            tokio::net::TcpListener::bind(bind_addr)
                .await
                .map_err(|source| RegistryError::Bind {
                    port: key.port,
                    source,
                })?;
        let addr = listener.local_addr().map_err(|source| RegistryError::Bind {
            port: key.port,
            source,
        })?;

        let shared_routes = Arc::new(RwLock::new(routes));
        let router = EventRouter::new(Arc::clone(&shared_routes), self.dispatcher.clone());
        let app = build_router(AppState::new(key.secret.clone(), router), &key.path);

        let cancel = CancellationToken::new();
        let serve_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let shutdown = async move { serve_cancel.cancelled().await };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "Listener terminated with error");
            }
        });

        info!(addr = %addr, path = %key.path, "Listening for webhooks");

        listeners.insert(
            key,
            ListenerEntry {
                addr,
                routes: shared_routes,
                cancel,
                task,
            },
        );

        Ok(addr)
    }

    /// Returns the number of live listeners.
    pub async fn listener_count(&self) -> usize {
        self.listeners.lock().await.len()
    }

    /// Stops all listeners and waits for their serve tasks to finish.
    pub async fn shutdown(&self) {
        let entries: Vec<ListenerEntry> = {
            let mut listeners = self.listeners.lock().await;
            listeners.drain().map(|(_, entry)| entry).collect()
        };

        for entry in entries {
            entry.cancel.cancel();
            if let Err(e) = entry.task.await {
                error!(error = %e, "Serve task panicked during shutdown");
            }
        }
    }
}
