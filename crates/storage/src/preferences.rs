//! Search history, favorites and network selection, persisted write-through

use shared::models::{Address, NetworkMode, PreferenceState, MAX_HISTORY};
use shared::{Error, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::kv::KeyValueStore;

/// Key under which the whole preference document is stored
pub const PREFERENCES_KEY: &str = "wallet-preferences";

enum WriteCommand {
    Persist(PreferenceState),
    Flush(oneshot::Sender<Result<()>>),
}

/// Observable, durable preference store.
///
/// The in-memory state is the source of truth for reads. Every mutation is
/// applied synchronously and a snapshot of the full state is queued for a
/// single background writer, so the backend receives documents in the same
/// order the mutations happened. Clones share state and writer.
#[derive(Clone)]
pub struct PreferenceStore {
    state: Arc<watch::Sender<PreferenceState>>,
    writes: mpsc::UnboundedSender<WriteCommand>,
}

impl PreferenceStore {
    /// Rehydrate from `backend`, falling back to empty defaults.
    ///
    /// A missing document, an unreadable backend and a corrupt document all
    /// produce the defaults; none of them is reported as an error.
    pub async fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let initial = match backend.get(PREFERENCES_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<PreferenceState>(&raw) {
                Ok(state) => {
                    let state = state.normalized();
                    info!(
                        "Loaded preferences: {} history entries, {} favorites, network {}",
                        state.search_history.len(),
                        state.favorites.len(),
                        state.network_mode
                    );
                    state
                }
                Err(e) => {
                    warn!("Discarding unreadable preferences document: {}", e);
                    PreferenceState::default()
                }
            },
            Ok(None) => {
                debug!("No stored preferences, starting with defaults");
                PreferenceState::default()
            }
            Err(e) => {
                warn!("Failed to read preferences, starting with defaults: {}", e);
                PreferenceState::default()
            }
        };

        Self::with_state(backend, initial)
    }

    /// Start from a known state without reading the backend
    pub fn with_state(backend: Arc<dyn KeyValueStore>, initial: PreferenceState) -> Self {
        let (state, _) = watch::channel(initial);
        let (writes, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(backend, rx));

        Self {
            state: Arc::new(state),
            writes,
        }
    }

    // === Favorites ===

    /// Prepend `address` unless it is already a favorite
    pub fn add_favorite(&self, address: &str) {
        self.mutate("add_favorite", |state| {
            if state.favorites.iter().any(|a| a == address) {
                return false;
            }
            state.favorites.insert(0, address.to_string());
            true
        });
    }

    pub fn remove_favorite(&self, address: &str) {
        self.mutate("remove_favorite", |state| {
            let before = state.favorites.len();
            state.favorites.retain(|a| a != address);
            state.favorites.len() != before
        });
    }

    pub fn is_favorite(&self, address: &str) -> bool {
        self.state.borrow().favorites.iter().any(|a| a == address)
    }

    /// Add or remove; returns whether the address is a favorite afterwards
    pub fn toggle_favorite(&self, address: &str) -> bool {
        let mut now_favorite = false;
        self.mutate("toggle_favorite", |state| {
            let before = state.favorites.len();
            state.favorites.retain(|a| a != address);
            if state.favorites.len() == before {
                state.favorites.insert(0, address.to_string());
                now_favorite = true;
            }
            true
        });
        now_favorite
    }

    pub fn favorites(&self) -> Vec<Address> {
        self.state.borrow().favorites.clone()
    }

    // === Search history ===

    /// Move `address` to the front of the history, keeping at most `MAX_HISTORY`
    pub fn add_to_history(&self, address: &str) {
        self.mutate("add_to_history", |state| {
            if state.search_history.first().map(String::as_str) == Some(address) {
                return false;
            }
            state.search_history.retain(|a| a != address);
            state.search_history.insert(0, address.to_string());
            state.search_history.truncate(MAX_HISTORY);
            true
        });
    }

    pub fn remove_from_history(&self, address: &str) {
        self.mutate("remove_from_history", |state| {
            let before = state.search_history.len();
            state.search_history.retain(|a| a != address);
            state.search_history.len() != before
        });
    }

    /// Forget all searches; favorites and network are untouched
    pub fn clear_history(&self) {
        self.mutate("clear_history", |state| {
            if state.search_history.is_empty() {
                return false;
            }
            state.search_history.clear();
            true
        });
    }

    pub fn search_history(&self) -> Vec<Address> {
        self.state.borrow().search_history.clone()
    }

    /// The `limit` most recent searches
    pub fn recent_history(&self, limit: usize) -> Vec<Address> {
        self.state
            .borrow()
            .search_history
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    // === Network ===

    /// Flip between main and dev; returns the new mode
    pub fn toggle_network_mode(&self) -> NetworkMode {
        let mut toggled = NetworkMode::default();
        self.mutate("toggle_network_mode", |state| {
            state.network_mode = state.network_mode.toggled();
            toggled = state.network_mode;
            true
        });
        toggled
    }

    pub fn set_network_mode(&self, mode: NetworkMode) {
        self.mutate("set_network_mode", |state| {
            if state.network_mode == mode {
                return false;
            }
            state.network_mode = mode;
            true
        });
    }

    pub fn network_mode(&self) -> NetworkMode {
        self.state.borrow().network_mode
    }

    // === Observation and durability ===

    pub fn snapshot(&self) -> PreferenceState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every change to the preferences
    pub fn subscribe(&self) -> watch::Receiver<PreferenceState> {
        self.state.subscribe()
    }

    /// Wait for every write queued so far.
    ///
    /// Returns the first persistence failure since the previous flush, if any.
    pub async fn flush(&self) -> Result<()> {
        let (reply, done) = oneshot::channel();
        self.writes
            .send(WriteCommand::Flush(reply))
            .map_err(|_| Error::Storage("Preference writer has stopped".to_string()))?;

        done.await
            .map_err(|_| Error::Storage("Preference writer has stopped".to_string()))?
    }

    /// Apply `change` atomically and queue the resulting state for persistence
    fn mutate<F>(&self, operation: &str, change: F)
    where
        F: FnOnce(&mut PreferenceState) -> bool,
    {
        let writes = &self.writes;
        let changed = self.state.send_if_modified(|state| {
            if !change(state) {
                return false;
            }
            // Queued under the state lock so snapshots reach the writer in mutation order
            if writes.send(WriteCommand::Persist(state.clone())).is_err() {
                error!("Preference writer has stopped; {} will not be persisted", operation);
            }
            true
        });

        if changed {
            debug!("Preferences updated by {}", operation);
        }
    }
}

async fn run_writer(backend: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<WriteCommand>) {
    let mut first_failure: Option<Error> = None;

    while let Some(command) = rx.recv().await {
        match command {
            WriteCommand::Persist(state) => {
                if let Err(e) = persist(backend.as_ref(), &state).await {
                    error!("Failed to persist preferences: {}", e);
                    first_failure.get_or_insert(e);
                }
            }
            WriteCommand::Flush(reply) => {
                let outcome = match first_failure.take() {
                    Some(e) => Err(e),
                    None => Ok(()),
                };
                let _ = reply.send(outcome);
            }
        }
    }

    debug!("Preference writer stopped");
}

async fn persist(backend: &dyn KeyValueStore, state: &PreferenceState) -> Result<()> {
    let document = serde_json::to_string(state)?;
    backend.set(PREFERENCES_KEY, &document).await
}
