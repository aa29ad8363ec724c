//! Note synchronizer: local echo plus debounced insert-or-update
//!
//! Each `NoteSync` owns one text field. Edits update the local buffer
//! synchronously and re-arm a quiet-period timer held by a background task.
//! When the timer fires the task writes the latest text to the store. The
//! task runs one write at a time; edits arriving during a write are queued
//! and re-arm the timer once it completes.

use crate::debounce::Debouncer;
use crate::status::{SaveStatus, SyncState};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use planner_core::{NewPlan, PlanKey, PlanStore, PlanUpdate, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use ulid::Ulid;

/// How a persist reaches the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertMode {
    /// `find_one`, then `update` by id or `insert`
    #[default]
    CheckThenAct,
    /// The store's `upsert` on the composite key
    Atomic,
}

/// Synchronizer settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Delay after the last edit before writing (default: 1000ms)
    pub quiet_period: Duration,
    /// Bound on each store call (default: 10s)
    pub write_timeout: Duration,
    pub upsert_mode: UpsertMode,
    /// Skip the write when the text equals the last persisted text
    pub skip_unchanged: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(1000),
            write_timeout: Duration::from_secs(10),
            upsert_mode: UpsertMode::CheckThenAct,
            skip_unchanged: true,
        }
    }
}

enum Command {
    Edit(String),
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Handle to one synchronized text field
///
/// Must be created inside a tokio runtime. Dropping the handle tears the
/// field down: a pending write is discarded, a write already in flight
/// completes.
pub struct NoteSync {
    key: PlanKey,
    /// Local echo buffer
    text: Arc<RwLock<String>>,
    commands: mpsc::UnboundedSender<Command>,
    status_tx: Arc<watch::Sender<SaveStatus>>,
    status_rx: watch::Receiver<SaveStatus>,
    task: Option<JoinHandle<()>>,
}

impl NoteSync {
    /// Load the stored note for `key` and start synchronizing it
    ///
    /// A failed load is logged and the field starts empty.
    pub async fn open<S>(store: Arc<S>, key: PlanKey, config: SyncConfig) -> Self
    where
        S: PlanStore + ?Sized + 'static,
    {
        let loaded = match timeout(config.write_timeout, store.find_one(&key)).await {
            Ok(Ok(found)) => found,
            Ok(Err(e)) => {
                warn!("Failed to load plan for {}: {}", key, e);
                None
            }
            Err(_) => {
                warn!("Loading plan for {} timed out after {:?}", key, config.write_timeout);
                None
            }
        };

        let (text, persisted, record_id) = match loaded {
            Some(record) => (record.notes.clone(), Some(record.notes), Some(record.id)),
            None => (String::new(), None, None),
        };
        Self::spawn(store, key, text, persisted, record_id, config)
    }

    /// Start synchronizing `key` from `initial` without reading the store
    pub fn new<S>(store: Arc<S>, key: PlanKey, initial: impl Into<String>, config: SyncConfig) -> Self
    where
        S: PlanStore + ?Sized + 'static,
    {
        Self::spawn(store, key, initial.into(), None, None, config)
    }

    fn spawn<S>(
        store: Arc<S>,
        key: PlanKey,
        text: String,
        persisted: Option<String>,
        record_id: Option<Ulid>,
        config: SyncConfig,
    ) -> Self
    where
        S: PlanStore + ?Sized + 'static,
    {
        let (commands, rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(SaveStatus::default());
        let status_tx = Arc::new(status_tx);

        let worker = Worker {
            store,
            key: key.clone(),
            debouncer: Debouncer::new(config.quiet_period),
            config,
            pending: None,
            persisted,
            record_id,
            status: status_tx.clone(),
        };
        let task = tokio::spawn(worker.run(rx));

        Self {
            key,
            text: Arc::new(RwLock::new(text)),
            commands,
            status_tx,
            status_rx,
            task: Some(task),
        }
    }

    /// Record an edit: `text` is the full field content, not a delta
    ///
    /// The displayed text changes immediately; the write happens one quiet
    /// period after the last edit.
    pub fn on_edit(&self, text: impl Into<String>) {
        let text = text.into();
        *self.text.write() = text.clone();

        self.status_tx.send_modify(|status| {
            if status.state == SyncState::Idle {
                status.state = SyncState::PendingWrite;
            }
        });

        if self.commands.send(Command::Edit(text)).is_err() {
            warn!("Edit for {} after synchronizer stopped; not persisted", self.key);
        }
    }

    /// Currently displayed text
    pub fn text(&self) -> String {
        self.text.read().clone()
    }

    pub fn state(&self) -> SyncState {
        self.status_rx.borrow().state
    }

    pub fn status(&self) -> SaveStatus {
        self.status_rx.borrow().clone()
    }

    /// Watch status changes (e.g. to drive a "saving..." indicator)
    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status_rx.clone()
    }

    /// Write any pending edit now and wait until the field is idle
    pub async fn flush(&self) -> SaveStatus {
        let (done_tx, done_rx) = oneshot::channel();
        if self.commands.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
        self.status()
    }

    /// Tear down: discard a pending write and wait for an in-flight one
    pub async fn shutdown(mut self) -> SaveStatus {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Synchronizer task for {} ended abnormally: {}", self.key, e);
            }
        }
        self.status()
    }
}

/// Background task owning the timer and the store handle
struct Worker<S: PlanStore + ?Sized> {
    store: Arc<S>,
    key: PlanKey,
    config: SyncConfig,
    debouncer: Debouncer,
    /// Latest unsaved text
    pending: Option<String>,
    /// Text known to be stored
    persisted: Option<String>,
    /// Id of the stored record, once known
    record_id: Option<Ulid>,
    status: Arc<watch::Sender<SaveStatus>>,
}

/// What a persist did
enum Persisted {
    Written(DateTime<Utc>),
    Skipped(&'static str),
}

impl<S: PlanStore + ?Sized> Worker<S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        loop {
            tokio::select! {
                // Edits and teardown take priority over an expiring timer
                biased;

                command = commands.recv() => match command {
                    Some(Command::Edit(text)) => {
                        self.pending = Some(text);
                        let deadline = self.debouncer.arm();
                        self.set_state(SyncState::PendingWrite);
                        debug!("Write for {} scheduled at {:?}", self.key, deadline);
                    }
                    Some(Command::Flush(done)) => {
                        self.debouncer.disarm();
                        if let Some(text) = self.pending.take() {
                            self.persist(text, &commands).await;
                        }
                        let _ = done.send(());
                    }
                    Some(Command::Shutdown) | None => {
                        if self.debouncer.disarm() && self.pending.take().is_some() {
                            debug!("Discarding pending write for {}", self.key);
                        }
                        self.set_state(SyncState::Idle);
                        break;
                    }
                },

                _ = self.debouncer.fired() => {
                    self.debouncer.disarm();
                    if let Some(text) = self.pending.take() {
                        self.persist(text, &commands).await;
                    }
                }
            }
        }
    }

    /// Write `text`, then settle on the state implied by `queued`
    async fn persist(&mut self, text: String, queued: &mpsc::UnboundedReceiver<Command>) {
        if self.config.skip_unchanged && self.persisted.as_deref() == Some(text.as_str()) {
            debug!("Text for {} unchanged, skipping write", self.key);
            self.set_state(settled_state(queued));
            return;
        }

        self.set_state(SyncState::Writing);
        let outcome = match timeout(self.config.write_timeout, self.write(&text)).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Backend(format!(
                "write timed out after {:?}",
                self.config.write_timeout
            ))),
        };

        match outcome {
            Ok(Persisted::Written(updated_at)) => {
                info!("Saved notes for {} ({} bytes)", self.key, text.len());
                self.persisted = Some(text);
                self.status.send_modify(|status| {
                    status.state = settled_state(queued);
                    status.last_saved_at = Some(updated_at);
                    status.last_error = None;
                    status.writes += 1;
                });
            }
            Ok(Persisted::Skipped(reason)) => {
                debug!("No write for {}: {}", self.key, reason);
                self.set_state(settled_state(queued));
            }
            Err(e) => {
                // The local buffer stays authoritative; no rollback, no retry
                warn!("Failed to save notes for {}: {}", self.key, e);
                self.status.send_modify(|status| {
                    status.state = settled_state(queued);
                    status.last_error = Some(e.to_string());
                    status.failures += 1;
                });
            }
        }
    }

    async fn write(&mut self, text: &str) -> Result<Persisted, StoreError> {
        match self.config.upsert_mode {
            UpsertMode::CheckThenAct => match self.store.find_one(&self.key).await? {
                Some(existing) => {
                    let record = self.store.update(existing.id, PlanUpdate::now(text)).await?;
                    self.record_id = Some(record.id);
                    Ok(Persisted::Written(record.updated_at))
                }
                None if text.is_empty() => Ok(Persisted::Skipped("empty note without a record")),
                None => {
                    let record = self
                        .store
                        .insert(NewPlan {
                            key: self.key.clone(),
                            notes: text.to_string(),
                        })
                        .await?;
                    self.record_id = Some(record.id);
                    Ok(Persisted::Written(record.updated_at))
                }
            },
            UpsertMode::Atomic => {
                if text.is_empty() && self.record_id.is_none() {
                    // Clearing only touches a record that already exists
                    return match self.store.find_one(&self.key).await? {
                        Some(existing) => {
                            let record = self.store.update(existing.id, PlanUpdate::now(text)).await?;
                            self.record_id = Some(record.id);
                            Ok(Persisted::Written(record.updated_at))
                        }
                        None => Ok(Persisted::Skipped("empty note without a record")),
                    };
                }
                let record = self.store.upsert(&self.key, text).await?.into_record();
                self.record_id = Some(record.id);
                Ok(Persisted::Written(record.updated_at))
            }
        }
    }

    fn set_state(&self, state: SyncState) {
        self.status.send_modify(|status| status.state = state);
    }
}

/// State after a write: edits that arrived meanwhile keep the field pending
fn settled_state(queued: &mpsc::UnboundedReceiver<Command>) -> SyncState {
    if queued.is_empty() {
        SyncState::Idle
    } else {
        SyncState::PendingWrite
    }
}
