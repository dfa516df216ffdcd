//! Reconciliation between the in-memory roster, the local cache and the
//! remote store.
//!
//! Local-first: every mutation is written to the cache before anything goes
//! over the network, and the remote side only wins once, at startup. Remote
//! and cache failures are logged and absorbed here; the only errors a caller
//! ever sees are validation errors from the edit intents.

use crate::cache::LocalCache;
use crate::clock::{Clock, SystemClock};
use crate::config::SyncSettings;
use crate::entity::{NewEntity, Roster};
use crate::error::{Result, TurnoverError};
use crate::remote::{RemoteLink, RemoteStore, ORDER_COLUMN};
use crate::status::{self, Evaluation, StatusChange, Summary};
use crate::validate;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// BootstrapOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BootstrapOutcome {
    /// No remote configured, or it did not become ready in time.
    Offline,
    /// The fetch failed; the local roster was kept.
    Failed,
    /// The remote table is empty; the local roster was kept.
    Empty,
    /// The remote rows replaced the local roster.
    Adopted { rows: usize },
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

struct PendingPush {
    handle: JoinHandle<()>,
    flush: Arc<Notify>,
}

/// Sole owner of the roster. Every mutation goes through `&mut self`, which
/// keeps "persist locally, then schedule the push" in order.
pub struct Reconciler {
    roster: Roster,
    cache: Box<dyn LocalCache>,
    remote: Option<RemoteLink>,
    clock: Arc<dyn Clock>,
    settings: SyncSettings,
    pending: Option<PendingPush>,
    push_lock: Arc<Mutex<()>>,
}

impl Reconciler {
    /// The roster starts empty; call [`Reconciler::load`] before use.
    pub fn new(
        cache: Box<dyn LocalCache>,
        remote: Option<RemoteLink>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            roster: Roster::default(),
            cache,
            remote,
            clock: Arc::new(SystemClock),
            settings,
            pending: None,
            push_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.roster)
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Evaluate one consultant without mutating anything.
    pub fn evaluation(&self, index: usize) -> Option<Evaluation> {
        self.roster
            .get(index)
            .map(|e| status::derive_status(e, self.clock.now_ms()))
    }

    pub fn has_pending_push(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| !p.handle.is_finished())
    }

    // -----------------------------------------------------------------------
    // Load / bootstrap
    // -----------------------------------------------------------------------

    /// Read the roster from the cache, seeding when nothing usable is found.
    /// Never fails.
    pub fn load(&mut self) -> &Roster {
        let mut roster = self.read_cache().unwrap_or_else(|| {
            debug!(size = self.settings.seed_size, "no cached roster; seeding");
            Roster::seed(self.settings.seed_size)
        });
        status::evaluate_roster(&mut roster, self.clock.now_ms());
        self.roster = roster;
        &self.roster
    }

    fn read_cache(&self) -> Option<Roster> {
        match self.cache.get(&self.settings.cache_key) {
            Ok(Some(data)) => match serde_json::from_str(&data) {
                Ok(roster) => Some(roster),
                Err(e) => {
                    warn!(error = %e, "cached roster unreadable; ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "local cache read failed");
                None
            }
        }
    }

    /// Wait for the remote client and adopt its rows if there are any.
    pub async fn bootstrap_remote(&mut self) -> BootstrapOutcome {
        let Some(link) = self.remote.clone() else {
            info!("no remote store configured; running local-only");
            return BootstrapOutcome::Offline;
        };
        if !link.ready.wait(self.settings.ready_timeout()).await {
            warn!(
                timeout_ms = self.settings.ready_timeout_ms,
                "remote store not ready; running local-only"
            );
            return BootstrapOutcome::Offline;
        }

        match link.store.select_all(ORDER_COLUMN).await {
            Err(e) => {
                warn!(error = %e, "remote fetch failed; keeping local roster");
                BootstrapOutcome::Failed
            }
            Ok(rows) if rows.is_empty() => {
                debug!("remote table empty; keeping local roster");
                BootstrapOutcome::Empty
            }
            Ok(rows) => {
                let count = rows.len();
                let mut roster = Roster::new(rows);
                status::evaluate_roster(&mut roster, self.clock.now_ms());
                self.roster = roster;
                self.persist_local();
                info!(rows = count, "adopted remote roster");
                BootstrapOutcome::Adopted { rows: count }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mutation path
    // -----------------------------------------------------------------------

    /// Apply `f` to a working copy of the roster. On success the copy is
    /// committed, re-evaluated, written to the cache and queued for the
    /// remote store. On error nothing changes.
    pub fn mutate<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Roster, i64) -> Result<T>,
    {
        let now = self.clock.now_ms();
        let mut working = self.roster.clone();
        let out = f(&mut working, now)?;
        status::evaluate_roster(&mut working, now);
        self.roster = working;
        self.persist_local();
        self.schedule_remote_push();
        Ok(out)
    }

    /// Best-effort write of the roster to the cache.
    pub fn persist_local(&mut self) {
        let data = match serde_json::to_string(&self.roster) {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "failed to serialize roster");
                return;
            }
        };
        if let Err(e) = self.cache.set(&self.settings.cache_key, &data) {
            warn!(error = %e, "local cache write failed");
        }
    }

    /// Queue a push of the current roster after the quiet period, replacing
    /// any push still waiting. Does nothing while the remote is unavailable.
    pub fn schedule_remote_push(&mut self) {
        let Some(link) = self.remote.as_ref().filter(|l| l.is_ready()) else {
            return;
        };
        if tokio::runtime::Handle::try_current().is_err() {
            debug!("no async runtime; remote push skipped");
            return;
        }
        if let Some(prev) = self.pending.take() {
            prev.handle.abort();
        }

        let store = Arc::clone(&link.store);
        let lock = Arc::clone(&self.push_lock);
        let snapshot = self.roster.clone();
        let quiet = self.settings.push_debounce();
        let flush = Arc::new(Notify::new());
        let wake = Arc::clone(&flush);

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(quiet) => {}
                _ = wake.notified() => {}
            }
            // Once fired the push runs in its own task: superseding this
            // slot must not cancel a request already on the wire.
            let push = tokio::spawn(async move {
                let _guard = lock.lock().await;
                push_remote(store.as_ref(), &snapshot).await;
            });
            let _ = push.await;
        });
        self.pending = Some(PendingPush { handle, flush });
    }

    /// Fire any waiting push now and wait for it to finish.
    pub async fn flush(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        pending.flush.notify_one();
        if let Err(e) = pending.handle.await {
            if !e.is_cancelled() {
                warn!(error = %e, "remote push task failed");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// Create a consultant and return its position.
    pub fn add_entity(&mut self, input: &NewEntity) -> Result<usize> {
        let entity = input.validate()?;
        self.mutate(move |roster, _| Ok(roster.push(entity)))
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<()> {
        let name = validate::name(name)?;
        self.mutate(move |roster, _| {
            roster.entity_mut(index)?.name = name;
            Ok(())
        })
    }

    pub fn set_company(&mut self, index: usize, company: &str) -> Result<()> {
        let company = company.trim().to_string();
        self.mutate(move |roster, _| {
            roster.entity_mut(index)?.company = company;
            Ok(())
        })
    }

    pub fn set_mailbox(&mut self, index: usize, mailbox: &str) -> Result<()> {
        let mailbox = validate::mailbox(mailbox)?;
        self.mutate(move |roster, _| {
            roster.entity_mut(index)?.mailbox = Some(mailbox);
            Ok(())
        })
    }

    pub fn set_active(&mut self, index: usize, active: bool) -> Result<()> {
        self.mutate(move |roster, _| {
            roster.entity_mut(index)?.active = active;
            Ok(())
        })
    }

    /// Record a follow-up action now. Refused for inactive consultants.
    pub fn record_action(&mut self, index: usize) -> Result<()> {
        self.mutate(move |roster, now| {
            let entity = roster.entity_mut(index)?;
            if !entity.active {
                return Err(TurnoverError::EntityInactive(index));
            }
            status::record_action(entity, now);
            Ok(())
        })
    }

    /// Drop the cached roster and start over from the seed. The remote table
    /// is left alone and a waiting push is cancelled.
    pub fn reset(&mut self) -> &Roster {
        if let Some(prev) = self.pending.take() {
            prev.handle.abort();
        }
        if let Err(e) = self.cache.remove(&self.settings.cache_key) {
            warn!(error = %e, "failed to clear local cache");
        }
        let mut roster = Roster::seed(self.settings.seed_size);
        status::evaluate_roster(&mut roster, self.clock.now_ms());
        self.roster = roster;
        info!("roster reset to seed");
        &self.roster
    }

    /// Periodic re-evaluation. Persists and pushes only when a status moved.
    pub fn sweep(&mut self) -> Vec<StatusChange> {
        let changes = status::evaluate_roster(&mut self.roster, self.clock.now_ms());
        if !changes.is_empty() {
            debug!(changed = changes.len(), "sweep moved statuses");
            self.persist_local();
            self.schedule_remote_push();
        }
        changes
    }
}

/// Replace the remote table with `roster`: delete every row, then insert the
/// roster if it has entries. Not atomic; a failure between the two steps
/// leaves the table empty. Failures are logged and abandoned.
pub async fn push_remote(store: &dyn RemoteStore, roster: &Roster) -> bool {
    if let Err(e) = store.delete_all().await {
        warn!(error = %e, "remote delete failed; push abandoned");
        return false;
    }
    if roster.is_empty() {
        return true;
    }
    if let Err(e) = store.insert_many(roster.as_slice()).await {
        warn!(error = %e, "remote insert failed; remote table left empty");
        return false;
    }
    debug!(rows = roster.len(), "roster pushed");
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
