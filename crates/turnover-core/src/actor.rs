//! Single owning task for the roster.
//!
//! On a multi-threaded runtime the UI and the periodic sweep must not touch
//! the roster concurrently. [`RosterService::spawn`] moves the [`Reconciler`]
//! into one task and hands out a cloneable [`RosterHandle`] that sends it
//! commands; the sweep runs on the same task between commands.

use crate::entity::{NewEntity, Roster};
use crate::error::{Result, TurnoverError};
use crate::status::{StatusChange, Summary};
use crate::sync::Reconciler;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

type Reply<T> = oneshot::Sender<Result<T>>;

enum Command {
    Add(NewEntity, Reply<usize>),
    Rename(usize, String, Reply<()>),
    SetCompany(usize, String, Reply<()>),
    SetMailbox(usize, String, Reply<()>),
    SetActive(usize, bool, Reply<()>),
    RecordAction(usize, Reply<()>),
    Reset(oneshot::Sender<Snapshot>),
    Sweep(oneshot::Sender<Vec<StatusChange>>),
    Snapshot(oneshot::Sender<Snapshot>),
    Shutdown(oneshot::Sender<()>),
}

/// Roster plus counts, as handed to a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub roster: Roster,
    pub summary: Summary,
}

impl Snapshot {
    fn of(rec: &Reconciler) -> Self {
        Self {
            roster: rec.roster().clone(),
            summary: rec.summary(),
        }
    }
}

pub struct RosterService;

impl RosterService {
    /// Move `reconciler` into a new task that sweeps every `sweep_every`.
    /// The first sweep happens one period after spawning.
    pub fn spawn(reconciler: Reconciler, sweep_every: Duration) -> RosterHandle {
        let (tx, rx) = mpsc::channel(32);
        let (events, _) = broadcast::channel(64);
        let period = sweep_every.max(Duration::from_millis(1));
        tokio::spawn(run(reconciler, rx, events.clone(), period));
        RosterHandle { tx, events }
    }
}

async fn run(
    mut rec: Reconciler,
    mut rx: mpsc::Receiver<Command>,
    events: broadcast::Sender<StatusChange>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!(period_secs = period.as_secs(), "roster service started");

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Some(Command::Shutdown(done)) => {
                    rec.flush().await;
                    let _ = done.send(());
                    break;
                }
                Some(cmd) => handle(&mut rec, cmd, &events),
                None => {
                    rec.flush().await;
                    break;
                }
            },
            _ = ticker.tick() => {
                sweep(&mut rec, &events);
            }
        }
    }
    info!("roster service stopped");
}

fn sweep(rec: &mut Reconciler, events: &broadcast::Sender<StatusChange>) -> Vec<StatusChange> {
    let changes = rec.sweep();
    for change in &changes {
        debug!(index = change.index, from = %change.from, to = %change.to, "status changed");
        let _ = events.send(*change);
    }
    changes
}

fn handle(rec: &mut Reconciler, cmd: Command, events: &broadcast::Sender<StatusChange>) {
    match cmd {
        Command::Add(input, reply) => {
            let _ = reply.send(rec.add_entity(&input));
        }
        Command::Rename(index, name, reply) => {
            let _ = reply.send(rec.rename(index, &name));
        }
        Command::SetCompany(index, company, reply) => {
            let _ = reply.send(rec.set_company(index, &company));
        }
        Command::SetMailbox(index, mailbox, reply) => {
            let _ = reply.send(rec.set_mailbox(index, &mailbox));
        }
        Command::SetActive(index, active, reply) => {
            let _ = reply.send(rec.set_active(index, active));
        }
        Command::RecordAction(index, reply) => {
            let _ = reply.send(rec.record_action(index));
        }
        Command::Reset(reply) => {
            rec.reset();
            let _ = reply.send(Snapshot::of(rec));
        }
        Command::Sweep(reply) => {
            let _ = reply.send(sweep(rec, events));
        }
        Command::Snapshot(reply) => {
            let _ = reply.send(Snapshot::of(rec));
        }
        Command::Shutdown(_) => {}
    }
}

// ---------------------------------------------------------------------------
// RosterHandle
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct RosterHandle {
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<StatusChange>,
}

impl RosterHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(make(tx))
            .await
            .map_err(|_| TurnoverError::ServiceStopped)?;
        rx.await.map_err(|_| TurnoverError::ServiceStopped)
    }

    /// Status changes produced by sweeps.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.events.subscribe()
    }

    pub async fn add(&self, input: NewEntity) -> Result<usize> {
        self.request(|r| Command::Add(input, r)).await?
    }

    pub async fn rename(&self, index: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.request(|r| Command::Rename(index, name, r)).await?
    }

    pub async fn set_company(&self, index: usize, company: impl Into<String>) -> Result<()> {
        let company = company.into();
        self.request(|r| Command::SetCompany(index, company, r)).await?
    }

    pub async fn set_mailbox(&self, index: usize, mailbox: impl Into<String>) -> Result<()> {
        let mailbox = mailbox.into();
        self.request(|r| Command::SetMailbox(index, mailbox, r)).await?
    }

    pub async fn set_active(&self, index: usize, active: bool) -> Result<()> {
        self.request(|r| Command::SetActive(index, active, r)).await?
    }

    pub async fn record_action(&self, index: usize) -> Result<()> {
        self.request(|r| Command::RecordAction(index, r)).await?
    }

    pub async fn reset(&self) -> Result<Snapshot> {
        self.request(Command::Reset).await
    }

    pub async fn sweep(&self) -> Result<Vec<StatusChange>> {
        self.request(Command::Sweep).await
    }

    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.request(Command::Snapshot).await
    }

    /// Flush any waiting push and stop the service.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(Command::Shutdown).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
