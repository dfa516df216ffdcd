use crate::output::print_json;
use crate::session::{self, Options};
use serde::Serialize;
use std::path::Path;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use turnover_core::actor::RosterService;
use turnover_core::sync::BootstrapOutcome;

#[derive(Serialize)]
struct SyncReport<'a> {
    #[serde(flatten)]
    outcome: BootstrapOutcome,
    table: &'a str,
    local_rows: usize,
    pushed: bool,
}

pub async fn sync(root: &Path, push: bool, opts: Options) -> anyhow::Result<()> {
    let mut session = session::open(root, opts.offline).await?;
    let online = !matches!(session.outcome, BootstrapOutcome::Offline);
    let rec = &mut session.reconciler;

    if push && online {
        rec.schedule_remote_push();
        rec.flush().await;
    } else if push {
        warn!("no remote store available; nothing pushed");
    }

    let report = SyncReport {
        outcome: session.outcome,
        table: &session.config.remote.table,
        local_rows: rec.roster().len(),
        pushed: push && online,
    };

    if opts.json {
        return print_json(&report);
    }
    match report.outcome {
        BootstrapOutcome::Offline => println!("Offline: using the local roster only."),
        BootstrapOutcome::Failed => println!("Remote fetch failed: kept the local roster."),
        BootstrapOutcome::Empty => println!("Remote table '{}' is empty: kept the local roster.", report.table),
        BootstrapOutcome::Adopted { rows } => {
            println!("Adopted {rows} consultant(s) from remote table '{}'.", report.table)
        }
    }
    if report.pushed {
        println!("Pushed {} consultant(s).", report.local_rows);
    }
    Ok(())
}

/// Run the roster service until Ctrl-C, printing status changes as the
/// periodic sweep finds them.
pub async fn watch(root: &Path, opts: Options) -> anyhow::Result<()> {
    let session = session::open(root, opts.offline).await?;
    let period = session.config.sync.sweep_interval();
    let handle = RosterService::spawn(session.reconciler, period);
    let mut changes = handle.subscribe();

    let initial = handle.sweep().await?;
    let snapshot = handle.snapshot().await?;
    info!(
        consultants = snapshot.summary.total(),
        attention = snapshot.summary.needs_attention(),
        changed = initial.len(),
        "watching roster"
    );
    if opts.json {
        print_json(&snapshot.summary)?;
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            change = changes.recv() => match change {
                Ok(change) => {
                    if opts.json {
                        print_json(&change)?;
                    } else {
                        println!(
                            "#{}: {} -> {}",
                            change.index + 1,
                            change.from.label(),
                            change.to.label()
                        );
                    }
                }
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "status changes dropped"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    handle.shutdown().await?;
    Ok(())
}
