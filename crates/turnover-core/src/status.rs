//! Status engine: maps `(active, lastAction, previous status, now)` to a
//! follow-up status.
//!
//! Status is time-derived, so callers re-run [`evaluate_roster`] on a timer as
//! well as after every edit. Nothing here touches I/O.

use crate::clock::MS_PER_DAY;
use crate::entity::{Entity, Roster};
use crate::types::Status;
use serde::Serialize;

/// Days since the last action at which a consultant needs a nudge.
pub const WARNING_AFTER_DAYS: f64 = 2.0;
/// Days since the last action at which a consultant is late.
pub const OVERDUE_AFTER_DAYS: f64 = 4.0;

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub status: Status,
    /// Advisory: the action control for this consultant should be highlighted.
    pub needs_attention: bool,
}

/// Derive the status of `entity` at `now_ms`. First matching rule wins.
pub fn derive_status(entity: &Entity, now_ms: i64) -> Evaluation {
    if !entity.active {
        return Evaluation {
            status: Status::Inactive,
            needs_attention: false,
        };
    }

    let Some(last) = entity.last_action else {
        let status = if entity.status == Status::New {
            Status::New
        } else {
            Status::Pending
        };
        return Evaluation {
            status,
            needs_attention: true,
        };
    };

    let days = now_ms.saturating_sub(last) as f64 / MS_PER_DAY as f64;
    if days >= OVERDUE_AFTER_DAYS {
        Evaluation {
            status: Status::Overdue,
            needs_attention: true,
        }
    } else if days >= WARNING_AFTER_DAYS {
        Evaluation {
            status: Status::Warning,
            needs_attention: true,
        }
    } else {
        Evaluation {
            status: Status::Current,
            needs_attention: false,
        }
    }
}

/// Derive and write the status back onto the entity.
pub fn apply(entity: &mut Entity, now_ms: i64) -> Evaluation {
    let eval = derive_status(entity, now_ms);
    entity.status = eval.status;
    eval
}

/// Record a follow-up action at `now_ms`. The caller is responsible for
/// refusing inactive consultants.
pub fn record_action(entity: &mut Entity, now_ms: i64) {
    entity.last_action = Some(now_ms);
    entity.status = Status::Current;
}

// ---------------------------------------------------------------------------
// Roster sweep
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub index: usize,
    pub from: Status,
    pub to: Status,
}

/// Re-evaluate every consultant, returning the ones whose status moved.
pub fn evaluate_roster(roster: &mut Roster, now_ms: i64) -> Vec<StatusChange> {
    roster
        .iter_mut()
        .enumerate()
        .filter_map(|(index, entity)| {
            let from = entity.status;
            let to = apply(entity, now_ms).status;
            (from != to).then_some(StatusChange { index, from, to })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-bucket counts shown above the roster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub current: usize,
    pub warning: usize,
    pub overdue: usize,
    /// `Pending` and `New` together.
    pub pending: usize,
    pub inactive: usize,
}

impl Summary {
    /// Tally stored statuses. Inactive consultants land in `inactive` only,
    /// whatever their status field says.
    pub fn of(roster: &Roster) -> Self {
        roster.iter().fold(Summary::default(), |mut s, e| {
            if !e.active {
                s.inactive += 1;
                return s;
            }
            match e.status {
                Status::Current => s.current += 1,
                Status::Warning => s.warning += 1,
                Status::Overdue => s.overdue += 1,
                Status::New | Status::Pending | Status::Inactive => s.pending += 1,
            }
            s
        })
    }

    pub fn total(&self) -> usize {
        self.current + self.warning + self.overdue + self.pending + self.inactive
    }

    pub fn needs_attention(&self) -> usize {
        self.warning + self.overdue + self.pending
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
