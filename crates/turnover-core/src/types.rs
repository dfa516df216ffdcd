use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Follow-up status of a consultant. Derived from `active` and `lastAction`;
/// only the `New` marker survives re-evaluation on its own.
///
/// Records store the labels the deployed table already uses (`"Nouveau"`,
/// `"À jour"`, ...). The snake-case names are accepted on input too, and any
/// unrecognised label reads back as `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    New,
    Pending,
    Current,
    Warning,
    Overdue,
    Inactive,
}

impl Status {
    pub fn all() -> &'static [Status] {
        &[
            Status::New,
            Status::Pending,
            Status::Current,
            Status::Warning,
            Status::Overdue,
            Status::Inactive,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Pending => "pending",
            Status::Current => "current",
            Status::Warning => "warning",
            Status::Overdue => "overdue",
            Status::Inactive => "inactive",
        }
    }

    /// Label written to the cache and the remote table.
    pub fn label(self) -> &'static str {
        match self {
            Status::New => "Nouveau",
            Status::Pending => "En attente",
            Status::Current => "À jour",
            Status::Warning => "Attention",
            Status::Overdue => "En retard",
            Status::Inactive => "Inactif",
        }
    }

    /// Lenient parse used for stored records.
    pub fn from_label(s: &str) -> Status {
        Status::all()
            .iter()
            .copied()
            .find(|st| st.label() == s || st.as_str() == s)
            .unwrap_or(Status::Pending)
    }

    /// `New` and `Pending` both mean "no action recorded yet".
    pub fn is_awaiting_first_action(self) -> bool {
        matches!(self, Status::New | Status::Pending)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        Status::from_label(&s)
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        s.label().to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
