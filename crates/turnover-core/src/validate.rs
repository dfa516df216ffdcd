use crate::error::{Result, TurnoverError};
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Mailbox validation
// ---------------------------------------------------------------------------

static MAILBOX_RE: OnceLock<Regex> = OnceLock::new();

fn mailbox_re() -> &'static Regex {
    MAILBOX_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

pub fn is_valid_mailbox(value: &str) -> bool {
    mailbox_re().is_match(&value.to_lowercase())
}

/// Trim and check a mailbox, returning the value to store.
pub fn mailbox(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if !is_valid_mailbox(trimmed) {
        return Err(TurnoverError::InvalidMailbox(value.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn name(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TurnoverError::EmptyName);
    }
    Ok(trimmed.to_string())
}

pub fn company(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TurnoverError::EmptyCompany);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_addresses() {
        assert!(is_valid_mailbox("a@b.com"));
        assert!(is_valid_mailbox("prenom.nom@domaine.fr"));
        assert!(is_valid_mailbox("X@Y.Z"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["a@b", "a.com", "", "a @b.com", "@b.com", "a@@b.com"] {
            assert!(!is_valid_mailbox(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn mailbox_trims_before_checking() {
        assert_eq!(mailbox("  a@b.com ").unwrap(), "a@b.com");
        assert!(matches!(
            mailbox("a@b"),
            Err(TurnoverError::InvalidMailbox(v)) if v == "a@b"
        ));
    }

    #[test]
    fn blank_name_rejected() {
        assert!(matches!(name("   "), Err(TurnoverError::EmptyName)));
        assert_eq!(name(" Ada ").unwrap(), "Ada");
    }
}
