use crate::error::{Result, TurnoverError};
use crate::types::Status;
use crate::validate;
use serde::{Deserialize, Serialize};

/// Number of placeholder consultants in a fresh roster.
pub const DEFAULT_SEED_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One tracked consultant. Serialized in the shape shared by the local cache
/// and the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EntityRecord")]
pub struct Entity {
    pub name: String,
    pub company: String,
    pub mailbox: Option<String>,
    pub status: Status,
    /// Milliseconds since the epoch of the most recent follow-up action.
    #[serde(rename = "lastAction")]
    pub last_action: Option<i64>,
    pub active: bool,
}

impl Entity {
    /// Create a fresh, never-contacted consultant.
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        mailbox: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            mailbox,
            status: Status::New,
            last_action: None,
            active: true,
        }
    }
}

/// Wire form read from the cache or a remote row. Every field is optional so
/// that partially filled rows still load.
#[derive(Deserialize)]
struct EntityRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    mailbox: Option<String>,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default, rename = "lastAction")]
    last_action: Option<serde_json::Value>,
    #[serde(default)]
    active: Option<serde_json::Value>,
}

impl From<EntityRecord> for Entity {
    fn from(r: EntityRecord) -> Self {
        Self {
            name: r.name.unwrap_or_default(),
            company: r.company.unwrap_or_default(),
            mailbox: r.mailbox.filter(|m| !m.is_empty()),
            status: r.status.unwrap_or(Status::New),
            last_action: r.last_action.as_ref().and_then(millis).filter(|t| *t != 0),
            active: r.active.and_then(|v| v.as_bool()).unwrap_or(true),
        }
    }
}

/// Epoch milliseconds from an integer, a float column or a numeric string.
/// Anything else reads as "never acted".
fn millis(v: &serde_json::Value) -> Option<i64> {
    match v {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// NewEntity
// ---------------------------------------------------------------------------

/// User input for the "create" intent, validated before it reaches a roster.
#[derive(Debug, Clone, Default)]
pub struct NewEntity {
    pub name: String,
    pub company: String,
    pub mailbox: Option<String>,
}

impl NewEntity {
    pub fn validate(&self) -> Result<Entity> {
        let name = validate::name(&self.name)?;
        let company = validate::company(&self.company)?;
        let mailbox = match self.mailbox.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(m) => Some(validate::mailbox(m)?),
        };
        Ok(Entity::new(name, company, mailbox))
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Ordered collection of consultants, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    entities: Vec<Entity>,
}

impl Roster {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Placeholder roster used when nothing has been cached yet.
    pub fn seed(size: usize) -> Self {
        let entities = (1..=size)
            .map(|i| {
                let letter = char::from(b'A' + ((i - 1) % 26) as u8);
                Entity::new(
                    format!("Consultant {i}"),
                    format!("Entreprise {letter}"),
                    Some(format!("consultant{i}@entreprise{i}.com")),
                )
            })
            .collect();
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Entity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn entity_mut(&mut self, index: usize) -> Result<&mut Entity> {
        self.entities
            .get_mut(index)
            .ok_or(TurnoverError::EntityNotFound(index))
    }

    /// Append an entity and return its position.
    pub fn push(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_placeholders() {
        let roster = Roster::seed(DEFAULT_SEED_SIZE);
        assert_eq!(roster.len(), 10);
        let third = roster.get(2).unwrap();
        assert_eq!(third.name, "Consultant 3");
        assert_eq!(third.company, "Entreprise C");
        assert_eq!(third.mailbox.as_deref(), Some("consultant3@entreprise3.com"));
        assert_eq!(third.status, Status::New);
        assert!(third.active);
        assert!(third.last_action.is_none());
    }

    #[test]
    fn record_shape_uses_camel_case_last_action() {
        let mut e = Entity::new("Ada", "ACME", None);
        e.last_action = Some(1_700_000_000_000);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["lastAction"], 1_700_000_000_000i64);
        assert!(json["mailbox"].is_null());
        assert_eq!(json["status"], "Nouveau");
    }

    #[test]
    fn odd_last_action_values_do_not_poison_roster() {
        let json = r#"[
            {"name": "A", "lastAction": 1700000000000.7},
            {"name": "B", "lastAction": "1700000000000"},
            {"name": "C", "lastAction": {"at": 1}},
            {"name": "D", "lastAction": true}
        ]"#;
        let roster: Roster = serde_json::from_str(json).unwrap();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster.get(0).unwrap().last_action, Some(1_700_000_000_000));
        assert_eq!(roster.get(1).unwrap().last_action, Some(1_700_000_000_000));
        assert!(roster.get(2).unwrap().last_action.is_none());
        assert!(roster.get(3).unwrap().last_action.is_none());
    }

    #[test]
    fn partial_rows_load_with_defaults() {
        let json = r#"{"id": 7, "name": "Bo", "mailbox": "", "lastAction": 0, "active": "yes"}"#;
        let e: Entity = serde_json::from_str(json).unwrap();
        assert_eq!(e.name, "Bo");
        assert_eq!(e.company, "");
        assert!(e.mailbox.is_none());
        assert!(e.last_action.is_none());
        assert_eq!(e.status, Status::New);
        assert!(e.active);
    }

    #[test]
    fn roster_serializes_as_array() {
        let roster = Roster::seed(2);
        let json = serde_json::to_string(&roster).unwrap();
        assert!(json.starts_with('['));
        let back: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roster);
    }

    #[test]
    fn new_entity_validation() {
        let ok = NewEntity {
            name: " Ada ".into(),
            company: "ACME".into(),
            mailbox: Some("ada@acme.io".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.name, "Ada");
        assert_eq!(ok.status, Status::New);

        let bad = NewEntity {
            name: "Ada".into(),
            company: "ACME".into(),
            mailbox: Some("ada@acme".into()),
        };
        assert!(matches!(bad.validate(), Err(TurnoverError::InvalidMailbox(_))));

        let no_company = NewEntity {
            name: "Ada".into(),
            ..Default::default()
        };
        assert!(matches!(no_company.validate(), Err(TurnoverError::EmptyCompany)));
    }

    #[test]
    fn entity_mut_out_of_range() {
        let mut roster = Roster::seed(1);
        assert!(matches!(
            roster.entity_mut(5),
            Err(TurnoverError::EntityNotFound(5))
        ));
    }
}
