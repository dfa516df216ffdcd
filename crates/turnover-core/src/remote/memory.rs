use super::RemoteStore;
use crate::entity::Entity;
use crate::error::{Result, TurnoverError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Select,
    Delete,
    Insert,
}

/// Journal entry for one call made against a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Select,
    Delete,
    Insert(Vec<Entity>),
}

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Entity>,
    calls: Vec<StoreCall>,
    failing: Vec<StoreOp>,
}

/// In-process consultant table. Clones share the same table, and any
/// operation can be switched to fail for exercising degraded paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    table: Arc<Mutex<Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Entity>) -> Self {
        let store = Self::default();
        store.lock().rows = rows;
        store
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn rows(&self) -> Vec<Entity> {
        self.lock().rows.clone()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of insert calls, i.e. completed full pushes.
    pub fn insert_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, StoreCall::Insert(_)))
            .count()
    }

    pub fn set_failing(&self, op: StoreOp, failing: bool) {
        let mut table = self.lock();
        table.failing.retain(|o| *o != op);
        if failing {
            table.failing.push(op);
        }
    }

    fn check(table: &Table, op: StoreOp) -> Result<()> {
        if table.failing.contains(&op) {
            return Err(TurnoverError::Remote(format!("{op:?} failed (injected)")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn select_all(&self, _order_by: &str) -> Result<Vec<Entity>> {
        let mut table = self.lock();
        table.calls.push(StoreCall::Select);
        Self::check(&table, StoreOp::Select)?;
        Ok(table.rows.clone())
    }

    async fn delete_all(&self) -> Result<()> {
        let mut table = self.lock();
        table.calls.push(StoreCall::Delete);
        Self::check(&table, StoreOp::Delete)?;
        table.rows.clear();
        Ok(())
    }

    async fn insert_many(&self, rows: &[Entity]) -> Result<()> {
        let mut table = self.lock();
        table.calls.push(StoreCall::Insert(rows.to_vec()));
        Self::check(&table, StoreOp::Insert)?;
        table.rows.extend_from_slice(rows);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delete_then_insert_replaces_table() {
        let store = MemoryStore::with_rows(vec![Entity::new("Old", "X", None)]);
        store.delete_all().await.unwrap();
        store
            .insert_many(&[Entity::new("New", "Y", None)])
            .await
            .unwrap();
        let rows = store.select_all("id").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "New");
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Delete,
                StoreCall::Insert(vec![Entity::new("New", "Y", None)]),
                StoreCall::Select
            ]
        );
    }

    #[tokio::test]
    async fn injected_failure_leaves_rows() {
        let store = MemoryStore::with_rows(vec![Entity::new("Old", "X", None)]);
        store.set_failing(StoreOp::Delete, true);
        assert!(store.delete_all().await.is_err());
        assert_eq!(store.rows().len(), 1);
        store.set_failing(StoreOp::Delete, false);
        assert!(store.delete_all().await.is_ok());
        assert!(store.rows().is_empty());
    }
}
