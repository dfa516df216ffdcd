//! Remote shared store: one logical table of consultant rows.
//!
//! The reconciler only needs three whole-table operations. Transport lives in
//! the implementations: [`RestStore`] speaks PostgREST over HTTP and
//! [`MemoryStore`] keeps rows in process.

pub mod memory;
pub mod ready;
pub mod rest;

use crate::entity::Entity;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use memory::{MemoryStore, StoreCall, StoreOp};
pub use ready::{readiness, ReadyNotifier, ReadySignal};
pub use rest::RestStore;

/// Column rows are ordered by when the roster is pulled.
pub const ORDER_COLUMN: &str = "id";

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Every row, ascending by `order_by`. Row ids are dropped.
    async fn select_all(&self, order_by: &str) -> Result<Vec<Entity>>;

    /// Delete every row (the predicate `id != -1` matches all of them).
    async fn delete_all(&self) -> Result<()>;

    async fn insert_many(&self, rows: &[Entity]) -> Result<()>;
}

/// A store together with the signal telling whether it may be used yet.
#[derive(Clone)]
pub struct RemoteLink {
    pub store: Arc<dyn RemoteStore>,
    pub ready: ReadySignal,
}

impl RemoteLink {
    pub fn new(store: Arc<dyn RemoteStore>, ready: ReadySignal) -> Self {
        Self { store, ready }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }
}

impl std::fmt::Debug for RemoteLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteLink")
            .field("ready", &self.ready.is_ready())
            .finish_non_exhaustive()
    }
}
