use async_trait::async_trait;

use super::{Filter, MemoryStore, Row, StoreError, Table, TableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Find,
    Insert,
    Update,
    Delete,
}

/// `MemoryStore` that returns a backend error for chosen `(table, op)` pairs.
#[derive(Default)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    failures: Vec<(Table, Op)>,
}

impl FailingStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_on(mut self, table: Table, op: Op) -> Self {
        self.failures.push((table, op));
        self
    }

    /// Direct access for seeding and inspecting rows.
    pub(crate) fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(&self, table: Table, op: Op) -> Result<(), StoreError> {
        if self.failures.contains(&(table, op)) {
            return Err(StoreError::Backend {
                table: table.name(),
                message: format!("{:?} unavailable", op),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TableStore for FailingStore {
    async fn find(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        self.check(table, Op::Find)?;
        self.inner.find(table, filter).await
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        self.check(table, Op::Insert)?;
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<Vec<Row>, StoreError> {
        self.check(table, Op::Update)?;
        self.inner.update(table, filter, patch).await
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        self.check(table, Op::Delete)?;
        self.inner.delete(table, filter).await
    }
}
