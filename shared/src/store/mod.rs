//! Table-scoped data access.
//!
//! Handlers talk to a [`TableStore`] and never to a concrete backend. A
//! deployment uses [`DynamoStore`]; tests and local runs use [`MemoryStore`].

pub mod dynamo;
pub mod memory;
#[cfg(test)]
pub(crate) mod failing;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// One stored record, as a JSON object.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// Credential records
    Credentials,
    Admins,
    Students,
    Organizations,
    Tests,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Credentials => "auth",
            Table::Admins => "admins",
            Table::Students => "students",
            Table::Organizations => "organizations",
            Table::Tests => "tests",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error on {table}: {message}")]
    Backend { table: &'static str, message: String },

    #[error("row in {table} is not an object")]
    InvalidRow { table: &'static str },
}

/// Conjunction of field equality tests. An empty filter matches every row.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.conditions.push((field.to_string(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| row.get(field) == Some(expected))
    }
}

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn find(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError>;

    /// Insert a row, assigning `id` and `created_at` when absent.
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Merge `patch` into every matching row and return the updated rows.
    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<Vec<Row>, StoreError>;

    /// Remove every matching row and return what was removed.
    async fn delete(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError>;

    /// First matching row, if any.
    async fn find_one(&self, table: Table, filter: &Filter) -> Result<Option<Row>, StoreError> {
        Ok(self.find(table, filter).await?.into_iter().next())
    }
}

/// Fill in the generated columns every inserted row carries.
pub(crate) fn prepare_insert(mut row: Row) -> Row {
    if !row.contains_key("id") {
        row.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
    }
    if !row.contains_key("created_at") {
        row.insert(
            "created_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
    }
    row
}

/// Build a row from a serializable value.
pub fn to_row<T: serde::Serialize>(table: Table, value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(StoreError::InvalidRow { table: table.name() }),
    }
}

/// String view of a column. Numeric ids are rendered as text.
pub fn row_str(row: &Row, field: &str) -> Option<String> {
    match row.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn row_f64(row: &Row, field: &str) -> Option<f64> {
    row.get(field).and_then(Value::as_f64)
}
