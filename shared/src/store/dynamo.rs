use async_trait::async_trait;
use aws_sdk_dynamodb::{
    types::{AttributeValue, ReturnValue},
    Client as DynamoClient,
};
use serde_json::{Number, Value};
use std::collections::HashMap;

use super::{prepare_insert, Filter, Row, StoreError, Table, TableStore};

type Item = HashMap<String, AttributeValue>;

/// DynamoDB-backed store: one table per logical table, partition key `id`.
pub struct DynamoStore {
    client: DynamoClient,
    table_prefix: String,
}

impl DynamoStore {
    pub fn new(client: DynamoClient, table_prefix: impl Into<String>) -> Self {
        Self {
            client,
            table_prefix: table_prefix.into(),
        }
    }

    /// Build a client from the ambient AWS environment.
    pub async fn from_env(table_prefix: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(DynamoClient::new(&config), table_prefix)
    }

    fn table_name(&self, table: Table) -> String {
        format!("{}-{}", self.table_prefix, table.name())
    }

    fn key_of(table: Table, row: &Row) -> Result<AttributeValue, StoreError> {
        row.get("id")
            .map(to_attr)
            .ok_or(StoreError::InvalidRow { table: table.name() })
    }
}

fn backend_error<E: std::fmt::Debug>(table: Table, e: E) -> StoreError {
    StoreError::Backend {
        table: table.name(),
        message: format!("{:?}", e),
    }
}

pub(crate) fn to_attr(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attr).collect()),
        Value::Object(map) => {
            AttributeValue::M(map.iter().map(|(k, v)| (k.clone(), to_attr(v))).collect())
        }
    }
}

pub(crate) fn from_attr(attr: &AttributeValue) -> Value {
    match attr {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => n
            .parse::<i64>()
            .map(Value::from)
            .ok()
            .or_else(|| n.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number))
            .unwrap_or_else(|| Value::String(n.clone())),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::L(items) => Value::Array(items.iter().map(from_attr).collect()),
        AttributeValue::M(map) => {
            Value::Object(map.iter().map(|(k, v)| (k.clone(), from_attr(v))).collect())
        }
        AttributeValue::Ss(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
        // NULL, binary and other set types have no useful JSON shape here
        _ => Value::Null,
    }
}

fn row_from_item(item: &Item) -> Row {
    item.iter().map(|(k, v)| (k.clone(), from_attr(v))).collect()
}

/// `#f0 = :v0 AND #f1 = :v1 ...` with its name and value maps.
fn filter_expression(filter: &Filter) -> (String, HashMap<String, String>, Item) {
    let mut clauses = Vec::new();
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    for (i, (field, value)) in filter.conditions().iter().enumerate() {
        clauses.push(format!("#f{i} = :v{i}"));
        names.insert(format!("#f{i}"), field.clone());
        values.insert(format!(":v{i}"), to_attr(value));
    }
    (clauses.join(" AND "), names, values)
}

/// `SET #p0 = :p0, ...` for every column in the patch except the key.
fn update_expression(patch: &Row) -> Option<(String, HashMap<String, String>, Item)> {
    let mut sets = Vec::new();
    let mut names = HashMap::new();
    let mut values = HashMap::new();
    for (i, (field, value)) in patch.iter().filter(|(k, _)| k.as_str() != "id").enumerate() {
        sets.push(format!("#p{i} = :p{i}"));
        names.insert(format!("#p{i}"), field.clone());
        values.insert(format!(":p{i}"), to_attr(value));
    }
    if sets.is_empty() {
        None
    } else {
        Some((format!("SET {}", sets.join(", ")), names, values))
    }
}

#[async_trait]
impl TableStore for DynamoStore {
    async fn find(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let table_name = self.table_name(table);
        let mut rows = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self
                .client
                .scan()
                .table_name(&table_name)
                .set_exclusive_start_key(start_key.take());

            if !filter.is_empty() {
                let (expression, names, values) = filter_expression(filter);
                request = request
                    .filter_expression(expression)
                    .set_expression_attribute_names(Some(names))
                    .set_expression_attribute_values(Some(values));
            }

            let output = request.send().await.map_err(|e| backend_error(table, e))?;
            rows.extend(output.items().iter().map(row_from_item));

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        tracing::debug!("Scanned {}: {} rows", table_name, rows.len());
        Ok(rows)
    }

    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError> {
        let row = prepare_insert(row);
        let item: Item = row.iter().map(|(k, v)| (k.clone(), to_attr(v))).collect();

        self.client
            .put_item()
            .table_name(self.table_name(table))
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| backend_error(table, e))?;

        Ok(row)
    }

    async fn update(&self, table: Table, filter: &Filter, patch: Row) -> Result<Vec<Row>, StoreError> {
        let matching = self.find(table, filter).await?;
        let Some((expression, names, values)) = update_expression(&patch) else {
            return Ok(matching);
        };

        let mut updated = Vec::with_capacity(matching.len());
        for row in &matching {
            let output = self
                .client
                .update_item()
                .table_name(self.table_name(table))
                .key("id", Self::key_of(table, row)?)
                .update_expression(&expression)
                .set_expression_attribute_names(Some(names.clone()))
                .set_expression_attribute_values(Some(values.clone()))
                .return_values(ReturnValue::AllNew)
                .send()
                .await
                .map_err(|e| backend_error(table, e))?;

            if let Some(attributes) = output.attributes() {
                updated.push(row_from_item(attributes));
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<Vec<Row>, StoreError> {
        let matching = self.find(table, filter).await?;

        let mut removed = Vec::with_capacity(matching.len());
        for row in matching {
            self.client
                .delete_item()
                .table_name(self.table_name(table))
                .key("id", Self::key_of(table, &row)?)
                .return_values(ReturnValue::AllOld)
                .send()
                .await
                .map_err(|e| backend_error(table, e))?;
            removed.push(row);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_conversion_preserves_shape() {
        let value = json!({
            "name": "Ada",
            "overall_mark": 72.5,
            "test_duration": 45,
            "active": true,
            "test_link": null,
            "tags": ["a", "b"],
        });
        let back = from_attr(&to_attr(&value));
        assert_eq!(back, value);
    }

    #[test]
    fn test_filter_expression_placeholders() {
        let filter = Filter::new().eq("org_id", "org-1").eq("language", "French");
        let (expression, names, values) = filter_expression(&filter);

        assert_eq!(expression, "#f0 = :v0 AND #f1 = :v1");
        assert_eq!(names["#f0"], "org_id");
        assert_eq!(names["#f1"], "language");
        assert_eq!(values[":v1"], AttributeValue::S("French".to_string()));
    }

    #[test]
    fn test_update_expression_skips_key() {
        let patch = json!({"id": "x", "status": "completed"})
            .as_object()
            .cloned()
            .unwrap();
        let (expression, names, _) = update_expression(&patch).unwrap();
        assert_eq!(expression, "SET #p0 = :p0");
        assert_eq!(names["#p0"], "status");

        let only_key = json!({"id": "x"}).as_object().cloned().unwrap();
        assert!(update_expression(&only_key).is_none());
    }
}
