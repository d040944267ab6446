use serde_json::{json, Value};
use std::collections::HashMap;

use crate::error::ApiError;
use crate::store::{row_str, Filter, Row, Table, TableStore};

/// List every organization
pub async fn list_organizations(store: &dyn TableStore) -> Result<Value, ApiError> {
    let rows = store.find(Table::Organizations, &Filter::new()).await?;
    Ok(json!({ "organizations": rows }))
}

/// Name of an organization, if it exists.
pub async fn org_name(store: &dyn TableStore, org_id: &str) -> Result<Option<String>, ApiError> {
    let row = store
        .find_one(Table::Organizations, &Filter::new().eq("id", org_id))
        .await?;
    Ok(row.and_then(|r| row_str(&r, "name")))
}

/// Embed `"organizations": {"name": ...}` in each row, looking every
/// distinct `org_id` up once.
pub async fn attach_org_names(store: &dyn TableStore, rows: Vec<Row>) -> Result<Vec<Row>, ApiError> {
    let mut names: HashMap<String, Option<String>> = HashMap::new();
    let mut out = Vec::with_capacity(rows.len());

    for mut row in rows {
        let embedded = match row_str(&row, "org_id") {
            Some(org_id) => {
                if !names.contains_key(&org_id) {
                    let name = org_name(store, &org_id).await?;
                    names.insert(org_id.clone(), name);
                }
                match &names[&org_id] {
                    Some(name) => json!({ "name": name }),
                    None => Value::Null,
                }
            }
            None => Value::Null,
        };
        row.insert("organizations".to_string(), embedded);
        out.push(row);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_list_organizations() {
        let store = MemoryStore::new();
        store
            .insert(Table::Organizations, row(json!({"id": "org-1", "name": "Alliance"})))
            .await
            .unwrap();

        let body = list_organizations(&store).await.unwrap();
        assert_eq!(body["organizations"][0]["name"], "Alliance");
    }

    #[tokio::test]
    async fn test_attach_org_names() {
        let store = MemoryStore::new();
        store
            .insert(Table::Organizations, row(json!({"id": "org-1", "name": "Alliance"})))
            .await
            .unwrap();

        let rows = vec![
            row(json!({"name": "A", "org_id": "org-1"})),
            row(json!({"name": "B", "org_id": "org-missing"})),
            row(json!({"name": "C"})),
        ];
        let rows = attach_org_names(&store, rows).await.unwrap();

        assert_eq!(rows[0]["organizations"]["name"], "Alliance");
        assert_eq!(rows[1]["organizations"], Value::Null);
        assert_eq!(rows[2]["organizations"], Value::Null);
    }
}
