use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{EntityStore, Query, Record, StoreError, StoreResult};

/// In-process store with the same filter-by-equality + sort + limit
/// semantics as the production backend. Drives every test in the workspace
/// and doubles as a scratch backend for local experiments.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> StoreError {
        StoreError::Backend("memory store lock poisoned".to_string())
    }

    fn stamp_new(fields: &Value) -> StoreResult<Value> {
        let Value::Object(map) = fields else {
            return Err(StoreError::InvalidPayload);
        };
        let mut record = map.clone();
        let now = json!(Utc::now());
        record.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
        record.insert("created_date".to_string(), now.clone());
        record.insert("updated_date".to_string(), now);
        Ok(Value::Object(record))
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Record> {
        let collections = self.collections.read().map_err(|_| Self::lock_err())?;
        collections
            .get(collection)
            .and_then(|records| records.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn filter(&self, collection: &str, query: Query) -> StoreResult<Vec<Record>> {
        let collections = self.collections.read().map_err(|_| Self::lock_err())?;
        let mut hits: Vec<Value> = collections
            .get(collection)
            .map(|records| {
                records
                    .values()
                    .filter(|record| matches_predicates(record, &query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, descending)) = query.sort() {
            hits.sort_by(|a, b| {
                let ordering = compare_fields(a, b, field);
                if descending { ordering.reverse() } else { ordering }
            });
        }
        if let Some(cap) = query.cap() {
            hits.truncate(cap);
        }
        Ok(hits)
    }

    async fn create(&self, collection: &str, fields: Value) -> StoreResult<Record> {
        let record = Self::stamp_new(&fields)?;
        let id = record["id"].as_str().unwrap_or_default().to_string();
        let mut collections = self.collections.write().map_err(|_| Self::lock_err())?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Record> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::InvalidPayload);
        };
        let mut collections = self.collections.write().map_err(|_| Self::lock_err())?;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let Value::Object(fields) = record else {
            return Err(StoreError::InvalidPayload);
        };
        for (key, value) in patch {
            fields.insert(key, value);
        }
        fields.insert("updated_date".to_string(), json!(Utc::now()));
        Ok(record.clone())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().map_err(|_| Self::lock_err())?;
        collections
            .get_mut(collection)
            .and_then(|records| records.remove(id))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    async fn bulk_create(&self, collection: &str, items: Vec<Value>) -> StoreResult<Vec<Record>> {
        let mut created = Vec::with_capacity(items.len());
        for fields in items {
            created.push(self.create(collection, fields).await?);
        }
        Ok(created)
    }
}

fn matches_predicates(record: &Value, query: &Query) -> bool {
    query.predicates().iter().all(|(field, expected)| {
        record.get(field).unwrap_or(&Value::Null) == expected
    })
}

/// Total order over JSON scalars, good enough for sort-by-field: null first,
/// then booleans, numbers, strings. RFC 3339 timestamps order correctly as
/// strings.
fn compare_fields(a: &Value, b: &Value, field: &str) -> Ordering {
    let left = a.get(field).unwrap_or(&Value::Null);
    let right = b.get(field).unwrap_or(&Value::Null);
    match (left, right) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let record = store
            .create("Lead", json!({"account_id": "acc", "full_name": "דנה לוי"}))
            .await
            .unwrap();
        assert!(record["id"].as_str().is_some_and(|id| !id.is_empty()));
        assert!(record["created_date"].is_string());
        assert_eq!(record["created_date"], record["updated_date"]);
    }

    #[tokio::test]
    async fn filter_is_exact_match_only() {
        let store = MemoryStore::new();
        store
            .create("Process", json!({"account_id": "a", "name": "x", "is_active": true}))
            .await
            .unwrap();
        store
            .create("Process", json!({"account_id": "a", "name": "x", "is_active": false}))
            .await
            .unwrap();
        store
            .create("Process", json!({"account_id": "b", "name": "x", "is_active": true}))
            .await
            .unwrap();

        let hits = store
            .filter(
                "Process",
                Query::new().eq("account_id", "a").eq("is_active", true),
            )
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["account_id"], "a");
    }

    #[tokio::test]
    async fn sort_descends_with_minus_prefix_and_limit_caps() {
        let store = MemoryStore::new();
        for n in [2, 9, 5] {
            store.create("Task", json!({"rank": n})).await.unwrap();
        }
        let hits = store
            .filter("Task", Query::new().order_by("-rank").limit(2))
            .await
            .unwrap();
        let ranks: Vec<i64> = hits.iter().map(|r| r["rank"].as_i64().unwrap()).collect();
        assert_eq!(ranks, vec![9, 5]);
    }

    #[tokio::test]
    async fn update_merges_and_bumps_updated_date() {
        let store = MemoryStore::new();
        let record = store
            .create("Lead", json!({"full_name": "a", "status": "new"}))
            .await
            .unwrap();
        let id = record["id"].as_str().unwrap();
        let updated = store
            .update("Lead", id, json!({"status": "hot"}))
            .await
            .unwrap();
        assert_eq!(updated["full_name"], "a");
        assert_eq!(updated["status"], "hot");
        assert_eq!(updated["created_date"], record["created_date"]);
    }

    #[tokio::test]
    async fn missing_records_surface_not_found() {
        let store = MemoryStore::new();
        assert!(store.get("Lead", "nope").await.unwrap_err().is_not_found());
        assert!(
            store
                .update("Lead", "nope", json!({}))
                .await
                .unwrap_err()
                .is_not_found()
        );
        assert!(store.delete("Lead", "nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn bulk_create_preserves_order() {
        let store = MemoryStore::new();
        let created = store
            .bulk_create("Lead", vec![json!({"n": 1}), json!({"n": 2})])
            .await
            .unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0]["n"], 1);
        assert_eq!(created[1]["n"], 2);
    }
}
