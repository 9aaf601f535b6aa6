//! Entity-store primitives. The production backend is an external
//! document-style service; the core only ever sees this trait.

mod memory;
mod query;

pub use memory::MemoryStore;
pub use query::Query;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// One document in a named collection. Always a JSON object carrying the
/// store-assigned `id`, `created_date` and `updated_date` fields.
pub type Record = Value;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} record {id} not found")]
    NotFound { collection: String, id: String },
    #[error("record payload must be a JSON object")]
    InvalidPayload,
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Generic CRUD + filter over named collections.
///
/// Multi-tenancy is the caller's contract: every query and payload the
/// automation core sends carries an `account_id`, and implementations are
/// free to enforce it server-side on top.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> StoreResult<Record>;

    /// Exact-match filtering with optional sort (`-field` = descending) and
    /// limit, mirroring the backend service's query semantics.
    async fn filter(&self, collection: &str, query: Query) -> StoreResult<Vec<Record>>;

    /// The store assigns `id`, `created_date` and `updated_date`.
    async fn create(&self, collection: &str, fields: Value) -> StoreResult<Record>;

    /// Shallow-merges `patch` into the record and bumps `updated_date`.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> StoreResult<Record>;

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    async fn bulk_create(&self, collection: &str, items: Vec<Value>) -> StoreResult<Vec<Record>>;
}
