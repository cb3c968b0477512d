//! Response store client
//!
//! The store is a hierarchy of collections and documents. Each document holds
//! a flat JSON object of fields. Two backends implement [`ResponseStore`]:
//! - `postgres`: the production backend on top of sqlx
//! - `memory`: an in-process backend for tests and local runs

pub mod memory;
pub mod path;
pub mod postgres;

use async_trait::async_trait;

use crate::store_errors::StoreError;

pub use memory::MemoryStore;
pub use path::{
    categories_path, function_doc, functions_path, CollectionPath, DocumentPath,
    CATEGORIES_COLLECTION, FUNCTIONS_COLLECTION, RESPONSE_FIELD,
};
pub use postgres::PgStore;

/// Fields stored on a document
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Build a field map holding only a `response` text
pub fn response_fields(text: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        RESPONSE_FIELD.to_string(),
        serde_json::Value::String(text.to_string()),
    );
    fields
}

/// Port for the hierarchical key-value backend.
///
/// Every call is a direct round trip: no caching, no retries.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Ids of the documents directly inside `collection`, in retrieval order.
    ///
    /// An empty or unknown collection yields an empty list.
    async fn list_children(&self, collection: &CollectionPath) -> Result<Vec<String>, StoreError>;

    /// Fields of the document at `document`, `None` when it does not exist.
    async fn get_value(&self, document: &DocumentPath) -> Result<Option<Fields>, StoreError>;

    /// Merge `fields` into the document, creating it and every ancestor
    /// document when missing. Fields not named are left untouched.
    async fn upsert(&self, document: &DocumentPath, fields: Fields) -> Result<(), StoreError>;

    /// Remove a document. Returns whether it existed.
    async fn delete(&self, document: &DocumentPath) -> Result<bool, StoreError>;

    /// Names of the top-level collections holding at least one document
    async fn list_collections(&self) -> Result<Vec<String>, StoreError>;
}
