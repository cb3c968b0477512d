//! In-memory response store
//!
//! Documents are kept in insertion order so listings are stable, which is the
//! same retrieval order the Postgres backend uses.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{CollectionPath, DocumentPath, Fields, ResponseStore};
use crate::store_errors::StoreError;

#[derive(Debug, Clone)]
struct StoredDocument {
    path: DocumentPath,
    fields: Fields,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<StoredDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, ancestors included
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

fn merge_into(documents: &mut Vec<StoredDocument>, path: &DocumentPath, fields: Fields) {
    match documents.iter_mut().find(|d| &d.path == path) {
        Some(existing) => existing.fields.extend(fields),
        None => documents.push(StoredDocument {
            path: path.clone(),
            fields,
        }),
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn list_children(&self, collection: &CollectionPath) -> Result<Vec<String>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|d| d.path.parent() == collection)
            .map(|d| d.path.id().to_string())
            .collect())
    }

    async fn get_value(&self, document: &DocumentPath) -> Result<Option<Fields>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .find(|d| &d.path == document)
            .map(|d| d.fields.clone()))
    }

    async fn upsert(&self, document: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        document.validate()?;
        let mut documents = self.documents.write().await;
        for ancestor in document.ancestors() {
            merge_into(&mut documents, &ancestor, Fields::new());
        }
        merge_into(&mut documents, document, fields);
        debug!(path = %document, "Upserted document in memory store");
        Ok(())
    }

    async fn delete(&self, document: &DocumentPath) -> Result<bool, StoreError> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| &d.path != document);
        Ok(documents.len() < before)
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        let documents = self.documents.read().await;
        let mut names: Vec<String> = Vec::new();
        for doc in documents.iter() {
            if doc.path.parent().segments().len() == 1 {
                let name = doc.path.parent().name();
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }
}
