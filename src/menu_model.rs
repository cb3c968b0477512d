//! Menu model: the category → function → response projection of the store.
//!
//! Nothing is cached; every navigation step goes back to the store. Each call
//! is bounded by the configured operation timeout so a hung backend cannot
//! stall the dispatcher.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::store::{
    categories_path, function_doc, functions_path, ResponseStore, RESPONSE_FIELD,
};
use crate::store_errors::StoreError;

/// Outcome of looking up the response for a function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseLookup {
    /// The `response` field holds this text (possibly empty)
    Found(String),
    /// The function document exists without a text `response` field
    MissingField,
    /// No function document at that path
    NotFound,
}

#[derive(Clone)]
pub struct MenuModel {
    store: Arc<dyn ResponseStore>,
    timeout: Duration,
}

impl MenuModel {
    pub fn new(store: Arc<dyn ResponseStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let path = categories_path();
        bounded(self.timeout, "list categories", self.store.list_children(&path)).await
    }

    /// Functions under a category; empty when it has none or does not exist
    pub async fn functions_of(&self, category: &str) -> Result<Vec<String>, StoreError> {
        let path = functions_path(category);
        bounded(self.timeout, "list functions", self.store.list_children(&path)).await
    }

    pub async fn response_of(
        &self,
        category: &str,
        function: &str,
    ) -> Result<ResponseLookup, StoreError> {
        let path = function_doc(category, function);
        let fields = bounded(self.timeout, "get response", self.store.get_value(&path)).await?;

        let lookup = match fields {
            None => ResponseLookup::NotFound,
            Some(fields) => match fields.get(RESPONSE_FIELD) {
                Some(serde_json::Value::String(text)) => ResponseLookup::Found(text.clone()),
                Some(other) => {
                    warn!(path = %path, value = %other, "Response field is not text");
                    ResponseLookup::MissingField
                }
                None => ResponseLookup::MissingField,
            },
        };
        debug!(category, function, ?lookup, "Looked up response");
        Ok(lookup)
    }

    /// Top-level collection names, for the connectivity check
    pub async fn collections(&self) -> Result<Vec<String>, StoreError> {
        bounded(self.timeout, "list collections", self.store.list_collections()).await
    }
}

/// Run a store call under `timeout`, turning expiry into [`StoreError::Timeout`]
pub async fn bounded<T>(
    timeout: Duration,
    operation: &str,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(format!(
            "{operation} did not finish within {}s",
            timeout.as_secs_f32()
        ))),
    }
}
