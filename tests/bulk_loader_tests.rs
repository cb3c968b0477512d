//! # Bulk Loader Tests
//!
//! CSV import into the in-memory store: ordering, last-write-wins, and
//! per-row failure reporting.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tempfile::NamedTempFile;

use menubot::bulk_loader::{BulkLoader, ImportRow, RowStatus};
use menubot::menu_model::{MenuModel, ResponseLookup};
use menubot::store::{
    functions_path, CollectionPath, DocumentPath, Fields, MemoryStore, ResponseStore,
};
use menubot::store_errors::StoreError;

const TIMEOUT: Duration = Duration::from_secs(5);

fn setup() -> (Arc<MemoryStore>, BulkLoader, MenuModel) {
    let store = Arc::new(MemoryStore::new());
    let loader = BulkLoader::new(store.clone(), TIMEOUT);
    let model = MenuModel::new(store.clone(), TIMEOUT);
    (store, loader, model)
}

fn row(category: &str, function: &str, response: &str) -> ImportRow {
    ImportRow {
        category: category.to_string(),
        function: function.to_string(),
        response: response.to_string(),
    }
}

#[tokio::test]
async fn test_import_csv_file() -> Result<()> {
    let (_, loader, model) = setup();

    let mut file = NamedTempFile::new()?;
    writeln!(file, "category,function,response")?;
    writeln!(file, "Share a link,All useful links,Website: https://arthera.net")?;
    writeln!(
        file,
        "Share a blurb,Ecosystem Blurb,\"Arthera Chain details:\n\n✅ Gas Pass\"",
    )?;
    file.flush()?;

    let report = loader.load_csv_path(file.path()).await?;

    assert_eq!(report.outcomes.len(), 2);
    assert!(report.is_complete_success());
    assert_eq!(report.outcomes[0].line, 2);
    assert_eq!(report.outcomes[1].line, 3);

    assert_eq!(model.categories().await?, vec!["Share a link", "Share a blurb"]);
    assert_eq!(
        model.response_of("Share a blurb", "Ecosystem Blurb").await?,
        ResponseLookup::Found("Arthera Chain details:\n\n✅ Gas Pass".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_duplicate_rows_last_write_wins() -> Result<()> {
    let (store, loader, model) = setup();

    let csv = "category,function,response\n\
               Links,All,first\n\
               Links,All,second\n";
    let report = loader.load_csv(csv.as_bytes()).await?;

    assert_eq!(report.written(), 2);
    assert_eq!(
        model.response_of("Links", "All").await?,
        ResponseLookup::Found("second".to_string())
    );
    // One category document and one function document
    assert_eq!(store.len().await, 2);
    Ok(())
}

#[tokio::test]
async fn test_reimport_is_idempotent() -> Result<()> {
    let (store, loader, model) = setup();
    let rows = vec![row("Links", "All", "same"), row("Links", "Docs", "docs")];

    loader.load_rows(rows.clone()).await;
    let count = store.len().await;
    loader.load_rows(rows).await;

    assert_eq!(store.len().await, count);
    assert_eq!(model.functions_of("Links").await?, vec!["All", "Docs"]);
    Ok(())
}

#[tokio::test]
async fn test_invalid_rows_rejected_without_stopping_batch() -> Result<()> {
    let (_, loader, model) = setup();

    let report = loader
        .load_rows(vec![
            row("Bad|Category", "f", "x"),
            row("", "f", "x"),
            row("Good", "f", "kept"),
        ])
        .await;

    assert!(matches!(report.outcomes[0].status, RowStatus::Rejected(_)));
    assert!(matches!(report.outcomes[1].status, RowStatus::Rejected(_)));
    assert_eq!(report.outcomes[2].status, RowStatus::Written);
    assert_eq!(report.unsuccessful().count(), 2);
    assert_eq!(model.categories().await?, vec!["Good"]);
    Ok(())
}

#[tokio::test]
async fn test_unparsable_csv_row_reported_with_line() -> Result<()> {
    let (_, loader, model) = setup();

    let csv = "category,function,response\n\
               A,one,1\n\
               only-two,columns\n\
               B,two,2\n";
    let report = loader.load_csv(csv.as_bytes()).await?;

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.outcomes[1].line, 3);
    assert!(matches!(report.outcomes[1].status, RowStatus::Rejected(_)));
    assert_eq!(report.written(), 2);
    assert_eq!(model.categories().await?, vec!["A", "B"]);
    Ok(())
}

#[tokio::test]
async fn test_missing_column_is_fatal() -> Result<()> {
    let (store, loader, _) = setup();

    let csv = "category,function\nA,one\n";
    let err = loader.load_csv(csv.as_bytes()).await.unwrap_err();

    assert!(err.to_string().contains("response"));
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_extra_columns_and_padded_headers_accepted() -> Result<()> {
    let (_, loader, model) = setup();

    let csv = " category , function , response ,owner\nA,one,1,ops\n";
    let report = loader.load_csv(csv.as_bytes()).await?;

    assert!(report.is_complete_success());
    assert_eq!(
        model.response_of("A", "one").await?,
        ResponseLookup::Found("1".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_file_is_fatal() {
    let (_, loader, _) = setup();
    let result = loader
        .load_csv_path(std::path::Path::new("/nonexistent/menubot.csv"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_set_response_patches_single_function() -> Result<()> {
    let (_, loader, model) = setup();
    loader.load_rows(vec![row("Share a link", "All useful links", "old")]).await;

    loader
        .set_response("Share a link", "All useful links", "Website: https://arthera.net")
        .await?;

    assert_eq!(
        model.response_of("Share a link", "All useful links").await?,
        ResponseLookup::Found("Website: https://arthera.net".to_string())
    );
    assert!(loader.set_response("a|b", "f", "x").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_delete_function() -> Result<()> {
    let (_, loader, model) = setup();
    loader.load_rows(vec![row("Links", "All", "x")]).await;

    assert!(loader.delete_function("Links", "All").await?);
    assert!(!loader.delete_function("Links", "All").await?);
    assert_eq!(model.response_of("Links", "All").await?, ResponseLookup::NotFound);
    Ok(())
}

/// Store that refuses writes to one category
struct PartiallyBrokenStore {
    inner: MemoryStore,
    broken_category: String,
}

#[async_trait]
impl ResponseStore for PartiallyBrokenStore {
    async fn list_children(&self, collection: &CollectionPath) -> Result<Vec<String>, StoreError> {
        self.inner.list_children(collection).await
    }

    async fn get_value(&self, document: &DocumentPath) -> Result<Option<Fields>, StoreError> {
        self.inner.get_value(document).await
    }

    async fn upsert(&self, document: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        if document.parent() == &functions_path(&self.broken_category) {
            return Err(StoreError::Query("permission denied".to_string()));
        }
        self.inner.upsert(document, fields).await
    }

    async fn delete(&self, document: &DocumentPath) -> Result<bool, StoreError> {
        self.inner.delete(document).await
    }

    async fn list_collections(&self) -> Result<Vec<String>, StoreError> {
        self.inner.list_collections().await
    }
}

#[tokio::test]
async fn test_store_fault_on_one_row_does_not_abort_batch() -> Result<()> {
    let store = Arc::new(PartiallyBrokenStore {
        inner: MemoryStore::new(),
        broken_category: "Locked".to_string(),
    });
    let loader = BulkLoader::new(store.clone(), TIMEOUT);
    let model = MenuModel::new(store, TIMEOUT);

    let report = loader
        .load_rows(vec![
            row("Open", "a", "1"),
            row("Locked", "b", "2"),
            row("Open", "c", "3"),
        ])
        .await;

    assert_eq!(report.outcomes[0].status, RowStatus::Written);
    assert_eq!(
        report.outcomes[1].status,
        RowStatus::Failed(StoreError::Query("permission denied".to_string()))
    );
    assert_eq!(report.outcomes[2].status, RowStatus::Written);
    assert_eq!(model.functions_of("Open").await?, vec!["a", "c"]);
    Ok(())
}
