//! # Catalog Export Tests

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use menubot::export::{export_catalog, Catalog};
use menubot::menu_model::MenuModel;
use menubot::store::{categories_path, function_doc, response_fields, Fields, MemoryStore, ResponseStore};

#[tokio::test]
async fn test_export_walks_whole_hierarchy() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert(
            &function_doc("Share a link", "All useful links"),
            response_fields("Website: https://arthera.net"),
        )
        .await?;
    store
        .upsert(&function_doc("Share a link", "Draft"), Fields::new())
        .await?;
    store.upsert(&categories_path().doc("Empty Cat"), Fields::new()).await?;

    let model = MenuModel::new(store, Duration::from_secs(5));
    let catalog = export_catalog(&model).await?;

    assert_eq!(catalog.categories.len(), 2);
    assert_eq!(catalog.function_count(), 2);

    let links = &catalog.categories[0];
    assert_eq!(links.id, "Share a link");
    assert_eq!(
        links.functions[0].response.as_deref(),
        Some("Website: https://arthera.net")
    );
    assert_eq!(links.functions[1].response, None);
    assert!(catalog.categories[1].functions.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_export_json_shape() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert(&function_doc("FAQ", "Gas Pass"), response_fields("Fixed price"))
        .await?;
    store
        .upsert(&function_doc("FAQ", "Empty"), Fields::new())
        .await?;

    let catalog = export_catalog(&MenuModel::new(store, Duration::from_secs(5))).await?;
    let json = catalog.to_json_pretty()?;
    let value: serde_json::Value = serde_json::from_str(&json)?;

    assert_eq!(value["categories"][0]["id"], "FAQ");
    assert_eq!(value["categories"][0]["functions"][0]["id"], "Gas Pass");
    assert_eq!(value["categories"][0]["functions"][0]["response"], "Fixed price");
    // Missing responses are omitted rather than written as null
    assert!(value["categories"][0]["functions"][1].get("response").is_none());

    let parsed: Catalog = serde_json::from_str(&json)?;
    assert_eq!(parsed, catalog);
    Ok(())
}
