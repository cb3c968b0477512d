//! Catalog export: a snapshot of every category, function and response.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::menu_model::{MenuModel, ResponseLookup};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionExport {
    pub id: String,
    /// Absent when the document has no text `response` field
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryExport {
    pub id: String,
    pub functions: Vec<FunctionExport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub exported_at: DateTime<Utc>,
    pub categories: Vec<CategoryExport>,
}

impl Catalog {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize catalog")
    }

    pub fn function_count(&self) -> usize {
        self.categories.iter().map(|c| c.functions.len()).sum()
    }
}

/// Walk the whole menu hierarchy. Any store fault aborts the export.
pub async fn export_catalog(model: &MenuModel) -> Result<Catalog> {
    let mut categories = Vec::new();

    for category in model.categories().await.context("Failed to list categories")? {
        let mut functions = Vec::new();
        for function in model
            .functions_of(&category)
            .await
            .with_context(|| format!("Failed to list functions of {category}"))?
        {
            let response = match model
                .response_of(&category, &function)
                .await
                .with_context(|| format!("Failed to read {category}/{function}"))?
            {
                ResponseLookup::Found(text) => Some(text),
                ResponseLookup::MissingField | ResponseLookup::NotFound => None,
            };
            functions.push(FunctionExport {
                id: function,
                response,
            });
        }
        categories.push(CategoryExport {
            id: category,
            functions,
        });
    }

    Ok(Catalog {
        exported_at: Utc::now(),
        categories,
    })
}

/// Log one line per category and function
pub fn log_catalog(catalog: &Catalog) {
    for category in &catalog.categories {
        info!(category = %category.id, functions = category.functions.len(), "Category");
        for function in &category.functions {
            info!(
                category = %category.id,
                function = %function.id,
                response = function.response.as_deref().unwrap_or("No response found"),
                "Function"
            );
        }
    }
}
