//! # Bulk Loader
//!
//! Imports canned responses from CSV (`category`, `function`, `response`
//! columns) into the store. Rows are independent: a rejected or failed row is
//! reported and the batch carries on. Nothing is rolled back.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::menu_model::bounded;
use crate::selection::validate_identifiers;
use crate::store::{function_doc, response_fields, ResponseStore};
use crate::store_errors::StoreError;

pub const REQUIRED_COLUMNS: [&str; 3] = ["category", "function", "response"];

/// One row of the import file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportRow {
    pub category: String,
    pub function: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    Written,
    /// Row never reached the store (unparsable or invalid identifiers)
    Rejected(String),
    /// The store refused the write
    Failed(StoreError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    /// 1-based line in the source file (the header is line 1)
    pub line: u64,
    pub category: String,
    pub function: String,
    pub status: RowStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub outcomes: Vec<RowOutcome>,
}

impl LoadReport {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == RowStatus::Written)
            .count()
    }

    /// Rows that were rejected or failed
    pub fn unsuccessful(&self) -> impl Iterator<Item = &RowOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status != RowStatus::Written)
    }

    pub fn is_complete_success(&self) -> bool {
        self.unsuccessful().next().is_none()
    }
}

pub struct BulkLoader {
    store: Arc<dyn ResponseStore>,
    timeout: Duration,
}

impl BulkLoader {
    pub fn new(store: Arc<dyn ResponseStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Import a CSV file. Only an unreadable file or a bad header is fatal.
    pub async fn load_csv_path(&self, path: &Path) -> Result<LoadReport> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        self.load_csv(file).await
    }

    pub async fn load_csv<R: Read>(&self, reader: R) -> Result<LoadReport> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = reader.headers().context("Failed to read CSV header")?.clone();

        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                bail!("CSV header is missing the '{column}' column");
            }
        }

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            // Header is line 1; fall back to counting when no position is known
            let fallback_line = index as u64 + 2;
            match record {
                Ok(record) => {
                    let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);
                    rows.push((line, record.deserialize::<ImportRow>(Some(&headers))));
                }
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                    rows.push((line, Err(e)));
                }
            }
        }

        let mut report = LoadReport::default();
        for (line, row) in rows {
            let outcome = match row {
                Ok(row) => self.write_row(line, row).await,
                Err(e) => {
                    warn!(line, error = %e, "Skipping unparsable CSV row");
                    RowOutcome {
                        line,
                        category: String::new(),
                        function: String::new(),
                        status: RowStatus::Rejected(e.to_string()),
                    }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            rows = report.outcomes.len(),
            written = report.written(),
            "CSV import finished"
        );
        Ok(report)
    }

    /// Write already-parsed rows in order. Lines are numbered as if the rows
    /// followed a header line.
    pub async fn load_rows(&self, rows: impl IntoIterator<Item = ImportRow>) -> LoadReport {
        let mut report = LoadReport::default();
        for (index, row) in rows.into_iter().enumerate() {
            report
                .outcomes
                .push(self.write_row(index as u64 + 2, row).await);
        }
        report
    }

    /// Replace the response of a single function
    pub async fn set_response(&self, category: &str, function: &str, text: &str) -> Result<()> {
        if let Err(reason) = validate_identifiers(category, function) {
            bail!("Refusing to write {category}/{function}: {reason}");
        }
        self.upsert_response(category, function, text)
            .await
            .with_context(|| format!("Failed to update response for {category}/{function}"))?;
        info!(category, function, "Response updated");
        Ok(())
    }

    /// Remove a function document. Returns whether it existed.
    pub async fn delete_function(&self, category: &str, function: &str) -> Result<bool> {
        let path = function_doc(category, function);
        let existed = bounded(self.timeout, "delete function", self.store.delete(&path))
            .await
            .with_context(|| format!("Failed to delete {path}"))?;
        info!(category, function, existed, "Function deleted");
        Ok(existed)
    }

    async fn write_row(&self, line: u64, row: ImportRow) -> RowOutcome {
        let status = match validate_identifiers(&row.category, &row.function) {
            Err(reason) => {
                warn!(line, category = %row.category, function = %row.function, reason = %reason, "Rejected row");
                RowStatus::Rejected(reason)
            }
            Ok(()) => match self
                .upsert_response(&row.category, &row.function, &row.response)
                .await
            {
                Ok(()) => {
                    info!(line, category = %row.category, function = %row.function, "Imported function");
                    RowStatus::Written
                }
                Err(e) => {
                    error!(line, category = %row.category, function = %row.function, error = %e, "Failed to import row");
                    RowStatus::Failed(e)
                }
            },
        };

        RowOutcome {
            line,
            category: row.category,
            function: row.function,
            status,
        }
    }

    async fn upsert_response(
        &self,
        category: &str,
        function: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        let path = function_doc(category, function);
        bounded(
            self.timeout,
            "upsert response",
            self.store.upsert(&path, response_fields(text)),
        )
        .await
    }
}
