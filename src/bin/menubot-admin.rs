//! Administrative tool for the menu bot's response store.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use menubot::bulk_loader::{BulkLoader, RowStatus};
use menubot::config::{init_tracing, LogConfig, StoreConfig};
use menubot::export::{export_catalog, log_catalog};
use menubot::menu_model::MenuModel;
use menubot::store::{PgStore, ResponseStore};

#[derive(Debug, Parser)]
#[command(name = "menubot-admin", about = "Manage the menu bot's canned responses")]
struct Cli {
    #[command(subcommand)]
    command: AdminCommand,
}

#[derive(Debug, Subcommand)]
enum AdminCommand {
    /// Import a CSV file with category, function and response columns
    Import { csv: PathBuf },
    /// Set the response of a single function
    Set {
        category: String,
        function: String,
        /// Response text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        text: Option<String>,
        /// Read the response text from a file
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a function and its response
    Delete { category: String, function: String },
    /// Write every category, function and response as JSON
    Export {
        /// Output file, stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Log every category, function and response
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let lookup = |key: &str| std::env::var(key).ok();
    init_tracing(&LogConfig::from_lookup(lookup)?);
    let cli = Cli::parse();

    let config = StoreConfig::from_env()?;
    let store: Arc<dyn ResponseStore> = Arc::new(PgStore::connect(&config).await?);
    let loader = BulkLoader::new(Arc::clone(&store), config.operation_timeout);
    let model = MenuModel::new(store, config.operation_timeout);

    match cli.command {
        AdminCommand::Import { csv } => {
            let report = loader.load_csv_path(&csv).await?;
            for outcome in report.unsuccessful() {
                match &outcome.status {
                    RowStatus::Rejected(reason) => {
                        warn!(line = outcome.line, reason = %reason, "Row rejected")
                    }
                    RowStatus::Failed(e) => warn!(line = outcome.line, error = %e, "Row failed"),
                    RowStatus::Written => {}
                }
            }
            let total = report.outcomes.len();
            let written = report.written();
            info!(total, written, "Import summary");
            if written < total {
                bail!("{} of {total} rows were not imported", total - written);
            }
        }
        AdminCommand::Set {
            category,
            function,
            text,
            file,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => bail!("Either --text or --file is required"),
            };
            loader.set_response(&category, &function, &text).await?;
        }
        AdminCommand::Delete { category, function } => {
            if !loader.delete_function(&category, &function).await? {
                warn!(category = %category, function = %function, "Nothing to delete");
            }
        }
        AdminCommand::Export { out } => {
            let catalog = export_catalog(&model).await?;
            let json = catalog.to_json_pretty()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!(
                        path = %path.display(),
                        categories = catalog.categories.len(),
                        functions = catalog.function_count(),
                        "Exported catalog"
                    );
                }
                None => println!("{json}"),
            }
        }
        AdminCommand::Check => {
            let catalog = export_catalog(&model).await?;
            log_catalog(&catalog);
        }
    }

    Ok(())
}
