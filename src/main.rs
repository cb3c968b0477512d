use anyhow::{Context, Result};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

use menubot::bot as handlers;
use menubot::config::{init_tracing, BotConfig};
use menubot::localization::LocalizationManager;
use menubot::menu_model::MenuModel;
use menubot::navigation::NavigationController;
use menubot::store::{PgStore, ResponseStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = BotConfig::from_env().context("Invalid bot configuration")?;
    init_tracing(&config.log);

    info!("Starting menu bot");

    let store: Arc<dyn ResponseStore> = Arc::new(PgStore::connect(&config.store).await?);
    let menu = MenuModel::new(store, config.store.operation_timeout);

    // Refuse to serve when the store cannot be reached
    let collections = menu
        .collections()
        .await
        .context("Initial response store check failed")?;
    info!(?collections, "Response store reachable");

    let i18n = Arc::new(LocalizationManager::new()?);
    let controller = Arc::new(NavigationController::new(menu, i18n, config.menu_columns));

    let bot = Bot::new(config.telegram_token);
    let me = bot
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;

    info!(username = me.username(), "Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<handlers::Command>()
                .endpoint(handlers::command_handler),
        )
        .branch(Update::filter_message().endpoint(handlers::message_handler))
        .branch(Update::filter_callback_query().endpoint(handlers::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![controller])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
