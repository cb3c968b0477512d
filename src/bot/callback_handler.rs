//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, ChatId, MessageId, UserId};
use tracing::{debug, error, warn};

use crate::navigation::{NavState, NavigationController, Screen};

// Import UI builder functions
use super::ui_builder::build_keyboard;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    controller: Arc<NavigationController>,
) -> Result<()> {
    let token = q.data.as_deref().unwrap_or("");
    debug!(user_id = %q.from.id, token, "Received callback query from user");

    // Answer before the store is queried so the button stops spinning;
    // an expired query must not keep the screen from being shown
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let screen = controller
        .select(token, q.from.language_code.as_deref())
        .await;

    match &q.message {
        Some(msg) => present(&bot, msg.chat().id, msg.id(), &screen, &q.from.id).await,
        None => warn!(user_id = %q.from.id, "Callback query without an accessible message"),
    }

    Ok(())
}

/// Replace the menu message in place, or remove it when the menu was closed.
/// Telegram failures here are logged, not propagated.
async fn present(bot: &Bot, chat_id: ChatId, message_id: MessageId, screen: &Screen, user_id: &UserId) {
    if screen.state == NavState::Closed {
        if let Err(e) = bot.delete_message(chat_id, message_id).await {
            error!(user_id = %user_id, error = %e, "Failed to delete menu message");
        }
        return;
    }

    let request = bot.edit_message_text(chat_id, message_id, screen.text.clone());
    let result = match build_keyboard(&screen.keyboard) {
        Some(keyboard) => request.reply_markup(keyboard).await,
        None => request.await,
    };

    if let Err(e) = result {
        error!(user_id = %user_id, state = ?screen.state, error = %e, "Failed to edit menu message");
    }
}
