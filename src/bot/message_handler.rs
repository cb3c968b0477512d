//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Message};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::navigation::{NavigationController, Screen};

// Import UI builder functions
use super::ui_builder::build_keyboard;

/// Commands understood by the bot
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "check the connection to the response store")]
    TestDb,
}

fn language_code(msg: &Message) -> Option<&str> {
    msg.from
        .as_ref()
        .and_then(|user| user.language_code.as_deref())
}

/// Send a screen as a new message
pub async fn send_screen(bot: &Bot, chat_id: ChatId, screen: &Screen) -> Result<()> {
    let request = bot.send_message(chat_id, screen.text.clone());
    match build_keyboard(&screen.keyboard) {
        Some(keyboard) => request.reply_markup(keyboard).await?,
        None => request.await?,
    };
    Ok(())
}

/// Handle `/start` and the diagnostic command
pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    controller: Arc<NavigationController>,
) -> Result<()> {
    let language_code = language_code(&msg);
    info!(chat_id = %msg.chat.id, command = ?cmd, "Received command");

    let screen = match cmd {
        Command::Start => controller.start(language_code).await,
        Command::TestDb => controller.diagnostics(language_code).await,
    };

    send_screen(&bot, msg.chat.id, &screen).await
}

/// Only private text messages get the `/start` hint; group chatter, media
/// and service messages are ignored
fn wants_hint(msg: &Message) -> bool {
    msg.chat.is_private() && msg.text().is_some()
}

/// Handle any other message: point the user at `/start`
pub async fn message_handler(
    bot: Bot,
    msg: Message,
    controller: Arc<NavigationController>,
) -> Result<()> {
    debug!(chat_id = %msg.chat.id, "Received non-command message");

    if !wants_hint(&msg) {
        return Ok(());
    }

    let screen = controller.hint(language_code(&msg));
    send_screen(&bot, msg.chat.id, &screen).await
}
