//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `message_handler`: Handles `/start`, the diagnostic command and free text
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Turns controller screens into inline keyboards

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::{command_handler, message_handler, Command};

pub use ui_builder::build_keyboard;
