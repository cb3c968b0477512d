//! UI Builder module for creating keyboards from controller screens

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::navigation::Button;

/// Inline keyboard for a screen's button rows, `None` when there are no buttons
pub fn build_keyboard(rows: &[Vec<Button>]) -> Option<InlineKeyboardMarkup> {
    let rows: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .filter(|row| !row.is_empty())
        .map(|row| {
            row.iter()
                .map(|button| {
                    InlineKeyboardButton::callback(button.label.clone(), button.selection.encode())
                })
                .collect()
        })
        .collect();

    if rows.is_empty() {
        None
    } else {
        Some(InlineKeyboardMarkup::new(rows))
    }
}
