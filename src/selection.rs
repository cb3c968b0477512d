//! Navigation selections and their callback-token encoding.
//!
//! Inside the crate a selection is always a [`Selection`] value. The string
//! form only exists at the Telegram boundary, where it travels as inline
//! button callback data.
//!
//! Token format (separator `|`):
//! - `Category(c)` is the bare category id
//! - `Function(c, f)` is `c|f`, split on the first separator when parsed
//! - controls have an empty category part: `|back`, `|close`

use std::fmt;

pub const SEPARATOR: char = '|';

/// Telegram rejects callback data longer than this many bytes
pub const MAX_TOKEN_BYTES: usize = 64;

const BACK_CONTROL: &str = "back";
const CLOSE_CONTROL: &str = "close";

/// What the user picked on an inline keyboard
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// Back to the category list
    Root,
    Category(String),
    Function { category: String, function: String },
    /// Dismiss the menu message
    Close,
}

/// A callback token that does not decode to a [`Selection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    Empty,
    UnknownControl(String),
    MissingFunction(String),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::Empty => write!(f, "empty selection token"),
            SelectionError::UnknownControl(word) => {
                write!(f, "unknown menu control {word:?}")
            }
            SelectionError::MissingFunction(token) => {
                write!(f, "selection {token:?} names no function")
            }
        }
    }
}

impl std::error::Error for SelectionError {}

impl Selection {
    pub fn category(id: impl Into<String>) -> Self {
        Selection::Category(id.into())
    }

    pub fn function(category: impl Into<String>, function: impl Into<String>) -> Self {
        Selection::Function {
            category: category.into(),
            function: function.into(),
        }
    }

    /// Callback token for this selection
    pub fn encode(&self) -> String {
        match self {
            Selection::Root => format!("{SEPARATOR}{BACK_CONTROL}"),
            Selection::Close => format!("{SEPARATOR}{CLOSE_CONTROL}"),
            Selection::Category(category) => category.clone(),
            Selection::Function { category, function } => {
                format!("{category}{SEPARATOR}{function}")
            }
        }
    }

    /// Whether the encoded token fits in Telegram callback data
    pub fn fits_callback_data(&self) -> bool {
        self.encode().len() <= MAX_TOKEN_BYTES
    }

    pub fn parse(token: &str) -> Result<Self, SelectionError> {
        if token.is_empty() {
            return Err(SelectionError::Empty);
        }

        match token.split_once(SEPARATOR) {
            None => Ok(Selection::Category(token.to_string())),
            Some(("", BACK_CONTROL)) => Ok(Selection::Root),
            Some(("", CLOSE_CONTROL)) => Ok(Selection::Close),
            Some(("", other)) => Err(SelectionError::UnknownControl(other.to_string())),
            Some((_, "")) => Err(SelectionError::MissingFunction(token.to_string())),
            Some((category, function)) => Ok(Selection::function(category, function)),
        }
    }
}

/// Why a category/function pair cannot be offered in a menu
pub fn validate_identifiers(category: &str, function: &str) -> Result<(), String> {
    if category.trim().is_empty() {
        return Err("category is empty".to_string());
    }
    if function.trim().is_empty() {
        return Err("function is empty".to_string());
    }
    if category.contains(SEPARATOR) {
        return Err(format!(
            "category {category:?} contains the reserved separator '{SEPARATOR}'"
        ));
    }
    let token = Selection::function(category, function).encode();
    if token.len() > MAX_TOKEN_BYTES {
        return Err(format!(
            "selection token is {} bytes, Telegram allows at most {MAX_TOKEN_BYTES}",
            token.len()
        ));
    }
    Ok(())
}
