//! Navigation controller
//!
//! Turns a trigger (`/start`, a decoded selection, the diagnostic command)
//! into the next [`Screen`]. The controller keeps no per-user state: the
//! selection carried by each callback is all it needs. Store faults and
//! malformed tokens become error screens, never errors.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::localization::LocalizationManager;
use crate::menu_model::{MenuModel, ResponseLookup};
use crate::selection::{Selection, SelectionError, SEPARATOR};
use crate::store_errors::StoreError;

/// Where the user ends up after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    Root,
    CategoryShown { category: String },
    ResponseShown { category: String, function: String },
    /// Menu dismissed; the transport removes the message
    Closed,
    /// An error message replaced the expected screen
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub selection: Selection,
}

/// Rendered output of a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub state: NavState,
    pub text: String,
    pub keyboard: Vec<Vec<Button>>,
}

impl Screen {
    fn text_only(state: NavState, text: String) -> Self {
        Self {
            state,
            text,
            keyboard: Vec::new(),
        }
    }

    /// Every button on the screen, row by row
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.keyboard.iter().flatten()
    }
}

/// Failure while producing a screen
#[derive(Debug)]
enum NavigationError {
    Selection(SelectionError),
    Store(StoreError),
}

impl std::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavigationError::Selection(e) => write!(f, "{e}"),
            NavigationError::Store(e) => write!(f, "{e}"),
        }
    }
}

pub struct NavigationController {
    menu: MenuModel,
    i18n: Arc<LocalizationManager>,
    columns: usize,
}

impl NavigationController {
    /// `columns` is the number of buttons per keyboard row (at least 1)
    pub fn new(menu: MenuModel, i18n: Arc<LocalizationManager>, columns: usize) -> Self {
        Self {
            menu,
            i18n,
            columns: columns.max(1),
        }
    }

    /// `/start`: the category list
    pub async fn start(&self, language_code: Option<&str>) -> Screen {
        match self.menu.categories().await {
            Ok(categories) => self.render_root(categories, language_code),
            Err(e) => self.error_screen(NavigationError::Store(e), language_code),
        }
    }

    /// Decode a callback token and apply it
    pub async fn select(&self, token: &str, language_code: Option<&str>) -> Screen {
        match Selection::parse(token) {
            Ok(selection) => self.navigate(&selection, language_code).await,
            Err(e) => {
                warn!(token, error = %e, "Malformed selection token");
                self.error_screen(NavigationError::Selection(e), language_code)
            }
        }
    }

    pub async fn navigate(&self, selection: &Selection, language_code: Option<&str>) -> Screen {
        match selection {
            Selection::Root => self.start(language_code).await,
            Selection::Close => Screen::text_only(NavState::Closed, String::new()),
            Selection::Category(category) => self.show_category(category, language_code).await,
            Selection::Function { category, function } => {
                self.show_response(category, function, language_code).await
            }
        }
    }

    /// Diagnostic command: list top-level collections
    pub async fn diagnostics(&self, language_code: Option<&str>) -> Screen {
        match self.menu.collections().await {
            Ok(collections) if collections.is_empty() => Screen::text_only(
                NavState::Root,
                self.i18n.t("diagnostics-empty", language_code),
            ),
            Ok(collections) => Screen::text_only(
                NavState::Root,
                self.i18n.t_args(
                    "diagnostics-connected",
                    &[("collections", collections.join(", ").as_str())],
                    language_code,
                ),
            ),
            Err(e) => {
                error!(error = %e, "Response store connectivity check failed");
                Screen::text_only(
                    NavState::Failed,
                    self.i18n.t_args(
                        "diagnostics-failed",
                        &[("error", e.to_string().as_str())],
                        language_code,
                    ),
                )
            }
        }
    }

    /// Reply to free text outside the menu
    pub fn hint(&self, language_code: Option<&str>) -> Screen {
        Screen::text_only(NavState::Root, self.i18n.t("hint-use-start", language_code))
    }

    fn render_root(&self, categories: Vec<String>, language_code: Option<&str>) -> Screen {
        let buttons: Vec<Button> = categories
            .into_iter()
            .filter(|category| {
                if category.contains(SEPARATOR) {
                    warn!(category = %category, "Category id contains the selection separator, skipping");
                    return false;
                }
                offerable(Selection::category(category.as_str()))
            })
            .map(|category| Button {
                selection: Selection::Category(category.clone()),
                label: category,
            })
            .collect();
        info!(count = buttons.len(), "Rendering category menu");

        if buttons.is_empty() {
            return Screen::text_only(
                NavState::Root,
                self.i18n.t("menu-no-categories", language_code),
            );
        }

        let mut keyboard = self.layout(buttons);
        keyboard.push(vec![self.close_button(language_code)]);

        Screen {
            state: NavState::Root,
            text: self.i18n.t("menu-choose-category", language_code),
            keyboard,
        }
    }

    async fn show_category(&self, category: &str, language_code: Option<&str>) -> Screen {
        let functions = match self.menu.functions_of(category).await {
            Ok(functions) => functions,
            Err(e) => return self.error_screen(NavigationError::Store(e), language_code),
        };

        let buttons: Vec<Button> = functions
            .into_iter()
            .map(|function| Button {
                selection: Selection::function(category, function.as_str()),
                label: function,
            })
            .filter(|button| offerable(button.selection.clone()))
            .collect();
        info!(category, count = buttons.len(), "Rendering function menu");

        let state = NavState::CategoryShown {
            category: category.to_string(),
        };
        let controls = vec![
            Button {
                label: self.i18n.t("menu-back", language_code),
                selection: Selection::Root,
            },
            self.close_button(language_code),
        ];

        if buttons.is_empty() {
            return Screen {
                state,
                text: self.i18n.t("menu-no-functions", language_code),
                keyboard: vec![controls],
            };
        }

        let mut keyboard = self.layout(buttons);
        keyboard.push(controls);

        Screen {
            state,
            text: self
                .i18n
                .t_args("menu-choose-function", &[("category", category)], language_code),
            keyboard,
        }
    }

    fn close_button(&self, language_code: Option<&str>) -> Button {
        Button {
            label: self.i18n.t("menu-close", language_code),
            selection: Selection::Close,
        }
    }

    async fn show_response(
        &self,
        category: &str,
        function: &str,
        language_code: Option<&str>,
    ) -> Screen {
        let lookup = match self.menu.response_of(category, function).await {
            Ok(lookup) => lookup,
            Err(e) => return self.error_screen(NavigationError::Store(e), language_code),
        };

        let text = match lookup {
            // Telegram refuses empty message text
            ResponseLookup::Found(text) if !text.trim().is_empty() => text,
            ResponseLookup::Found(_) | ResponseLookup::MissingField => {
                warn!(category, function, "No response configured");
                self.i18n.t("response-missing-field", language_code)
            }
            ResponseLookup::NotFound => {
                warn!(category, function, "Function document not found");
                self.i18n.t("response-function-not-found", language_code)
            }
        };

        Screen {
            state: NavState::ResponseShown {
                category: category.to_string(),
                function: function.to_string(),
            },
            text,
            keyboard: vec![vec![Button {
                label: self.i18n.t("menu-back", language_code),
                selection: Selection::category(category),
            }]],
        }
    }

    fn error_screen(&self, error: NavigationError, language_code: Option<&str>) -> Screen {
        error!(error = %error, "Navigation failed");
        Screen::text_only(
            NavState::Failed,
            self.i18n
                .t_args("error-occurred", &[("error", error.to_string().as_str())], language_code),
        )
    }

    fn layout(&self, buttons: Vec<Button>) -> Vec<Vec<Button>> {
        buttons
            .chunks(self.columns)
            .map(|row| row.to_vec())
            .collect()
    }
}

/// Entries whose token would exceed Telegram's callback limit are left out
fn offerable(selection: Selection) -> bool {
    if selection.fits_callback_data() {
        return true;
    }
    warn!(token = %selection.encode(), "Selection token too long for callback data, skipping");
    false
}
