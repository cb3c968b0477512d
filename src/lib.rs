//! # Menu Bot
//!
//! A Telegram bot that walks users through a two-level menu of categories
//! and functions and answers with canned responses kept in a hierarchical
//! document store, plus the tooling that loads those responses.

pub mod bot;
pub mod bulk_loader;
pub mod config;
pub mod export;
pub mod localization;
pub mod menu_model;
pub mod navigation;
pub mod selection;
pub mod store;
pub mod store_errors;
