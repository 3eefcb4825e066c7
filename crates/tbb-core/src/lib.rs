//! Core domain + application logic for the spreadsheet balance bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / Google Sheets
//! live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod report;

pub use errors::{Error, Result};
