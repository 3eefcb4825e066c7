//! Telegram adapter (teloxide).
//!
//! Routes bot commands into the core fetch-and-format pipeline and sends the
//! resulting report pages back as silent messages.

use teloxide::types::{KeyboardButton, KeyboardMarkup};

pub mod handlers;
pub mod router;

/// Persistent one-button reply keyboard offering the balance command.
pub fn balance_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new("/balance")]]).resize_keyboard(true)
}
