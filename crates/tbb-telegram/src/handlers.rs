//! Command handlers: `/start` (welcome + keyboard) and `/balance` (one
//! fetch-format-reply cycle).
//!
//! Handlers hold no state between invocations; concurrent commands from
//! different chats run independently.

use std::sync::Arc;

use chrono::Local;
use teloxide::prelude::*;

use tbb_core::report;

use crate::balance_keyboard;
use crate::router::AppState;

const WELCOME_TEXT: &str = "Hi! Tap the button below to see current balances.";

fn error_reply(e: &tbb_core::Error) -> String {
    format!("An error occurred: {e}. Please try again later.")
}

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    if !text.starts_with('/') {
        return Ok(());
    }

    let (cmd, _args) = parse_command(text);
    match cmd.as_str() {
        "start" => handle_start(bot, msg).await,
        "balance" => handle_balance(bot, msg, state).await,
        _ => Ok(()),
    }
}

async fn handle_start(bot: Bot, msg: Message) -> ResponseResult<()> {
    let _ = bot
        .send_message(msg.chat.id, WELCOME_TEXT)
        .reply_markup(balance_keyboard())
        .disable_notification(true)
        .await;
    Ok(())
}

async fn handle_balance(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let pages =
        match report::balance_report(state.sheets.as_ref(), &state.cfg, Local::now()).await {
            Ok(pages) => pages,
            Err(e) => {
                tracing::error!(chat_id = msg.chat.id.0, error = %e, "balance command failed");
                let _ = bot.send_message(msg.chat.id, error_reply(&e)).await;
                return Ok(());
            }
        };

    for page in pages {
        tracing::info!(chars = page.chars().count(), "sending report page");
        let _ = bot
            .send_message(msg.chat.id, page)
            .reply_markup(balance_keyboard())
            .disable_notification(true)
            .await;
    }

    Ok(())
}
