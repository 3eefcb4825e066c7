use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};

use tbb_core::{config::Config, ports::SheetSource};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub sheets: Arc<dyn SheetSource>,
}

pub async fn run_polling(cfg: Arc<Config>, sheets: Arc<dyn SheetSource>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!("balance bot started: @{}", me.username());
    }
    tracing::info!(
        spreadsheet_id = %cfg.spreadsheet_id,
        worksheet = %cfg.worksheet_name,
        range = %cfg.sheet_range,
        "serving balances"
    );

    // Command menu shown by Telegram clients.
    let commands = vec![
        BotCommand::new("start", "Start the bot"),
        BotCommand::new("balance", "Show account balances"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        tracing::warn!(error = %e, "failed to register command menu");
    }

    let state = Arc::new(AppState { cfg, sheets });

    let handler =
        dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
