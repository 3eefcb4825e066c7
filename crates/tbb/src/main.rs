use std::sync::Arc;

use tbb_core::{config::Config, ports::SheetSource};
use tbb_sheets::{GoogleSheetsClient, ServiceAccountKey};

#[tokio::main]
async fn main() -> Result<(), tbb_core::Error> {
    tbb_core::logging::init("tbb")?;

    let cfg = Arc::new(Config::load()?);

    let key = ServiceAccountKey::from_file(&cfg.credentials_path)?;
    let sheets: Arc<dyn SheetSource> = Arc::new(GoogleSheetsClient::new(key, cfg.fetch_timeout)?);

    tbb_telegram::router::run_polling(cfg, sheets)
        .await
        .map_err(|e| tbb_core::Error::Transport(format!("telegram bot failed: {e}")))?;

    Ok(())
}
