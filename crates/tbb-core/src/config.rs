use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

/// Typed configuration, loaded once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    // Spreadsheet source
    pub credentials_path: PathBuf,
    pub spreadsheet_id: String,
    pub worksheet_name: String,
    pub sheet_range: String,

    // Runtime constants
    pub fetch_timeout: Duration,
    pub message_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let telegram_bot_token = env_str("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let spreadsheet_id = env_str("SPREADSHEET_ID").unwrap_or_default();
        if spreadsheet_id.trim().is_empty() {
            return Err(Error::Config(
                "SPREADSHEET_ID environment variable is required".to_string(),
            ));
        }

        // The process cannot serve anything without sheet credentials, so a
        // missing key file stops startup rather than failing per request.
        let credentials_path = env_path("GOOGLE_CREDENTIALS_PATH")
            .unwrap_or_else(|| PathBuf::from("credentials.json"));
        if !credentials_path.is_file() {
            return Err(Error::Auth(format!(
                "credentials file not found: {}",
                credentials_path.display()
            )));
        }

        let worksheet_name = env_str("WORKSHEET_NAME").unwrap_or_else(|| "Main".to_string());
        let sheet_range = env_str("SHEET_RANGE").unwrap_or_else(|| "E:G".to_string());

        let fetch_timeout = Duration::from_millis(env_u64("FETCH_TIMEOUT_MS").unwrap_or(30_000));
        let message_limit = env_usize("MESSAGE_LIMIT").unwrap_or(4096);

        Ok(Self {
            telegram_bot_token,
            credentials_path,
            spreadsheet_id,
            worksheet_name,
            sheet_range,
            fetch_timeout,
            message_limit,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}
