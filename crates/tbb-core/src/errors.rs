/// Core error type for the balance bot.
///
/// Adapter crates map their specific failures into this type so the request
/// handler can pick the user-facing reply consistently. Startup errors
/// (`Config`, `Auth` from credential loading) are fatal; everything else is
/// surfaced per request and the process keeps polling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
