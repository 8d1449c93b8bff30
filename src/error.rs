use thiserror::Error;

#[derive(Error, Debug)]
pub enum DblError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DBL API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unauthorized: the DBL token was rejected")]
    Unauthorized,

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Rate limit exceeded, try again later")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Unexpected response from DBL: {reason}")]
    WeirdResponse { reason: String },

    #[error("Route {route} requires formatting arguments")]
    RequireFormatting { route: String },

    #[error("Invalid parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("Bot user ID is not known yet, wait until the bot is ready")]
    BotNotReady,

    #[error("Key not found in cache: {key}")]
    KeyNotFound { key: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, DblError>;
