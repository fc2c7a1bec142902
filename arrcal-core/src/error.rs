use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum ArrcalError {
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("instance not configured: {0}")]
    InstanceNotConfigured(String),

    #[error("{instance} returned {status}: {message}")]
    Remote {
        instance: String,
        status: u16,
        message: String,
    },

    #[error("invalid date range: {end} is before {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("fetch cancelled")]
    Cancelled,

    #[error("source error: {0}")]
    Source(String),
}

impl ArrcalError {
    /// Whether this error is a benign abort rather than a real failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, ArrcalError>;
