use thiserror::Error;

#[derive(Error, Debug)]
pub enum TapError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}) on {path}: {message}")]
    Api {
        status: u16,
        path: String,
        message: String,
    },

    #[error("Malformed {stream} payload: {source}")]
    Malformed {
        stream: &'static str,
        source: serde_json::Error,
    },

    #[error("Missing '{field}' in {stream} payload")]
    MissingField {
        stream: &'static str,
        field: &'static str,
    },

    #[error("Context is missing '{0}'")]
    MissingContext(String),

    #[error("Missing personal access token")]
    MissingToken,

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TapError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TapError::Http(e) => e.is_timeout() || e.is_connect(),
            TapError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
