#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Non-2xx answer. `message` is the server's own text when it sent one.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("DateTime string is required")]
    MissingDateTime,

    #[error("Invalid date format: {0}")]
    InvalidDateTime(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
