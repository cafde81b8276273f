use thiserror::Error;

#[derive(Error, Debug)]
pub enum NonceError {
    #[error("Nonce configuration error: {0}")]
    Configuration(String),

    #[error("Failed to write nonce markup: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL encoding error: {0}")]
    UrlEncoding(#[from] serde_urlencoded::ser::Error),
}

impl NonceError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        NonceError::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, NonceError>;
