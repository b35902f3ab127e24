use thiserror::Error;

/// Errors that can occur while loading, checking or repairing a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// I/O error while touching a catalog document or image directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be parsed or serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed filename or document shape
    #[error("Invalid format: {0}")]
    Format(String),

    /// Caller-supplied rules or settings are inconsistent
    #[error("Config error: {0}")]
    Config(String),

    /// Network failure talking to a remote image host or provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// A generated picture could not be decoded or re-encoded
    #[error("Image error: {0}")]
    Image(String),
}

impl CatalogError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }
}
