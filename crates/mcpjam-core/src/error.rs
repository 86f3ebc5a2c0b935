use thiserror::Error;

#[derive(Debug, Error)]
pub enum McpJamError {
    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Caller input rejected before anything reached the queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown operation: {0}")]
    UnknownOp(String),

    #[error("Invalid arguments for {op}: {message}")]
    InvalidParams { op: &'static str, message: String },
}

impl ValidationError {
    pub fn invalid(op: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParams {
            op,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, McpJamError>;
