use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type GenAiResult<T> = Result<T, GenAiError>;
