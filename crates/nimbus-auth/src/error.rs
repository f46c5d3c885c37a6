use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credential is for provider {actual}, expected {expected}")]
    ProviderMismatch { expected: String, actual: String },
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuthResult<T> = Result<T, AuthError>;
