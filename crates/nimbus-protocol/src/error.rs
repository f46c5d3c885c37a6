//! Error types for Data Connect operations.

use thiserror::Error;

/// Errors raised while executing an operation or publishing its result.
///
/// Transport, decode and server failures come from the RPC client and are
/// propagated unchanged to the caller. The type is `Clone` so observable
/// query references can keep the last error around for their observers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataConnectError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("server error [{code}]: {message}")]
    Server { code: String, message: String },
    #[error("encode error: {0}")]
    Encode(String),
    #[error("main context is closed")]
    MainContextClosed,
    #[error("publisher panicked: {0}")]
    PublisherPanicked(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl DataConnectError {
    /// Server-reported failure whose message is the code itself.
    pub fn server(code: impl Into<String>) -> Self {
        let code = code.into();
        Self::Server {
            message: code.clone(),
            code,
        }
    }

    pub fn server_with_message(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Server {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Short, stable name of the variant for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Server { .. } => "server",
            Self::Encode(_) => "encode",
            Self::MainContextClosed => "main_context_closed",
            Self::PublisherPanicked(_) => "publisher_panicked",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

impl From<serde_json::Error> for DataConnectError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

/// Convenience result type for Data Connect operations.
pub type DataConnectResult<T> = Result<T, DataConnectError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_shorthand_uses_code_as_message() {
        let err = DataConnectError::server("rate_limited");
        assert_eq!(
            err,
            DataConnectError::Server {
                code: "rate_limited".into(),
                message: "rate_limited".into(),
            }
        );
        assert_eq!(err.to_string(), "server error [rate_limited]: rate_limited");
        assert_eq!(err.kind(), "server");
    }

    #[test]
    fn json_errors_map_to_decode() {
        let err: DataConnectError = serde_json::from_str::<u32>("\"nope\"")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "decode");
    }
}
