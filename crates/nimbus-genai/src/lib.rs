//! # nimbus-genai — generative-AI request configuration
//!
//! - [`schema`] — Schema / DataType, the OpenAPI-style subset used for
//!   structured responses
//! - [`generation`] — GenerationConfig sampling and output options
//! - [`error`] — GenAiError, GenAiResult

pub mod error;
pub mod generation;
pub mod schema;

pub use error::{GenAiError, GenAiResult};
pub use generation::GenerationConfig;
pub use schema::{DataType, Schema};
