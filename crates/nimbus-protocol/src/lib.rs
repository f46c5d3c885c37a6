//! # nimbus-protocol — Data Connect contract types
//!
//! This crate defines the request/result shapes, the error taxonomy, and the
//! port traits that the query lifecycle in `nimbus-dataconnect` is built on.
//!
//! It carries no runtime dependency (no tokio) so transports and hosts can
//! implement the ports without pulling in the executor.
//!
//! ## Module Overview
//!
//! - [`request`] — OperationRequest trait and the concrete QueryRequest
//! - [`result`] — OperationResult wrapper and typed decoding
//! - [`config`] — ConnectorConfig (service / location / connector)
//! - [`ports`] — RpcClient boundary and the QueryPublisher capability
//! - [`error`] — DataConnectError, DataConnectResult

pub mod config;
pub mod error;
pub mod ports;
pub mod request;
pub mod result;

pub use config::ConnectorConfig;
pub use error::{DataConnectError, DataConnectResult};
pub use ports::{QueryPublisher, RpcClient, RpcClientExt};
pub use request::{OperationRequest, QueryRequest};
pub use result::OperationResult;
