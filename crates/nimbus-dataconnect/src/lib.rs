//! # nimbus-dataconnect — query references for Data Connect
//!
//! A query reference owns one [`QueryRequest`](nimbus_protocol::QueryRequest)
//! and a shared [`RpcClient`](nimbus_protocol::RpcClient). `execute` fetches
//! once and returns the result; `subscribe` fetches once and leaves the result
//! to observers. Either way the result is published on the [`MainContext`]
//! before the call returns.
//!
//! - [`context`] — MainContext serial executor
//! - [`query`] — QueryRef, generic over its publisher
//! - [`published`] — watch-channel backed PublishedQueryRef
//! - [`observed`] — callback backed ObservedQueryRef
//! - [`memory`] — scripted InMemoryRpcClient
//! - [`client`] — DataConnect facade and builder

pub mod client;
pub mod context;
pub mod memory;
pub mod observed;
pub mod published;
pub mod query;
pub mod state;

pub use client::{DataConnect, DataConnectBuilder};
pub use context::{DEFAULT_CONTEXT_BUFFER, MainContext};
pub use memory::InMemoryRpcClient;
pub use observed::{ObservedQueryRef, ObservedState, ObserverId};
pub use published::{PublishedQueryRef, PublishedState};
pub use query::QueryRef;
pub use state::{ObservableQuery, QueryState};
