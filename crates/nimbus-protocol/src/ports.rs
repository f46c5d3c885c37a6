//! Boundary ports for the query lifecycle.
//!
//! - [`RpcClient`] is the only way a query reaches the backend. It is
//!   object-safe (`async-trait`) and returns the raw JSON payload; typed
//!   decoding lives in [`RpcClientExt`].
//! - [`QueryPublisher`] is the strategy by which a completed operation
//!   becomes visible to observers. A query reference cannot be built
//!   without one.

use std::future::Future;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DataConnectError, DataConnectResult};
use crate::request::QueryRequest;
use crate::result::OperationResult;

#[async_trait]
pub trait RpcClient: Send + Sync {
    async fn execute_query(&self, request: &QueryRequest)
    -> DataConnectResult<OperationResult<Value>>;
}

/// Typed execution on top of any [`RpcClient`].
pub trait RpcClientExt: RpcClient {
    /// Execute `request` and decode the payload as `T`.
    ///
    /// A payload that does not match `T` fails with [`DataConnectError::Decode`].
    fn execute_query_as<'a, T>(
        &'a self,
        request: &'a QueryRequest,
    ) -> impl Future<Output = DataConnectResult<OperationResult<T>>> + Send + 'a
    where
        T: DeserializeOwned + Send + 'a,
    {
        async move { self.execute_query(request).await?.decode() }
    }
}

impl<C: RpcClient + ?Sized> RpcClientExt for C {}

/// Publish strategy for one query reference.
///
/// Both methods are invoked on the main context, one at a time.
pub trait QueryPublisher<T>: Send + Sync + 'static {
    /// A fetch succeeded: store `data` and clear any previous error.
    fn publish(&self, data: T);

    /// A fetch failed: record `error`, keep previously published data.
    fn publish_error(&self, error: &DataConnectError);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    struct FixedClient(Value);

    #[async_trait]
    impl RpcClient for FixedClient {
        async fn execute_query(
            &self,
            _request: &QueryRequest,
        ) -> DataConnectResult<OperationResult<Value>> {
            Ok(OperationResult::new(self.0.clone()))
        }
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct User {
        name: String,
    }

    #[tokio::test]
    async fn typed_execution_decodes_payload() {
        let client = FixedClient(json!({"name": "Ada"}));
        let request = QueryRequest::new("GetUser");
        let result = client.execute_query_as::<User>(&request).await.unwrap();
        assert_eq!(result.data.name, "Ada");
    }

    #[tokio::test]
    async fn typed_execution_through_trait_object() {
        let client: Box<dyn RpcClient> = Box::new(FixedClient(json!([1, 2])));
        let request = QueryRequest::new("ListIds");
        let err = client
            .execute_query_as::<User>(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, DataConnectError::Decode(_)));
    }
}
