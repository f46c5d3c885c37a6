//! Base query reference: one logical query, its RPC client, and a publisher.

use std::marker::PhantomData;
use std::sync::Arc;

use nimbus_protocol::{
    DataConnectResult, OperationRequest, OperationResult, QueryPublisher, QueryRequest,
    RpcClient, RpcClientExt,
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::context::MainContext;

/// Drives execution of one query request and hands results to `P`.
///
/// The reference holds no result state of its own; whatever observers read
/// lives in the publisher. It never changes request and is reusable for its
/// whole lifetime: every call goes back to the backend.
pub struct QueryRef<T, P> {
    id: Uuid,
    request: QueryRequest,
    client: Arc<dyn RpcClient>,
    publisher: Arc<P>,
    context: MainContext,
    _result: PhantomData<fn() -> T>,
}

impl<T, P> Clone for QueryRef<T, P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            request: self.request.clone(),
            client: Arc::clone(&self.client),
            publisher: Arc::clone(&self.publisher),
            context: self.context.clone(),
            _result: PhantomData,
        }
    }
}

impl<T, P> QueryRef<T, P>
where
    T: DeserializeOwned + Clone + Send + 'static,
    P: QueryPublisher<T>,
{
    pub fn new(
        request: QueryRequest,
        client: Arc<dyn RpcClient>,
        publisher: Arc<P>,
        context: MainContext,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            client,
            publisher,
            context,
            _result: PhantomData,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &QueryRequest {
        &self.request
    }

    pub fn publisher(&self) -> &Arc<P> {
        &self.publisher
    }

    pub fn main_context(&self) -> &MainContext {
        &self.context
    }

    /// Fetch the latest result once, publish it, and return it.
    #[instrument(
        skip(self),
        fields(query_id = %self.id, operation = %self.request.operation_name())
    )]
    pub async fn execute(&self) -> DataConnectResult<OperationResult<T>> {
        let data = self.reload_results().await?;
        Ok(OperationResult::new(data))
    }

    /// Start producing updates for observers.
    ///
    /// Currently this is exactly one fetch; the result is only visible
    /// through the publisher.
    #[instrument(
        skip(self),
        fields(query_id = %self.id, operation = %self.request.operation_name())
    )]
    pub async fn subscribe(&self) -> DataConnectResult<()> {
        self.reload_results().await.map(|_| ())
    }

    async fn reload_results(&self) -> DataConnectResult<T> {
        match self.client.execute_query_as::<T>(&self.request).await {
            Ok(result) => {
                let data = result.into_data();
                let publisher = Arc::clone(&self.publisher);
                let published = data.clone();
                self.context
                    .run(move || publisher.publish(published))
                    .await?;
                debug!("query result published");
                Ok(data)
            }
            Err(error) => {
                warn!(error_kind = error.kind(), %error, "query fetch failed");
                let publisher = Arc::clone(&self.publisher);
                let published = error.clone();
                if let Err(context_error) = self
                    .context
                    .run(move || publisher.publish_error(&published))
                    .await
                {
                    warn!(%context_error, "query error not published");
                }
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use nimbus_protocol::DataConnectError;
    use parking_lot::Mutex;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::memory::InMemoryRpcClient;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct User {
        name: String,
    }

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<User>>,
        errors: Mutex<Vec<DataConnectError>>,
        off_context: AtomicUsize,
        context: Mutex<Option<MainContext>>,
    }

    impl RecordingPublisher {
        fn check_context(&self) {
            if let Some(context) = self.context.lock().as_ref()
                && !context.is_current()
            {
                self.off_context.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    impl QueryPublisher<User> for RecordingPublisher {
        fn publish(&self, data: User) {
            self.check_context();
            self.published.lock().push(data);
        }

        fn publish_error(&self, error: &DataConnectError) {
            self.check_context();
            self.errors.lock().push(error.clone());
        }
    }

    fn get_user_request() -> QueryRequest {
        QueryRequest::new("GetUser").with_variables_value(json!({"id": "42"}))
    }

    #[tokio::test]
    async fn execute_returns_and_publishes_decoded_data() {
        let client = Arc::new(InMemoryRpcClient::new());
        client.stub_data("GetUser", json!({"name": "Ada"}));
        let context = MainContext::spawn(8).unwrap();
        let publisher = Arc::new(RecordingPublisher::default());
        *publisher.context.lock() = Some(context.clone());

        let query = QueryRef::<User, _>::new(
            get_user_request(),
            client.clone(),
            publisher.clone(),
            context,
        );
        let result = query.execute().await.unwrap();

        assert_eq!(result.data, User { name: "Ada".into() });
        assert_eq!(*publisher.published.lock(), vec![User { name: "Ada".into() }]);
        assert_eq!(publisher.off_context.load(Ordering::SeqCst), 0);
        assert_eq!(client.requests(), vec![get_user_request()]);
    }

    #[tokio::test]
    async fn failures_propagate_unchanged_and_publish_error() {
        let client = Arc::new(InMemoryRpcClient::new());
        client.stub_error("GetUser", DataConnectError::server("rate_limited"));
        let context = MainContext::spawn(8).unwrap();
        let publisher = Arc::new(RecordingPublisher::default());
        *publisher.context.lock() = Some(context.clone());

        let query = QueryRef::<User, _>::new(
            get_user_request(),
            client,
            publisher.clone(),
            context,
        );
        let err = query.execute().await.unwrap_err();

        assert_eq!(err, DataConnectError::server("rate_limited"));
        assert!(publisher.published.lock().is_empty());
        assert_eq!(*publisher.errors.lock(), vec![err]);
        assert_eq!(publisher.off_context.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn decode_failures_surface_as_decode_errors() {
        let client = Arc::new(InMemoryRpcClient::new());
        client.stub_data("GetUser", json!({"fullName": 1}));
        let publisher = Arc::new(RecordingPublisher::default());

        let query = QueryRef::<User, _>::new(
            get_user_request(),
            client,
            publisher.clone(),
            MainContext::inline(),
        );
        let err = query.execute().await.unwrap_err();
        assert!(matches!(err, DataConnectError::Decode(_)));
        assert_eq!(publisher.errors.lock().len(), 1);
    }

    #[tokio::test]
    async fn subscribe_is_exactly_one_call() {
        let client = Arc::new(InMemoryRpcClient::new());
        client.stub_data("GetUser", json!({"name": "Ada"}));
        let publisher = Arc::new(RecordingPublisher::default());
        let query = QueryRef::<User, _>::new(
            get_user_request(),
            client.clone(),
            publisher.clone(),
            MainContext::inline(),
        );

        query.subscribe().await.unwrap();
        assert_eq!(client.call_count(), 1);
        query.subscribe().await.unwrap();
        assert_eq!(client.call_count(), 2);
        assert_eq!(publisher.published.lock().len(), 2);
    }

    #[tokio::test]
    async fn overlapping_subscribes_are_not_deduplicated() {
        let client = Arc::new(InMemoryRpcClient::new().with_latency(Duration::from_millis(50)));
        client.stub_data("GetUser", json!({"name": "Ada"}));
        let publisher = Arc::new(RecordingPublisher::default());
        let query = QueryRef::<User, _>::new(
            get_user_request(),
            client.clone(),
            publisher.clone(),
            MainContext::spawn(8).unwrap(),
        );

        let all_in_flight = async {
            while client.call_count() < 3 {
                tokio::task::yield_now().await;
            }
            publisher.published.lock().len()
        };
        let (a, b, c, published_early) = tokio::join!(
            query.subscribe(),
            query.subscribe(),
            query.subscribe(),
            all_in_flight
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(published_early, 0);
        assert_eq!(client.call_count(), 3);
        assert_eq!(publisher.published.lock().len(), 3);
    }

    #[tokio::test]
    async fn closed_context_fails_success_path() {
        let client = Arc::new(InMemoryRpcClient::new());
        client.stub_data("GetUser", json!({"name": "Ada"}));
        let context = MainContext::spawn(8).unwrap();
        context.shutdown().await;
        let publisher = Arc::new(RecordingPublisher::default());

        let query = QueryRef::<User, _>::new(
            get_user_request(),
            client,
            publisher.clone(),
            context,
        );
        let err = query.execute().await.unwrap_err();
        assert_eq!(err, DataConnectError::MainContextClosed);
        assert!(publisher.published.lock().is_empty());
    }

    #[tokio::test]
    async fn closed_context_keeps_original_fetch_error() {
        let client = Arc::new(InMemoryRpcClient::new());
        client.stub_error("GetUser", DataConnectError::Transport("offline".into()));
        let context = MainContext::spawn(8).unwrap();
        context.shutdown().await;

        let query = QueryRef::<User, _>::new(
            get_user_request(),
            client,
            Arc::new(RecordingPublisher::default()),
            context,
        );
        let err = query.execute().await.unwrap_err();
        assert_eq!(err, DataConnectError::Transport("offline".into()));
    }
}
