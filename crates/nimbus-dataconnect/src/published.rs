//! Published-property query reference.
//!
//! The latest state sits in a `tokio::sync::watch` channel. Observers either
//! read the current value or hold a receiver and wait for changes, the way a
//! published property is bound in reactive UI code.

use std::sync::Arc;

use nimbus_protocol::{
    DataConnectError, DataConnectResult, OperationResult, QueryPublisher, QueryRequest, RpcClient,
};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;
use uuid::Uuid;

use crate::context::MainContext;
use crate::query::QueryRef;
use crate::state::{ObservableQuery, QueryState};

/// Publisher backed by a watch channel.
#[derive(Debug)]
pub struct PublishedState<T> {
    sender: watch::Sender<QueryState<T>>,
}

impl<T> Default for PublishedState<T> {
    fn default() -> Self {
        let (sender, _) = watch::channel(QueryState::default());
        Self { sender }
    }
}

impl<T> QueryPublisher<T> for PublishedState<T>
where
    T: Send + Sync + 'static,
{
    fn publish(&self, data: T) {
        self.sender.send_modify(|state| state.apply_data(data));
        debug!(receivers = self.sender.receiver_count(), "published query data");
    }

    fn publish_error(&self, error: &DataConnectError) {
        self.sender
            .send_modify(|state| state.apply_error(error.clone()));
    }
}

#[derive(Clone)]
pub struct PublishedQueryRef<T> {
    query: QueryRef<T, PublishedState<T>>,
}

impl<T> PublishedQueryRef<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(request: QueryRequest, client: Arc<dyn RpcClient>, context: MainContext) -> Self {
        Self {
            query: QueryRef::new(
                request,
                client,
                Arc::new(PublishedState::default()),
                context,
            ),
        }
    }

    pub fn id(&self) -> Uuid {
        self.query.id()
    }

    pub fn request(&self) -> &QueryRequest {
        self.query.request()
    }

    pub async fn execute(&self) -> DataConnectResult<OperationResult<T>> {
        self.query.execute().await
    }

    pub async fn subscribe(&self) -> DataConnectResult<()> {
        self.query.subscribe().await
    }

    /// Receiver that sees the current state and every later publish.
    pub fn watch(&self) -> watch::Receiver<QueryState<T>> {
        self.query.publisher().sender.subscribe()
    }

    /// Stream of states published after this call.
    pub fn updates(&self) -> WatchStream<QueryState<T>> {
        WatchStream::from_changes(self.watch())
    }
}

impl<T> ObservableQuery<T> for PublishedQueryRef<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn state(&self) -> QueryState<T> {
        self.query.publisher().sender.borrow().clone()
    }

    fn data(&self) -> Option<T> {
        self.query.publisher().sender.borrow().data.clone()
    }

    fn last_error(&self) -> Option<DataConnectError> {
        self.query.publisher().sender.borrow().last_error.clone()
    }
}
