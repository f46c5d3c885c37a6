//! Structured-observation query reference.
//!
//! State lives behind a `parking_lot::RwLock` and observers register change
//! callbacks. Callbacks run on the main context right after each publish,
//! with a snapshot of the new state. Neither lock is held while they run, so
//! a callback may read the reference or register and remove observers.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use nimbus_protocol::{
    DataConnectError, DataConnectResult, OperationResult, QueryPublisher, QueryRequest, RpcClient,
};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::context::{MainContext, panic_message};
use crate::query::QueryRef;
use crate::state::{ObservableQuery, QueryState};

/// Identifier returned by [`ObservedQueryRef::observe`].
pub type ObserverId = u64;

type ObserverFn<T> = dyn Fn(&QueryState<T>) + Send + Sync;

pub struct ObservedState<T> {
    state: RwLock<QueryState<T>>,
    observers: Mutex<Vec<(ObserverId, Arc<ObserverFn<T>>)>>,
    next_id: AtomicU64,
}

impl<T> Default for ObservedState<T> {
    fn default() -> Self {
        Self {
            state: RwLock::new(QueryState::default()),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<T: Clone> ObservedState<T> {
    fn notify(&self) {
        let snapshot = self.state.read().clone();
        let observers: Vec<(ObserverId, Arc<ObserverFn<T>>)> = {
            let guard = self.observers.lock();
            guard.iter().map(|(id, cb)| (*id, Arc::clone(cb))).collect()
        };
        debug!(observers = observers.len(), "notifying query observers");
        for (id, observer) in observers {
            // One failing observer must not starve the rest or the context.
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer(&snapshot))) {
                warn!(
                    observer = id,
                    panic = %panic_message(&*payload),
                    "query observer panicked"
                );
            }
        }
    }
}

impl<T> QueryPublisher<T> for ObservedState<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn publish(&self, data: T) {
        self.state.write().apply_data(data);
        self.notify();
    }

    fn publish_error(&self, error: &DataConnectError) {
        self.state.write().apply_error(error.clone());
        self.notify();
    }
}

#[derive(Clone)]
pub struct ObservedQueryRef<T> {
    query: QueryRef<T, ObservedState<T>>,
}

impl<T> ObservedQueryRef<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(request: QueryRequest, client: Arc<dyn RpcClient>, context: MainContext) -> Self {
        Self {
            query: QueryRef::new(request, client, Arc::new(ObservedState::default()), context),
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

    /// Register `callback` to run after every publish.
    pub fn observe(
        &self,
        callback: impl Fn(&QueryState<T>) + Send + Sync + 'static,
    ) -> ObserverId {
        let publisher = self.query.publisher();
        let id = publisher.next_id.fetch_add(1, Ordering::Relaxed);
        publisher.observers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove an observer. Unknown ids are ignored.
    pub fn unobserve(&self, id: ObserverId) {
        self.query
            .publisher()
            .observers
            .lock()
            .retain(|(observer, _)| *observer != id);
    }

    pub fn observer_count(&self) -> usize {
        self.query.publisher().observers.lock().len()
    }
}

impl<T> ObservableQuery<T> for ObservedQueryRef<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn state(&self) -> QueryState<T> {
        self.query.publisher().state.read().clone()
    }
}
