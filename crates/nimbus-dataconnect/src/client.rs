use std::sync::Arc;

use nimbus_protocol::{
    ConnectorConfig, DataConnectError, DataConnectResult, OperationRequest, QueryRequest,
    RpcClient,
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::context::{DEFAULT_CONTEXT_BUFFER, MainContext};
use crate::observed::ObservedQueryRef;
use crate::published::PublishedQueryRef;

pub struct DataConnectBuilder {
    config: ConnectorConfig,
    client: Option<Arc<dyn RpcClient>>,
    context: Option<MainContext>,
}

impl DataConnectBuilder {
    pub fn new(config: ConnectorConfig) -> Self {
        Self {
            config,
            client: None,
            context: None,
        }
    }

    pub fn rpc_client(mut self, client: Arc<dyn RpcClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn main_context(mut self, context: MainContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Validate the configuration and assemble the client.
    ///
    /// Without an explicit main context a serial one is spawned on the
    /// current tokio runtime.
    #[instrument(skip(self), fields(connector = %self.config.connector_path()))]
    pub fn build(self) -> DataConnectResult<DataConnect> {
        self.config.validate()?;
        let client = self.client.ok_or_else(|| {
            DataConnectError::InvalidConfig("an RPC client is required".to_owned())
        })?;
        let context = match self.context {
            Some(context) => context,
            None => MainContext::spawn(DEFAULT_CONTEXT_BUFFER)?,
        };
        debug!(?context, "data connect client built");
        Ok(DataConnect {
            config: self.config,
            client,
            context,
        })
    }
}

/// Entry point for creating query references against one connector.
#[derive(Clone)]
pub struct DataConnect {
    config: ConnectorConfig,
    client: Arc<dyn RpcClient>,
    context: MainContext,
}

impl DataConnect {
    pub fn builder(config: ConnectorConfig) -> DataConnectBuilder {
        DataConnectBuilder::new(config)
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn main_context(&self) -> &MainContext {
        &self.context
    }

    /// New published-property reference for `request`. Never shared with
    /// earlier calls, even for an identical request.
    pub fn query<T>(&self, request: QueryRequest) -> PublishedQueryRef<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        debug!(operation = request.operation_name(), "published query ref created");
        PublishedQueryRef::new(request, Arc::clone(&self.client), self.context.clone())
    }

    /// New structured-observation reference for `request`.
    pub fn observed_query<T>(&self, request: QueryRequest) -> ObservedQueryRef<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        debug!(operation = request.operation_name(), "observed query ref created");
        ObservedQueryRef::new(request, Arc::clone(&self.client), self.context.clone())
    }
}
