//! Scripted in-process RPC client.
//!
//! Responses are keyed by operation name. Each operation holds a queue of
//! outcomes; calls consume them in order and the last one keeps repeating.
//! Unknown operations fail with a `not_found` server error.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use nimbus_protocol::{
    DataConnectError, DataConnectResult, OperationRequest, OperationResult, QueryRequest,
    RpcClient,
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

type Outcome = DataConnectResult<Value>;

#[derive(Debug, Default)]
pub struct InMemoryRpcClient {
    scripts: Mutex<HashMap<String, VecDeque<Outcome>>>,
    requests: Mutex<Vec<QueryRequest>>,
    latency: Option<Duration>,
}

impl InMemoryRpcClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Load scripted outcomes from a fixtures document.
    ///
    /// ```json
    /// {
    ///   "GetUser": { "data": { "name": "Ada" } },
    ///   "ListMovies": [
    ///     { "data": [] },
    ///     { "error": { "kind": "server", "code": "rate_limited" } }
    ///   ]
    /// }
    /// ```
    pub fn from_fixtures(fixtures: Value) -> DataConnectResult<Self> {
        let entries: HashMap<String, Value> = serde_json::from_value(fixtures)
            .map_err(|error| DataConnectError::InvalidConfig(format!("bad fixtures: {error}")))?;

        let client = Self::new();
        for (operation, entry) in entries {
            let outcomes = match entry {
                Value::Array(items) => items
                    .into_iter()
                    .map(serde_json::from_value::<FixtureOutcome>)
                    .collect::<Result<Vec<_>, _>>(),
                single => serde_json::from_value::<FixtureOutcome>(single).map(|one| vec![one]),
            }
            .map_err(|error| {
                DataConnectError::InvalidConfig(format!(
                    "bad fixture for operation {operation}: {error}"
                ))
            })?;
            for outcome in outcomes {
                client.push_outcome(&operation, outcome.into());
            }
        }
        Ok(client)
    }

    pub fn from_fixtures_str(raw: &str) -> DataConnectResult<Self> {
        let fixtures: Value = serde_json::from_str(raw)
            .map_err(|error| DataConnectError::InvalidConfig(format!("bad fixtures: {error}")))?;
        Self::from_fixtures(fixtures)
    }

    /// Replace the script for `operation` with a single successful payload.
    pub fn stub_data(&self, operation: &str, data: Value) {
        self.replace(operation, Ok(data));
    }

    /// Replace the script for `operation` with a single failure.
    pub fn stub_error(&self, operation: &str, error: DataConnectError) {
        self.replace(operation, Err(error));
    }

    /// Append an outcome to the script for `operation`.
    pub fn push_outcome(&self, operation: &str, outcome: Outcome) {
        self.scripts
            .lock()
            .entry(operation.to_owned())
            .or_default()
            .push_back(outcome);
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().clone()
    }

    fn replace(&self, operation: &str, outcome: Outcome) {
        self.scripts
            .lock()
            .insert(operation.to_owned(), VecDeque::from([outcome]));
    }

    fn next_outcome(&self, operation: &str) -> Outcome {
        let mut scripts = self.scripts.lock();
        let Some(queue) = scripts.get_mut(operation) else {
            return Err(DataConnectError::server_with_message(
                "not_found",
                format!("no operation named {operation}"),
            ));
        };
        if queue.len() > 1
            && let Some(outcome) = queue.pop_front()
        {
            return outcome;
        }
        queue.front().cloned().unwrap_or_else(|| {
            Err(DataConnectError::server_with_message(
                "not_found",
                format!("no outcome scripted for {operation}"),
            ))
        })
    }
}

#[async_trait]
impl RpcClient for InMemoryRpcClient {
    #[instrument(skip(self, request), fields(operation = %request.operation_name()))]
    async fn execute_query(
        &self,
        request: &QueryRequest,
    ) -> DataConnectResult<OperationResult<Value>> {
        self.requests.lock().push(request.clone());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let outcome = self.next_outcome(request.operation_name());
        debug!(ok = outcome.is_ok(), "scripted outcome returned");
        outcome.map(OperationResult::new)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FixtureOutcome {
    Data(Value),
    Error(FixtureError),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum FixtureError {
    Transport {
        message: String,
    },
    Decode {
        message: String,
    },
    Server {
        code: String,
        #[serde(default)]
        message: Option<String>,
    },
}

impl From<FixtureOutcome> for Outcome {
    fn from(outcome: FixtureOutcome) -> Self {
        match outcome {
            FixtureOutcome::Data(data) => Ok(data),
            FixtureOutcome::Error(FixtureError::Transport { message }) => {
                Err(DataConnectError::Transport(message))
            }
            FixtureOutcome::Error(FixtureError::Decode { message }) => {
                Err(DataConnectError::Decode(message))
            }
            FixtureOutcome::Error(FixtureError::Server { code, message }) => Err(match message {
                Some(message) => DataConnectError::server_with_message(code, message),
                None => DataConnectError::server(code),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn unknown_operation_is_not_found() {
        let client = InMemoryRpcClient::new();
        let err = client
            .execute_query(&QueryRequest::new("Missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataConnectError::Server { ref code, .. } if code == "not_found"));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn scripted_sequence_repeats_last_outcome() {
        let client = InMemoryRpcClient::new();
        client.push_outcome("Count", Ok(json!(1)));
        client.push_outcome("Count", Ok(json!(2)));

        let request = QueryRequest::new("Count");
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(client.execute_query(&request).await.unwrap().data);
        }
        assert_eq!(seen, vec![json!(1), json!(2), json!(2)]);
    }

    #[tokio::test]
    async fn fixtures_load_data_and_errors() -> anyhow::Result<()> {
        let client = InMemoryRpcClient::from_fixtures(json!({
            "GetUser": { "data": { "name": "Ada" } },
            "ListMovies": [
                { "data": [] },
                { "error": { "kind": "server", "code": "rate_limited" } }
            ],
            "Flaky": { "error": { "kind": "transport", "message": "offline" } }
        }))?;

        let user = client.execute_query(&QueryRequest::new("GetUser")).await?;
        assert_eq!(user.data, json!({"name": "Ada"}));

        let movies = QueryRequest::new("ListMovies");
        assert_eq!(client.execute_query(&movies).await?.data, json!([]));
        let err = client.execute_query(&movies).await.unwrap_err();
        assert_eq!(err, DataConnectError::server("rate_limited"));

        let err = client
            .execute_query(&QueryRequest::new("Flaky"))
            .await
            .unwrap_err();
        assert_eq!(err, DataConnectError::Transport("offline".into()));
        Ok(())
    }

    #[test]
    fn malformed_fixtures_are_config_errors() {
        let err =
            InMemoryRpcClient::from_fixtures_str("{\"GetUser\": {\"nope\": 1}}").unwrap_err();
        assert!(matches!(err, DataConnectError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_fixture_names_its_operation() {
        let err = InMemoryRpcClient::from_fixtures(json!({
            "GetUser": {"data": {"name": "Ada"}},
            "ListMovies": [
                {"data": []},
                {"error": {"kind": "server"}}
            ]
        }))
        .unwrap_err();
        let DataConnectError::InvalidConfig(message) = err else {
            panic!("expected InvalidConfig, got {err:?}");
        };
        assert!(message.contains("ListMovies"), "{message}");
        assert!(message.contains("code"), "{message}");
    }
}
