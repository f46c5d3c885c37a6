//! Operation requests: what to execute on the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DataConnectError, DataConnectResult};

/// A named remote operation with optional input variables.
pub trait OperationRequest {
    fn operation_name(&self) -> &str;
    fn variables(&self) -> Option<&Value>;
}

/// Immutable description of a query operation.
///
/// Fields are private; a request is built once and then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    operation_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

impl QueryRequest {
    pub fn new(operation_name: impl Into<String>) -> Self {
        Self {
            operation_name: operation_name.into(),
            variables: None,
        }
    }

    /// Attach variables from any serializable value.
    pub fn with_variables<V: Serialize + ?Sized>(self, variables: &V) -> DataConnectResult<Self> {
        let value = serde_json::to_value(variables)
            .map_err(|error| DataConnectError::Encode(error.to_string()))?;
        Ok(self.with_variables_value(value))
    }

    pub fn with_variables_value(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }
}

impl OperationRequest for QueryRequest {
    fn operation_name(&self) -> &str {
        &self.operation_name
    }

    fn variables(&self) -> Option<&Value> {
        self.variables.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct GetUserVars {
        id: String,
    }

    #[test]
    fn query_request_without_variables() {
        let request = QueryRequest::new("ListMovies");
        assert_eq!(request.operation_name(), "ListMovies");
        assert!(request.variables().is_none());
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, json!({"operationName": "ListMovies"}));
    }

    #[test]
    fn query_request_serializes_typed_variables() {
        let request = QueryRequest::new("GetUser")
            .with_variables(&GetUserVars { id: "42".into() })
            .unwrap();
        assert_eq!(request.variables(), Some(&json!({"id": "42"})));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            json!({"operationName": "GetUser", "variables": {"id": "42"}})
        );
    }

    #[test]
    fn unserializable_variables_are_encode_errors() {
        use std::collections::HashMap;
        let mut bad = HashMap::new();
        bad.insert(vec![1_u8], "non-string key");
        let err = QueryRequest::new("Bad").with_variables(&bad).unwrap_err();
        assert_eq!(err.kind(), "encode");
    }
}
