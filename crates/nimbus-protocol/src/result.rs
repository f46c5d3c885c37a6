//! Operation results.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DataConnectError, DataConnectResult};

/// Decoded payload of one completed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub data: T,
}

impl<T> OperationResult<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl OperationResult<Value> {
    /// Decode the raw payload into the expected result type.
    pub fn decode<T: DeserializeOwned>(self) -> DataConnectResult<OperationResult<T>> {
        let data = serde_json::from_value(self.data)
            .map_err(|error| DataConnectError::Decode(error.to_string()))?;
        Ok(OperationResult { data })
    }
}
