//! Connector configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DataConnectError, DataConnectResult};

/// Identifies the backend connector a client talks to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    pub service_id: String,
    pub location: String,
    pub connector: String,
}

impl ConnectorConfig {
    pub fn new(
        service_id: impl Into<String>,
        location: impl Into<String>,
        connector: impl Into<String>,
    ) -> Self {
        Self {
            service_id: service_id.into(),
            location: location.into(),
            connector: connector.into(),
        }
    }

    pub fn validate(&self) -> DataConnectResult<()> {
        for (field, value) in [
            ("serviceId", &self.service_id),
            ("location", &self.location),
            ("connector", &self.connector),
        ] {
            if value.trim().is_empty() {
                return Err(DataConnectError::InvalidConfig(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Resource path of the connector, `projects/-/locations/{location}/services/{service}/connectors/{connector}`.
    pub fn connector_path(&self) -> String {
        format!(
            "projects/-/locations/{}/services/{}/connectors/{}",
            self.location, self.service_id, self.connector
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_config_validates_fields() {
        let config = ConnectorConfig::new("movies", "us-central1", "default");
        assert!(config.validate().is_ok());
        assert_eq!(
            config.connector_path(),
            "projects/-/locations/us-central1/services/movies/connectors/default"
        );

        let empty = ConnectorConfig::new("movies", " ", "default");
        let err = empty.validate().unwrap_err();
        assert_eq!(
            err,
            DataConnectError::InvalidConfig("location must not be empty".into())
        );
    }

    #[test]
    fn connector_config_serde_is_camel_case() {
        let config = ConnectorConfig::new("movies", "us-central1", "default");
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"serviceId\":\"movies\""));
        let back: ConnectorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
