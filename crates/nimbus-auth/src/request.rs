//! Requests sent to the identity backend.

use serde::{Deserialize, Serialize};

/// Per-app settings attached to every auth request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequestConfiguration {
    pub api_key: String,
    pub app_id: String,
}

impl AuthRequestConfiguration {
    pub fn new(api_key: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_id: app_id.into(),
        }
    }
}

/// Exchanges an identity-provider assertion for a session.
///
/// Token fields start empty and are filled by
/// [`AuthCredential::prepare`](crate::AuthCredential::prepare).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyAssertionRequest {
    pub provider_id: String,
    #[serde(skip)]
    pub request_configuration: Option<AuthRequestConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_oauth_token_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id_token: Option<String>,
    pub return_secure_token: bool,
}

impl VerifyAssertionRequest {
    pub fn new(provider_id: impl Into<String>, configuration: AuthRequestConfiguration) -> Self {
        Self {
            provider_id: provider_id.into(),
            request_configuration: Some(configuration),
            provider_access_token: None,
            provider_oauth_token_secret: None,
            provider_id_token: None,
            return_secure_token: true,
        }
    }
}
