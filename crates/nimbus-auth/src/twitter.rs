//! Twitter (OAuth 1.0a) credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::credential::AuthCredential;
use crate::error::{AuthError, AuthResult};
use crate::request::VerifyAssertionRequest;

pub struct TwitterAuthProvider;

impl TwitterAuthProvider {
    pub const ID: &'static str = "twitter.com";

    pub fn credential(
        token: impl Into<String>,
        secret: impl Into<String>,
    ) -> TwitterAuthCredential {
        TwitterAuthCredential {
            provider: Self::ID.to_owned(),
            token: token.into(),
            secret: secret.into(),
        }
    }
}

/// OAuth access token and token secret from a Twitter sign-in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterAuthCredential {
    provider: String,
    token: String,
    secret: String,
}

impl TwitterAuthCredential {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn to_bytes(&self) -> AuthResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a payload written by [`to_bytes`](Self::to_bytes).
    ///
    /// Payloads for any other provider are rejected.
    pub fn from_bytes(bytes: &[u8]) -> AuthResult<Self> {
        let credential: Self = serde_json::from_slice(bytes)?;
        if credential.provider != TwitterAuthProvider::ID {
            return Err(AuthError::ProviderMismatch {
                expected: TwitterAuthProvider::ID.to_owned(),
                actual: credential.provider,
            });
        }
        Ok(credential)
    }
}

impl fmt::Debug for TwitterAuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterAuthCredential")
            .field("provider", &self.provider)
            .field("token", &"<redacted>")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl AuthCredential for TwitterAuthCredential {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn prepare(&self, request: &mut VerifyAssertionRequest) {
        request.provider_access_token = Some(self.token.clone());
        request.provider_oauth_token_secret = Some(self.secret.clone());
    }
}
