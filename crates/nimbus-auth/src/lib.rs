//! # nimbus-auth — identity-provider credentials
//!
//! A credential is obtained from a provider (e.g. [`TwitterAuthProvider`])
//! and prepares a [`VerifyAssertionRequest`] by filling in the provider
//! specific token fields. Credentials serialize to a self-describing JSON
//! payload so hosts can hand them across process boundaries.

pub mod credential;
pub mod error;
pub mod request;
pub mod twitter;

pub use credential::AuthCredential;
pub use error::{AuthError, AuthResult};
pub use request::{AuthRequestConfiguration, VerifyAssertionRequest};
pub use twitter::{TwitterAuthCredential, TwitterAuthProvider};
