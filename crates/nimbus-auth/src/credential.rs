use crate::request::VerifyAssertionRequest;

/// A credential issued by an identity provider.
pub trait AuthCredential: Send + Sync {
    fn provider(&self) -> &str;

    /// Copy the provider-specific fields into `request`.
    fn prepare(&self, request: &mut VerifyAssertionRequest);
}
