//! Errors returned by switch user operations.

/// Switch user was configured with invalid options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// The trigger parameter name is empty.
    #[error("switch user trigger parameter name must not be empty")]
    EmptyParameter,

    /// The scope identifier is empty.
    #[error("switch user scope identifier must not be empty")]
    EmptyScope,
}

/// The credential needed to perform the operation could not be found.
///
/// Callers are expected to re-authenticate the request.
#[derive(Debug, thiserror::Error)]
pub enum CredentialsNotFound {
    /// The security context holds no credential.
    #[error("no credential found in the security context")]
    Missing,

    /// Exit was requested without an impersonation in effect.
    #[error("original credential not found, the current credential is not impersonated")]
    NotImpersonated,
}

/// Unable to decode the request query string.
#[derive(Debug, thiserror::Error)]
#[error("unable to decode the request query string")]
pub struct QueryDecode;

/// Unable to encode the rewritten request query string.
#[derive(Debug, thiserror::Error)]
#[error("unable to encode the rewritten request query string")]
pub struct QueryEncode;
