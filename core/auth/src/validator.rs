//! Post-resolution health checks on account records.
use std::sync::Arc;

use anyhow::Result;

use switchuser_context::Context;

use crate::UserRecord;

/// Operations implemented by account health checkers.
pub trait PrincipalValidator: Send + Sync {
    /// Check a freshly resolved account is in a usable state.
    ///
    /// Implementations should return an [`AccountStatusError`] for unhealthy accounts.
    fn validate_post_resolution(&self, context: &Context, user: &UserRecord) -> Result<()>;
}

/// Check account health with a [`PrincipalValidator`] backend.
#[derive(Clone)]
pub struct Validator {
    inner: Arc<dyn PrincipalValidator>,
}

impl Validator {
    /// Check a freshly resolved account is in a usable state.
    pub fn validate_post_resolution(&self, context: &Context, user: &UserRecord) -> Result<()> {
        self.inner.validate_post_resolution(context, user)
    }
}

impl<T> From<T> for Validator
where
    T: PrincipalValidator + 'static,
{
    fn from(value: T) -> Self {
        let inner = Arc::new(value);
        Validator { inner }
    }
}

/// An account failed its health checks.
#[derive(Debug, thiserror::Error)]
pub enum AccountStatusError {
    /// The account's credentials have expired.
    #[error("credentials for account \"{0}\" have expired")]
    // (identifier,)
    CredentialsExpired(String),

    /// The account was disabled.
    #[error("account \"{0}\" is disabled")]
    // (identifier,)
    Disabled(String),

    /// The account has expired.
    #[error("account \"{0}\" has expired")]
    // (identifier,)
    Expired(String),

    /// The account is locked.
    #[error("account \"{0}\" is locked")]
    // (identifier,)
    Locked(String),
}

impl AccountStatusError {
    /// Identifier of the account that failed the checks.
    pub fn identifier(&self) -> &str {
        match self {
            AccountStatusError::CredentialsExpired(identifier) => identifier,
            AccountStatusError::Disabled(identifier) => identifier,
            AccountStatusError::Expired(identifier) => identifier,
            AccountStatusError::Locked(identifier) => identifier,
        }
    }
}
