//! Resolve textual identifiers into account records.
use std::sync::Arc;

use anyhow::Result;

use switchuser_context::Context;

use crate::UserRecord;

/// Operations implemented by user record persistence backends.
pub trait PrincipalDirectory: Send + Sync {
    /// Re-fetch the latest state of an account that was resolved in the past.
    fn refresh(&self, context: &Context, user: &UserRecord) -> Result<UserRecord>;

    /// Look up the account record for the given identifier.
    ///
    /// Implementations must return an [`UnknownIdentifier`] error
    /// when no account matches the identifier.
    fn resolve(&self, context: &Context, identifier: &str) -> Result<UserRecord>;
}

/// Look up account records from a [`PrincipalDirectory`] backend.
#[derive(Clone)]
pub struct Directory {
    inner: Arc<dyn PrincipalDirectory>,
}

impl Directory {
    /// Re-fetch the latest state of an account.
    pub fn refresh(&self, context: &Context, user: &UserRecord) -> Result<UserRecord> {
        self.inner.refresh(context, user)
    }

    /// Look up the account record for the given identifier.
    ///
    /// For details see [`PrincipalDirectory::resolve`].
    pub fn resolve(&self, context: &Context, identifier: &str) -> Result<UserRecord> {
        self.inner.resolve(context, identifier)
    }
}

impl<T> From<T> for Directory
where
    T: PrincipalDirectory + 'static,
{
    fn from(value: T) -> Self {
        let inner = Arc::new(value);
        Directory { inner }
    }
}

/// No account matches the requested identifier.
#[derive(Debug, thiserror::Error)]
#[error("no account found with identifier \"{identifier}\"")]
pub struct UnknownIdentifier {
    pub identifier: String,
}

impl UnknownIdentifier {
    /// No account matches the requested identifier.
    pub fn new<S: Into<String>>(identifier: S) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}
