//! Store for the credential of a request or session scope.
use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use switchuser_models::Credential;

/// Holds at most one [`Credential`] for the current request or session scope.
///
/// A [`SecurityContext`] is a handle: clones of it access the same scope.
/// Scopes are created by the surrounding framework (usually one per session)
/// and written to by authentication mechanisms and by switch user.
///
/// Writes from concurrent requests sharing a scope are not ordered:
/// the last write wins.
#[derive(Clone, Default)]
pub struct SecurityContext {
    inner: Arc<Mutex<Option<Credential>>>,
}

impl SecurityContext {
    /// Remove the current credential from the scope, returning it.
    pub fn clear(&self) -> Option<Credential> {
        self.access().take()
    }

    /// Current credential for the scope, if any.
    pub fn credential(&self) -> Option<Credential> {
        self.access().clone()
    }

    /// Check if the scope holds no credential.
    pub fn is_empty(&self) -> bool {
        self.access().is_none()
    }

    /// Initialise a new, empty, scope.
    pub fn new() -> SecurityContext {
        SecurityContext::default()
    }

    /// Store a new credential for the scope, returning the one it replaced.
    pub fn replace(&self, credential: Credential) -> Option<Credential> {
        self.access().replace(credential)
    }

    /// Initialise a new scope already holding a credential.
    pub fn with_credential(credential: Credential) -> SecurityContext {
        let context = SecurityContext::default();
        context.replace(credential);
        context
    }
}

impl SecurityContext {
    /// Lock and access the shared credential slot.
    ///
    /// A panic while the lock is held can't leave the slot half written
    /// so poisoned locks are recovered.
    fn access(&self) -> MutexGuard<'_, Option<Credential>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for SecurityContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityContext")
            .field("credential", &*self.access())
            .finish()
    }
}
