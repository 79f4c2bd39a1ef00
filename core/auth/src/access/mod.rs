//! Module to deal with the Authorisation (who may impersonate whom) side of switch user.
use std::sync::Arc;

use anyhow::Result;

use switchuser_context::Context;

#[cfg(test)]
mod test;

use crate::Credential;
use crate::UserRecord;

/// Operations implemented by authorisation policy engines.
pub trait AccessOracle: Send + Sync {
    /// Decide if the `acting` credential holds all `capabilities` over the optional `subject`.
    ///
    /// Deciding is expected to be free of side effects:
    ///
    /// - Return `Ok(true)` to grant access.
    /// - Return `Ok(false)` to deny access.
    /// - Return `Err` if the decision could not be made (this will still deny access).
    fn decide(
        &self,
        context: &Context,
        acting: &Credential,
        capabilities: &[String],
        subject: Option<&UserRecord>,
    ) -> Result<bool>;
}

/// Decide access with an [`AccessOracle`] backend.
#[derive(Clone)]
pub struct Oracle {
    inner: Arc<dyn AccessOracle>,
}

impl Oracle {
    /// Decide if the `acting` credential holds all `capabilities` over the optional `subject`.
    ///
    /// For details see [`AccessOracle::decide`].
    pub fn decide(
        &self,
        context: &Context,
        acting: &Credential,
        capabilities: &[String],
        subject: Option<&UserRecord>,
    ) -> Result<bool> {
        self.inner.decide(context, acting, capabilities, subject)
    }
}

impl<T> From<T> for Oracle
where
    T: AccessOracle + 'static,
{
    fn from(value: T) -> Self {
        let inner = Arc::new(value);
        Oracle { inner }
    }
}

/// Restrict which users can be impersonated, before any authorisation decision is made.
///
/// Any `Fn(&UserRecord) -> bool` closure is a valid filter.
pub trait TargetFilter: Send + Sync {
    /// Return `true` if the user may be the target of impersonation.
    fn allow(&self, context: &Context, user: &UserRecord) -> bool;
}

impl<F> TargetFilter for F
where
    F: Fn(&UserRecord) -> bool + Send + Sync,
{
    fn allow(&self, _: &Context, user: &UserRecord) -> bool {
        self(user)
    }
}

/// An entity is not allowed to switch to a target identity.
///
/// Unknown targets are reported with this same error so callers can't tell
/// which identities exist and which don't.
#[derive(Debug, thiserror::Error)]
#[error("entity \"{entity}\" is not allowed to switch to \"{target}\"")]
pub struct AccessDenied {
    entity: String,
    target: String,
}

impl AccessDenied {
    /// Deny an entity from switching to a target identity.
    pub fn deny<S1, S2>(entity: S1, target: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            entity: entity.into(),
            target: target.into(),
        }
    }

    /// Identifier of the entity that was denied.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Identifier of the requested target.
    pub fn target(&self) -> &str {
        &self.target
    }
}
