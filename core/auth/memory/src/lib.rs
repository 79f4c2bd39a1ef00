//! In-memory implementations of the switch user collaborators.
//!
//! These are intended for development, demo instances and tests:
//! account records live in process memory and access decisions are based
//! exclusively on the capabilities attached to credentials.
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use anyhow::Result;

use switchuser_auth::access::AccessOracle;
use switchuser_auth::directory::PrincipalDirectory;
use switchuser_auth::directory::UnknownIdentifier;
use switchuser_auth::validator::AccountStatusError;
use switchuser_auth::validator::PrincipalValidator;
use switchuser_auth::Credential;
use switchuser_auth::UserRecord;
use switchuser_context::Context;

/// Directory of account records kept in process memory.
///
/// Clones of a [`MemoryDirectory`] share the same records.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryDirectory {
    /// Add or update an account record.
    pub fn insert(&self, user: UserRecord) {
        let mut users = self
            .users
            .write()
            .expect("MemoryDirectory::users lock poisoned");
        users.insert(user.identifier.clone(), user);
    }

    /// Initialise a directory with the given account records.
    pub fn with_users<I>(users: I) -> MemoryDirectory
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let directory = MemoryDirectory::default();
        for user in users {
            directory.insert(user);
        }
        directory
    }
}

impl MemoryDirectory {
    fn lookup(&self, identifier: &str) -> Result<UserRecord> {
        let users = self
            .users
            .read()
            .expect("MemoryDirectory::users lock poisoned");
        users
            .get(identifier)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!(UnknownIdentifier::new(identifier)))
    }
}

impl PrincipalDirectory for MemoryDirectory {
    fn refresh(&self, _: &Context, user: &UserRecord) -> Result<UserRecord> {
        self.lookup(&user.identifier)
    }

    fn resolve(&self, _: &Context, identifier: &str) -> Result<UserRecord> {
        self.lookup(identifier)
    }
}

/// Grant access to credentials holding all the requested capabilities.
pub struct CapabilityOracle;

impl AccessOracle for CapabilityOracle {
    fn decide(
        &self,
        _: &Context,
        acting: &Credential,
        capabilities: &[String],
        _: Option<&UserRecord>,
    ) -> Result<bool> {
        let granted = capabilities
            .iter()
            .all(|capability| acting.has_capability(capability));
        Ok(granted)
    }
}

/// Grant all access requests.
pub struct Unrestricted;

impl AccessOracle for Unrestricted {
    fn decide(
        &self,
        _: &Context,
        _: &Credential,
        _: &[String],
        _: Option<&UserRecord>,
    ) -> Result<bool> {
        Ok(true)
    }
}

/// Reject accounts based on the status flags in their record.
pub struct AccountStatusChecker;

impl PrincipalValidator for AccountStatusChecker {
    fn validate_post_resolution(&self, _: &Context, user: &UserRecord) -> Result<()> {
        let identifier = user.identifier.clone();
        let error = if user.locked {
            AccountStatusError::Locked(identifier)
        } else if user.disabled {
            AccountStatusError::Disabled(identifier)
        } else if user.expired {
            AccountStatusError::Expired(identifier)
        } else if user.credentials_expired {
            AccountStatusError::CredentialsExpired(identifier)
        } else {
            return Ok(());
        };
        anyhow::bail!(error)
    }
}
