//! Principals credentials are issued to.
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

/// The entity a [`Credential`](crate::Credential) was issued to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Principal {
    /// Principal authenticated by a bare identifier with no account record behind it.
    ///
    /// Anonymous and placeholder identities fall in this category.
    Identifier(String),

    /// Principal backed by a resolvable account record.
    User(UserRecord),
}

impl Principal {
    /// Textual identifier of the principal.
    pub fn identifier(&self) -> &str {
        match self {
            Principal::Identifier(identifier) => identifier,
            Principal::User(user) => &user.identifier,
        }
    }

    /// Access the account record backing the principal, if there is one.
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Principal::Identifier(_) => None,
            Principal::User(user) => Some(user),
        }
    }
}

impl Display for Principal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl From<UserRecord> for Principal {
    fn from(value: UserRecord) -> Self {
        Principal::User(value)
    }
}

impl From<&str> for Principal {
    fn from(value: &str) -> Self {
        Principal::Identifier(value.to_string())
    }
}

impl From<String> for Principal {
    fn from(value: String) -> Self {
        Principal::Identifier(value)
    }
}

/// Account record as returned by principal directories.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique textual identifier of the account.
    pub identifier: String,

    /// Capabilities granted to the account.
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// The account's credentials have expired and must be renewed.
    #[serde(default)]
    pub credentials_expired: bool,

    /// The account was disabled by an administrator.
    #[serde(default)]
    pub disabled: bool,

    /// The account has expired.
    #[serde(default)]
    pub expired: bool,

    /// The account is locked.
    #[serde(default)]
    pub locked: bool,
}

impl UserRecord {
    /// Healthy account record with no capabilities.
    pub fn new<S: Into<String>>(identifier: S) -> Self {
        UserRecord {
            identifier: identifier.into(),
            capabilities: Vec::new(),
            credentials_expired: false,
            disabled: false,
            expired: false,
            locked: false,
        }
    }

    /// Replace the capabilities granted to the account.
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::Principal;
    use super::UserRecord;

    #[test]
    fn decode_user_record_defaults() {
        let user: UserRecord = serde_json::from_value(serde_json::json!({
            "identifier": "kuba",
        }))
        .unwrap();
        assert_eq!(user, UserRecord::new("kuba"));
    }

    #[test]
    fn principal_identifier() {
        let user = Principal::from(UserRecord::new("kuba"));
        let bare = Principal::from("anon.");
        assert_eq!(user.identifier(), "kuba");
        assert_eq!(bare.identifier(), "anon.");
        assert!(user.user().is_some());
        assert!(bare.user().is_none());
    }
}
