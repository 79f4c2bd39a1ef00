//! Credentials held in security contexts.
use std::fmt::Debug;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use super::Principal;
use super::UserRecord;

/// Proof of identity and authorisation scope held for a session.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    /// Credential issued by the authentication mechanism.
    Direct(DirectCredential),

    /// Credential issued by switching to another principal.
    Impersonated(ImpersonatedCredential),
}

impl Credential {
    /// The credential authorisation decisions about impersonation are anchored to.
    ///
    /// For impersonated credentials this is the original credential,
    /// for all others it is the credential itself.
    pub fn anchor(&self) -> &DirectCredential {
        match self {
            Credential::Direct(direct) => direct,
            Credential::Impersonated(impersonated) => &impersonated.original,
        }
    }

    /// Capabilities granted by the credential.
    pub fn capabilities(&self) -> &[String] {
        match self {
            Credential::Direct(direct) => &direct.capabilities,
            Credential::Impersonated(impersonated) => &impersonated.capabilities,
        }
    }

    /// Check if the credential grants the given capability.
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities().iter().any(|granted| granted == capability)
    }

    /// Textual identifier of the principal the credential was issued to.
    pub fn identifier(&self) -> &str {
        self.principal().identifier()
    }

    /// Check if the credential was issued by switching to another principal.
    pub fn is_impersonated(&self) -> bool {
        matches!(self, Credential::Impersonated(_))
    }

    /// Original credential an impersonated credential was derived from.
    pub fn original(&self) -> Option<&DirectCredential> {
        match self {
            Credential::Direct(_) => None,
            Credential::Impersonated(impersonated) => Some(&impersonated.original),
        }
    }

    /// Principal the credential was issued to.
    pub fn principal(&self) -> &Principal {
        match self {
            Credential::Direct(direct) => &direct.principal,
            Credential::Impersonated(impersonated) => &impersonated.principal,
        }
    }

    /// Proof of authentication material attached to the credential.
    pub fn proof(&self) -> &Proof {
        match self {
            Credential::Direct(direct) => &direct.proof,
            Credential::Impersonated(impersonated) => &impersonated.proof,
        }
    }

    /// Key of the provider that issued the credential.
    pub fn provider(&self) -> &str {
        match self {
            Credential::Direct(direct) => &direct.provider,
            Credential::Impersonated(impersonated) => &impersonated.provider,
        }
    }
}

impl From<DirectCredential> for Credential {
    fn from(value: DirectCredential) -> Self {
        Credential::Direct(value)
    }
}

impl From<ImpersonatedCredential> for Credential {
    fn from(value: ImpersonatedCredential) -> Self {
        Credential::Impersonated(value)
    }
}

/// Credential issued directly by an authentication mechanism.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DirectCredential {
    /// Capabilities granted by the credential.
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Principal the credential was issued to.
    pub principal: Principal,

    /// Proof of authentication material.
    #[serde(default)]
    pub proof: Proof,

    /// Key of the provider that issued the credential.
    pub provider: String,
}

impl DirectCredential {
    /// Credential with no capabilities nor proof material.
    pub fn new<P, S>(principal: P, provider: S) -> Self
    where
        P: Into<Principal>,
        S: Into<String>,
    {
        DirectCredential {
            capabilities: Vec::new(),
            principal: principal.into(),
            proof: Proof::default(),
            provider: provider.into(),
        }
    }

    /// Rebuild the credential for an updated principal.
    ///
    /// Proof material, capabilities and provider key are carried over unchanged.
    pub fn rebuild<P: Into<Principal>>(&self, principal: P) -> Self {
        DirectCredential {
            capabilities: self.capabilities.clone(),
            principal: principal.into(),
            proof: self.proof.clone(),
            provider: self.provider.clone(),
        }
    }

    /// Replace the capabilities granted by the credential.
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    /// Attach proof of authentication material to the credential.
    pub fn with_proof(mut self, proof: Proof) -> Self {
        self.proof = proof;
        self
    }
}

/// Credential issued when a principal assumes the identity of a user.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ImpersonatedCredential {
    /// Capabilities granted by the credential.
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Credential of the principal that is impersonating.
    pub original: DirectCredential,

    /// Principal being impersonated.
    pub principal: Principal,

    /// Proof of authentication material.
    #[serde(default)]
    pub proof: Proof,

    /// Key of the provider that issued the credential.
    pub provider: String,
}

impl ImpersonatedCredential {
    /// Impersonate a user on behalf of the `original` credential.
    ///
    /// The new credential grants the user's own capabilities and carries no proof material.
    pub fn new<S: Into<String>>(user: UserRecord, provider: S, original: DirectCredential) -> Self {
        ImpersonatedCredential {
            capabilities: user.capabilities.clone(),
            original,
            principal: Principal::User(user),
            proof: Proof::default(),
            provider: provider.into(),
        }
    }
}

/// Opaque proof of authentication material (passwords, tokens, ...).
///
/// The material is never included in [`Debug`] output.
#[derive(Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Proof(Option<String>);

impl Proof {
    /// Access the raw proof material, if any.
    pub fn expose(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Wrap proof of authentication material.
    pub fn new<S: Into<String>>(material: S) -> Self {
        Proof(Some(material.into()))
    }
}

impl Debug for Proof {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            None => write!(f, "Proof(None)"),
            Some(_) => write!(f, "Proof(<redacted>)"),
        }
    }
}
