//! Events emitted when principals switch identity, and the bus that delivers them.
//!
//! Events follow a "proposed value, observers may replace" protocol:
//! the [`ImpersonationEvent`] carries the credential about to be committed and
//! observers can swap it for a different one while the event is dispatched.
//! Once dispatch completes the emitter must commit whatever credential the event
//! holds, never assuming the one it proposed survived.
use switchuser_models::Credential;
use switchuser_models::UserRecord;

pub mod bus;

/// Topic impersonation events are published on, for both entering and exiting impersonation.
pub const TOPIC_SWITCH_USER: &str = "security.switch_user";

/// Event emitted when a principal switches identity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImpersonationEvent {
    credential: Credential,
    target: UserRecord,
}

impl ImpersonationEvent {
    /// Credential currently proposed for commit.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Consume the event and return the credential to commit.
    pub fn into_credential(self) -> Credential {
        self.credential
    }

    /// Propose a credential for the `target` user.
    pub fn new(target: UserRecord, credential: Credential) -> Self {
        ImpersonationEvent { credential, target }
    }

    /// Replace the proposed credential, returning the one that was replaced.
    pub fn replace_credential(&mut self, credential: Credential) -> Credential {
        std::mem::replace(&mut self.credential, credential)
    }

    /// User the identity is switched to.
    pub fn target(&self) -> &UserRecord {
        &self.target
    }
}
