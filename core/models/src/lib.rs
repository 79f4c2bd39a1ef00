//! Data models for the Switch User (identity impersonation) system.
//!
//! A [`Credential`] is the proof of identity and authorisation scope held for a session.
//! Credentials come in two flavours:
//!
//! - [`DirectCredential`]s, issued by the authentication mechanism upstream of switch user.
//! - [`ImpersonatedCredential`]s, issued when a privileged principal assumes another identity.
//!
//! An [`ImpersonatedCredential`] always records the credential it was derived from as a
//! [`DirectCredential`]: impersonation is therefore at most one level deep and the original
//! identity is always one hop away, no matter how many times a principal switches target.
mod credential;
mod principal;

pub use self::credential::Credential;
pub use self::credential::DirectCredential;
pub use self::credential::ImpersonatedCredential;
pub use self::credential::Proof;
pub use self::principal::Principal;
pub use self::principal::UserRecord;
