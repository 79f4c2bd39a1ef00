//! Interfaces switch user relies on to look up, authorise and validate principals.
//!
//! The concrete implementations are external collaborators:
//!
//! - A [`PrincipalDirectory`](directory::PrincipalDirectory) resolves identifiers
//!   into [`UserRecord`]s.
//! - An [`AccessOracle`](access::AccessOracle) decides if a credential holds the
//!   capabilities needed to impersonate a user.
//! - A [`TargetFilter`](access::TargetFilter) can restrict which users may be impersonated.
//! - A [`PrincipalValidator`](validator::PrincipalValidator) checks the health of
//!   resolved accounts.
//!
//! All interfaces are synchronous: switch user performs no I/O of its own and
//! introduces no suspension points while handling a request.
pub mod access;
pub mod directory;
pub mod validator;

// Re-export model definitions for convenience.
pub use switchuser_models::Credential;
pub use switchuser_models::DirectCredential;
pub use switchuser_models::ImpersonatedCredential;
pub use switchuser_models::Principal;
pub use switchuser_models::UserRecord;
