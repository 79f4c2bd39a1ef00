//! Switch User: let privileged principals temporarily assume the identity of other users.
//!
//! Requests carrying the trigger query parameter (`_switch_user` by default) ask to:
//!
//! - Switch to the user identified by the parameter value (`?_switch_user=kuba`).
//! - Exit impersonation and revert to the original identity (`?_switch_user=_exit`).
//!
//! The [`SwitchUserInterceptor`] inspects requests, resolves and authorises the target user
//! through the collaborators in [`switchuser_auth`] and updates the credential held in the
//! [`SecurityContext`](switchuser_context::SecurityContext) of the request's scope.
//!
//! ## Authorisation anchor
//!
//! Permission to impersonate is always checked against the original credential.
//! A principal impersonating user A who asks to impersonate user B is authorised
//! as themselves, not as A, and the credential for B records the true original.
//! Exiting impersonation therefore always lands back on the original identity in one hop.
//!
//! ## Request rewriting
//!
//! The trigger parameter is removed from the request query before anything else happens,
//! so it is never replayed by redirects nor seen by downstream components.
//! Once the identity is switched clients are redirected to the clean URL,
//! unless the interceptor is configured as stateless.
pub mod conf;
pub mod errors;
pub mod query;
pub mod request;
pub mod telemetry;

mod interceptor;
#[cfg(feature = "actix-web")]
mod middleware;

pub use self::conf::SwitchUserConf;
pub use self::interceptor::Outcome;
pub use self::interceptor::SwitchUserInterceptor;
pub use self::interceptor::SwitchUserInterceptorBuilder;
pub use self::request::RequestTarget;
pub use self::request::SwitchRequest;

#[cfg(feature = "actix-web")]
pub use self::middleware::SwitchUserError;
#[cfg(feature = "actix-web")]
pub use self::middleware::SwitchUserMiddleware;
#[cfg(feature = "actix-web")]
pub use self::middleware::SwitchUserService;
