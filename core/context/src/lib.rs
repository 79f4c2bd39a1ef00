//! The [`Context`] is a general purpose container to carry operation scoped values around.
//!
//! Contexts are organised into a tree structure:
//!
//! - A root context represents the general process wide scope.
//! - Derived contexts represents a narrower scope within their parent with additional
//!   or updated information attached to them.
//!
//! Contexts carry two values:
//!
//! - The [`Logger`] for the operation, decorated with request attributes as needed.
//! - The [`SecurityContext`] of the scope (session or request) the operation belongs to.
//!
//! Passing the [`SecurityContext`] explicitly along with the operation, rather than
//! looking it up from a process wide location, ensures concurrent sessions never
//! observe each other's credentials.
#[cfg(feature = "actix-web")]
use std::future::Ready;

#[cfg(feature = "actix-web")]
use actix_web::dev::Payload;
#[cfg(feature = "actix-web")]
use actix_web::FromRequest;
#[cfg(feature = "actix-web")]
use actix_web::HttpMessage;
#[cfg(feature = "actix-web")]
use actix_web::HttpRequest;
use opentelemetry_api::trace::TraceContextExt;
use opentelemetry_api::trace::TraceId;
use opentelemetry_api::Context as OtelContext;
use slog::Logger;
use slog::OwnedKV;
use slog::SendSyncRefUnwindSafeKV;

mod security;

pub use self::security::SecurityContext;

/// The [`Context`] is a general purpose container to carry scoped values around.
///
/// Refer to the [crate level docs](crate) for details.
#[derive(Clone, Debug)]
pub struct Context {
    /// Logger with contextual attributes attached to it.
    pub logger: Logger,

    /// Credential store for the scope the operation belongs to.
    pub security: SecurityContext,
}

impl Context {
    /// Derive a new [`Context`] by making changes to the current one.
    pub fn derive(&self) -> ContextBuilder {
        ContextBuilder {
            logger: self.logger.clone(),
            security: self.security.clone(),
        }
    }

    /// Derive a new [`Context`] by making changes to the current one using the provided callback.
    pub fn derive_with<F>(&self, callback: F) -> Context
    where
        F: FnOnce(ContextBuilder) -> ContextBuilder,
    {
        let builder = callback(self.derive());
        builder.build()
    }

    /// Initialise a new root context with an empty security scope.
    pub fn root(logger: Logger) -> ContextBuilder {
        ContextBuilder {
            logger,
            security: SecurityContext::new(),
        }
    }
}

#[cfg(feature = "actix-web")]
impl FromRequest for Context {
    type Error = actix_web::Error;
    type Future = Ready<std::result::Result<Self, Self::Error>>;

    fn from_request(request: &HttpRequest, _: &mut Payload) -> Self::Future {
        let context = request
            .extensions()
            .get::<Context>()
            .expect("request has no context to extract")
            .clone();
        std::future::ready(Ok(context))
    }
}

/// A builder for root and derived contexts.
pub struct ContextBuilder {
    logger: Logger,
    security: SecurityContext,
}

impl ContextBuilder {
    /// Finalise the build process and return a new [`Context`].
    pub fn build(self) -> Context {
        Context {
            logger: self.logger,
            security: self.security,
        }
    }

    /// Decorate the [`Context`]'s logger with the trace ID of the current OpenTelemetry span.
    pub fn log_trace(self) -> Self {
        let context = OtelContext::current();
        let span = context.span();
        let trace_id = span.span_context().trace_id();
        if trace_id == TraceId::INVALID {
            self
        } else {
            let trace_id = trace_id.to_string();
            self.log_values(slog::o!("trace_id" => trace_id))
        }
    }

    /// Update the [`Context`] logger to attach new log key/pair values.
    pub fn log_values<T>(mut self, entries: OwnedKV<T>) -> Self
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        self.logger = self.logger.new(entries);
        self
    }

    /// Attach the [`SecurityContext`] of the scope the operation belongs to.
    pub fn security(mut self, security: SecurityContext) -> Self {
        self.security = security;
        self
    }
}

#[cfg(any(test, feature = "test-fixture"))]
impl Context {
    /// Create an empty context useful for test.
    pub fn fixture() -> Context {
        let logger = Logger::root(slog::Discard, slog::o!());
        Context::root(logger).build()
    }
}
