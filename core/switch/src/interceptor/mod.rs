//! Intercept requests to switch the identity of the current principal, or revert it.
use std::sync::Arc;

use anyhow::Result;

use switchuser_auth::access::AccessDenied;
use switchuser_auth::access::Oracle;
use switchuser_auth::access::TargetFilter;
use switchuser_auth::directory::Directory;
use switchuser_auth::directory::UnknownIdentifier;
use switchuser_auth::validator::Validator;
use switchuser_context::Context;
use switchuser_events::bus::Notifications;
use switchuser_events::ImpersonationEvent;
use switchuser_events::TOPIC_SWITCH_USER;
use switchuser_models::Credential;
use switchuser_models::DirectCredential;
use switchuser_models::ImpersonatedCredential;


use crate::conf::SwitchUserConf;
use crate::conf::EXIT_SENTINEL;
use crate::errors::CredentialsNotFound;
use crate::query;
use crate::request::SwitchRequest;
use crate::telemetry;

/// Result of intercepting a request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Stateless mode switched identity: the request should proceed with the new credential.
    Proceed,

    /// The identity was switched: clients should be redirected to the given URL.
    Redirect(String),

    /// The request did not ask to switch identity and was left untouched.
    Skip,
}

/// Switch the identity of principals on request, and revert them to their original identity.
///
/// Requests carrying the trigger parameter (`_switch_user` by default) are handled as follow:
///
/// - The reserved [`EXIT_SENTINEL`] value restores the original credential.
/// - Any other value is the identifier of the user to impersonate.
///
/// Authorisation to impersonate is always decided for the original credential,
/// even when the current credential is already impersonating someone.
/// Impersonated credentials therefore always record the true original credential
/// and exiting impersonation always lands back on it.
#[derive(Clone)]
pub struct SwitchUserInterceptor {
    conf: SwitchUserConf,
    directory: Directory,
    filter: Option<Arc<dyn TargetFilter>>,
    notifications: Option<Notifications>,
    oracle: Oracle,
    validator: Validator,
}

impl SwitchUserInterceptor {
    /// Begin building an interceptor with the required collaborators.
    pub fn builder<D, O, V>(
        conf: SwitchUserConf,
        directory: D,
        oracle: O,
        validator: V,
    ) -> SwitchUserInterceptorBuilder
    where
        D: Into<Directory>,
        O: Into<Oracle>,
        V: Into<Validator>,
    {
        SwitchUserInterceptorBuilder {
            conf,
            directory: directory.into(),
            filter: None,
            notifications: None,
            oracle: oracle.into(),
            validator: validator.into(),
        }
    }

    /// Configuration the interceptor was built with.
    pub fn conf(&self) -> &SwitchUserConf {
        &self.conf
    }

    /// Inspect a request and switch the identity in the [`Context::security`] scope if asked to.
    ///
    /// The trigger parameter is removed from the request query as soon as it is found,
    /// before the identity is switched, so it never reaches downstream components
    /// whether switching succeeds or not.
    pub fn handle<R>(&self, context: &Context, request: &mut R) -> Result<Outcome>
    where
        R: SwitchRequest + ?Sized,
    {
        let parameter = &self.conf.parameter;
        let trigger = match query::trigger_value(request.query(), parameter)? {
            None => return Ok(Outcome::Skip),
            Some(trigger) => trigger,
        };
        let stripped = query::strip_parameter(request.query(), parameter)?;
        request.set_query(stripped)?;

        let credential = if trigger == EXIT_SENTINEL {
            telemetry::EXIT_COUNT.inc();
            self.exit(context).map_err(|error| {
                let reason = telemetry::error_reason(&error);
                telemetry::EXIT_ERR.with_label_values(&[reason]).inc();
                error
            })?
        } else {
            telemetry::SWITCH_COUNT.inc();
            self.switch(context, &trigger).map_err(|error| {
                let reason = telemetry::error_reason(&error);
                telemetry::SWITCH_ERR.with_label_values(&[reason]).inc();
                error
            })?
        };
        context.security.replace(credential);

        if self.conf.stateless {
            return Ok(Outcome::Proceed);
        }
        let url = self
            .conf
            .target_url
            .clone()
            .unwrap_or_else(|| request.url());
        Ok(Outcome::Redirect(url))
    }
}

impl SwitchUserInterceptor {
    /// Determine the credential to restore when exiting impersonation.
    fn exit(&self, context: &Context) -> Result<Credential> {
        let current = context
            .security
            .credential()
            .ok_or(CredentialsNotFound::Missing)?;
        let original = match current {
            Credential::Direct(_) => anyhow::bail!(CredentialsNotFound::NotImpersonated),
            Credential::Impersonated(impersonated) => impersonated.original,
        };
        slog::info!(
            context.logger, "Exiting impersonation";
            "original" => original.principal.identifier(),
        );

        // Principals with no account record can't be refreshed nor announced.
        let refreshed = match original.principal.user() {
            None => None,
            Some(user) => Some(self.directory.refresh(context, user)?),
        };
        let user = match refreshed {
            None => return Ok(Credential::from(original)),
            Some(user) => user,
        };

        let original = Credential::from(original.rebuild(user.clone()));
        self.notify(context, ImpersonationEvent::new(user, original))
    }

    /// Deliver an event to observers, if any, and return the credential it ends up with.
    fn notify(&self, context: &Context, mut event: ImpersonationEvent) -> Result<Credential> {
        if let Some(notifications) = &self.notifications {
            notifications.publish(context, &mut event, TOPIC_SWITCH_USER)?;
        }
        Ok(event.into_credential())
    }

    /// Determine the credential to impersonate the user identified by `identifier`.
    fn switch(&self, context: &Context, identifier: &str) -> Result<Credential> {
        let current = context
            .security
            .credential()
            .ok_or(CredentialsNotFound::Missing)?;
        if current.is_impersonated() && current.identifier() == identifier {
            slog::debug!(
                context.logger, "Already impersonating the requested user";
                "target" => identifier,
            );
            return Ok(current);
        }

        // Decisions are always made for the true original credential.
        let anchor: DirectCredential = current.anchor().clone();
        let acting = Credential::from(anchor.clone());
        let entity = acting.identifier();
        slog::info!(
            context.logger, "Attempting to switch user";
            "entity" => entity,
            "target" => identifier,
        );

        let user = match self.directory.resolve(context, identifier) {
            Ok(user) => user,
            Err(error) if error.is::<UnknownIdentifier>() => {
                slog::debug!(
                    context.logger, "Switch user target not found";
                    "entity" => entity,
                    "target" => identifier,
                    "cause" => %error,
                );
                anyhow::bail!(AccessDenied::deny(entity, identifier));
            }
            Err(error) => return Err(error),
        };

        let allowed = self
            .filter
            .as_ref()
            .map(|filter| filter.allow(context, &user))
            .unwrap_or(true);
        if !allowed {
            slog::warn!(
                context.logger, "Switch user target rejected by filter";
                "entity" => entity,
                "target" => identifier,
            );
            anyhow::bail!(AccessDenied::deny(entity, identifier));
        }

        let capabilities = [self.conf.role.clone()];
        let granted = self
            .oracle
            .decide(context, &acting, &capabilities, Some(&user))?;
        if !granted {
            slog::warn!(
                context.logger, "Switch user denied";
                "entity" => entity,
                "target" => identifier,
                "capability" => &self.conf.role,
            );
            anyhow::bail!(AccessDenied::deny(entity, identifier));
        }

        self.validator.validate_post_resolution(context, &user)?;

        let credential = ImpersonatedCredential::new(user.clone(), &self.conf.scope, anchor);
        let credential = self.notify(context, ImpersonationEvent::new(user, credential.into()))?;
        slog::info!(
            context.logger, "Switched user";
            "entity" => entity,
            "target" => credential.identifier(),
        );
        Ok(credential)
    }
}

/// Collect optional collaborators and build a [`SwitchUserInterceptor`].
pub struct SwitchUserInterceptorBuilder {
    conf: SwitchUserConf,
    directory: Directory,
    filter: Option<Arc<dyn TargetFilter>>,
    notifications: Option<Notifications>,
    oracle: Oracle,
    validator: Validator,
}

impl SwitchUserInterceptorBuilder {
    /// Validate the configuration and build the [`SwitchUserInterceptor`].
    ///
    /// Fails with a [`ConfigurationError`](crate::errors::ConfigurationError)
    /// if the configured scope is empty.
    pub fn build(self) -> Result<SwitchUserInterceptor> {
        self.conf.validate()?;
        Ok(SwitchUserInterceptor {
            conf: self.conf,
            directory: self.directory,
            filter: self.filter,
            notifications: self.notifications,
            oracle: self.oracle,
            validator: self.validator,
        })
    }

    /// Restrict the users that can be impersonated.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: TargetFilter + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Announce identity switches on a notification bus.
    pub fn notifications<N>(mut self, notifications: N) -> Self
    where
        N: Into<Notifications>,
    {
        self.notifications = Some(notifications.into());
        self
    }
}
