//! Interfaces to deliver [`ImpersonationEvent`]s to interested observers.
use std::sync::Arc;

use anyhow::Result;

use switchuser_context::Context;

use super::ImpersonationEvent;

/// Operations implemented by notification buses supported by switch user.
pub trait NotificationBus: Send + Sync {
    /// Synchronously deliver a mutable event to all observers of a topic.
    ///
    /// Observers may replace the event's credential while the event is delivered.
    fn publish(&self, context: &Context, event: &mut ImpersonationEvent, topic: &str)
        -> Result<()>;
}

/// Publish events onto a [`NotificationBus`].
#[derive(Clone)]
pub struct Notifications(Arc<dyn NotificationBus>);

impl Notifications {
    /// Synchronously deliver a mutable event to all observers of a topic.
    pub fn publish(
        &self,
        context: &Context,
        event: &mut ImpersonationEvent,
        topic: &str,
    ) -> Result<()> {
        self.0.publish(context, event, topic)
    }
}

impl<T> From<T> for Notifications
where
    T: NotificationBus + 'static,
{
    fn from(value: T) -> Self {
        Notifications(Arc::new(value))
    }
}

/// Logic to run when an [`ImpersonationEvent`] is published.
///
/// Any `Fn(&mut ImpersonationEvent) -> Result<()>` closure is a valid observer.
pub trait Observer: Send + Sync {
    /// Inspect and optionally update the event.
    fn notify(&self, context: &Context, event: &mut ImpersonationEvent) -> Result<()>;
}

impl<F> Observer for F
where
    F: Fn(&mut ImpersonationEvent) -> Result<()> + Send + Sync,
{
    fn notify(&self, _: &Context, event: &mut ImpersonationEvent) -> Result<()> {
        self(event)
    }
}

/// In-process [`NotificationBus`] fanning events out to subscribed observers.
///
/// Observers are notified in subscription order.
/// The first observer to fail stops delivery and its error is returned to the publisher.
#[derive(Clone, Default)]
pub struct ObserverBus {
    observers: Vec<(String, Arc<dyn Observer>)>,
}

impl ObserverBus {
    /// Subscribe an observer to events published on `topic`.
    pub fn subscribe<S, O>(mut self, topic: S, observer: O) -> Self
    where
        S: Into<String>,
        O: Observer + 'static,
    {
        self.observers.push((topic.into(), Arc::new(observer)));
        self
    }
}

impl NotificationBus for ObserverBus {
    fn publish(
        &self,
        context: &Context,
        event: &mut ImpersonationEvent,
        topic: &str,
    ) -> Result<()> {
        let observers = self
            .observers
            .iter()
            .filter(|(subscribed, _)| subscribed == topic);
        for (_, observer) in observers {
            observer.notify(context, event)?;
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-fixture"))]
pub use self::fixture::NotificationsFixture;

#[cfg(any(test, feature = "test-fixture"))]
mod fixture {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::MutexGuard;

    use anyhow::Result;

    use switchuser_context::Context;
    use switchuser_models::Credential;

    use super::ImpersonationEvent;
    use super::NotificationBus;

    /// Introspection tools for events published during unit tests.
    ///
    /// Clones of the fixture share the record of published events.
    #[derive(Clone, Default)]
    pub struct NotificationsFixture {
        inner: Arc<Mutex<FixtureState>>,
    }

    impl NotificationsFixture {
        /// Initialise a notification bus fixture for unit tests.
        pub fn new() -> NotificationsFixture {
            NotificationsFixture::default()
        }

        /// Remove and return the events published so far, along with their topic.
        pub fn published(&self) -> Vec<(String, ImpersonationEvent)> {
            std::mem::take(&mut self.access().published)
        }

        /// Replace the credential of every event published from now on.
        pub fn replace_with(&self, credential: Credential) {
            self.access().replacement = Some(credential);
        }
    }

    impl NotificationsFixture {
        fn access(&self) -> MutexGuard<'_, FixtureState> {
            self.inner
                .lock()
                .expect("NotificationsFixture::inner state lock poisoned")
        }
    }

    impl NotificationBus for NotificationsFixture {
        fn publish(
            &self,
            _: &Context,
            event: &mut ImpersonationEvent,
            topic: &str,
        ) -> Result<()> {
            let mut state = self.access();
            state.published.push((topic.to_string(), event.clone()));
            if let Some(credential) = state.replacement.clone() {
                event.replace_credential(credential);
            }
            Ok(())
        }
    }

    /// Container for the shared state.
    #[derive(Default)]
    struct FixtureState {
        published: Vec<(String, ImpersonationEvent)>,
        replacement: Option<Credential>,
    }
}
