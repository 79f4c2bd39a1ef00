//! Telemetry related to switching user.
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use anyhow::Result;
use once_cell::sync::Lazy;
use prometheus::Counter;
use prometheus::CounterVec;
use prometheus::Opts;

use switchuser_auth::access::AccessDenied;
use switchuser_auth::validator::AccountStatusError;

use crate::errors::CredentialsNotFound;

/// Total number of requests to exit impersonation.
pub static EXIT_COUNT: Lazy<Counter> = Lazy::new(|| {
    Counter::new(
        "switchuser_exit_count",
        "Total number of requests to exit impersonation",
    )
    .expect("failed to initialise EXIT_COUNT counter")
});

/// Number of requests to exit impersonation that resulted in error.
pub static EXIT_ERR: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        Opts::new(
            "switchuser_exit_error",
            "Number of requests to exit impersonation that resulted in error",
        ),
        &["reason"],
    )
    .expect("failed to initialise EXIT_ERR counter")
});

/// Total number of requests to switch user.
pub static SWITCH_COUNT: Lazy<Counter> = Lazy::new(|| {
    Counter::new(
        "switchuser_switch_count",
        "Total number of requests to switch user",
    )
    .expect("failed to initialise SWITCH_COUNT counter")
});

/// Number of requests to switch user that resulted in error.
pub static SWITCH_ERR: Lazy<CounterVec> = Lazy::new(|| {
    CounterVec::new(
        Opts::new(
            "switchuser_switch_error",
            "Number of requests to switch user that resulted in error",
        ),
        &["reason"],
    )
    .expect("failed to initialise SWITCH_ERR counter")
});

/// Ensure metrics are registered only once.
static METRICS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// The first time this method is called it will register the switch user metrics.
pub fn register_metrics(reg: &prometheus::Registry) -> Result<()> {
    // Skip registration if already done before.
    if METRICS_REGISTERED.swap(true, Ordering::AcqRel) {
        return Ok(());
    }

    let collectors: [Box<dyn prometheus::core::Collector>; 4] = [
        Box::new(EXIT_COUNT.clone()),
        Box::new(EXIT_ERR.clone()),
        Box::new(SWITCH_COUNT.clone()),
        Box::new(SWITCH_ERR.clone()),
    ];
    for collector in collectors {
        reg.register(collector)?;
    }
    Ok(())
}

/// Classify errors into a low cardinality label for metrics.
pub(crate) fn error_reason(error: &anyhow::Error) -> &'static str {
    if error.is::<AccessDenied>() {
        "access_denied"
    } else if error.is::<AccountStatusError>() {
        "account_status"
    } else if error.is::<CredentialsNotFound>() {
        "credentials_not_found"
    } else {
        "other"
    }
}
