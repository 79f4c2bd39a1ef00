use anyhow::Result;

use switchuser_context::Context;

use super::AccessDenied;
use super::AccessOracle;
use super::Oracle;
use super::TargetFilter;
use crate::Credential;
use crate::DirectCredential;
use crate::UserRecord;

/// Test oracle granting access to credentials holding all requested capabilities.
struct Holds;

impl AccessOracle for Holds {
    fn decide(
        &self,
        _: &Context,
        acting: &Credential,
        capabilities: &[String],
        _: Option<&UserRecord>,
    ) -> Result<bool> {
        Ok(capabilities.iter().all(|cap| acting.has_capability(cap)))
    }
}

/// Test oracle unable to make decisions.
struct Broken;

impl AccessOracle for Broken {
    fn decide(
        &self,
        _: &Context,
        _: &Credential,
        _: &[String],
        _: Option<&UserRecord>,
    ) -> Result<bool> {
        anyhow::bail!("policy engine unavailable")
    }
}

fn capabilities() -> Vec<String> {
    vec!["ROLE_ALLOWED_TO_SWITCH".to_string()]
}

#[test]
fn access_denied_message() {
    let error = AccessDenied::deny("admin", "kuba");
    assert_eq!(
        error.to_string(),
        "entity \"admin\" is not allowed to switch to \"kuba\""
    );
    assert_eq!(error.entity(), "admin");
    assert_eq!(error.target(), "kuba");
}

#[test]
fn closure_filter() {
    let context = Context::fixture();
    let filter = |user: &UserRecord| user.identifier != "root";
    assert!(filter.allow(&context, &UserRecord::new("kuba")));
    assert!(!filter.allow(&context, &UserRecord::new("root")));
}

#[test]
fn oracle_allows() {
    let context = Context::fixture();
    let oracle = Oracle::from(Holds);
    let acting = DirectCredential::new("admin", "main").with_capabilities(capabilities());
    let subject = UserRecord::new("kuba");
    let decision = oracle
        .decide(&context, &acting.into(), &capabilities(), Some(&subject))
        .unwrap();
    assert!(decision);
}

#[test]
fn oracle_denies() {
    let context = Context::fixture();
    let oracle = Oracle::from(Holds);
    let acting = DirectCredential::new("admin", "main");
    let decision = oracle
        .decide(&context, &acting.into(), &capabilities(), None)
        .unwrap();
    assert!(!decision);
}

#[test]
fn oracle_errors_propagate() {
    let context = Context::fixture();
    let oracle = Oracle::from(Broken);
    let acting = DirectCredential::new("admin", "main");
    let error = oracle
        .decide(&context, &acting.into(), &capabilities(), None)
        .unwrap_err();
    assert_eq!(error.to_string(), "policy engine unavailable");
}
