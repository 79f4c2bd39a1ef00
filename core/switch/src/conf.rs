//! Switch user configuration object and loading helpers.
use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::ConfigurationError;

/// Default name of the query parameter that triggers switch user.
pub const DEFAULT_PARAMETER: &str = "_switch_user";

/// Default capability a credential must hold to switch user.
pub const DEFAULT_ROLE: &str = "ROLE_ALLOWED_TO_SWITCH";

/// Reserved trigger value requesting to exit impersonation.
pub const EXIT_SENTINEL: &str = "_exit";

/// Configuration of the switch user interceptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchUserConf {
    /// Name of the query parameter that triggers switch user.
    #[serde(default = "SwitchUserConf::default_parameter")]
    pub parameter: String,

    /// Capability the original credential must hold to switch user.
    #[serde(default = "SwitchUserConf::default_role")]
    pub role: String,

    /// Identifier of the scope issuing impersonated credentials.
    pub scope: String,

    /// Skip redirects after switching user.
    ///
    /// Stateless clients are expected to send the trigger with every request.
    #[serde(default)]
    pub stateless: bool,

    /// Redirect clients to this URL instead of the current one after switching user.
    #[serde(default)]
    pub target_url: Option<String>,
}

impl SwitchUserConf {
    /// Default configuration for the given scope.
    pub fn new<S: Into<String>>(scope: S) -> SwitchUserConf {
        SwitchUserConf {
            parameter: Self::default_parameter(),
            role: Self::default_role(),
            scope: scope.into(),
            stateless: false,
            target_url: None,
        }
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.scope.is_empty() {
            anyhow::bail!(ConfigurationError::EmptyScope);
        }
        if self.parameter.is_empty() {
            anyhow::bail!(ConfigurationError::EmptyParameter);
        }
        Ok(())
    }
}

impl SwitchUserConf {
    fn default_parameter() -> String {
        DEFAULT_PARAMETER.to_string()
    }

    fn default_role() -> String {
        DEFAULT_ROLE.to_string()
    }
}

/// Errors loading switch user configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The switch user configuration file is not valid YAML for [`SwitchUserConf`].
    #[error("switch user configuration at '{0}' is not valid")]
    Decode(String),

    /// The switch user configuration file exists but could not be read.
    #[error("switch user configuration at '{0}' could not be read")]
    Open(String),

    /// No switch user configuration file exists at the path.
    #[error("switch user configuration not found at '{0}'")]
    PathNotFound(String),
}

/// Load and validate switch user configuration from the YAML file at the specified path.
pub fn load(path: &str) -> Result<SwitchUserConf> {
    if !PathBuf::from(path).exists() {
        let error = Error::PathNotFound(path.to_string());
        let error = anyhow::anyhow!(error);
        return Err(error);
    }

    let file = File::open(path).with_context(|| Error::Open(path.into()))?;
    let conf: SwitchUserConf =
        serde_yaml::from_reader(file).with_context(|| Error::Decode(path.into()))?;
    conf.validate()?;
    Ok(conf)
}
