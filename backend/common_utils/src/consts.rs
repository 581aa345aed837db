//! Commonly used constants

/// Error code used when the gateway reply carries no machine readable code
pub const NO_ERROR_CODE: &str = "No error code";
/// Error message used when the gateway reply carries no human readable message
pub const NO_ERROR_MESSAGE: &str = "No error message";

/// Default number of seconds an outbound gateway call may run before timing out
pub const REQUEST_TIME_OUT: u64 = 30;

/// Prefix for environment variables that override configuration values
pub const ENV_PREFIX: &str = "GATEWAY";

/// Environment variable that selects the deployment environment
pub const RUN_ENV: &str = "RUN_ENV";

/// Environment variable that points at an explicit configuration file
pub const CONFIG_PATH: &str = "CONFIG_PATH";

/// Deployment environments the service can run under. Sandbox and production
/// differ only in the configuration file they load.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Env {
    #[default]
    Development,
    Sandbox,
    Production,
}

impl Env {
    /// Resolve the environment from `RUN_ENV`, defaulting to development.
    pub fn current_env() -> Self {
        std::env::var(RUN_ENV)
            .ok()
            .and_then(|env| env.parse().ok())
            .unwrap_or_default()
    }

    /// Name of the configuration file for this environment.
    pub fn config_path(self) -> &'static str {
        match self {
            Self::Development => "development.toml",
            Self::Sandbox => "sandbox.toml",
            Self::Production => "production.toml",
        }
    }
}
