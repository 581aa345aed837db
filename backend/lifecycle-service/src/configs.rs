use std::path::PathBuf;

use common_utils::{consts, masking::Secret};
use domain_types::{
    router_data::ConnectorAuthType,
    types::{Connectors, Proxy},
};

use crate::logger::config::Log;

#[derive(Clone, serde::Deserialize, Debug)]
pub struct Config {
    pub common: Common,
    pub log: Log,
    pub proxy: Proxy,
    pub connectors: Connectors,
    pub gateway_credentials: GatewayCredentials,
    #[serde(default)]
    pub http_client: HttpClient,
}

#[derive(Clone, serde::Deserialize, Debug)]
pub struct Common {
    pub environment: consts::Env,
}

impl Common {
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let Self { environment } = self;
        match environment {
            consts::Env::Development | consts::Env::Production | consts::Env::Sandbox => Ok(()),
        }
    }
}

/// Password grant credentials issued to the merchant by the gateway.
#[derive(Clone, serde::Deserialize, Debug)]
pub struct GatewayCredentials {
    pub client_id: Secret<String>,
    pub client_secret: Secret<String>,
    pub username: Secret<String>,
    pub password: Secret<String>,
}

impl GatewayCredentials {
    /// The auth variant the connector expects, carrying all four credentials.
    pub fn auth_type(&self) -> ConnectorAuthType {
        ConnectorAuthType::MultiAuthKey {
            api_key: self.username.clone(),
            key1: self.client_id.clone(),
            api_secret: self.password.clone(),
            key2: self.client_secret.clone(),
        }
    }
}

#[derive(Clone, serde::Deserialize, Debug)]
#[serde(default)]
pub struct HttpClient {
    /// Seconds an outbound gateway call may run before it is abandoned.
    pub request_timeout: u64,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self {
            request_timeout: consts::REQUEST_TIME_OUT,
        }
    }
}

impl Config {
    /// Function to build the configuration by picking it from default locations
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::new_with_config_path(None)
    }

    /// Function to build the configuration by picking it from default locations
    pub fn new_with_config_path(
        explicit_config_path: Option<PathBuf>,
    ) -> Result<Self, config::ConfigError> {
        let env = consts::Env::current_env();
        let config_path = Self::config_path(&env, explicit_config_path);

        let config = Self::builder(&env)?
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(consts::ENV_PREFIX)
                    .try_parsing(true)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("proxy.bypass_proxy_urls"),
            )
            .build()?;

        #[allow(clippy::print_stderr)]
        let config: Self = serde_path_to_error::deserialize(config).map_err(|error| {
            eprintln!("Unable to deserialize application configuration: {error}");
            error.into_inner()
        })?;

        // Validate the environment field
        config.common.validate()?;

        Ok(config)
    }

    pub fn builder(
        environment: &consts::Env,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            // Here, it should be `set_override()` not `set_default()`.
            // "common.environment" can't be altered by config field.
            // Should be single source of truth.
            .set_override("common.environment", environment.to_string())
    }

    /// Config path. An explicit path wins over the `CONFIG_PATH` variable,
    /// which wins over the per-environment file under `config/`.
    pub fn config_path(
        environment: &consts::Env,
        explicit_config_path: Option<PathBuf>,
    ) -> PathBuf {
        let explicit_config_path =
            explicit_config_path.or_else(|| std::env::var_os(consts::CONFIG_PATH).map(PathBuf::from));
        let mut config_path = PathBuf::new();
        if let Some(explicit_config_path_val) = explicit_config_path {
            config_path.push(explicit_config_path_val);
        } else {
            let config_directory: String = "config".into();
            let config_file_name = environment.config_path();

            config_path.push(workspace_path());
            config_path.push(config_directory);
            config_path.push(config_file_name);
        }
        config_path
    }
}

pub fn workspace_path() -> PathBuf {
    if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
        let mut path = PathBuf::from(manifest_dir);
        path.pop();
        path.pop();
        path
    } else {
        PathBuf::from(".")
    }
}
