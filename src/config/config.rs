use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::metrics::MetricsServerConfig;
use crate::error::Result;

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_ENV: &str = "UPDATEIP_CONFIG";

/// Prefix for environment overrides, e.g. `UPDATEIP_METRICS__PORT=9100`.
pub const ENV_PREFIX: &str = "UPDATEIP_";

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsServerConfig,
}

/// Builds the figment for a YAML file plus `UPDATEIP_` environment overrides.
pub fn figment_for(path: impl AsRef<Path>) -> Figment {
    Figment::new()
        .merge(Yaml::file(path.as_ref()))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"))
}

/// Extracts a versioned configuration from a figment.
pub fn extract_config(figment: &Figment) -> Result<ConfigV1> {
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<ConfigV1> {
    extract_config(&figment_for(path))
}

/// Load config from `$UPDATEIP_CONFIG`, or "config.yaml" in the current directory.
///
/// Exits the process when the configuration cannot be loaded.
pub fn load_config() -> ConfigV1 {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    match load_config_from(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading configuration from {}: {}", path, e);
            std::process::exit(1);
        }
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() {
    let schema = schema_for!(Config);
    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Could not serialize configuration schema: {}", e),
    }
}
