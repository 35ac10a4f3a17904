use anyhow::{anyhow, Result};
use std::path::Path;
use tracing::{debug, info};

use super::runtime::DashboardConfig;

pub const ENV_PREFIX: &str = "DASHBOARD";

/// Loads the config from an optional TOML file, then `DASHBOARD_*` env vars.
pub fn load_config(path: &str) -> Result<DashboardConfig> {
    load_with_prefix(path, ENV_PREFIX)
}

fn load_with_prefix(path: &str, prefix: &str) -> Result<DashboardConfig> {
    if Path::new(path).exists() {
        info!("Loading configuration from {}", path);
    } else {
        debug!("No config file at {}, using defaults and environment", path);
    }

    let settings = ::config::Config::builder()
        .add_source(::config::File::with_name(path).required(false))
        .add_source(
            ::config::Environment::with_prefix(prefix)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("users")
                .with_list_parse_key("containers"),
        )
        .build()?;

    let config: DashboardConfig = settings.try_deserialize()?;
    config
        .validate()
        .map_err(|errors| anyhow!("Invalid configuration: {}", errors.join(", ")))?;

    Ok(config)
}

pub fn to_toml(config: &DashboardConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
