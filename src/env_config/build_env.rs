use super::models::app_config::AppConfig;
use super::models::app_env::{AppEnv, Env};
use crate::error::{AppError, Result};
use std::env;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const DEFAULT_CONFIG_DIR: &str = "config";

impl AppEnv {
    pub fn new() -> Result<AppEnv> {
        let env = Env::from_str(&get_env_var("ENV")?).map_err(AppError::Config)?;
        let server_port = get_env_var("SERVER_PORT")?
            .parse()
            .map_err(|_| AppError::Config("SERVER_PORT must be a number".to_string()))?;

        Ok(AppEnv {
            env,
            server_port,
            server_address: get_env_var("SERVER_ADDRESS")?,
            config_dir: env::var("CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string()),
        })
    }
}

impl AppConfig {
    /// Loads `<config_dir>/<env>.toml` and validates it.
    pub fn new(app_env: &AppEnv) -> Result<AppConfig> {
        let path = Path::new(&app_env.config_dir).join(format!("{}.toml", app_env.env));
        debug!("Loading configuration from {}", path.display());

        let raw = std::fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;

        AppConfig::from_toml_str(&raw)
    }
}

fn get_env_var(name: &str) -> Result<String> {
    env::var(name).map_err(|_| AppError::Config(format!("ENV -> {} is not set", name)))
}
