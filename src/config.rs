use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// Create-test endpoint; when unset submissions go to the logging stub.
    pub save_endpoint_url: Option<String>,
    pub save_timeout_secs: u64,
    /// Where the vendor lands after a successful save or a confirmed cancel.
    pub dashboard_path: String,
    pub max_import_bytes: usize,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            save_endpoint_url: env::var("SAVE_ENDPOINT_URL").ok().filter(|v| !v.trim().is_empty()),
            save_timeout_secs: get_env_parse_or("SAVE_TIMEOUT_SECS", 30)?,
            dashboard_path: env::var("DASHBOARD_PATH")
                .unwrap_or_else(|_| "/vendor/dashboard".to_string()),
            max_import_bytes: get_env_parse_or("MAX_IMPORT_BYTES", 5 * 1024 * 1024)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: "127.0.0.1:8080".to_string(),
            save_endpoint_url: None,
            save_timeout_secs: 30,
            dashboard_path: "/vendor/dashboard".to_string(),
            max_import_bytes: 5 * 1024 * 1024,
        }
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, fallback: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(fallback),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
