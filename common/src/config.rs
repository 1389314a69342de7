use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SessionError};

/// Loads a TOML configuration file; a missing file yields the defaults.
pub async fn load_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!("No configuration at {:?}, using defaults", path);
        return Ok(T::default());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SessionError::Configuration {
            message: format!("Failed to read config file: {}", e),
        })?;

    parse(&content)
}

pub fn parse<T>(content: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    toml::from_str(content).map_err(|e| SessionError::Configuration {
        message: format!("Failed to parse config file: {}", e),
    })
}

/// Reads `name` from the environment and parses it; unset or unparsable
/// values are ignored.
pub fn env_override<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|value| value.parse().ok())
}
