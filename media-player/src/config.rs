use std::path::Path;
use std::time::Duration;

use common::logging::LoggingConfig;
use common::run_loop::LoopSettings;
use common::{Result, SessionError};
use serde::{Deserialize, Serialize};

use crate::policy::ScriptedPolicy;

/// Player configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Pipeline topology: factories and element names
    pub elements: PlayerElements,

    /// Progress monitor settings
    pub monitor: MonitorConfig,

    /// Scripted skip-ahead / speed-up policy
    pub policy: ScriptedPolicy,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerElements {
    pub pipeline_name: String,
    pub source_factory: String,
    pub source_name: String,
    pub convert_factory: String,
    pub convert_name: String,
    pub sink_factory: String,

    /// Also the element whose state changes drive the session
    pub sink_name: String,

    /// Only source pads whose media type starts with this are linked
    pub accepted_media_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Progress monitor refresh interval
    #[serde(with = "common::serde_helpers::millis")]
    pub refresh_interval: Duration,
}

impl Default for PlayerElements {
    fn default() -> Self {
        Self {
            pipeline_name: "music-pipeline".to_string(),
            source_factory: "uridecodebin".to_string(),
            source_name: "music-source".to_string(),
            convert_factory: "audioconvert".to_string(),
            convert_name: "music-convert".to_string(),
            sink_factory: "autoaudiosink".to_string(),
            sink_name: "music-sink".to_string(),
            accepted_media_prefix: "audio/x-raw".to_string(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(10),
        }
    }
}

impl PlayerConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub async fn load(path: &Path) -> Result<Self> {
        let config: Self = common::config::load_or_default(path).await?;
        config.validate()?;
        Ok(config)
    }

    /// Applies the `MPLAYER_*` variables and validates the result again.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        EnvConfigOverride::apply_overrides(&mut self);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let names = [
            &self.elements.pipeline_name,
            &self.elements.source_name,
            &self.elements.convert_name,
            &self.elements.sink_name,
        ];
        if names.iter().any(|name| name.is_empty()) {
            return Err(SessionError::Configuration {
                message: "Element names cannot be empty".to_string(),
            });
        }

        if self.elements.accepted_media_prefix.is_empty() {
            return Err(SessionError::Configuration {
                message: "Accepted media prefix cannot be empty".to_string(),
            });
        }

        if self.monitor.refresh_interval.is_zero() {
            return Err(SessionError::Configuration {
                message: "Refresh interval must be greater than 0".to_string(),
            });
        }

        self.policy.validate()
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            tick_interval: self.monitor.refresh_interval,
            ..LoopSettings::default()
        }
    }
}

/// Environment-based configuration override
pub struct EnvConfigOverride;

impl EnvConfigOverride {
    /// Apply environment variable overrides to configuration
    pub fn apply_overrides(config: &mut PlayerConfig) {
        use common::config::env_override;

        if let Some(level) = env_override::<String>("MPLAYER_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(millis) = env_override::<u64>("MPLAYER_REFRESH_MS") {
            config.monitor.refresh_interval = Duration::from_millis(millis);
        }
        if let Some(enabled) = env_override::<String>("MPLAYER_POLICY_ENABLED") {
            config.policy.enabled = enabled.to_lowercase() == "true";
        }
        if let Some(sink) = env_override::<String>("MPLAYER_SINK") {
            config.elements.sink_factory = sink;
        }
    }
}
