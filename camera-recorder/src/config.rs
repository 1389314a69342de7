use std::path::Path;
use std::time::Duration;

use common::logging::LoggingConfig;
use common::run_loop::LoopSettings;
use common::{Result, SessionError};
use serde::{Deserialize, Serialize};

/// Recorder configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecorderConfig {
    /// Capture devices
    pub devices: CaptureDevices,

    /// Pipeline topology: factories and element names
    pub elements: RecorderElements,

    /// Progress monitor and shutdown settings
    pub monitor: RecorderMonitorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CaptureDevices {
    /// ALSA device of the audio source
    pub audio: String,
    /// Video4Linux device node of the video source
    pub video: String,
}

impl Default for CaptureDevices {
    fn default() -> Self {
        Self {
            audio: "hw:1,0".to_string(),
            video: "/dev/video0".to_string(),
        }
    }
}

/// 元件工厂名与实例名
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecorderElements {
    pub pipeline_name: String,
    pub audio_source_factory: String,
    pub audio_source_name: String,
    pub video_source_factory: String,
    pub video_source_name: String,
    pub audio_encoder_factory: String,
    pub audio_encoder_name: String,
    pub video_encoder_factory: String,
    pub video_encoder_name: String,
    pub queue_factory: String,
    pub queue_name: String,
    pub muxer_factory: String,
    pub muxer_name: String,
    pub sink_factory: String,

    /// Also the element whose state changes drive the session
    pub sink_name: String,
}

impl Default for RecorderElements {
    fn default() -> Self {
        Self {
            pipeline_name: "record-pipeline".to_string(),
            audio_source_factory: "alsasrc".to_string(),
            audio_source_name: "audio-source".to_string(),
            video_source_factory: "v4l2src".to_string(),
            video_source_name: "video-source".to_string(),
            audio_encoder_factory: "voaacenc".to_string(),
            audio_encoder_name: "audio-enc".to_string(),
            video_encoder_factory: "jpegenc".to_string(),
            video_encoder_name: "video-enc".to_string(),
            queue_factory: "queue".to_string(),
            queue_name: "audio-queue".to_string(),
            muxer_factory: "avimux".to_string(),
            muxer_name: "record-mux".to_string(),
            sink_factory: "filesink".to_string(),
            sink_name: "record-sink".to_string(),
        }
    }
}

impl RecorderElements {
    fn names(&self) -> [&str; 8] {
        [
            self.pipeline_name.as_str(),
            self.audio_source_name.as_str(),
            self.video_source_name.as_str(),
            self.audio_encoder_name.as_str(),
            self.video_encoder_name.as_str(),
            self.queue_name.as_str(),
            self.muxer_name.as_str(),
            self.sink_name.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecorderMonitorConfig {
    /// Progress monitor refresh interval
    #[serde(with = "common::serde_helpers::millis")]
    pub refresh_interval: Duration,

    /// How long to wait for the file to be finalized after an interrupt
    #[serde(with = "common::serde_helpers::millis")]
    pub drain_timeout: Duration,
}

impl Default for RecorderMonitorConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(10),
            drain_timeout: Duration::from_secs(5),
        }
    }
}

impl RecorderConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub async fn load(path: &Path) -> Result<Self> {
        let config: Self = common::config::load_or_default(path).await?;
        config.validate()?;
        Ok(config)
    }

    /// Applies the `RECORDER_*` variables and validates the result again.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        EnvConfigOverride::apply_overrides(&mut self);
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.devices.audio.is_empty() || self.devices.video.is_empty() {
            return Err(SessionError::Configuration {
                message: "Capture devices cannot be empty".to_string(),
            });
        }

        if self.elements.names().iter().any(|name| name.is_empty()) {
            return Err(SessionError::Configuration {
                message: "Element names cannot be empty".to_string(),
            });
        }

        let mut names = self.elements.names().to_vec();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.elements.names().len() {
            return Err(SessionError::Configuration {
                message: "Element names must be unique".to_string(),
            });
        }

        if self.monitor.refresh_interval.is_zero() {
            return Err(SessionError::Configuration {
                message: "Refresh interval must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            tick_interval: self.monitor.refresh_interval,
            drain_timeout: self.monitor.drain_timeout,
        }
    }
}

/// Environment-based configuration override
pub struct EnvConfigOverride;

impl EnvConfigOverride {
    /// Apply environment variable overrides to configuration
    pub fn apply_overrides(config: &mut RecorderConfig) {
        use common::config::env_override;

        if let Some(level) = env_override::<String>("RECORDER_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Some(device) = env_override::<String>("RECORDER_AUDIO_DEVICE") {
            config.devices.audio = device;
        }
        if let Some(device) = env_override::<String>("RECORDER_VIDEO_DEVICE") {
            config.devices.video = device;
        }
        if let Some(millis) = env_override::<u64>("RECORDER_DRAIN_TIMEOUT_MS") {
            config.monitor.drain_timeout = Duration::from_millis(millis);
        }
    }
}
