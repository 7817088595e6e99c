use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::files::Placement;
use crate::obs::Hotkeys;
use crate::recording::RecorderSettings;
use crate::trim::RetryPolicy;

/// Written to disk when no config file exists yet
pub const DEFAULT_CONFIG: &str = include_str!("../config/lift-replays.toml");

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub obs: ObsConfig,
    pub recording: RecordingConfig,
    pub transcoder: TranscoderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct ObsConfig {
    pub url: String,
    pub handshake_timeout_ms: u64,
    #[serde(default)]
    pub hotkeys: Hotkeys,
}

#[derive(Debug, Deserialize)]
pub struct RecordingConfig {
    pub capture_dir: String,
    pub video_dir: String,
    pub raw_extension: String,
    pub output_extension: String,
    pub lead_ms: i64,
    pub settle_delay_ms: u64,
    #[serde(default)]
    pub placement: Placement,
}

#[derive(Debug, Deserialize)]
pub struct TranscoderConfig {
    pub path: String,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("LIFT_REPLAYS").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load `path`, first writing the default config there if it is missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file found at {}, creating default", path.display());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write default config to {}", path.display()))?;
        }

        Self::load(path).with_context(|| format!("Failed to load config from {}", path.display()))
    }

    pub fn capture_dir(&self) -> PathBuf {
        expand(&self.recording.capture_dir)
    }

    pub fn video_dir(&self) -> PathBuf {
        expand(&self.recording.video_dir)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.obs.handshake_timeout_ms)
    }

    pub fn recorder_settings(&self) -> RecorderSettings {
        RecorderSettings {
            capture_dir: self.capture_dir(),
            raw_extension: self.recording.raw_extension.clone(),
            output_extension: self.recording.output_extension.clone(),
            lead_ms: self.recording.lead_ms,
            settle_delay: Duration::from_millis(self.recording.settle_delay_ms),
            hotkeys: self.obs.hotkeys.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.transcoder.max_attempts,
            delay: Duration::from_millis(self.transcoder.retry_delay_ms),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("lift-replays.toml");

        let cfg = Config::load_or_create(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.obs.url, "ws://localhost:4444");
        assert_eq!(cfg.obs.hotkeys.stop, "OBS_KEY_F8");
        assert_eq!(cfg.recording.placement, Placement::Move);

        let settings = cfg.recorder_settings();
        assert_eq!(settings.lead_ms, 5000);
        assert_eq!(settings.settle_delay, Duration::from_secs(3));
        assert!(!settings.capture_dir.to_string_lossy().starts_with('~'));

        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(1));
    }
}
