use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::pipeline::PipelineOptions;
use crate::resample::{InterpolationMode, ResampleOptions, SpeedUnit};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid flush_timeout '{value}': {message}")]
    InvalidDuration { value: String, message: String },
    #[error("channel_capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub resample: ResampleConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResampleConfig {
    #[serde(default)]
    pub interpolation: InterpolationMode,
    #[serde(default)]
    pub speed_unit: SpeedUnit,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Human readable duration, e.g. `30s` or `2m`.
    #[serde(default = "default_flush_timeout")]
    pub flush_timeout: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            flush_timeout: default_flush_timeout(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: default_output(),
            resample: ResampleConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("output.csv")
}

fn default_channel_capacity() -> usize {
    crate::pipeline::DEFAULT_CHANNEL_CAPACITY
}

fn default_flush_timeout() -> String {
    humantime::format_duration(crate::pipeline::DEFAULT_FLUSH_TIMEOUT).to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.pipeline_options()?;
        Ok(config)
    }

    pub fn resample_options(&self) -> ResampleOptions {
        ResampleOptions {
            interpolation: self.resample.interpolation,
            speed_unit: self.resample.speed_unit,
        }
    }

    pub fn pipeline_options(&self) -> Result<PipelineOptions, ConfigError> {
        if self.pipeline.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(PipelineOptions {
            channel_capacity: self.pipeline.channel_capacity,
            flush_timeout: parse_duration(&self.pipeline.flush_timeout)?,
        })
    }
}

fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(s.trim()).map_err(|e| ConfigError::InvalidDuration {
        value: s.to_string(),
        message: e.to_string(),
    })
}
