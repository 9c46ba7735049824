//! Configuration management for the dithering studio.
//!
//! Handles loading, saving, and validating configuration from JSON files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::image_proc::Params;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "ditherdrop.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Optional URL of a source image to fetch
    #[serde(default)]
    pub image_url: String,

    /// Collapse the image to grayscale before dithering
    #[serde(default)]
    pub grayscale: bool,

    /// Downscale divisor / upscale multiplier for the dither pattern (1-100)
    #[serde(default = "default_scale_factor")]
    pub scale_factor: u32,

    /// Long-edge bound applied to incoming sources before processing
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// Web server port
    #[serde(default = "default_web_port")]
    pub web_port: u16,

    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

fn default_scale_factor() -> u32 {
    2
}

fn default_max_dimension() -> u32 {
    1920
}

fn default_web_port() -> u16 {
    8888
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_url: String::new(),
            grayscale: false,
            scale_factor: default_scale_factor(),
            max_dimension: default_max_dimension(),
            web_port: default_web_port(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file atomically
    ///
    /// Write-to-temp-then-rename so a crash mid-write never leaves a
    /// truncated config behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;

        let tmp_path = path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &content)?;

        std::fs::rename(&tmp_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp_path);
            ConfigError::ReadError(e)
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scale_factor < 1 || self.scale_factor > 100 {
            return Err(ConfigError::ValidationError(
                "scale_factor must be between 1 and 100".to_string(),
            ));
        }

        if self.max_dimension < 100 || self.max_dimension > 4096 {
            return Err(ConfigError::ValidationError(
                "max_dimension must be between 100 and 4096".to_string(),
            ));
        }

        if self.web_port == 0 {
            return Err(ConfigError::ValidationError(
                "web_port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The dithering parameters for one processing pass
    pub fn params(&self) -> Params {
        Params {
            grayscale: self.grayscale,
            scale_factor: self.scale_factor,
        }
    }

    /// Check if a source image URL is configured
    pub fn has_image_url(&self) -> bool {
        !self.image_url.trim().is_empty()
    }
}
