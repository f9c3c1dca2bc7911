//! Pipeline configuration loaded from a TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! Reef Check Caribbean hard-coral settings. See `reefcheck.toml` at the crate
//! root for an annotated example.

use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::{
    CENTURY_PREFIX, DATA_SOURCE, DATE_DELIMITER, HARD_CORAL, METHOD, POINTS_PER_SEGMENT, REGION,
};

/// How the converter signs decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignPolicy {
    /// Negate southern latitudes and western longitudes.
    #[default]
    Cardinal,
    /// Leave every coordinate positive, ignoring the direction letter.
    Unsigned,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Substrate code whose percent cover is computed.
    pub target_substrate: String,
    pub points_per_segment: u32,
    pub date_delimiter: String,
    pub century_prefix: String,
    pub sign_policy: SignPolicy,
    pub region: String,
    pub method: String,
    pub data_source: String,
    /// Sort the final table by reef id and date instead of first-seen order.
    pub sort_output: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_substrate: HARD_CORAL.to_string(),
            points_per_segment: POINTS_PER_SEGMENT,
            date_delimiter: DATE_DELIMITER.to_string(),
            century_prefix: CENTURY_PREFIX.to_string(),
            sign_policy: SignPolicy::default(),
            region: REGION.to_string(),
            method: METHOD.to_string(),
            data_source: DATA_SOURCE.to_string(),
            sort_output: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl PipelineConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.points_per_segment == 0 {
            return Err(ConfigError::Invalid(
                "points_per_segment must be greater than zero".to_string(),
            ));
        }
        if self.target_substrate.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "target_substrate must not be empty".to_string(),
            ));
        }
        if self.date_delimiter.is_empty() {
            return Err(ConfigError::Invalid(
                "date_delimiter must not be empty".to_string(),
            ));
        }
        if self.century_prefix.len() != 2 || !self.century_prefix.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ConfigError::Invalid(format!(
                "century_prefix must be two digits, got '{}'",
                self.century_prefix
            )));
        }
        Ok(())
    }
}

/// Load the pipeline configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    PipelineConfig::from_toml_str(&text)
}
