//! Configuration management
//!
//! This module handles loading and managing configuration from:
//! - Command-line arguments
//! - Configuration files (TOML)
//! - Defaults

use crate::error::{Error, Result};
use crate::pathway::metadata::StateMetadata;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Extra or overriding entries for the state metadata table
    #[serde(default)]
    pub states: Vec<StateEntry>,
}

/// Input dataset layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// CSV file with one row per student observation
    pub path: Option<PathBuf>,

    #[serde(default = "default_id_column")]
    pub id_column: String,

    #[serde(default = "default_group_column")]
    pub group_column: String,

    #[serde(default = "default_offset_column")]
    pub offset_column: String,

    #[serde(default = "default_date_column")]
    pub date_column: String,

    /// chrono format strings tried in order when parsing the reference date
    #[serde(default = "default_date_formats")]
    pub date_formats: Vec<String>,
}

/// Transformation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Native time units folded into one time bucket
    #[serde(default = "default_bucket_units")]
    pub bucket_units: u32,

    /// Keep only records whose reference year is strictly before this year
    pub max_year: Option<i32>,

    /// Last bucket to synthesize; defaults to the largest observed bucket
    pub time_max: Option<u32>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination file (stdout when unset)
    pub path: Option<PathBuf>,

    #[serde(default = "default_output_format")]
    pub format: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// One `[[states]]` table entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateEntry {
    pub key: String,
    pub long_name: String,
    pub sort_order: u32,
    pub color: String,
}

impl StateEntry {
    pub fn metadata(&self) -> StateMetadata {
        StateMetadata::new(&self.long_name, self.sort_order, &self.color)
    }
}

// Default value functions

fn default_id_column() -> String {
    "ID".to_string()
}

fn default_group_column() -> String {
    "GradEnrollGroups".to_string()
}

fn default_offset_column() -> String {
    "TIME_FROM_HSGRAD".to_string()
}

fn default_date_column() -> String {
    "HIGH_SCHOOL_GRAD_DATE".to_string()
}

fn default_date_formats() -> Vec<String> {
    ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%Y-%m-%d %H:%M:%S", "%m/%d/%Y %H:%M"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_bucket_units() -> u32 {
    4
}

fn default_output_format() -> String {
    "json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            id_column: default_id_column(),
            group_column: default_group_column(),
            offset_column: default_offset_column(),
            date_column: default_date_column(),
            date_formats: default_date_formats(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            bucket_units: default_bucket_units(),
            max_year: None,
            time_max: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            format: default_output_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&contents).map_err(|e| Error::ConfigParse {
            file: path.clone(),
            message: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    ///
    /// Searches in order:
    /// 1. ./config.toml
    /// 2. ~/.cohort-pathways/config.toml
    /// 3. /etc/cohort-pathways/config.toml
    pub fn load() -> Result<Self> {
        let paths = vec![
            PathBuf::from("config.toml"),
            dirs::home_dir()
                .map(|h| h.join(".cohort-pathways").join("config.toml"))
                .unwrap_or_else(|| PathBuf::from("/dev/null")),
            PathBuf::from("/etc/cohort-pathways/config.toml"),
        ];

        for path in paths {
            if path.exists() {
                tracing::info!("Loading config from {:?}", path);
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.pipeline.bucket_units > 0,
            "pipeline.bucket_units must be greater than zero"
        );
        if self.input.date_formats.is_empty() {
            return Err(Error::config("input.date_formats must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.id_column, "ID");
        assert_eq!(config.input.group_column, "GradEnrollGroups");
        assert_eq!(config.pipeline.bucket_units, 4);
        assert_eq!(config.pipeline.max_year, None);
        assert_eq!(config.output.format, "json");
        assert_eq!(config.logging.level, "info");
        assert!(config.states.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r##"
[input]
path = "data/clearinghouse.csv"
date_column = "GRAD_DATE"

[pipeline]
bucket_units = 2
max_year = 2015

[logging]
level = "debug"

[[states]]
key = "enrvocational"
long_name = "Enrolled | Vocational"
sort_order = 20
color = "#123456"
        "##;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.input.path,
            Some(PathBuf::from("data/clearinghouse.csv"))
        );
        assert_eq!(config.input.date_column, "GRAD_DATE");
        assert_eq!(config.input.id_column, "ID");
        assert_eq!(config.pipeline.bucket_units, 2);
        assert_eq!(config.pipeline.max_year, Some(2015));
        assert_eq!(config.pipeline.time_max, None);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.states.len(), 1);
        assert_eq!(config.states[0].metadata().sort_order, 20);
    }

    #[test]
    fn test_zero_bucket_units_rejected() {
        let config: Config = toml::from_str("[pipeline]\nbucket_units = 0\n").unwrap();
        assert!(config.validate().is_err());
    }
}
