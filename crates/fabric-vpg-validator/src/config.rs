//! Configuration for fabric-vpg-validator.
//!
//! Settings come from an optional TOML file (default
//! `/etc/contrail/fabric-vpg-validator.toml`) overlaid with command line
//! flags. None of them affect checking semantics.

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AuditError, AuditResult};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/contrail/fabric-vpg-validator.toml";

/// Preferred directory for log files
pub const DEFAULT_LOG_DIR: &str = "/var/log/contrail";

/// Command line arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "fabric-vpg-validator", version)]
#[command(about = "Checks virtual port groups for VN/VLAN conflicts within a VPG and across the fabric")]
pub struct Args {
    /// Run in debug mode
    #[arg(long)]
    pub debug: bool,

    /// File to dump JSON results to (skips the human-readable report)
    #[arg(long = "to-json", value_name = "FILE")]
    pub to_json: Option<PathBuf>,

    /// Log file to save output [default: fabric_validation-<timestamp>.log]
    #[arg(long = "log-file", alias = "log_file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// VPG list export to validate
    #[arg(long, value_name = "FILE")]
    pub vpgs: Option<PathBuf>,

    /// JSON map of interface id to display name
    #[arg(long, value_name = "FILE")]
    pub names: Option<PathBuf>,
}

/// Where VPG data and interface names come from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// VPG list export
    #[serde(default)]
    pub vpg_file: Option<PathBuf>,

    /// Interface display names; ids are reported as-is when unset
    #[serde(default)]
    pub names_file: Option<PathBuf>,
}

/// Report sink selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Dump findings as JSON here instead of logging the report
    #[serde(default)]
    pub to_json: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Write the log file as JSON lines
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            json: false,
        }
    }
}

/// Complete validator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Input collaborators
    #[serde(default)]
    pub source: SourceConfig,

    /// Report sink
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ValidatorConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> AuditResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|e| match e {
                AuditError::Configuration { message, .. } => {
                    AuditError::configuration(path.display().to_string(), message)
                }
                other => other,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(AuditError::Io(e)),
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> AuditResult<Self> {
        toml::from_str(content)
            .map_err(|e| AuditError::configuration("config", format!("failed to parse: {}", e)))
    }

    /// Resolves the configuration for a run: file (explicit, or the default
    /// location) overlaid with the command line.
    pub fn from_args(args: &Args) -> AuditResult<Self> {
        let mut config = match &args.config {
            Some(path) => {
                let content = fs::read_to_string(path)?;
                Self::from_toml(&content)?
            }
            None => Self::load_or_default(DEFAULT_CONFIG_PATH)?,
        };
        config.apply_args(args);
        Ok(config)
    }

    /// Overlays command line flags
    pub fn apply_args(&mut self, args: &Args) {
        if args.debug {
            self.logging.level = "debug".to_string();
        }
        if let Some(path) = &args.to_json {
            self.output.to_json = Some(path.clone());
        }
        if let Some(path) = &args.log_file {
            self.logging.file = Some(path.clone());
        }
        if let Some(path) = &args.vpgs {
            self.source.vpg_file = Some(path.clone());
        }
        if let Some(path) = &args.names {
            self.source.names_file = Some(path.clone());
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> AuditResult<()> {
        if self.source.vpg_file.is_none() {
            return Err(AuditError::configuration(
                "source.vpg_file",
                "a VPG export is required (--vpgs)",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(AuditError::configuration(
                "logging.level",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Log file for this run, defaulting to a timestamped file
    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| default_log_file(Utc::now()))
    }
}

/// `fabric_validation-<unix-ts>.log` under [`DEFAULT_LOG_DIR`] when that
/// directory exists, else under the system temp directory.
pub fn default_log_file(now: DateTime<Utc>) -> PathBuf {
    let dir = if Path::new(DEFAULT_LOG_DIR).is_dir() {
        PathBuf::from(DEFAULT_LOG_DIR)
    } else {
        std::env::temp_dir()
    };
    dir.join(format!("fabric_validation-{}.log", now.timestamp()))
}
