//! Configuration for plinth
//!
//! Loads configuration from TOML file at `~/.config/plinth/config.toml`.
//! Every field has a built-in default, so a missing file or a partial one is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub companions: CompanionConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if the file is missing
    /// or unusable
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("plinth").join("config.toml"))
    }
}

/// Bootstrap options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Create the unmapped manager-internal window at startup
    pub diagnostic_window: bool,
    pub diagnostic_window_size: (u16, u16),
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            diagnostic_window: true,
            diagnostic_window_size: (500, 500),
        }
    }
}

/// Helper programs started once after the session is up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// Seconds to wait after startup before launching anything
    pub delay_secs: u64,
    pub programs: Vec<CompanionProgram>,
}

impl CompanionConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            delay_secs: 10,
            programs: vec![
                CompanionProgram::new("nitrogen", &["--restore"]),
                CompanionProgram::new("sxhkd", &[]),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionProgram {
    /// Looked up on `PATH` unless it contains a `/`
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CompanionProgram {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}
