//! Configuration loading and setting resolution
//!
//! Settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (applied by the caller)
//!
//! A missing TOML file at the default location is not an error: the tool
//! continues with defaults. Loading happens before logging is set up, so
//! [`load_config`] reports a [`ConfigOrigin`] for the caller to log later.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// TOML configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// AcoustID client key
    #[serde(default)]
    pub acoustid_api_key: Option<String>,

    /// Parent directory for per-decode scratch directories
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub decoders: DecoderConfig,
}

/// `[logging]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter directive (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// `[decoders]` table: external decoder programs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// MP3 decoder program (lame-compatible command line)
    #[serde(default)]
    pub lame: Option<String>,

    /// Ogg Vorbis decoder program (oggdec-compatible command line)
    #[serde(default)]
    pub oggdec: Option<String>,
}

/// Where a resolved setting came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    CommandLine,
    Environment,
    Toml,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingSource::CommandLine => write!(f, "command line"),
            SettingSource::Environment => write!(f, "environment"),
            SettingSource::Toml => write!(f, "TOML"),
        }
    }
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// No file at the default location; defaults in use
    DefaultsMissingFile(PathBuf),
    /// Platform config directory unknown; defaults in use
    DefaultsNoConfigDir,
}

impl ConfigOrigin {
    /// Log the origin (call once a subscriber is installed)
    pub fn log(&self) {
        match self {
            ConfigOrigin::File(path) => info!("Loaded config from {}", path.display()),
            ConfigOrigin::DefaultsMissingFile(path) => {
                debug!("No config file at {}, using defaults", path.display())
            }
            ConfigOrigin::DefaultsNoConfigDir => {
                warn!("Could not determine config directory, using defaults")
            }
        }
    }
}

/// Default config file location for a WKMP tool
///
/// `~/.config/wkmp/<module>.toml` on Linux, the platform config dir elsewhere.
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wkmp").join(format!("{}.toml", module_name)))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Parse TOML config text
pub fn parse_toml_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}

/// Load the tool's configuration
///
/// An explicitly requested file must exist. The default location may be
/// absent, in which case defaults are returned.
pub fn load_config(explicit: Option<&Path>, module_name: &str) -> Result<(TomlConfig, ConfigOrigin)> {
    if let Some(path) = explicit {
        let config = load_toml_config(path)?;
        return Ok((config, ConfigOrigin::File(path.to_path_buf())));
    }

    let Some(path) = default_config_path(module_name) else {
        return Ok((TomlConfig::default(), ConfigOrigin::DefaultsNoConfigDir));
    };

    if !path.exists() {
        return Ok((TomlConfig::default(), ConfigOrigin::DefaultsMissingFile(path)));
    }

    let config = load_toml_config(&path)?;
    Ok((config, ConfigOrigin::File(path)))
}

/// Validate a setting value (non-empty, non-whitespace)
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Resolve a string setting from command line, environment and TOML
///
/// Blank values are skipped at every tier. Returns `None` when no tier has a
/// usable value so the caller can apply its compiled default.
pub fn resolve_setting(
    cli_value: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Option<(String, SettingSource)> {
    let env_value = std::env::var(env_var_name).ok();

    let candidates = [
        (cli_value, SettingSource::CommandLine),
        (env_value.as_deref(), SettingSource::Environment),
        (toml_value, SettingSource::Toml),
    ];

    let valid: Vec<(&str, SettingSource)> = candidates
        .into_iter()
        .filter_map(|(value, source)| value.filter(|v| is_valid_value(v)).map(|v| (v, source)))
        .collect();

    if valid.len() > 1 {
        debug!(
            setting = env_var_name,
            "Setting found in multiple sources, using {}", valid[0].1
        );
    }

    valid
        .first()
        .map(|(value, source)| (value.trim().to_string(), *source))
}
