//! Configuration management for mini-mind.
//!
//! Configuration can be set via environment variables:
//! - `MINI_MIND_BACKGROUND` - Optional. Background the page starts with and resets to. Defaults to `#6366f1`.
//! - `MINI_MIND_OUTPUT` - Optional. How frames are printed: `text` or `json`. Defaults to `text`.
//! - `MINI_MIND_EVENT_BUFFER` - Optional. Inbound event channel capacity. Defaults to `256`.
//! - `MINI_MIND_PRINT_MANIFEST` - Optional. Print the tool manifest on startup. Defaults to `false`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::util::env_var_bool;

pub const DEFAULT_BACKGROUND: &str = "#6366f1";
pub const DEFAULT_EVENT_BUFFER: usize = 256;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// How the binary prints page frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable frames.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{}`", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Page configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Background at session start and after reset
    pub default_background: String,

    /// Frame output format
    pub output: OutputFormat,

    /// Capacity of the inbound event channel
    pub event_buffer: usize,

    /// Print the tool manifest before processing events
    pub print_manifest: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_background: DEFAULT_BACKGROUND.to_string(),
            output: OutputFormat::Text,
            event_buffer: DEFAULT_EVENT_BUFFER,
            print_manifest: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a variable is set but cannot be
    /// used.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_background = match std::env::var("MINI_MIND_BACKGROUND") {
            Ok(value) if value.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "MINI_MIND_BACKGROUND".to_string(),
                    "must not be empty".to_string(),
                ))
            }
            Ok(value) => value.trim().to_string(),
            Err(_) => DEFAULT_BACKGROUND.to_string(),
        };

        let output = std::env::var("MINI_MIND_OUTPUT")
            .unwrap_or_else(|_| "text".to_string())
            .parse::<OutputFormat>()
            .map_err(|e| ConfigError::InvalidValue("MINI_MIND_OUTPUT".to_string(), e))?;

        let event_buffer = std::env::var("MINI_MIND_EVENT_BUFFER")
            .unwrap_or_else(|_| DEFAULT_EVENT_BUFFER.to_string())
            .parse::<usize>()
            .map_err(|e| {
                ConfigError::InvalidValue("MINI_MIND_EVENT_BUFFER".to_string(), format!("{}", e))
            })?;
        if event_buffer == 0 {
            return Err(ConfigError::InvalidValue(
                "MINI_MIND_EVENT_BUFFER".to_string(),
                "must be greater than 0".to_string(),
            ));
        }

        let print_manifest = env_var_bool("MINI_MIND_PRINT_MANIFEST", false);

        Ok(Self {
            default_background,
            output,
            event_buffer,
            print_manifest,
        })
    }
}
