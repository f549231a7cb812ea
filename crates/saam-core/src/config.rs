//! Configuration management.
//!
//! Loads configuration from `${SAAM_HOME}/config.toml` with sensible defaults.

use std::fs;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Gemini provider overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiProviderConfig {
    /// API key (falls back to the `GEMINI_API_KEY` environment variable).
    pub api_key: Option<String>,
    /// Base URL override (the `GEMINI_BASE_URL` environment variable wins).
    pub base_url: Option<String>,
}

/// Provider configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub gemini: GeminiProviderConfig,
}

/// Attachment image handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Maximum width before an uploaded image is downscaled.
    pub max_width: u32,
    /// Maximum height before an uploaded image is downscaled.
    pub max_height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: 2048,
            max_height: 2048,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The Gemini model to use.
    pub model: String,

    /// Maximum tokens for responses (optional).
    pub max_output_tokens: Option<u32>,

    /// Whether replies are consumed as a stream of fragments.
    ///
    /// This is a single policy for every input shape, images included;
    /// `false` switches the whole client to single-shot replies.
    pub stream: bool,

    /// Provider configuration (API keys, base URLs).
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Attachment image handling.
    #[serde(default)]
    pub image: ImageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            max_output_tokens: None,
            stream: true,
            providers: ProvidersConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_MODEL: &'static str = "gemini-2.5-flash";

    /// Loads configuration from `${SAAM_HOME}/config.toml`.
    ///
    /// A missing file yields defaults; a malformed file is an error rather
    /// than a silent fallback.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let path = paths::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("read config at {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parse config at {}", path.display()))
    }

    /// Writes a default config file if none exists yet.
    ///
    /// # Errors
    /// Returns an error if the directory or file cannot be written.
    pub fn init() -> Result<std::path::PathBuf> {
        let path = paths::config_path();
        if path.exists() {
            return Ok(path);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config dir {}", parent.display()))?;
        }
        let rendered =
            toml::to_string_pretty(&Self::default()).context("serialize default config")?;
        fs::write(&path, rendered)
            .with_context(|| format!("write config at {}", path.display()))?;
        Ok(path)
    }
}

pub mod paths {
    //! Path resolution for saam configuration and log directories.
    //!
    //! SAAM_HOME resolution order:
    //! 1. SAAM_HOME environment variable (if set)
    //! 2. ~/.config/saam (default)

    use std::path::PathBuf;

    /// Returns the saam home directory.
    pub fn saam_home() -> PathBuf {
        if let Ok(home) = std::env::var("SAAM_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("saam"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        saam_home().join("config.toml")
    }

    /// Returns the path to the log directory.
    pub fn logs_dir() -> PathBuf {
        saam_home().join("logs")
    }
}
