//! Configuration loader/writer plus strongly typed settings structures.
//!
//! Deserializes the TOML config we ship, exposes defaults embedded at
//! compile time, and persists edits back to disk.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::theme::Theme;

// Embed the default configuration file at compile time
const DEFAULT_CONFIG: &str = include_str!("../defaults/config.toml");

/// Top-level configuration object.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub button: ButtonConfig,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Settings recognized by the button widget itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonConfig {
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_text_size")]
    pub text_size: f32,
    /// Hex color; falls back to the theme's text color.
    pub text_color: Option<String>,
    /// Hex color; falls back to the named styles, then the text color.
    pub progress_indicator_color: Option<String>,
    /// Progress indicator variant name resolved through the registry.
    /// Unset means the built-in arc spinner.
    pub progress_indicator: Option<String>,
    /// Preferred named style from `[theme.styles]`.
    pub style: Option<String>,
    #[serde(default = "default_padding_horizontal")]
    pub padding_horizontal: f32,
    #[serde(default = "default_padding_vertical")]
    pub padding_vertical: f32,
}

fn default_text() -> String {
    "Submit".to_string()
}

fn default_text_size() -> f32 {
    15.0
}

fn default_padding_horizontal() -> f32 {
    6.0
}

fn default_padding_vertical() -> f32 {
    4.0
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            text: default_text(),
            text_size: default_text_size(),
            text_color: None,
            progress_indicator_color: None,
            progress_indicator: None,
            style: None,
            padding_horizontal: default_padding_horizontal(),
            padding_vertical: default_padding_vertical(),
        }
    }
}

/// Theming keys consumed by the background/shape decorator, not the
/// widget core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundConfig {
    pub ripple_color: Option<String>,
    pub tint: Option<String>,
    #[serde(default = "default_tint_mode")]
    pub tint_mode: String,
    /// When true the host paints its own background and the decorator
    /// leaves the cells alone.
    #[serde(default)]
    pub user_background: bool,
}

fn default_tint_mode() -> String {
    "src_in".to_string()
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            ripple_color: None,
            tint: None,
            tint_mode: default_tint_mode(),
            user_background: false,
        }
    }
}

/// Demo host settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    16
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl Config {
    /// Default config file location (`~/.morpho/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".morpho").join("config.toml"))
    }

    /// Load from the given path, or the default location. A missing file
    /// yields the embedded defaults.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path.or_else(Self::default_path) {
            Some(path) => path,
            None => {
                tracing::warn!("Could not resolve home directory, using embedded defaults");
                return Self::embedded_defaults();
            }
        };

        if !path.exists() {
            tracing::debug!("No config file at {:?}, using embedded defaults", path);
            return Self::embedded_defaults();
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        tracing::info!("Config loaded from {:?}", path);
        Ok(config)
    }

    /// Parse the compile-time embedded defaults.
    pub fn embedded_defaults() -> Result<Self> {
        toml::from_str(DEFAULT_CONFIG).context("Embedded default config is malformed")
    }

    /// Save to disk, creating parent directories as needed.
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let toml_string = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file {:?}", path))?;

        tracing::info!("Config saved to {:?}", path);
        Ok(())
    }
}
