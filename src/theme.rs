//! Color and style resolution.
//!
//! Holds the theme tables from the config file and the `StyleContext`
//! handed to themed indicator constructors: theme + raw button settings +
//! a preferred style token + a fallback style token, resolved in that
//! order.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::ButtonConfig;

/// Stroke width used when neither style names one, in surface units.
pub const DEFAULT_STROKE_WIDTH: f32 = 1.5;

/// Convert hex string to ratatui Color
pub fn parse_color(hex: &str) -> Option<Color> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}

/// Convert ratatui Color to hex string
pub fn color_to_hex(color: &Color) -> String {
    match color {
        Color::Rgb(r, g, b) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        _ => "#ffffff".to_string(),
    }
}

/// Named indicator style slot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndicatorStyle {
    pub color: Option<String>,
    pub stroke_width: Option<f32>,
}

/// Theme tables loaded from the `[theme]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default)]
    pub styles: HashMap<String, IndicatorStyle>,
}

fn default_text_color() -> String {
    "#e0e0e0".to_string()
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text_color: default_text_color(),
            styles: HashMap::new(),
        }
    }
}

impl Theme {
    pub fn style(&self, name: &str) -> Option<&IndicatorStyle> {
        self.styles.get(name)
    }

    /// Theme text color, or white if the hex string is malformed.
    pub fn text_color(&self) -> Color {
        parse_color(&self.text_color).unwrap_or(Color::White)
    }
}

/// Everything a themed indicator constructor gets to look at: the theme,
/// the raw button settings, and two style-resolution tokens (preferred
/// style name, then fallback style name).
pub struct StyleContext<'a> {
    pub theme: &'a Theme,
    pub button: &'a ButtonConfig,
    pub style_attr: &'a str,
    pub default_style: &'a str,
}

impl StyleContext<'_> {
    fn styled<T>(&self, pick: impl Fn(&IndicatorStyle) -> Option<T>) -> Option<T> {
        self.theme
            .style(self.style_attr)
            .and_then(&pick)
            .or_else(|| self.theme.style(self.default_style).and_then(&pick))
    }

    /// Indicator color: explicit key, then styles, then the text color.
    pub fn indicator_color(&self) -> Color {
        self.button
            .progress_indicator_color
            .as_deref()
            .and_then(parse_color)
            .or_else(|| self.styled(|s| s.color.as_deref().and_then(parse_color)))
            .unwrap_or_else(|| self.text_color())
    }

    /// Text color: explicit key, then the theme's.
    pub fn text_color(&self) -> Color {
        self.button
            .text_color
            .as_deref()
            .and_then(parse_color)
            .unwrap_or_else(|| self.theme.text_color())
    }

    pub fn stroke_width(&self) -> f32 {
        self.styled(|s| s.stroke_width)
            .unwrap_or(DEFAULT_STROKE_WIDTH)
    }
}
