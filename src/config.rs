//! Configuration for document translation.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// An RGB color with components in 0.0-1.0.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl Color {
    /// Create a new color.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Opaque white.
    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Opaque black.
    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parse `#RRGGBB` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::Config(format!("invalid color '{}', expected #RRGGBB", s)));
        }
        let channel = |i: usize| -> Result<f32> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|e| Error::Config(format!("invalid color '{}': {}", s, e)))
        };
        Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Document translation configuration.
///
/// Only the PDF path reads the overlay settings; the Office paths let the
/// host application re-lay-out text on its own.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Fill color of the rectangle painted over each original run.
    ///
    /// The page background is assumed uniform; runs over images or colored
    /// sections get a visible patch.
    pub cover_color: Color,

    /// Fill color of the redrawn translated text.
    pub text_color: Color,

    /// Standard-14 font used when a run's own font cannot be reused.
    pub fallback_font: String,

    /// Remove the original glyph-showing operators, not just cover them.
    ///
    /// With this off the source text stays in the content stream underneath
    /// the cover and is still extractable.
    pub erase_original_glyphs: bool,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslateConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            cover_color: Color::white(),
            text_color: Color::black(),
            fallback_font: "Helvetica".to_string(),
            erase_original_glyphs: true,
        }
    }

    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Set the cover color.
    pub fn with_cover_color(mut self, color: Color) -> Self {
        self.cover_color = color;
        self
    }

    /// Set the text color.
    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    /// Set the fallback font.
    pub fn with_fallback_font(mut self, font: impl Into<String>) -> Self {
        self.fallback_font = font.into();
        self
    }

    /// Enable or disable erasing the original glyphs.
    pub fn with_erase_original_glyphs(mut self, enable: bool) -> Self {
        self.erase_original_glyphs = enable;
        self
    }
}
