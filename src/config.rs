// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor configuration.
//!
//! Settings are read from a YAML file. Every field has a default, so a
//! file only needs to name the values it changes:
//!
//! ```yaml
//! min_box_size: 12
//! style:
//!   stroke: [0, 120, 255, 255]
//!   label_font: /usr/share/fonts/TTF/DejaVuSans.ttf
//! ```

use crate::models::annotation::{AnnotationRecord, BBox};
use crate::util::geometry::MIN_BOX_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File name looked up inside the user's config directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "bbox-editor";

/// Top-level editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Smallest box width/height in display pixels a resize may produce.
    pub min_box_size: f64,
    /// Side length of the square corner handles, in display pixels.
    pub handle_size: f64,
    /// Record appended by "add box".
    pub new_box: NewBoxTemplate,
    /// Colors and label layout for the exported composite.
    pub style: RenderStyle,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_box_size: MIN_BOX_SIZE,
            handle_size: 10.0,
            new_box: NewBoxTemplate::default(),
            style: RenderStyle::default(),
        }
    }
}

impl EditorConfig {
    /// Parse settings from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml_str(&yaml)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Default location of the config file, e.g. `~/.config/bbox-editor/config.yaml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load `explicit` if given, else the default location if it exists,
    /// else fall back to defaults. Errors are logged, never fatal.
    pub fn load_or_default(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No config file found, using defaults");
                    return Self::default();
                }
            },
        };

        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("{:#}; using default settings", e);
                Self::default()
            }
        }
    }
}

/// Field values for a newly added box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBoxTemplate {
    pub bbox: BBox,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub source: String,
    pub interactivity: bool,
}

impl Default for NewBoxTemplate {
    fn default() -> Self {
        Self {
            bbox: BBox::new(0.4, 0.4, 0.6, 0.5),
            kind: "text".to_string(),
            content: "New Box".to_string(),
            source: "manual".to_string(),
            interactivity: false,
        }
    }
}

impl NewBoxTemplate {
    pub fn to_record(&self) -> AnnotationRecord {
        AnnotationRecord {
            kind: Some(Value::String(self.kind.clone())),
            content: Some(Value::String(self.content.clone())),
            source: Some(Value::String(self.source.clone())),
            interactivity: Some(Value::Bool(self.interactivity)),
            ..AnnotationRecord::new(self.bbox.clone())
        }
    }
}

/// RGBA color, one byte per channel.
pub type Rgba8 = [u8; 4];

/// Appearance of boxes and index labels in the exported composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Box interior, normally translucent.
    pub fill: Rgba8,
    /// Box outline.
    pub stroke: Rgba8,
    pub stroke_width: u32,
    pub label_background: Rgba8,
    pub label_text: Rgba8,
    /// Height of the label tag drawn above each box.
    pub label_height: u32,
    /// Horizontal padding on each side of the label text.
    pub label_padding: u32,
    /// TrueType font for labels; the built-in digit glyphs are used if unset.
    pub label_font: Option<PathBuf>,
    pub label_font_size: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            fill: [231, 76, 60, 26],
            stroke: [231, 76, 60, 255],
            stroke_width: 2,
            label_background: [231, 76, 60, 255],
            label_text: [255, 255, 255, 255],
            label_height: 20,
            label_padding: 5,
            label_font: None,
            label_font_size: 16.0,
        }
    }
}
