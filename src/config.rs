use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::announce::DEFAULT_ANNOUNCEMENT_CAPACITY;
use crate::layout::{LayoutDirection, LayoutMode, LayoutSpacing};
use crate::presentation::{PresentationMode, Theme};

/// Row length of the serpentine layout when none is configured.
pub const DEFAULT_SERPENTINE_ROW_SIZE: usize = 6;

/// User-editable editor preferences, stored as TOML.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub direction: LayoutDirection,
    pub presentation_mode: PresentationMode,
    pub theme: Theme,
    pub node_width: f32,
    pub node_height: f32,
    pub node_gap: f32,
    pub rank_gap: f32,
    pub announcement_capacity: usize,
    pub serpentine: bool,
    pub serpentine_row_size: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let spacing = LayoutSpacing::default();
        Self {
            direction: LayoutDirection::TopToBottom,
            presentation_mode: PresentationMode::Visual,
            theme: Theme::Default,
            node_width: spacing.node_width,
            node_height: spacing.node_height,
            node_gap: spacing.node_gap,
            rank_gap: spacing.rank_gap,
            announcement_capacity: DEFAULT_ANNOUNCEMENT_CAPACITY,
            serpentine: false,
            serpentine_row_size: None,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("io error: {0}")]
    #[diagnostic(code("config.io"))]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    #[diagnostic(code("config.parse"))]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize config: {0}")]
    #[diagnostic(code("config.serialize"))]
    Serialize(#[from] toml::ser::Error),
}

impl EditorConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads the config at `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn preferences_path(&self) -> PathBuf {
        ProjectDirs::from("com", "dialoguegraph", "nodal_editor")
            .map(|dirs| dirs.config_dir().join("editor.toml"))
            .unwrap_or_else(|| PathBuf::from("editor.toml"))
    }

    /// Clamps every value into its usable range.
    pub fn resolve(&self) -> ResolvedConfig {
        let defaults = LayoutSpacing::default();
        let positive = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        // Gaps may be zero, never negative.
        let gap = |value: f32, fallback: f32| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback
            }
        };

        let spacing = LayoutSpacing {
            node_width: positive(self.node_width, defaults.node_width),
            node_height: positive(self.node_height, defaults.node_height),
            node_gap: gap(self.node_gap, defaults.node_gap),
            rank_gap: gap(self.rank_gap, defaults.rank_gap),
        };
        let layout_mode = if self.serpentine {
            LayoutMode::Serpentine {
                row_size: self
                    .serpentine_row_size
                    .unwrap_or(DEFAULT_SERPENTINE_ROW_SIZE)
                    .max(1),
            }
        } else {
            LayoutMode::Layered
        };

        ResolvedConfig {
            direction: self.direction,
            presentation_mode: self.presentation_mode,
            theme: self.theme,
            spacing,
            layout_mode,
            announcement_capacity: self.announcement_capacity.max(1),
        }
    }
}

/// Settings an editor session runs with.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedConfig {
    pub direction: LayoutDirection,
    pub presentation_mode: PresentationMode,
    pub theme: Theme,
    pub spacing: LayoutSpacing,
    pub layout_mode: LayoutMode,
    pub announcement_capacity: usize,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        EditorConfig::default().resolve()
    }
}
