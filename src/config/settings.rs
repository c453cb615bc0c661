//! TOML-based configuration for fieldflow.
//!
//! Example configuration (`fieldflow.toml`):
//! ```toml
//! [export]
//! file_name = "data_model.json"
//! indent = 2
//!
//! [lineage]
//! direction = "upstream"   # upstream, downstream, both
//!
//! [view]
//! show_normal = true
//! show_calculation = true
//! only_highlighted = false
//!
//! [view.style]
//! normal_color = "#fd5d5d"
//! calculation_color = "#0066ff"
//! calculation_dash = "5,5"
//!
//! [layout]
//! algorithm = "layered"    # stacked, layered
//! direction = "LR"
//! row_height = 180.0
//! column_width = 320.0
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::{LayeredLayout, Layout, LayoutDirection, StackedLayout};
use crate::lineage::Direction;
use crate::transform::{DEFAULT_EXPORT_FILE, DEFAULT_INDENT, PLACEHOLDER_ROW_HEIGHT};
use crate::view::{EdgeStyle, Visibility};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "FIELDFLOW_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "fieldflow.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub export: ExportSettings,
    pub lineage: LineageSettings,
    pub view: ViewSettings,
    pub layout: LayoutSettings,
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportSettings {
    /// File name used when no output path is given.
    pub file_name: String,

    /// Spaces per indent level in exported JSON.
    pub indent: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_EXPORT_FILE.to_string(),
            indent: DEFAULT_INDENT,
        }
    }
}

/// Lineage configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LineageSettings {
    /// Direction used when a field is selected.
    pub direction: Direction,
}

/// Initial edge filters and edge styling.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewSettings {
    #[serde(flatten)]
    pub visibility: Visibility,

    pub style: EdgeStyle,
}

/// Which placement algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutAlgorithm {
    Stacked,
    #[default]
    Layered,
}

/// Layout configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub algorithm: LayoutAlgorithm,

    pub direction: LayoutDirection,

    /// Spacing between nodes sharing a rank.
    pub row_height: f64,

    /// Spacing between ranks.
    pub column_width: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::default(),
            direction: LayoutDirection::default(),
            row_height: PLACEHOLDER_ROW_HEIGHT,
            column_width: 320.0,
        }
    }
}

impl LayoutSettings {
    /// Build the configured layout.
    pub fn build(&self) -> Box<dyn Layout> {
        match self.algorithm {
            LayoutAlgorithm::Stacked => Box::new(StackedLayout {
                spacing: self.row_height,
            }),
            LayoutAlgorithm::Layered => Box::new(LayeredLayout {
                rank_spacing: self.column_width,
                node_spacing: self.row_height,
            }),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> SettingsResult<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> SettingsResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `FIELDFLOW_CONFIG`
    /// 2. `./fieldflow.toml`
    /// 3. `~/.config/fieldflow/config.toml`
    pub fn load() -> SettingsResult<Self> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("fieldflow").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject values no document could be exported or laid out with.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.export.file_name.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "export.file_name must not be empty".to_string(),
            ));
        }
        for (name, value) in [
            ("layout.row_height", self.layout.row_height),
            ("layout.column_width", self.layout.column_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::InvalidConfig(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        let opacity = self.view.style.dimmed_opacity;
        if !(0.0..=1.0).contains(&opacity) {
            return Err(SettingsError::InvalidConfig(format!(
                "view.style.dimmed_opacity must be between 0 and 1, got {}",
                opacity
            )));
        }
        Ok(())
    }
}
