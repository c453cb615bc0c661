//! Configuration module for fieldflow.
//!
//! Handles the settings file and its lookup locations.

mod settings;

pub use settings::{
    ExportSettings, LayoutAlgorithm, LayoutSettings, LineageSettings, Settings, SettingsError,
    SettingsResult, ViewSettings, CONFIG_ENV_VAR, LOCAL_CONFIG_FILE,
};
