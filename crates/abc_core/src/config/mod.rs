//! Configuration management for Audacity Batch Cleaner.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Validation of every constrained field before a batch starts
//!
//! # Example
//!
//! ```no_run
//! use abc_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/audacity-batch.toml");
//! config.load_or_create().unwrap();
//! config.validate().unwrap();
//!
//! println!("Input folder: {}", config.settings().paths.input_folder);
//!
//! config.settings_mut().pacing.settle_ms = 0;
//! config.update_section(ConfigSection::Pacing).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    CompressionMode, CompressionSettings, ConfigSection, EditorSettings, ExportSettings,
    LoggingSettings, NoiseSettings, PacingSettings, PathSettings, Settings,
};
