//! Config manager for loading, saving, and atomic updates.
//!
//! Key features:
//! - Atomic writes (write to temp file, then rename)
//! - Section-level updates (only modified section is changed)
//! - Rewrites the file when keys are missing or unknown
//! - Range validation before a batch starts

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use toml_edit::{DocumentMut, Item};

use super::settings::{ConfigSection, Settings};

/// Errors that can occur during config operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Failed to parse config for editing: {0}")]
    EditParseError(#[from] toml_edit::TomlError),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Manages application configuration.
///
/// Handles loading, saving, and atomic section-level updates.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigManager {
    /// Create a new config manager with the given config file path.
    ///
    /// Does not load the config - call `load()` or `load_or_create()` after.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Settings::default(),
        }
    }

    /// Get the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Get a reference to the current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a mutable reference to the current settings.
    ///
    /// Changes made here are only in memory until `save()` or
    /// `update_section()` is called.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Consume the manager and keep only the settings.
    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Load config from file.
    ///
    /// Returns error if file doesn't exist.
    pub fn load(&mut self) -> ConfigResult<()> {
        if !self.config_path.exists() {
            return Err(ConfigError::NotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path)?;
        self.settings = toml::from_str(&content)?;
        Ok(())
    }

    /// Load config from file, creating with defaults if it doesn't exist.
    ///
    /// Rewrites the file if keys were missing or unknown sections were found.
    pub fn load_or_create(&mut self) -> ConfigResult<()> {
        if self.config_path.exists() {
            let content = fs::read_to_string(&self.config_path)?;
            let (settings, was_modified) = self.parse_and_clean(&content)?;
            self.settings = settings;

            if was_modified {
                tracing::debug!("Rewriting config {}", self.config_path.display());
                self.save()?;
            }
        } else {
            self.settings = Settings::default();
            self.save()?;
            tracing::info!("Created default config at {}", self.config_path.display());
        }
        Ok(())
    }

    /// Validate the in-memory settings.
    pub fn validate(&self) -> ConfigResult<()> {
        self.settings.validate()
    }

    /// Parse content and decide whether the file needs rewriting.
    fn parse_and_clean(&self, content: &str) -> ConfigResult<(Settings, bool)> {
        let doc: DocumentMut = content.parse()?;

        // Missing fields pick up their defaults here.
        let settings: Settings = toml::from_str(content)?;

        let known: Vec<&str> = ConfigSection::ALL.iter().map(|s| s.table_name()).collect();
        let has_unknown = doc.iter().any(|(key, _)| !known.contains(&key));

        // Compare against what we would have written ourselves.
        let mut reparsed = true;
        for section in ConfigSection::ALL {
            let name = section.table_name();
            let expected = section_toml(&settings, section)?;
            let expected_doc: DocumentMut = expected.parse()?;
            let Some(table) = doc.get(name).and_then(Item::as_table) else {
                reparsed = false;
                break;
            };
            if expected_doc.iter().any(|(key, _)| !table.contains_key(key)) {
                reparsed = false;
                break;
            }
        }

        Ok((settings, has_unknown || !reparsed))
    }

    /// Save the entire config atomically.
    pub fn save(&self) -> ConfigResult<()> {
        let content = self.generate_config_with_comments()?;
        self.atomic_write(&content)?;
        Ok(())
    }

    /// Update a specific section atomically.
    ///
    /// Re-reads the file from disk, replaces only the given table, and
    /// writes back atomically so comments elsewhere survive.
    pub fn update_section(&mut self, section: ConfigSection) -> ConfigResult<()> {
        let current_content = if self.config_path.exists() {
            fs::read_to_string(&self.config_path)?
        } else {
            String::new()
        };

        let mut doc: DocumentMut = if current_content.is_empty() {
            DocumentMut::new()
        } else {
            current_content.parse()?
        };

        let section_doc: DocumentMut = section_toml(&self.settings, section)?.parse()?;
        let section_table = section_doc.as_table().clone();

        doc[section.table_name()] = Item::Table(section_table);

        self.atomic_write(&doc.to_string())?;

        Ok(())
    }

    /// Generate config content with a comment above each section.
    fn generate_config_with_comments(&self) -> ConfigResult<String> {
        let mut output = String::new();

        output.push_str("# Audacity Batch Cleaner Configuration\n");
        output.push_str(
            "# This file is auto-generated. Comments may be preserved on section updates.\n\n",
        );

        for (i, section) in ConfigSection::ALL.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            output.push_str(&format!("# {}\n", section.comment()));
            output.push_str(&format!("[{}]\n", section.table_name()));
            for line in section_toml(&self.settings, *section)?.lines() {
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    /// Write content to config file atomically.
    fn atomic_write(&self, content: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.config_path.with_extension("toml.tmp");

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.config_path)?;

        Ok(())
    }
}

/// Serialize one section's fields (without the table header).
fn section_toml(settings: &Settings, section: ConfigSection) -> ConfigResult<String> {
    let content = match section {
        ConfigSection::Paths => toml::to_string_pretty(&settings.paths)?,
        ConfigSection::Editor => toml::to_string_pretty(&settings.editor)?,
        ConfigSection::Noise => toml::to_string_pretty(&settings.noise)?,
        ConfigSection::Compression => toml::to_string_pretty(&settings.compression)?,
        ConfigSection::Export => toml::to_string_pretty(&settings.export)?,
        ConfigSection::Pacing => toml::to_string_pretty(&settings.pacing)?,
        ConfigSection::Logging => toml::to_string_pretty(&settings.logging)?,
    };
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_or_create_creates_default() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(".config").join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert!(config_path.exists());
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[paths]"));
        assert!(content.contains("[editor]"));
        assert!(content.contains("reduction_macro = \"NoiseReductionPython\""));
    }

    #[test]
    fn generated_file_loads_back_unchanged() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();
        let first = fs::read_to_string(&config_path).unwrap();

        let mut again = ConfigManager::new(&config_path);
        again.load().unwrap();
        assert_eq!(again.settings().export.output_suffix, "_processed");

        // A complete file must not be rewritten.
        let (_, modified) = again.parse_and_clean(&first).unwrap();
        assert!(!modified);
    }

    #[test]
    fn load_or_create_preserves_existing() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        fs::write(&config_path, "[paths]\noutput_folder = \"my_custom_folder\"\n").unwrap();

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        assert_eq!(manager.settings().paths.output_folder, "my_custom_folder");
        // Missing keys were filled in on disk.
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[noise]"));
        assert!(content.contains("my_custom_folder"));
    }

    #[test]
    fn load_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let mut manager = ConfigManager::new(dir.path().join("absent.toml"));
        assert!(matches!(manager.load(), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn update_section_only_changes_target() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        manager.settings_mut().logging.compact = false;
        manager.update_section(ConfigSection::Logging).unwrap();

        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("compact = false"));
        assert!(content.contains("[paths]"));
        assert!(content.contains("# Input, output and log folders"));
    }

    #[test]
    fn validate_reports_invalid_settings() {
        let mut manager = ConfigManager::new("unused.toml");
        manager.settings_mut().export.num_channels = 64;

        let err = manager.validate().unwrap_err();
        assert!(err.to_string().contains("num_channels"));
    }

    #[test]
    fn atomic_write_creates_no_temp_on_success() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("settings.toml");

        let mut manager = ConfigManager::new(&config_path);
        manager.load_or_create().unwrap();

        let temp_path = config_path.with_extension("toml.tmp");
        assert!(!temp_path.exists());
    }
}
