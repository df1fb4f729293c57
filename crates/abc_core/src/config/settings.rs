//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::editor::is_macro_name;
use crate::logging::LogLevel;

use super::manager::{ConfigError, ConfigResult};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Input/output/log folders.
    #[serde(default)]
    pub paths: PathSettings,

    /// Editor executable and scripting pipe.
    #[serde(default)]
    pub editor: EditorSettings,

    /// Noise sample window and reduction macro.
    #[serde(default)]
    pub noise: NoiseSettings,

    /// Compression effect.
    #[serde(default)]
    pub compression: CompressionSettings,

    /// Export naming and format.
    #[serde(default)]
    pub export: ExportSettings,

    /// Optional pauses between commands and projects.
    #[serde(default)]
    pub pacing: PacingSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Fail with every problem found, if any.
    pub fn validate(&self) -> ConfigResult<()> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// Check every field that has a constrained range.
    ///
    /// Returns the list of problems found; an empty list means the
    /// settings are usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let ext = &self.paths.input_extension;
        if ext.trim().is_empty() {
            problems.push("paths.input_extension must not be empty".to_string());
        } else if ext.starts_with('.') {
            problems.push(format!(
                "paths.input_extension must not start with a dot (got '{}')",
                ext
            ));
        }

        if self.editor.executable.trim().is_empty() {
            problems.push("editor.executable must not be empty".to_string());
        }
        if self.editor.pipe_to.is_some() != self.editor.pipe_from.is_some() {
            problems.push("editor.pipe_to and editor.pipe_from must be set together".to_string());
        }
        for (name, value) in [
            ("editor.ready_timeout_secs", self.editor.ready_timeout_secs),
            ("editor.command_timeout_secs", self.editor.command_timeout_secs),
            ("editor.close_timeout_secs", self.editor.close_timeout_secs),
        ] {
            if value == 0 {
                problems.push(format!("{} must be greater than zero", name));
            }
        }
        if self.editor.poll_interval_ms == 0 {
            problems.push("editor.poll_interval_ms must be greater than zero".to_string());
        }

        if !(self.noise.sample_start_secs >= 0.0) {
            problems.push("noise.sample_start_secs must be zero or positive".to_string());
        }
        if !(self.noise.sample_duration_secs > 0.0) {
            problems.push("noise.sample_duration_secs must be positive".to_string());
        }
        if !is_macro_name(&self.noise.reduction_macro) {
            problems.push(format!(
                "noise.reduction_macro must be a single word (got '{}')",
                self.noise.reduction_macro
            ));
        }

        match self.compression.mode {
            CompressionMode::Macro => {
                if !is_macro_name(&self.compression.macro_name) {
                    problems.push(format!(
                        "compression.macro_name must be a single word in macro mode (got '{}')",
                        self.compression.macro_name
                    ));
                }
            }
            CompressionMode::Command => {
                if !(self.compression.ratio >= 1.0) {
                    problems.push("compression.ratio must be at least 1.0".to_string());
                }
                if !(self.compression.attack_secs > 0.0) {
                    problems.push("compression.attack_secs must be positive".to_string());
                }
                if !(self.compression.release_secs > 0.0) {
                    problems.push("compression.release_secs must be positive".to_string());
                }
            }
        }

        if self.export.output_extension.trim().is_empty()
            || self.export.output_extension.starts_with('.')
        {
            problems.push(
                "export.output_extension must be non-empty and have no leading dot".to_string(),
            );
        }
        if !(1..=32).contains(&self.export.num_channels) {
            problems.push(format!(
                "export.num_channels must be between 1 and 32 (got {})",
                self.export.num_channels
            ));
        }
        if self.export.output_suffix.is_empty()
            && self
                .export
                .output_extension
                .eq_ignore_ascii_case(&self.paths.input_extension)
            && same_folder(&self.paths.input_folder, &self.paths.output_folder)
        {
            problems.push(
                "export settings would overwrite the input projects in place".to_string(),
            );
        }

        problems
    }
}

/// Whether two configured folders name the same place, however spelled.
fn same_folder(a: &str, b: &str) -> bool {
    resolve_folder(a) == resolve_folder(b)
}

fn resolve_folder(folder: &str) -> PathBuf {
    let path = Path::new(folder);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };
    // Canonical when the folder exists; otherwise `.` and trailing slashes
    // are dropped by rebuilding from components.
    fs::canonicalize(&absolute).unwrap_or_else(|_| absolute.components().collect())
}

/// Path configuration for input, output and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Folder scanned for project files.
    #[serde(default = "default_input_folder")]
    pub input_folder: String,

    /// Folder receiving exported audio.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Folder for per-project logs and the batch report.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Extension of project files to pick up (no leading dot).
    #[serde(default = "default_input_extension")]
    pub input_extension: String,
}

fn default_input_folder() -> String {
    "input".to_string()
}

fn default_output_folder() -> String {
    "output".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_input_extension() -> String {
    "aup3".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input_folder: default_input_folder(),
            output_folder: default_output_folder(),
            logs_folder: default_logs_folder(),
            input_extension: default_input_extension(),
        }
    }
}

/// Editor executable and scripting channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Path to the Audacity executable.
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Override for the command pipe (we write, editor reads).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipe_to: Option<String>,

    /// Override for the reply pipe (editor writes, we read).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipe_from: Option<String>,

    /// How long to wait for the editor to answer its first command.
    #[serde(default = "default_ready_timeout")]
    pub ready_timeout_secs: u64,

    /// How long to wait for the reply to any single command.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// How long to wait for a graceful exit before killing the editor.
    #[serde(default = "default_close_timeout")]
    pub close_timeout_secs: u64,

    /// Poll interval while waiting for startup or shutdown.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

#[cfg(target_os = "windows")]
fn default_executable() -> String {
    r"C:\Program Files\Audacity\audacity.exe".to_string()
}

#[cfg(target_os = "macos")]
fn default_executable() -> String {
    "/Applications/Audacity.app/Contents/MacOS/Audacity".to_string()
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_executable() -> String {
    "/usr/bin/audacity".to_string()
}

fn default_ready_timeout() -> u64 {
    60
}

fn default_command_timeout() -> u64 {
    300
}

fn default_close_timeout() -> u64 {
    15
}

fn default_poll_interval() -> u64 {
    250
}

impl EditorSettings {
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs(self.ready_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_secs(self.close_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            pipe_to: None,
            pipe_from: None,
            ready_timeout_secs: default_ready_timeout(),
            command_timeout_secs: default_command_timeout(),
            close_timeout_secs: default_close_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Noise profile sampling and reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseSettings {
    /// Start of the background-noise sample, in seconds.
    #[serde(default)]
    pub sample_start_secs: f64,

    /// Length of the background-noise sample, in seconds.
    #[serde(default = "default_sample_duration")]
    pub sample_duration_secs: f64,

    /// Name of the user macro that applies noise reduction.
    #[serde(default = "default_reduction_macro")]
    pub reduction_macro: String,
}

fn default_sample_duration() -> f64 {
    5.0
}

fn default_reduction_macro() -> String {
    "NoiseReductionPython".to_string()
}

impl NoiseSettings {
    /// End of the noise sample window.
    pub fn sample_end_secs(&self) -> f64 {
        self.sample_start_secs + self.sample_duration_secs
    }
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            sample_start_secs: 0.0,
            sample_duration_secs: default_sample_duration(),
            reduction_macro: default_reduction_macro(),
        }
    }
}

/// How the compression effect is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Run a user macro by name.
    #[default]
    Macro,
    /// Run the built-in Compressor command with the parameters below.
    Command,
}

impl std::fmt::Display for CompressionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompressionMode::Macro => write!(f, "macro"),
            CompressionMode::Command => write!(f, "command"),
        }
    }
}

/// Compression effect configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionSettings {
    #[serde(default)]
    pub mode: CompressionMode,

    /// Macro used in `macro` mode.
    #[serde(default = "default_compressor_macro")]
    pub macro_name: String,

    #[serde(default = "default_threshold")]
    pub threshold_db: f64,

    #[serde(default = "default_noise_floor")]
    pub noise_floor_db: f64,

    #[serde(default = "default_ratio")]
    pub ratio: f64,

    #[serde(default = "default_attack")]
    pub attack_secs: f64,

    #[serde(default = "default_release")]
    pub release_secs: f64,

    /// Make-up gain to 0 dB after compressing.
    #[serde(default)]
    pub normalize: bool,
}

fn default_compressor_macro() -> String {
    "CompressorPython".to_string()
}

fn default_threshold() -> f64 {
    -30.0
}

fn default_noise_floor() -> f64 {
    -40.0
}

fn default_ratio() -> f64 {
    2.5
}

fn default_attack() -> f64 {
    0.1
}

fn default_release() -> f64 {
    1.0
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            mode: CompressionMode::default(),
            macro_name: default_compressor_macro(),
            threshold_db: default_threshold(),
            noise_floor_db: default_noise_floor(),
            ratio: default_ratio(),
            attack_secs: default_attack(),
            release_secs: default_release(),
            normalize: false,
        }
    }
}

/// Export naming and format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Appended to the project stem.
    #[serde(default = "default_output_suffix")]
    pub output_suffix: String,

    /// Extension of the exported file (no leading dot).
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    #[serde(default = "default_num_channels")]
    pub num_channels: u32,

    /// Replace an existing export. When false the project is skipped.
    #[serde(default = "default_true")]
    pub overwrite: bool,
}

fn default_output_suffix() -> String {
    "_processed".to_string()
}

fn default_output_extension() -> String {
    "wav".to_string()
}

fn default_num_channels() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_suffix: default_output_suffix(),
            output_extension: default_output_extension(),
            num_channels: default_num_channels(),
            overwrite: true,
        }
    }
}

/// Pauses kept for editors that need breathing room after a reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingSettings {
    /// Pause after every acknowledged step.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Pause between projects, after the editor has exited.
    #[serde(default = "default_between_files")]
    pub between_files_secs: u64,
}

fn default_settle_ms() -> u64 {
    250
}

fn default_between_files() -> u64 {
    2
}

impl PacingSettings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn between_files(&self) -> Duration {
        Duration::from_secs(self.between_files_secs)
    }
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            settle_ms: default_settle_ms(),
            between_files_secs: default_between_files(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for console and per-project logs.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep editor replies out of the console, show them only on failure.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of reply lines kept for the failure tail.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Write `batch_report.json` into the logs folder.
    #[serde(default = "default_true")]
    pub write_report: bool,
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            compact: true,
            error_tail: default_error_tail(),
            show_timestamps: true,
            write_report: true,
        }
    }
}

/// Names of config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSection {
    Paths,
    Editor,
    Noise,
    Compression,
    Export,
    Pacing,
    Logging,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 7] = [
        ConfigSection::Paths,
        ConfigSection::Editor,
        ConfigSection::Noise,
        ConfigSection::Compression,
        ConfigSection::Export,
        ConfigSection::Pacing,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Editor => "editor",
            ConfigSection::Noise => "noise",
            ConfigSection::Compression => "compression",
            ConfigSection::Export => "export",
            ConfigSection::Pacing => "pacing",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the section in generated files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Input, output and log folders",
            ConfigSection::Editor => "Audacity executable and mod-script-pipe channel",
            ConfigSection::Noise => "Noise profile sample window and reduction macro",
            ConfigSection::Compression => "Compression (mode = \"macro\" or \"command\")",
            ConfigSection::Export => "Exported file naming and channel count",
            ConfigSection::Pacing => "Extra pauses after replies and between projects",
            ConfigSection::Logging => "Logging configuration",
        }
    }
}
