//! Typed script commands for Audacity's scripting pipe.
//!
//! Each variant renders to the exact text line the editor expects,
//! e.g. `SelectTime: Start="0" End="5"` or `Macro_NoiseReductionPython`.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::CompressionSettings;

use super::types::{EditorError, EditorResult};

/// A single command sent over the scripting pipe.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// Select a time range on all tracks.
    SelectTime { start: f64, end: f64 },
    /// Learn the noise profile from the current selection.
    GetNoiseProfile,
    /// Select every track from start to end.
    SelectAll,
    /// Run a user macro by name (without the `Macro_` prefix).
    Macro(String),
    /// Built-in dynamic range compressor.
    Compressor {
        threshold_db: f64,
        noise_floor_db: f64,
        ratio: f64,
        attack_secs: f64,
        release_secs: f64,
        normalize: bool,
    },
    /// Export the selection to a file.
    Export2 { filename: PathBuf, num_channels: u32 },
    /// Echo text back; used as a readiness probe.
    Message { text: String },
}

impl ScriptCommand {
    /// Select `[start, end]` seconds.
    pub fn select_time(start: f64, end: f64) -> Self {
        ScriptCommand::SelectTime { start, end }
    }

    pub fn run_macro(name: impl Into<String>) -> Self {
        ScriptCommand::Macro(name.into())
    }

    pub fn export(filename: impl Into<PathBuf>, num_channels: u32) -> Self {
        ScriptCommand::Export2 {
            filename: filename.into(),
            num_channels,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        ScriptCommand::Message { text: text.into() }
    }

    /// Compressor command using the configured parameters.
    pub fn compressor(settings: &CompressionSettings) -> Self {
        ScriptCommand::Compressor {
            threshold_db: settings.threshold_db,
            noise_floor_db: settings.noise_floor_db,
            ratio: settings.ratio,
            attack_secs: settings.attack_secs,
            release_secs: settings.release_secs,
            normalize: settings.normalize,
        }
    }

    /// Command identifier as the editor knows it.
    pub fn name(&self) -> String {
        match self {
            ScriptCommand::SelectTime { .. } => "SelectTime".to_string(),
            ScriptCommand::GetNoiseProfile => "NoiseReduction".to_string(),
            ScriptCommand::SelectAll => "SelectAll".to_string(),
            ScriptCommand::Macro(name) => format!("Macro_{}", name),
            ScriptCommand::Compressor { .. } => "Compressor".to_string(),
            ScriptCommand::Export2 { .. } => "Export2".to_string(),
            ScriptCommand::Message { .. } => "Message".to_string(),
        }
    }

    /// Check that every argument can be written on one line inside quotes.
    pub fn validate(&self) -> EditorResult<()> {
        match self {
            ScriptCommand::SelectTime { start, end } => {
                if !start.is_finite() || !end.is_finite() || end <= start {
                    return Err(EditorError::InvalidArgument(format!(
                        "bad time range {}..{}",
                        start, end
                    )));
                }
                Ok(())
            }
            ScriptCommand::Macro(name) => {
                if !is_macro_name(name) {
                    return Err(EditorError::InvalidArgument(format!(
                        "macro name '{}' must be a single word",
                        name
                    )));
                }
                Ok(())
            }
            ScriptCommand::Export2 { filename, .. } => {
                check_quotable("export filename", &script_path(filename))
            }
            ScriptCommand::Message { text } => check_quotable("message text", text),
            _ => Ok(()),
        }
    }

    /// Render the command line (without terminator).
    pub fn render(&self) -> String {
        match self {
            ScriptCommand::SelectTime { start, end } => {
                format!("SelectTime: Start=\"{}\" End=\"{}\"", start, end)
            }
            ScriptCommand::GetNoiseProfile => "NoiseReduction: GetProfile=\"1\"".to_string(),
            ScriptCommand::SelectAll => "SelectAll".to_string(),
            ScriptCommand::Macro(name) => format!("Macro_{}", name),
            ScriptCommand::Compressor {
                threshold_db,
                noise_floor_db,
                ratio,
                attack_secs,
                release_secs,
                normalize,
            } => format!(
                "Compressor: Threshold=\"{}\" NoiseFloor=\"{}\" Ratio=\"{}\" AttackTime=\"{}\" ReleaseTime=\"{}\" Normalize=\"{}\" UsePeak=\"0\"",
                threshold_db,
                noise_floor_db,
                ratio,
                attack_secs,
                release_secs,
                u8::from(*normalize)
            ),
            ScriptCommand::Export2 {
                filename,
                num_channels,
            } => format!(
                "Export2: Filename=\"{}\" NumChannels={}",
                script_path(filename),
                num_channels
            ),
            ScriptCommand::Message { text } => format!("Message: Text=\"{}\"", text),
        }
    }
}

impl fmt::Display for ScriptCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Path as written in a script: forward slashes on every platform.
pub fn script_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn check_quotable(what: &str, value: &str) -> EditorResult<()> {
    if value.contains('"') || value.contains('\n') || value.contains('\r') {
        return Err(EditorError::InvalidArgument(format!(
            "{} cannot contain quotes or line breaks: {}",
            what, value
        )));
    }
    Ok(())
}

/// Macro names go on the command line unquoted, so they must be one word.
pub(crate) fn is_macro_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c == '"')
}
