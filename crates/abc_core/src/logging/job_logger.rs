//! Per-project logger with file and console output.
//!
//! Each project processed in a batch gets its own logger that:
//! - Writes to a dedicated log file
//! - Mirrors lines to a console callback (if provided)
//! - Keeps editor replies in a tail buffer, shown when a step fails

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{ConsoleCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-project logger with dual output (file + console).
pub struct JobLogger {
    log_path: PathBuf,
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    console: Arc<Mutex<Option<ConsoleCallback>>>,
    config: LogConfig,
    /// Recent editor reply lines.
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
}

impl JobLogger {
    /// Create a new job logger writing `<log_dir>/<job_name>.log`.
    pub fn new(
        job_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        console: Option<ConsoleCallback>,
    ) -> std::io::Result<Self> {
        let job_name = job_name.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&job_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            log_path,
            file_writer: Arc::new(Mutex::new(Some(BufWriter::new(file)))),
            console: Arc::new(Mutex::new(console)),
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(config.error_tail))),
            config,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn warn(&self, message: &str) {
        let msg = MessagePrefix::Warning.format(message);
        self.log(LogLevel::Warn, &msg);
    }

    pub fn error(&self, message: &str) {
        let msg = MessagePrefix::Error.format(message);
        self.log(LogLevel::Error, &msg);
    }

    /// Log a script command about to be sent to the editor.
    pub fn script(&self, command: &str) {
        let msg = MessagePrefix::Script.format(command);
        self.log(LogLevel::Info, &msg);
    }

    pub fn phase(&self, phase_name: &str) {
        let msg = MessagePrefix::Phase.format(phase_name);
        self.log(LogLevel::Info, &msg);
    }

    pub fn section(&self, section_name: &str) {
        let msg = MessagePrefix::Section.format(section_name);
        self.log(LogLevel::Info, &msg);
    }

    pub fn success(&self, message: &str) {
        let msg = MessagePrefix::Success.format(message);
        self.log(LogLevel::Info, &msg);
    }

    /// Record a reply line from the editor.
    ///
    /// Always kept in the tail buffer and the log file. In compact mode it
    /// does not reach the console.
    pub fn reply_line(&self, line: &str) {
        {
            let mut buffer = self.tail_buffer.lock();
            if self.config.error_tail > 0 {
                if buffer.len() >= self.config.error_tail {
                    buffer.pop_front();
                }
                buffer.push_back(line.to_string());
            }
        }

        let formatted = self.format_message(&MessagePrefix::Reply.format(line));
        if self.config.compact {
            self.write_file(&formatted);
        } else {
            self.output(&formatted);
        }
    }

    /// Show the tail buffer (typically after a failure).
    pub fn show_tail(&self, header: &str) {
        let buffer = self.tail_buffer.lock();
        if buffer.is_empty() {
            return;
        }

        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in buffer.iter() {
            self.output(&self.format_message(line));
        }
    }

    pub fn clear_tail(&self) {
        self.tail_buffer.lock().clear();
    }

    pub fn get_tail(&self) -> Vec<String> {
        self.tail_buffer.lock().iter().cloned().collect()
    }

    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    fn write_file(&self, formatted: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", formatted);
        }
    }

    fn output(&self, formatted: &str) {
        self.write_file(formatted);

        if let Some(ref callback) = *self.console.lock() {
            callback(formatted);
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sanitize a string to be safe for use as a filename.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
