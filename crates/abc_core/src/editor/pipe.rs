//! Client side of Audacity's `mod-script-pipe` channel.
//!
//! The editor serves two pipes: one it reads commands from and one it
//! writes replies to. Every reply is a block of text lines followed by
//! `BatchCommand finished: <status>` and a blank line.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::EditorSettings;

use super::types::{EditorError, EditorResult, Reply, ReplyStatus, STATUS_PREFIX};

#[cfg(windows)]
const COMMAND_EOL: &str = "\r\n\0";
#[cfg(not(windows))]
const COMMAND_EOL: &str = "\n";

/// Locations of the command and reply pipes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipePaths {
    /// Pipe we write commands to.
    pub to_editor: PathBuf,
    /// Pipe we read replies from.
    pub from_editor: PathBuf,
}

impl PipePaths {
    pub fn new(to_editor: impl Into<PathBuf>, from_editor: impl Into<PathBuf>) -> Self {
        Self {
            to_editor: to_editor.into(),
            from_editor: from_editor.into(),
        }
    }

    /// Use the configured overrides, or the platform default names.
    pub fn from_settings(settings: &EditorSettings) -> EditorResult<Self> {
        match (&settings.pipe_to, &settings.pipe_from) {
            (Some(to), Some(from)) => Ok(Self::new(to, from)),
            _ => Self::platform_default(),
        }
    }

    #[cfg(windows)]
    pub fn platform_default() -> EditorResult<Self> {
        Ok(Self::new(r"\\.\pipe\ToSrvPipe", r"\\.\pipe\FromSrvPipe"))
    }

    /// Audacity names its pipes after the real user id, so under `sudo`
    /// these are the invoking user's pipes.
    #[cfg(unix)]
    pub fn platform_default() -> EditorResult<Self> {
        let uid = real_uid();
        Ok(Self::new(
            format!("/tmp/audacity_script_pipe.to.{}", uid),
            format!("/tmp/audacity_script_pipe.from.{}", uid),
        ))
    }

    #[cfg(not(any(unix, windows)))]
    pub fn platform_default() -> EditorResult<Self> {
        Err(EditorError::InvalidArgument(
            "no default pipe names on this platform; set editor.pipe_to and editor.pipe_from"
                .to_string(),
        ))
    }
}

#[cfg(unix)]
fn real_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

/// Assembles reply lines into complete replies.
#[derive(Debug, Default)]
pub struct ReplyAccumulator {
    lines: Vec<String>,
    status: Option<ReplyStatus>,
}

impl ReplyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line. Returns the reply once its terminating blank
    /// line has been seen.
    pub fn push(&mut self, raw: &str) -> Option<Reply> {
        let line = clean_line(raw);

        if let Some(rest) = line.strip_prefix(STATUS_PREFIX) {
            self.status = Some(ReplyStatus::parse(rest));
            return None;
        }

        if line.is_empty() {
            if let Some(status) = self.status.take() {
                return Some(Reply {
                    lines: std::mem::take(&mut self.lines),
                    status,
                });
            }
        }

        self.lines.push(line.to_string());
        None
    }

    /// Whether a partial reply is pending.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.status.is_none()
    }
}

fn clean_line(raw: &str) -> &str {
    raw.trim_start_matches('\0')
        .trim_end_matches(&['\n', '\r', '\0'][..])
}

/// Connected scripting channel.
///
/// A background thread reads the reply pipe and forwards lines, so
/// waiting for a reply can be bounded by a timeout.
pub struct ScriptPipe {
    writer: File,
    lines: Receiver<io::Result<String>>,
}

impl ScriptPipe {
    /// Open both pipes, waiting at most `timeout`.
    ///
    /// `check` runs on every poll and can abort the wait early, e.g. when
    /// the editor process has exited.
    pub fn connect(
        paths: &PipePaths,
        timeout: Duration,
        poll: Duration,
        mut check: impl FnMut() -> EditorResult<()>,
    ) -> EditorResult<Self> {
        let deadline = Instant::now() + timeout;

        // Both ends are opened concurrently: a FIFO open blocks until the
        // editor opens the other side, and the editor's order is not ours
        // to choose.
        let to_rx = spawn_opener(paths.to_editor.clone(), PipeEnd::Write, deadline, poll);
        let from_rx = spawn_opener(paths.from_editor.clone(), PipeEnd::Read, deadline, poll);

        let mut writer: Option<File> = None;
        let mut reader: Option<File> = None;

        while writer.is_none() || reader.is_none() {
            check()?;
            if Instant::now() >= deadline {
                return Err(EditorError::NotReady { waited: timeout });
            }
            if writer.is_none() {
                writer = poll_opener(&to_rx, poll, "opening the command pipe", timeout)?;
            }
            if reader.is_none() {
                reader = poll_opener(&from_rx, poll, "opening the reply pipe", timeout)?;
            }
        }

        let (writer, reader) = match (writer, reader) {
            (Some(w), Some(r)) => (w, r),
            _ => return Err(EditorError::NotReady { waited: timeout }),
        };

        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("script-pipe-reader".to_string())
            .spawn(move || {
                let mut reader = BufReader::new(reader);
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line) {
                        Ok(0) => break,
                        Ok(_) => {
                            if tx.send(Ok(line)).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            let _ = tx.send(Err(e));
                            break;
                        }
                    }
                }
            })
            .map_err(|e| EditorError::io("starting the pipe reader", e))?;

        Ok(Self { writer, lines: rx })
    }

    /// Send one command line and wait for its complete reply.
    ///
    /// Every reply line is passed to `on_line` as it arrives. The reply
    /// status is returned as-is; callers decide what a failure means.
    pub fn execute(
        &mut self,
        command: &str,
        timeout: Duration,
        mut on_line: impl FnMut(&str),
    ) -> EditorResult<Reply> {
        // Leftovers from a reply that previously timed out.
        while self.lines.try_recv().is_ok() {}

        self.writer
            .write_all(format!("{}{}", command, COMMAND_EOL).as_bytes())
            .and_then(|_| self.writer.flush())
            .map_err(|e| EditorError::io("writing to the command pipe", e))?;

        let deadline = Instant::now() + timeout;
        let mut accumulator = ReplyAccumulator::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(EditorError::Timeout {
                    command: command.to_string(),
                    waited: timeout,
                });
            }

            match self.lines.recv_timeout(remaining) {
                Ok(Ok(line)) => {
                    let cleaned = clean_line(&line);
                    if !cleaned.is_empty() {
                        on_line(cleaned);
                    }
                    if let Some(reply) = accumulator.push(&line) {
                        return Ok(reply);
                    }
                }
                Ok(Err(e)) => return Err(EditorError::io("reading the reply pipe", e)),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(EditorError::Timeout {
                        command: command.to_string(),
                        waited: timeout,
                    })
                }
                Err(RecvTimeoutError::Disconnected) => return Err(EditorError::ChannelClosed),
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum PipeEnd {
    Read,
    Write,
}

/// Open a pipe end on a helper thread, retrying while it does not exist.
///
/// A FIFO open that never gets a peer stays blocked; the thread is then
/// abandoned, which is harmless for a short-lived batch process.
fn spawn_opener(
    path: PathBuf,
    end: PipeEnd,
    deadline: Instant,
    poll: Duration,
) -> Receiver<io::Result<File>> {
    let (tx, rx) = mpsc::channel();
    let spawned = thread::Builder::new()
        .name("script-pipe-open".to_string())
        .spawn(move || loop {
            let result = match end {
                PipeEnd::Read => OpenOptions::new().read(true).open(&path),
                PipeEnd::Write => OpenOptions::new().write(true).open(&path),
            };
            match result {
                Err(e) if e.kind() == io::ErrorKind::NotFound && Instant::now() < deadline => {
                    thread::sleep(poll);
                }
                other => {
                    let _ = tx.send(other);
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::warn!("Failed to start pipe opener thread: {}", e);
    }
    rx
}

fn poll_opener(
    rx: &Receiver<io::Result<File>>,
    poll: Duration,
    operation: &str,
    timeout: Duration,
) -> EditorResult<Option<File>> {
    match rx.recv_timeout(poll) {
        Ok(Ok(file)) => Ok(Some(file)),
        Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
            Err(EditorError::NotReady { waited: timeout })
        }
        Ok(Err(e)) => Err(EditorError::io(operation, e)),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(EditorError::NotReady { waited: timeout }),
    }
}
