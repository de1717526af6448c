//! Diagnostics side-channel.
//!
//! The extractor and the capture report what went wrong here instead of
//! writing debug files themselves. Sinks must never fail the capture: write
//! errors are logged and swallowed.

use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Why a film card produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoTitle,
    NoShowtimes { title: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoTitle => write!(f, "no title"),
            SkipReason::NoShowtimes { title } => write!(f, "no showtimes for \"{title}\""),
        }
    }
}

/// Something worth keeping for a post-mortem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No selector of the container cascade matched.
    NoContainers { tried: Vec<String> },
    /// A container was found but yielded no record.
    ContainerSkipped { index: usize, reason: SkipReason },
    /// Rendered markup at the moment of failure.
    PageSnapshot { url: String, html: String },
    /// PNG screenshot at the moment of failure.
    Screenshot { url: String, png: Vec<u8> },
    /// The capture as a whole failed.
    CaptureFailed { url: String, error: String },
}

impl Diagnostic {
    /// One-line description, used by text logs.
    pub fn summary(&self) -> String {
        match self {
            Diagnostic::NoContainers { tried } => {
                format!("no film container matched; tried {}", tried.join(" | "))
            }
            Diagnostic::ContainerSkipped { index, reason } => {
                format!("container #{index} skipped: {reason}")
            }
            Diagnostic::PageSnapshot { url, html } => {
                format!("page snapshot of {url} ({} bytes)", html.len())
            }
            Diagnostic::Screenshot { url, png } => {
                format!("screenshot of {url} ({} bytes)", png.len())
            }
            Diagnostic::CaptureFailed { url, error } => format!("capture of {url} failed: {error}"),
        }
    }
}

/// Receiver of diagnostics.
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Discards everything.
pub struct NullSink;

impl DiagnosticsSink for NullSink {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticsSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}

/// Writes debug artifacts into a directory:
/// `page.html`, `screenshot.png` and an appended `diagnostics.log`.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub const SNAPSHOT_FILE: &'static str = "page.html";
    pub const SCREENSHOT_FILE: &'static str = "screenshot.png";
    pub const LOG_FILE: &'static str = "diagnostics.log";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join(name), bytes)
    }

    fn append_log(&self, line: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(Self::LOG_FILE))?;
        writeln!(file, "{} {line}", Utc::now().to_rfc3339())
    }
}

impl DiagnosticsSink for DirectorySink {
    fn report(&self, diagnostic: Diagnostic) {
        let result = match &diagnostic {
            Diagnostic::PageSnapshot { html, .. } => self
                .write_file(Self::SNAPSHOT_FILE, html.as_bytes())
                .and_then(|_| self.append_log(&diagnostic.summary())),
            Diagnostic::Screenshot { png, .. } => self
                .write_file(Self::SCREENSHOT_FILE, png)
                .and_then(|_| self.append_log(&diagnostic.summary())),
            _ => self.append_log(&diagnostic.summary()),
        };

        match result {
            Ok(()) => debug!(dir = %self.dir.display(), "{}", diagnostic.summary()),
            Err(e) => warn!(dir = %self.dir.display(), "failed to write diagnostics: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.report(Diagnostic::NoContainers {
            tried: vec![".a".to_string()],
        });
        sink.report(Diagnostic::ContainerSkipped {
            index: 2,
            reason: SkipReason::NoTitle,
        });
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Diagnostic::NoContainers { .. }));
    }

    #[test]
    fn test_directory_sink_writes_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("debug");
        let sink = DirectorySink::new(&dir);

        sink.report(Diagnostic::PageSnapshot {
            url: "https://x/".to_string(),
            html: "<html></html>".to_string(),
        });
        sink.report(Diagnostic::Screenshot {
            url: "https://x/".to_string(),
            png: vec![0x89, b'P', b'N', b'G'],
        });
        sink.report(Diagnostic::CaptureFailed {
            url: "https://x/".to_string(),
            error: "timeout".to_string(),
        });

        assert_eq!(
            fs::read_to_string(dir.join(DirectorySink::SNAPSHOT_FILE)).unwrap(),
            "<html></html>"
        );
        assert_eq!(fs::read(dir.join(DirectorySink::SCREENSHOT_FILE)).unwrap().len(), 4);
        let log = fs::read_to_string(dir.join(DirectorySink::LOG_FILE)).unwrap();
        assert_eq!(log.lines().count(), 3);
        assert!(log.contains("capture of https://x/ failed: timeout"));
    }

    #[test]
    fn test_summary_mentions_reason() {
        let d = Diagnostic::ContainerSkipped {
            index: 1,
            reason: SkipReason::NoShowtimes {
                title: "Dune".to_string(),
            },
        };
        assert_eq!(d.summary(), "container #1 skipped: no showtimes for \"Dune\"");
    }
}
