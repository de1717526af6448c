//! Error type shared by the renderer, capture and store layers.
//!
//! The extractor itself never fails: per-field misses fall back to defaults
//! and a page without containers yields an empty record list.

use std::path::PathBuf;

/// Errors raised while rendering, persisting or configuring a capture.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("timed out after {timeout_ms}ms while {stage}")]
    Timeout { stage: &'static str, timeout_ms: u64 },

    #[error("render error: {0}")]
    Render(String),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScrapeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
