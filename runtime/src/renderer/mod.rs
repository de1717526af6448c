//! Renderer abstraction for loading the showtimes page.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over the
//! browser engine (Chromium via chromiumoxide) so the capture can also run
//! against a stored snapshot.

pub mod chromium;
pub mod snapshot;

pub use chromium::ChromiumRenderer;
pub use snapshot::SnapshotRenderer;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<()>;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL and wait for the load to settle.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Click the first element matching `selector`, if there is one.
    async fn click_if_present(&self, selector: &str) -> Result<bool>;
    /// Wait until one of `selectors` matches; returns the first that did, or
    /// `None` once the timeout elapses.
    async fn wait_for_any(&self, selectors: &[String], timeout_ms: u64) -> Result<Option<String>>;
    /// Get the full rendered HTML.
    async fn html(&self) -> Result<String>;
    /// Full-page PNG screenshot.
    async fn screenshot(&self) -> Result<Vec<u8>>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}
