//! Renderer serving a stored HTML snapshot.
//!
//! Lets the full capture path run without a browser: against a page saved
//! from a previous run, or against fixtures in tests.

use super::{NavigationResult, RenderContext, Renderer};
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::path::Path;

/// Serves the same markup for every navigation.
#[derive(Debug, Clone)]
pub struct SnapshotRenderer {
    html: String,
}

impl SnapshotRenderer {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let html = std::fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
        Ok(Self::new(html))
    }
}

#[async_trait]
impl Renderer for SnapshotRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        Ok(Box::new(SnapshotContext {
            html: self.html.clone(),
            url: None,
        }))
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

struct SnapshotContext {
    html: String,
    url: Option<String>,
}

impl SnapshotContext {
    /// Selectors that match in the stored markup, checked synchronously so
    /// the parsed tree never crosses an await.
    fn first_matching(&self, selectors: &[String]) -> Option<String> {
        let document = Html::parse_document(&self.html);
        selectors
            .iter()
            .find(|raw| {
                Selector::parse(raw)
                    .map(|selector| document.select(&selector).next().is_some())
                    .unwrap_or(false)
            })
            .cloned()
    }
}

#[async_trait]
impl RenderContext for SnapshotContext {
    async fn navigate(&mut self, url: &str, _timeout_ms: u64) -> Result<NavigationResult> {
        self.url = Some(url.to_string());
        Ok(NavigationResult {
            final_url: url.to_string(),
            load_time_ms: 0,
        })
    }

    async fn click_if_present(&self, _selector: &str) -> Result<bool> {
        Ok(false)
    }

    async fn wait_for_any(&self, selectors: &[String], _timeout_ms: u64) -> Result<Option<String>> {
        Ok(self.first_matching(selectors))
    }

    async fn html(&self) -> Result<String> {
        if self.url.is_none() {
            return Err(ScrapeError::Render("no page loaded".to_string()));
        }
        Ok(self.html.clone())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Err(ScrapeError::Render(
            "screenshots are not available for snapshots".to_string(),
        ))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
