//! Headless Chromium renderer backed by chromiumoxide.

use super::{NavigationResult, RenderContext, Renderer};
use crate::config::BrowserSettings;
use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Interval between two probes while waiting for a selector.
const SELECTOR_POLL_MS: u64 = 250;

/// A launched Chromium process.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch headless Chromium with the given settings.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg(format!("--user-agent={}", settings.user_agent))
            .window_size(settings.window_width, settings.window_height)
            .request_timeout(Duration::from_millis(settings.navigation_timeout_ms));

        if let Some(path) = settings.executable.as_ref() {
            info!("using chromium at {}", path.display());
            builder = builder.chrome_executable(path);
        }

        let config = builder.build().map_err(ScrapeError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {e}");
                }
            }
        });

        info!("headless browser launched");
        Ok(Self {
            browser: Mutex::new(browser),
            handler,
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Render(format!("failed to open tab: {e}")))?;
        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(&self) -> Result<()> {
        let mut browser = self.browser.lock().await;
        if let Err(e) = browser.close().await {
            warn!("failed to close browser: {e}");
        }
        if let Err(e) = browser.wait().await {
            warn!("failed to reap browser process: {e}");
        }
        self.handler.abort();
        info!("browser shutdown complete");
        Ok(())
    }
}

/// One Chromium tab.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(Duration::from_millis(timeout_ms), load).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ScrapeError::Timeout {
                    stage: "loading the page",
                    timeout_ms,
                })
            }
        }

        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_else(|| url.to_string());
        let load_time_ms = start.elapsed().as_millis() as u64;
        debug!(%final_url, load_time_ms, "page loaded");

        Ok(NavigationResult {
            final_url,
            load_time_ms,
        })
    }

    async fn click_if_present(&self, selector: &str) -> Result<bool> {
        let Ok(element) = self.page.find_element(selector).await else {
            return Ok(false);
        };
        element
            .click()
            .await
            .map_err(|e| ScrapeError::Render(format!("click on {selector} failed: {e}")))?;
        Ok(true)
    }

    async fn wait_for_any(&self, selectors: &[String], timeout_ms: u64) -> Result<Option<String>> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            for selector in selectors {
                if self.page.find_element(selector.as_str()).await.is_ok() {
                    return Ok(Some(selector.clone()));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
        }
    }

    async fn html(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| ScrapeError::Render(format!("failed to read page content: {e}")))
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page
            .screenshot(params)
            .await
            .map_err(|e| ScrapeError::Render(format!("failed to capture screenshot: {e}")))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page
            .close()
            .await
            .map_err(|e| ScrapeError::Render(format!("failed to close tab: {e}")))
    }
}
