//! One capture: render the showtimes page, extract films, build the result.
//!
//! The capture never returns an error. Anything that prevents a usable
//! page (browser failure, timeout, no film container at all) ends up as a
//! result with an empty film list and an `error` message, so the persisted
//! file never keeps stale data and consumers can tell "nothing showing" from
//! "scrape failed".

use crate::config::ScrapeConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsSink};
use crate::error::Result;
use crate::extraction::{ExtractionReport, ShowtimeExtractor};
use crate::model::ScrapeResult;
use crate::renderer::{RenderContext, Renderer};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Run one capture with `renderer`.
pub async fn capture(
    renderer: &dyn Renderer,
    config: &ScrapeConfig,
    sink: &dyn DiagnosticsSink,
) -> ScrapeResult {
    let captured_at = Utc::now();
    let cinema = config.cinema.clone();

    let extractor = match ShowtimeExtractor::new(&config.selectors, &cinema.url) {
        Ok(extractor) => extractor,
        Err(e) => return fail(config, sink, captured_at, e.to_string()),
    };

    let mut context = match renderer.new_context().await {
        Ok(context) => context,
        Err(e) => return fail(config, sink, captured_at, e.to_string()),
    };

    let outcome = render_and_extract(context.as_mut(), &extractor, config, sink).await;

    if let Err(e) = context.close().await {
        warn!("failed to close browser context: {e}");
    }

    match outcome {
        Ok(report) if report.is_empty_page() => fail(
            config,
            sink,
            captured_at,
            format!(
                "no film container found on {} (tried {} selectors)",
                cinema.url,
                extractor.container_selectors().len()
            ),
        ),
        Ok(report) => {
            info!(
                films = report.films.len(),
                skipped = report.skipped,
                selector = report.matched_selector.as_deref().unwrap_or_default(),
                "capture complete"
            );
            ScrapeResult::success(cinema, captured_at, report.films)
        }
        Err(e) => fail(config, sink, captured_at, e.to_string()),
    }
}

async fn render_and_extract(
    context: &mut dyn RenderContext,
    extractor: &ShowtimeExtractor,
    config: &ScrapeConfig,
    sink: &dyn DiagnosticsSink,
) -> Result<ExtractionReport> {
    let url = config.cinema.url.as_str();
    let browser = &config.browser;

    info!("loading {url}");
    let navigation = match context.navigate(url, browser.navigation_timeout_ms).await {
        Ok(navigation) => navigation,
        Err(e) => {
            dump_page(&*context, url, sink).await;
            return Err(e);
        }
    };
    debug!(final_url = %navigation.final_url, ms = navigation.load_time_ms, "navigation done");

    dismiss_consent(&*context, config).await;

    let selectors = extractor.container_selectors();
    match context
        .wait_for_any(&selectors, browser.selector_timeout_ms)
        .await
    {
        Ok(Some(selector)) => info!("film cards found with {selector}"),
        Ok(None) => warn!(
            timeout_ms = browser.selector_timeout_ms,
            "no film card appeared, extracting anyway"
        ),
        Err(e) => warn!("waiting for film cards failed: {e}"),
    }

    let html = match context.html().await {
        Ok(html) => html,
        Err(e) => {
            dump_page(&*context, url, sink).await;
            return Err(e);
        }
    };

    let report = extractor.extract_html(&html, sink);
    if report.is_empty_page() {
        sink.report(Diagnostic::PageSnapshot {
            url: url.to_string(),
            html,
        });
        report_screenshot(&*context, url, sink).await;
    }
    Ok(report)
}

/// Click the first cookie-consent button present, then let the overlay go.
async fn dismiss_consent(context: &dyn RenderContext, config: &ScrapeConfig) {
    for selector in &config.browser.consent_selectors {
        match context.click_if_present(selector).await {
            Ok(true) => {
                info!("cookie consent dismissed via {selector}");
                tokio::time::sleep(Duration::from_millis(config.browser.consent_settle_ms)).await;
                return;
            }
            Ok(false) => {}
            Err(e) => debug!("consent button {selector} not clickable: {e}"),
        }
    }
    debug!("no cookie consent overlay");
}

/// Best-effort HTML and screenshot of whatever the context shows.
async fn dump_page(context: &dyn RenderContext, url: &str, sink: &dyn DiagnosticsSink) {
    if let Ok(html) = context.html().await {
        sink.report(Diagnostic::PageSnapshot {
            url: url.to_string(),
            html,
        });
    }
    report_screenshot(context, url, sink).await;
}

async fn report_screenshot(context: &dyn RenderContext, url: &str, sink: &dyn DiagnosticsSink) {
    match context.screenshot().await {
        Ok(png) => sink.report(Diagnostic::Screenshot {
            url: url.to_string(),
            png,
        }),
        Err(e) => debug!("no screenshot: {e}"),
    }
}

fn fail(
    config: &ScrapeConfig,
    sink: &dyn DiagnosticsSink,
    captured_at: chrono::DateTime<Utc>,
    error: String,
) -> ScrapeResult {
    warn!("capture failed: {error}");
    sink.report(Diagnostic::CaptureFailed {
        url: config.cinema.url.clone(),
        error: error.clone(),
    });
    ScrapeResult::failure(config.cinema.clone(), captured_at, error)
}
