//! `magic-showtimes scrape`: capture the live page and write the result.

use crate::capture::capture;
use crate::cli::{doctor, output};
use crate::config::ScrapeConfig;
use crate::diagnostics::{DiagnosticsSink, DirectorySink, NullSink};
use crate::model::ScrapeResult;
use crate::renderer::{ChromiumRenderer, Renderer};
use crate::store;
use anyhow::{Context, Result};
use chrono::Utc;
use std::time::Instant;
use tracing::{info, warn};

/// Exit code when the written result records a failed capture.
pub const EXIT_CAPTURE_FAILED: i32 = 2;

/// Run one capture against the live site. Returns the process exit code.
pub async fn run(mut config: ScrapeConfig) -> Result<i32> {
    let start = Instant::now();
    let sink = diagnostics_sink(&config);

    if config.browser.executable.is_none() {
        config.browser.executable = doctor::find_chromium();
    }

    if !output::is_quiet() {
        let s = output::Styled::new();
        output::print_header(&s);
        eprintln!("  Capturing {}", s.cyan(&config.cinema.url));
        eprintln!();
    }

    let result = match ChromiumRenderer::launch(&config.browser).await {
        Ok(renderer) => {
            let result = capture(&renderer, &config, sink.as_ref()).await;
            if let Err(e) = renderer.shutdown().await {
                warn!("browser shutdown failed: {e}");
            }
            result
        }
        Err(e) => {
            warn!("{e}");
            ScrapeResult::failure(config.cinema.clone(), Utc::now(), e.to_string())
        }
    };

    finish(&config, &result, start)
}

/// Persist `result` and report it. Shared by every command that captures.
pub(crate) fn finish(config: &ScrapeConfig, result: &ScrapeResult, start: Instant) -> Result<i32> {
    store::write_result(&config.output, result)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    let elapsed = start.elapsed().as_millis();
    info!(elapsed_ms = elapsed as u64, "done");

    if !output::is_quiet() {
        let s = output::Styled::new();
        output::print_films(&s, result);
        eprintln!(
            "  {} {} {}",
            s.dim("Written to"),
            config.output.display(),
            s.dim(&format!("in {}", output::format_elapsed(elapsed)))
        );
    }

    Ok(if result.is_failure() {
        EXIT_CAPTURE_FAILED
    } else {
        0
    })
}

/// Debug artifacts go to the configured directory; without one they are
/// dropped.
pub(crate) fn diagnostics_sink(config: &ScrapeConfig) -> Box<dyn DiagnosticsSink> {
    match &config.debug_dir {
        Some(dir) => {
            info!("debug artifacts go to {}", dir.display());
            Box::new(DirectorySink::new(dir))
        }
        None => Box::new(NullSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CinemaInfo;

    #[test]
    fn test_finish_exit_codes() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ScrapeConfig {
            output: tmp.path().join("out").join("magic.json"),
            ..ScrapeConfig::default()
        };

        let ok = ScrapeResult::success(CinemaInfo::default(), Utc::now(), vec![]);
        assert_eq!(finish(&config, &ok, Instant::now()).unwrap(), 0);

        let failed = ScrapeResult::failure(CinemaInfo::default(), Utc::now(), "browser launch failed");
        assert_eq!(
            finish(&config, &failed, Instant::now()).unwrap(),
            EXIT_CAPTURE_FAILED
        );
        assert!(store::read_result(&config.output).unwrap().is_failure());
    }

    #[test]
    fn test_unwritable_output_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let config = ScrapeConfig {
            output: blocker.join("magic.json"),
            ..ScrapeConfig::default()
        };
        let ok = ScrapeResult::success(CinemaInfo::default(), Utc::now(), vec![]);
        assert!(finish(&config, &ok, Instant::now()).is_err());
    }
}
