//! `magic-showtimes extract <file>`: run the extractor over a saved page.

use crate::capture::capture;
use crate::cli::{output, scrape_cmd};
use crate::config::ScrapeConfig;
use crate::renderer::SnapshotRenderer;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;

/// Extract from `html_file`. The result is written to the configured output
/// when `write` is set, printed to stdout otherwise. A failed extraction still
/// exits 0 here; only `scrape` signals it through the exit code.
pub async fn run(config: ScrapeConfig, html_file: &Path, write: bool) -> Result<i32> {
    let start = Instant::now();
    let renderer = SnapshotRenderer::from_file(html_file)
        .with_context(|| format!("cannot load snapshot {}", html_file.display()))?;
    let sink = scrape_cmd::diagnostics_sink(&config);

    let result = capture(&renderer, &config, sink.as_ref()).await;

    if write {
        scrape_cmd::finish(&config, &result, start)?;
    } else {
        output::print_json(&result);
    }
    Ok(0)
}
