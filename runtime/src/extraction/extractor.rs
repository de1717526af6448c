//! Film card discovery and record assembly.

use super::profile::{CompiledProfile, SelectorProfile};
use super::{fields, showtimes, Card};
use crate::diagnostics::{Diagnostic, DiagnosticsSink, NullSink, SkipReason};
use crate::error::{Result, ScrapeError};
use crate::model::FilmRecord;
use scraper::{ElementRef, Html};
use tracing::{debug, info};
use url::Url;

/// What one extraction pass found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Container selector that matched, `None` when the whole cascade missed.
    pub matched_selector: Option<String>,
    /// Number of cards found under the matched selector.
    pub containers: usize,
    /// Cards dropped for lacking a title or showtimes.
    pub skipped: usize,
    pub films: Vec<FilmRecord>,
}

impl ExtractionReport {
    /// True when no container selector matched anything.
    pub fn is_empty_page(&self) -> bool {
        self.matched_selector.is_none()
    }
}

/// Turns a rendered showtimes page into film records.
pub struct ShowtimeExtractor {
    selectors: CompiledProfile,
    page_url: Url,
}

impl ShowtimeExtractor {
    pub fn new(profile: &SelectorProfile, page_url: &str) -> Result<Self> {
        let page_url = Url::parse(page_url)
            .map_err(|e| ScrapeError::Config(format!("invalid page url {page_url}: {e}")))?;
        Ok(Self {
            selectors: profile.compile()?,
            page_url,
        })
    }

    /// Container selectors in the order they are probed.
    pub fn container_selectors(&self) -> Vec<String> {
        self.selectors
            .containers
            .iter()
            .map(|(raw, _)| raw.clone())
            .collect()
    }

    /// Film records of a parsed page, in document order.
    pub fn extract(&self, document: &Html) -> Vec<FilmRecord> {
        self.extract_with_report(document, &NullSink).films
    }

    /// Parse markup and extract in one step. The parsed tree is dropped
    /// before returning, so this is safe to call from async code.
    pub fn extract_html(&self, html: &str, sink: &dyn DiagnosticsSink) -> ExtractionReport {
        let document = Html::parse_document(html);
        self.extract_with_report(&document, sink)
    }

    pub fn extract_with_report(
        &self,
        document: &Html,
        sink: &dyn DiagnosticsSink,
    ) -> ExtractionReport {
        let Some((selector, containers)) = self.find_containers(document) else {
            let tried = self.container_selectors();
            info!(selectors = tried.len(), "no film container matched");
            sink.report(Diagnostic::NoContainers { tried });
            return ExtractionReport::default();
        };

        debug!(%selector, count = containers.len(), "film containers found");

        let mut report = ExtractionReport {
            matched_selector: Some(selector),
            containers: containers.len(),
            ..ExtractionReport::default()
        };

        for (index, element) in containers.into_iter().enumerate() {
            match self.extract_card(element) {
                Ok(film) => report.films.push(film),
                Err(reason) => {
                    debug!(index, ?reason, "film card skipped");
                    report.skipped += 1;
                    sink.report(Diagnostic::ContainerSkipped { index, reason });
                }
            }
        }

        report
    }

    /// First selector of the cascade with at least one match.
    fn find_containers<'a>(&self, document: &'a Html) -> Option<(String, Vec<ElementRef<'a>>)> {
        self.selectors.containers.iter().find_map(|(raw, selector)| {
            let found: Vec<_> = document.select(selector).collect();
            if found.is_empty() {
                None
            } else {
                Some((raw.clone(), found))
            }
        })
    }

    fn extract_card(&self, element: ElementRef<'_>) -> std::result::Result<FilmRecord, SkipReason> {
        let card = Card {
            element,
            selectors: &self.selectors,
            page_url: &self.page_url,
        };

        let title = fields::title(&card).ok_or(SkipReason::NoTitle)?;
        let found = showtimes::showtimes(&card).ok_or_else(|| SkipReason::NoShowtimes {
            title: title.clone(),
        })?;
        debug!(%title, method = found.strategy, count = found.value.len(), "showtimes resolved");

        Ok(FilmRecord {
            poster_url: fields::poster(&card),
            detail_url: fields::detail_link(&card),
            duration: fields::duration(&card),
            genre: fields::genre(&card),
            showtimes: found.value,
            title,
        })
    }
}
