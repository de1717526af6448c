//! Showtime extraction from a rendered page.
//!
//! Pure functions over a parsed document: no I/O, no clock, no randomness.
//! The page must already be fully rendered; producing that markup is the
//! renderer's job.

pub mod cascade;
pub mod extractor;
pub mod fields;
pub mod patterns;
pub mod profile;
pub mod showtimes;

pub use extractor::{ExtractionReport, ShowtimeExtractor};
pub use profile::{CompiledProfile, SelectorProfile};

use scraper::ElementRef;
use url::Url;

/// One film card being extracted, with what its strategies need to see.
pub struct Card<'a> {
    pub element: ElementRef<'a>,
    pub selectors: &'a CompiledProfile,
    pub page_url: &'a Url,
}

impl Card<'_> {
    /// Resolve a `src` the way a browser does, relative to the page.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        let reference = usable_reference(reference)?;
        self.page_url.join(reference).ok().map(String::from)
    }

    /// Resolve an `href` against the site origin: `film/dune` and
    /// `/film/dune` both land on `https://host/film/dune`.
    pub fn resolve_from_origin(&self, reference: &str) -> Option<String> {
        let reference = usable_reference(reference)?;
        if Url::parse(reference).is_ok() {
            return Some(reference.to_string());
        }
        let origin = self.page_url.join("/").ok()?;
        let rooted = if reference.starts_with('/') {
            reference.to_string()
        } else {
            format!("/{reference}")
        };
        origin.join(&rooted).ok().map(String::from)
    }
}

fn usable_reference(reference: &str) -> Option<&str> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('#') || reference.starts_with("javascript:") {
        None
    } else {
        Some(reference)
    }
}

/// Element text as the DOM's `textContent` reads it, whitespace collapsed.
pub(crate) fn text_content(element: ElementRef<'_>) -> String {
    patterns::normalize_ws(&element.text().collect::<String>())
}

/// Element text with a space between text nodes, so adjacent cells
/// (`<span>20:00</span><span>22:15</span>`) stay apart.
pub(crate) fn spaced_text(element: ElementRef<'_>) -> String {
    patterns::normalize_ws(&element.text().collect::<Vec<_>>().join(" "))
}
