//! Selector profile: every CSS selector and marker the extractor relies on.
//!
//! The showtimes site is a CSS-in-JS build whose class names change between
//! deployments, so the profile is plain data that can be overridden from the
//! config file without touching code.

use crate::error::{Result, ScrapeError};
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// Raw selectors, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorProfile {
    /// Film card selectors in priority order. The first one matching at
    /// least one element is used; the others are ignored.
    pub containers: Vec<String>,
    /// Anchor carrying the film title in its `title` attribute.
    pub title_link: String,
    /// Fallback title holders, in priority order.
    pub title_text: Vec<String>,
    /// Responsive image sources (`srcset`).
    pub poster_sources: String,
    /// Plain images, in priority order.
    pub poster_images: Vec<String>,
    /// File-name fragment of the preferred poster width.
    pub poster_width_tag: String,
    /// Path fragment identifying a film detail link.
    pub detail_path: String,
    /// Elements dedicated to the runtime.
    pub duration: Vec<String>,
    /// Elements holding a `Genre :` label.
    pub genre_labels: Vec<String>,
    /// Time-bearing elements whose text nodes are showtimes.
    pub time_elements: Vec<String>,
    /// Links and buttons labelled with a showtime.
    pub aria_labelled: Vec<String>,
}

impl Default for SelectorProfile {
    fn default() -> Self {
        Self {
            containers: strings(&[
                ".css-1fwauv0",
                "[data-testid=\"movie-showtimes\"]",
                ".movie-card",
                ".film-card",
                "article.film",
            ]),
            title_link: "a[title]".to_string(),
            title_text: strings(&["h2", "h3", "h4", "[class*=\"title\"]", "a"]),
            poster_sources: "picture source".to_string(),
            poster_images: strings(&["picture img", "img"]),
            poster_width_tag: "_500_x".to_string(),
            detail_path: "/film/".to_string(),
            duration: strings(&[".css-uyt4dk span", "[class*=\"duration\"]"]),
            genre_labels: strings(&[".css-fqfb77 > div > div", "span.css-45pqov"]),
            time_elements: strings(&["time span", "time"]),
            aria_labelled: strings(&["a[aria-label]", "button[aria-label]"]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Parsed form of a [`SelectorProfile`].
#[derive(Debug, Clone)]
pub struct CompiledProfile {
    pub containers: Vec<(String, Selector)>,
    pub title_link: Selector,
    pub title_text: Vec<Selector>,
    pub poster_sources: Selector,
    pub poster_images: Vec<Selector>,
    pub poster_width_tag: String,
    pub detail_links: Selector,
    pub detail_path: String,
    pub duration: Vec<Selector>,
    pub genre_labels: Vec<Selector>,
    pub time_elements: Vec<Selector>,
    pub aria_labelled: Vec<Selector>,
}

impl SelectorProfile {
    /// Parse every selector, failing on the first invalid one.
    pub fn compile(&self) -> Result<CompiledProfile> {
        if self.containers.is_empty() {
            return Err(ScrapeError::Config(
                "selector profile has no container selectors".to_string(),
            ));
        }

        Ok(CompiledProfile {
            containers: self
                .containers
                .iter()
                .map(|s| -> Result<(String, Selector)> { Ok((s.clone(), parse(s)?)) })
                .collect::<Result<_>>()?,
            title_link: parse(&self.title_link)?,
            title_text: parse_all(&self.title_text)?,
            poster_sources: parse(&self.poster_sources)?,
            poster_images: parse_all(&self.poster_images)?,
            poster_width_tag: self.poster_width_tag.clone(),
            detail_links: parse("a[href]")?,
            detail_path: self.detail_path.clone(),
            duration: parse_all(&self.duration)?,
            genre_labels: parse_all(&self.genre_labels)?,
            time_elements: parse_all(&self.time_elements)?,
            aria_labelled: parse_all(&self.aria_labelled)?,
        })
    }
}

fn parse(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn parse_all(selectors: &[String]) -> Result<Vec<Selector>> {
    selectors.iter().map(|s| parse(s)).collect()
}
