//! Film records and the persisted capture document.
//!
//! Field names on the wire are French (`titre`, `horaires`, ...) because the
//! consumers of the JSON file predate this crate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Genre used when a film card carries no `Genre :` label.
pub const DEFAULT_GENRE: &str = "Film";

/// One film listed on the showtimes page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRecord {
    #[serde(rename = "titre")]
    pub title: String,
    /// Poster URL, empty when unresolved.
    #[serde(rename = "affiche", default)]
    pub poster_url: String,
    /// Film detail page, or the showtimes page when no detail link exists.
    #[serde(rename = "lien", default)]
    pub detail_url: String,
    /// Free-text runtime such as `1h 39min`; empty when not found.
    #[serde(rename = "duree", default)]
    pub duration: String,
    #[serde(default = "default_genre")]
    pub genre: String,
    /// Screening times in first-seen order, without duplicates.
    #[serde(rename = "horaires")]
    pub showtimes: Vec<String>,
}

fn default_genre() -> String {
    DEFAULT_GENRE.to_string()
}

impl FilmRecord {
    /// A record is persisted only with a title and at least one showtime.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.showtimes.is_empty()
    }
}

/// Static description of the cinema, taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinemaInfo {
    #[serde(rename = "nom")]
    pub name: String,
    #[serde(rename = "ville")]
    pub city: String,
    #[serde(rename = "adresse")]
    pub address: String,
    /// Showtimes page that gets scraped.
    pub url: String,
}

impl Default for CinemaInfo {
    fn default() -> Self {
        Self {
            name: "Cinema Magic".to_string(),
            city: "Le Creusot".to_string(),
            address: "71200 Le Creusot".to_string(),
            url: "https://www.cinemamagic-creusot.fr/horaires/".to_string(),
        }
    }
}

/// The document written at the end of every run.
///
/// `error` is present only when the capture failed as a whole, in which case
/// `films` is empty. An empty `films` without `error` means the page rendered
/// but listed nothing to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub cinema: CinemaInfo,
    /// Day the capture ran (UTC), not the screening date.
    #[serde(rename = "date")]
    pub capture_date: NaiveDate,
    #[serde(rename = "dateUpdate")]
    pub captured_at: DateTime<Utc>,
    pub films: Vec<FilmRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResult {
    /// Successful capture. Invalid records are dropped here as well so the
    /// persisted invariant holds whatever the caller passes in.
    pub fn success(cinema: CinemaInfo, captured_at: DateTime<Utc>, films: Vec<FilmRecord>) -> Self {
        Self {
            cinema,
            capture_date: captured_at.date_naive(),
            captured_at,
            films: films.into_iter().filter(FilmRecord::is_valid).collect(),
            error: None,
        }
    }

    /// Total failure: no films and an explicit reason.
    pub fn failure(cinema: CinemaInfo, captured_at: DateTime<Utc>, error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.trim().is_empty() {
            error = "capture failed".to_string();
        }
        Self {
            cinema,
            capture_date: captured_at.date_naive(),
            captured_at,
            films: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Total number of screenings across all films.
    pub fn showtime_count(&self) -> usize {
        self.films.iter().map(|f| f.showtimes.len()).sum()
    }
}
