//! Text patterns matched against film cards.

use regex::Regex;
use std::sync::LazyLock;

/// A whole string that is exactly one `HH:MM` time.
static STRICT_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("strict time regex is valid"));

/// A whole string that is exactly one `HH:MM` or `HHhMM` time.
static ANY_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]?\d|2[0-3])\s*[:hH]\s*([0-5]\d)$").expect("time regex is valid")
});

/// `HH:MM` anywhere inside free text.
static FREE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("free time regex is valid")
});

/// `1h45min`, no spaces.
static NARROW_DURATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+h\d+min").expect("narrow duration regex is valid"));

/// `1h 45 min`, `2 H min`, any spacing or case.
static LOOSE_DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+\s*h\s*\d*\s*min").expect("loose duration regex is valid")
});

/// The `Genre :` label, with or without spaces around the colon.
static GENRE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)genres?\s*:").expect("genre marker regex is valid"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Parse a string that holds exactly one `HH:MM` time.
pub fn strict_time(text: &str) -> Option<String> {
    let caps = STRICT_TIME_RE.captures(text.trim())?;
    Some(canonical_time(&caps[1], &caps[2]))
}

/// Parse a string that holds exactly one `HH:MM` or `HHhMM` time.
pub fn any_time(text: &str) -> Option<String> {
    let caps = ANY_TIME_RE.captures(text.trim())?;
    Some(canonical_time(&caps[1], &caps[2]))
}

/// Every `HH:MM` occurrence in free text, in order.
pub fn times_in_text(text: &str) -> Vec<String> {
    FREE_TIME_RE
        .captures_iter(text)
        .map(|caps| canonical_time(&caps[1], &caps[2]))
        .collect()
}

fn canonical_time(hours: &str, minutes: &str) -> String {
    format!("{hours}:{minutes}")
}

pub fn narrow_duration(text: &str) -> Option<String> {
    NARROW_DURATION_RE
        .find(text)
        .map(|m| m.as_str().to_string())
}

pub fn loose_duration(text: &str) -> Option<String> {
    LOOSE_DURATION_RE
        .find(text)
        .map(|m| normalize_ws(m.as_str()))
}

/// Text following the first `Genre :` label, or `None` when the label is
/// missing or nothing follows it.
pub fn genre_after_marker(text: &str) -> Option<String> {
    let m = GENRE_MARKER_RE.find(text)?;
    let genre = normalize_ws(&text[m.end()..]);
    let genre = genre.trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace());
    if genre.is_empty() {
        None
    } else {
        Some(genre.to_string())
    }
}

/// Whether the text carries a `Genre :` label at all.
pub fn has_genre_marker(text: &str) -> bool {
    GENRE_MARKER_RE.is_match(text)
}

/// First URL in a `srcset` list whose file name carries the width tag.
pub fn tagged_candidate<'a>(srcset: &'a str, width_tag: &str) -> Option<&'a str> {
    srcset_candidates(srcset).find(|url| url.contains(width_tag))
}

/// URLs of a `srcset` attribute, descriptors (`500w`, `2x`) dropped.
///
/// Candidates are split on whitespace, not on commas: a comma only ends a
/// candidate when it trails a URL or a descriptor, so CDN paths such as
/// `c_fill,w_500` stay whole.
pub fn srcset_candidates(srcset: &str) -> impl Iterator<Item = &str> {
    let mut urls = Vec::new();
    let mut in_descriptors = false;
    for token in srcset.split_whitespace() {
        if in_descriptors {
            in_descriptors = !token.ends_with(',');
            continue;
        }
        let url = token.trim_start_matches(',').trim_end_matches(',');
        if url.is_empty() {
            continue;
        }
        urls.push(url);
        in_descriptors = !token.ends_with(',');
    }
    urls.into_iter()
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_ws(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_time() {
        assert_eq!(strict_time(" 14:30 ").as_deref(), Some("14:30"));
        assert_eq!(strict_time("9:05").as_deref(), Some("9:05"));
        assert_eq!(strict_time("20h30"), None);
        assert_eq!(strict_time("Séance 14:30"), None);
        assert_eq!(strict_time("25:00"), None);
    }

    #[test]
    fn test_any_time_normalizes_h_separator() {
        assert_eq!(any_time("20h30").as_deref(), Some("20:30"));
        assert_eq!(any_time("20 H 30").as_deref(), Some("20:30"));
        assert_eq!(any_time("18:45").as_deref(), Some("18:45"));
        assert_eq!(any_time("1h45").as_deref(), Some("1:45"));
        assert_eq!(any_time("9h30").as_deref(), Some("9:30"));
        assert_eq!(any_time("2h min"), None);
    }

    #[test]
    fn test_times_in_text() {
        assert_eq!(times_in_text("Séance 21:10 salle 2"), vec!["21:10"]);
        assert_eq!(times_in_text("14:00 / 17:30 (VO)"), vec!["14:00", "17:30"]);
        assert!(times_in_text("Durée 1h45min").is_empty());
    }

    #[test]
    fn test_narrow_duration_ignores_surrounding_text() {
        assert_eq!(
            narrow_duration("Durée totale : 1h45min environ").as_deref(),
            Some("1h45min")
        );
        assert_eq!(narrow_duration("1h 45min"), None);
    }

    #[test]
    fn test_loose_duration() {
        assert_eq!(loose_duration("Drame | 1h 39min").as_deref(), Some("1h 39min"));
        assert_eq!(loose_duration("2 H  05 MIN").as_deref(), Some("2 H 05 MIN"));
        assert_eq!(loose_duration("séance à 20h30"), None);
    }

    #[test]
    fn test_genre_after_marker() {
        assert_eq!(genre_after_marker("Genre : Drame").as_deref(), Some("Drame"));
        assert_eq!(
            genre_after_marker("Genre:  Comédie,\n Romance").as_deref(),
            Some("Comédie, Romance")
        );
        assert_eq!(genre_after_marker("Genre :"), None);
        assert_eq!(genre_after_marker("Drame"), None);
        assert!(has_genre_marker("GENRE : x"));
    }

    #[test]
    fn test_srcset_candidates() {
        let srcset = "https://cdn.example/a_250_x375.jpg 250w, https://cdn.example/a_500_x750.jpg 500w";
        assert_eq!(
            srcset_candidates(srcset).collect::<Vec<_>>(),
            vec!["https://cdn.example/a_250_x375.jpg", "https://cdn.example/a_500_x750.jpg"]
        );
        assert_eq!(
            tagged_candidate(srcset, "_500_x"),
            Some("https://cdn.example/a_500_x750.jpg")
        );
        assert_eq!(tagged_candidate(srcset, "_1000_x"), None);
    }

    #[test]
    fn test_srcset_candidates_keep_commas_inside_urls() {
        let srcset = "https://img.cdn.net/c_fill,w_250/p.jpg 250w 1x, \
                      https://img.cdn.net/c_fill,w_500/p.jpg 500w, /bare.jpg,/next.jpg";
        assert_eq!(
            srcset_candidates(srcset).collect::<Vec<_>>(),
            vec![
                "https://img.cdn.net/c_fill,w_250/p.jpg",
                "https://img.cdn.net/c_fill,w_500/p.jpg",
                "/bare.jpg,/next.jpg",
            ]
        );
    }
}
