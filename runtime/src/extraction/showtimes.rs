//! Showtime resolution.
//!
//! Methods are tried from the most specific markup to a free-text scan and
//! the first one yielding any time wins. Later methods are fallbacks only;
//! their results are never merged with an earlier method's.

use super::cascade::{first_non_empty, Hit, Strategy};
use super::{patterns, spaced_text, text_content, Card};
use scraper::{ElementRef, Selector};
use std::collections::HashSet;

/// Showtimes of a card, deduplicated in first-seen order, with the name of
/// the method that found them.
pub fn showtimes<'a>(card: &Card<'a>) -> Option<Hit<Vec<String>>> {
    let strategies: [Strategy<Card<'a>, Vec<String>>; 4] = [
        Strategy::new("time-elements", from_time_elements),
        Strategy::new("aria-label", from_aria_labels),
        Strategy::new("element-text", from_element_text),
        Strategy::new("free-text", from_free_text),
    ];
    first_non_empty(card, &strategies).map(|hit| Hit {
        strategy: hit.strategy,
        value: dedup(hit.value),
    })
}

/// (a) text nodes inside dedicated time elements.
fn from_time_elements(card: &Card<'_>) -> Option<Vec<String>> {
    let times = matching(card, &card.selectors.time_elements)
        .flat_map(|el| el.text())
        .filter_map(patterns::strict_time)
        .collect();
    Some(times)
}

/// (b) `aria-label` on links and buttons.
fn from_aria_labels(card: &Card<'_>) -> Option<Vec<String>> {
    let times = matching(card, &card.selectors.aria_labelled)
        .filter_map(|el| el.value().attr("aria-label"))
        .filter_map(patterns::strict_time)
        .collect();
    Some(times)
}

/// Card elements matching any of `selectors`, in document order.
fn matching<'a>(
    card: &Card<'a>,
    selectors: &'a [Selector],
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    card.element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| selectors.iter().any(|selector| selector.matches(el)))
}

/// (c) any element whose whole text is a time, `HH:MM` or `HHhMM`.
fn from_element_text(card: &Card<'_>) -> Option<Vec<String>> {
    let times = card
        .element
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter_map(|el| patterns::any_time(&text_content(el)))
        .collect();
    Some(times)
}

/// (d) every `HH:MM` found in the card's text.
fn from_free_text(card: &Card<'_>) -> Option<Vec<String>> {
    Some(patterns::times_in_text(&spaced_text(card.element)))
}

/// Drop repeated times, keeping the first occurrence of each.
pub fn dedup(times: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    times
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
