//! Per-field resolution for a film card.
//!
//! Each field is a cascade of strategies; a miss degrades to the field's
//! default and never aborts the rest of the card.

use super::cascade::{first_hit, Strategy};
use super::{patterns, spaced_text, text_content, Card};
use crate::model::DEFAULT_GENRE;
use scraper::ElementRef;

// ── Title ───────────────────────────────────────────────────────────────────

pub fn title<'a>(card: &Card<'a>) -> Option<String> {
    let strategies: [Strategy<Card<'a>, String>; 2] = [
        Strategy::new("title-attribute", title_from_attribute),
        Strategy::new("title-text", title_from_text),
    ];
    first_hit(card, &strategies).map(|hit| hit.value)
}

fn title_from_attribute(card: &Card<'_>) -> Option<String> {
    card.element
        .select(&card.selectors.title_link)
        .filter_map(|a| a.value().attr("title"))
        .map(patterns::normalize_ws)
        .find(|t| !t.is_empty())
}

fn title_from_text(card: &Card<'_>) -> Option<String> {
    card.selectors.title_text.iter().find_map(|selector| {
        card.element
            .select(selector)
            .map(text_content)
            .find(|t| !t.is_empty())
    })
}

// ── Poster ──────────────────────────────────────────────────────────────────

/// Poster URL, empty when no image is found.
pub fn poster<'a>(card: &Card<'a>) -> String {
    let strategies: [Strategy<Card<'a>, String>; 3] = [
        Strategy::new("srcset-width-tag", poster_tagged),
        Strategy::new("srcset-first", poster_first_candidate),
        Strategy::new("img-src", poster_img),
    ];
    first_hit(card, &strategies)
        .map(|hit| hit.value)
        .unwrap_or_default()
}

fn first_srcset<'a>(card: &Card<'a>) -> Option<&'a str> {
    card.element
        .select(&card.selectors.poster_sources)
        .filter_map(|source| source.value().attr("srcset"))
        .find(|srcset| !srcset.trim().is_empty())
}

fn poster_tagged(card: &Card<'_>) -> Option<String> {
    let srcset = first_srcset(card)?;
    let url = patterns::tagged_candidate(srcset, &card.selectors.poster_width_tag)?;
    card.resolve(url)
}

fn poster_first_candidate(card: &Card<'_>) -> Option<String> {
    let srcset = first_srcset(card)?;
    let url = patterns::srcset_candidates(srcset).next()?;
    card.resolve(url)
}

fn poster_img(card: &Card<'_>) -> Option<String> {
    card.selectors.poster_images.iter().find_map(|selector| {
        card.element
            .select(selector)
            .filter_map(|img| img.value().attr("src"))
            .filter(|src| !src.starts_with("data:"))
            .find_map(|src| card.resolve(src))
    })
}

// ── Detail link ─────────────────────────────────────────────────────────────

/// Film detail page, or the showtimes page itself when the card has none.
pub fn detail_link(card: &Card<'_>) -> String {
    card.element
        .select(&card.selectors.detail_links)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| is_detail_href(href, &card.selectors.detail_path))
        .find_map(|href| card.resolve_from_origin(href))
        .unwrap_or_else(|| card.page_url.to_string())
}

fn is_detail_href(href: &str, detail_path: &str) -> bool {
    href.contains(detail_path) || href.starts_with(detail_path.trim_start_matches('/'))
}

// ── Duration ────────────────────────────────────────────────────────────────

/// Free-text runtime, empty when not found.
pub fn duration<'a>(card: &Card<'a>) -> String {
    let strategies: [Strategy<Card<'a>, String>; 3] = [
        Strategy::new("dedicated-narrow", duration_dedicated_narrow),
        Strategy::new("dedicated-loose", duration_dedicated_loose),
        Strategy::new("card-loose", duration_card_loose),
    ];
    first_hit(card, &strategies)
        .map(|hit| hit.value)
        .unwrap_or_default()
}

fn duration_elements<'a>(card: &Card<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let element = card.element;
    let selectors = card.selectors;
    selectors
        .duration
        .iter()
        .flat_map(move |selector| element.select(selector))
}

fn duration_dedicated_narrow(card: &Card<'_>) -> Option<String> {
    duration_elements(card).find_map(|el| patterns::narrow_duration(&text_content(el)))
}

fn duration_dedicated_loose(card: &Card<'_>) -> Option<String> {
    duration_elements(card).find_map(|el| patterns::loose_duration(&spaced_text(el)))
}

fn duration_card_loose(card: &Card<'_>) -> Option<String> {
    patterns::loose_duration(&spaced_text(card.element))
}

// ── Genre ───────────────────────────────────────────────────────────────────

/// Genre after the `Genre :` label, or the generic placeholder.
pub fn genre<'a>(card: &Card<'a>) -> String {
    let strategies: [Strategy<Card<'a>, String>; 2] = [
        Strategy::new("genre-label", genre_from_labels),
        Strategy::new("genre-anywhere", genre_from_any_element),
    ];
    first_hit(card, &strategies)
        .map(|hit| hit.value)
        .unwrap_or_else(|| DEFAULT_GENRE.to_string())
}

/// Configured label elements; when the label holds only the marker the
/// value sits in a sibling, so the parent's text is read instead.
fn genre_from_labels(card: &Card<'_>) -> Option<String> {
    card.selectors.genre_labels.iter().find_map(|selector| {
        card.element
            .select(selector)
            .filter(|label| patterns::has_genre_marker(&spaced_text(*label)))
            .find_map(|label| {
                patterns::genre_after_marker(&spaced_text(label)).or_else(|| {
                    label
                        .parent()
                        .and_then(ElementRef::wrap)
                        .and_then(|parent| patterns::genre_after_marker(&spaced_text(parent)))
                })
            })
    })
}

/// Smallest element of the card whose text carries the label and a value.
fn genre_from_any_element(card: &Card<'_>) -> Option<String> {
    card.element
        .descendants()
        .filter_map(ElementRef::wrap)
        .map(spaced_text)
        .filter_map(|text| {
            let genre = patterns::genre_after_marker(&text)?;
            Some((text.len(), genre))
        })
        .min_by_key(|(len, _)| *len)
        .map(|(_, genre)| genre)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::profile::SelectorProfile;
    use scraper::{Html, Selector};
    use url::Url;

    const PAGE: &str = "https://www.cinemamagic-creusot.fr/horaires/";

    fn with_card<R>(body: &str, f: impl FnOnce(&Card<'_>) -> R) -> R {
        let html = format!(r#"<html><body><div class="card">{body}</div></body></html>"#);
        let document = Html::parse_document(&html);
        let selector = Selector::parse(".card").unwrap();
        let element = document.select(&selector).next().unwrap();
        let selectors = SelectorProfile::default().compile().unwrap();
        let page_url = Url::parse(PAGE).unwrap();
        let card = Card {
            element,
            selectors: &selectors,
            page_url: &page_url,
        };
        f(&card)
    }

    #[test]
    fn test_title_prefers_link_attribute() {
        let t = with_card(
            r#"<h2>Affiche du jour</h2><a href="/film/dune" title=" Dune :  Deuxième partie ">voir</a>"#,
            title,
        );
        assert_eq!(t.as_deref(), Some("Dune : Deuxième partie"));
    }

    #[test]
    fn test_title_falls_back_to_heading_text() {
        let t = with_card(r#"<a title="">x</a><h2>  </h2><h3>Oppenheimer</h3>"#, title);
        assert_eq!(t.as_deref(), Some("Oppenheimer"));
    }

    #[test]
    fn test_title_missing() {
        assert_eq!(with_card("<span>20:00</span>", title), None);
    }

    #[test]
    fn test_poster_prefers_width_tagged_candidate() {
        let p = with_card(
            r#"<picture>
                 <source srcset="https://cdn.x/p_250_x375.jpg 250w, https://cdn.x/p_500_x750.jpg 500w">
                 <img src="https://cdn.x/fallback.jpg">
               </picture>"#,
            poster,
        );
        assert_eq!(p, "https://cdn.x/p_500_x750.jpg");
    }

    #[test]
    fn test_poster_url_with_commas_kept_whole() {
        let p = with_card(
            r#"<picture><source srcset="https://img.cdn.net/c_fill,w_250/p_250_x375.jpg 250w, https://img.cdn.net/c_fill,w_500/p_500_x750.jpg 500w"></picture>"#,
            poster,
        );
        assert_eq!(p, "https://img.cdn.net/c_fill,w_500/p_500_x750.jpg");
    }

    #[test]
    fn test_poster_first_candidate_then_img() {
        let p = with_card(
            r#"<picture><source srcset="/img/p_250.webp 250w, /img/p_1000.webp 1000w"></picture>"#,
            poster,
        );
        assert_eq!(p, "https://www.cinemamagic-creusot.fr/img/p_250.webp");

        let p = with_card(
            r#"<img src="data:image/gif;base64,AAAA"><img src="posters/alien.jpg">"#,
            poster,
        );
        assert_eq!(p, "https://www.cinemamagic-creusot.fr/horaires/posters/alien.jpg");

        assert_eq!(with_card("<p>no image</p>", poster), "");
    }

    #[test]
    fn test_detail_link_resolves_against_origin() {
        let l = with_card(
            r##"<a href="#top">top</a><a href="film/dune-2">Dune</a>"##,
            detail_link,
        );
        assert_eq!(l, "https://www.cinemamagic-creusot.fr/film/dune-2");

        let l = with_card(r#"<a href="https://other.example/film/x">x</a>"#, detail_link);
        assert_eq!(l, "https://other.example/film/x");
    }

    #[test]
    fn test_detail_link_defaults_to_page() {
        let l = with_card(r#"<a href="/reserver/123">Réserver</a>"#, detail_link);
        assert_eq!(l, PAGE);
    }

    #[test]
    fn test_duration_narrow_in_dedicated_element() {
        let d = with_card(
            r#"<div class="css-uyt4dk"><span>Durée totale : 1h45min environ</span></div>"#,
            duration,
        );
        assert_eq!(d, "1h45min");
    }

    #[test]
    fn test_duration_narrow_beats_loose_in_same_element() {
        let d = with_card(
            r#"<div class="css-uyt4dk"><span>Durée 1h 45 min, soit 1h45min</span></div>"#,
            duration,
        );
        assert_eq!(d, "1h45min");
    }

    #[test]
    fn test_duration_loose_in_card_text() {
        let d = with_card("<p>Drame</p><p>1h 39min</p>", duration);
        assert_eq!(d, "1h 39min");
        assert_eq!(with_card("<p>20h30</p>", duration), "");
    }

    #[test]
    fn test_genre_from_label_and_sibling() {
        let g = with_card(
            r#"<div class="css-fqfb77"><div><div>Genre : Science-fiction</div></div></div>"#,
            genre,
        );
        assert_eq!(g, "Science-fiction");

        let g = with_card(
            r#"<p><span class="css-45pqov">Genre :</span> Comédie dramatique</p>"#,
            genre,
        );
        assert_eq!(g, "Comédie dramatique");
    }

    #[test]
    fn test_genre_anywhere_picks_tightest_element() {
        let g = with_card(
            "<div><ul><li>Genre : Thriller</li><li>Durée : 2h 01min</li></ul></div>",
            genre,
        );
        assert_eq!(g, "Thriller");
    }

    #[test]
    fn test_genre_defaults_to_placeholder() {
        assert_eq!(with_card("<p>Sans étiquette</p>", genre), "Film");
        assert_eq!(with_card("<p>Genre :</p>", genre), "Film");
    }
}
