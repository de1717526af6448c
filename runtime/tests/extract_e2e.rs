//! Full pipeline over saved pages: snapshot renderer, capture, persisted JSON.

use assert_json_diff::assert_json_include;
use magic_showtimes::capture::capture;
use magic_showtimes::config::ScrapeConfig;
use magic_showtimes::diagnostics::{DirectorySink, NullSink};
use magic_showtimes::renderer::SnapshotRenderer;
use magic_showtimes::store;
use serde_json::{json, Value};

const SHOWTIMES_PAGE: &str = r#"<!DOCTYPE html>
<html lang="fr"><body>
  <div id="didomi-host"></div>
  <main>
    <div class="css-1fwauv0">
      <a href="/film/dune-deuxieme-partie" title="Dune : Deuxième Partie">
        <picture>
          <source srcset="https://cdn.example.net/dune_250_x375.jpg 250w, https://cdn.example.net/dune_500_x750.jpg 500w">
          <img src="/img/placeholder.png" alt="">
        </picture>
      </a>
      <div class="css-uyt4dk"><span>2h46min</span></div>
      <div class="css-fqfb77"><div><div>Genre : Science-fiction, Aventure</div></div></div>
      <time><span>14:00</span></time>
      <time><span>20:30</span></time>
    </div>
    <div class="css-1fwauv0">
      <h3>Le Comte de Monte-Cristo</h3>
      <a aria-label="Séance de 17h45" href="/reservation/1">17h45</a>
    </div>
    <div class="css-1fwauv0">
      <a title="Prochainement">Prochainement</a>
    </div>
  </main>
</body></html>"#;

fn config(dir: &std::path::Path) -> ScrapeConfig {
    let mut config = ScrapeConfig {
        output: dir.join("data").join("cinema-magic.json"),
        ..ScrapeConfig::default()
    };
    config.browser.consent_settle_ms = 0;
    config
}

#[tokio::test]
async fn test_snapshot_capture_writes_expected_document() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(tmp.path());

    let result = capture(&SnapshotRenderer::new(SHOWTIMES_PAGE), &config, &NullSink).await;
    store::write_result(&config.output, &result).unwrap();

    let raw = std::fs::read_to_string(&config.output).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();

    assert_json_include!(
        actual: doc.clone(),
        expected: json!({
            "cinema": {
                "nom": "Cinema Magic",
                "ville": "Le Creusot",
                "url": "https://www.cinemamagic-creusot.fr/horaires/"
            },
            "films": [
                {
                    "titre": "Dune : Deuxième Partie",
                    "affiche": "https://cdn.example.net/dune_500_x750.jpg",
                    "lien": "https://www.cinemamagic-creusot.fr/film/dune-deuxieme-partie",
                    "duree": "2h46min",
                    "genre": "Science-fiction, Aventure",
                    "horaires": ["14:00", "20:30"]
                },
                {
                    "titre": "Le Comte de Monte-Cristo",
                    "genre": "Film",
                    "duree": "",
                    "horaires": ["17:45"]
                }
            ]
        })
    );
    assert_eq!(doc["films"].as_array().unwrap().len(), 2);
    assert!(doc.get("error").is_none());
    assert_eq!(
        doc["date"].as_str().unwrap(),
        &doc["dateUpdate"].as_str().unwrap()[..10]
    );
}

#[tokio::test]
async fn test_unrecognised_page_persists_error_document() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config(tmp.path());
    let debug_dir = tmp.path().join("debug");
    config.debug_dir = Some(debug_dir.clone());

    // A previous good capture must not survive a failed one.
    let good = capture(&SnapshotRenderer::new(SHOWTIMES_PAGE), &config, &NullSink).await;
    store::write_result(&config.output, &good).unwrap();

    let page = "<html><body><h1>Maintenance en cours</h1></body></html>";
    let sink = DirectorySink::new(&debug_dir);
    let result = capture(&SnapshotRenderer::new(page), &config, &sink).await;
    store::write_result(&config.output, &result).unwrap();

    let doc: Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output).unwrap()).unwrap();
    assert_eq!(doc["films"], json!([]));
    assert!(!doc["error"].as_str().unwrap().is_empty());

    let snapshot = std::fs::read_to_string(debug_dir.join(DirectorySink::SNAPSHOT_FILE)).unwrap();
    assert!(snapshot.contains("Maintenance"));
    let log = std::fs::read_to_string(debug_dir.join(DirectorySink::LOG_FILE)).unwrap();
    assert!(log.contains("no film container matched"));
}
