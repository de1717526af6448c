//! Persistence of the result document.
//!
//! The file is replaced atomically: readers see either the previous capture
//! or the new one, never a half-written file.

use crate::error::{Result, ScrapeError};
use crate::model::ScrapeResult;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `result` as pretty JSON to `path`, replacing any previous capture.
pub fn write_result(path: &Path, result: &ScrapeResult) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ScrapeError::io(parent, e))?;
    }

    let mut json = serde_json::to_string_pretty(result)?;
    json.push('\n');

    let tmp = temp_path(path);
    fs::write(&tmp, json).map_err(|e| ScrapeError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(ScrapeError::io(path, e));
    }

    info!(
        path = %path.display(),
        films = result.films.len(),
        failed = result.is_failure(),
        "result written"
    );
    Ok(())
}

/// Read back a persisted document.
pub fn read_result(path: &Path) -> Result<ScrapeResult> {
    let raw = fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Sibling temp file, on the same filesystem so the rename is atomic.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CinemaInfo, FilmRecord};
    use chrono::{TimeZone, Utc};

    fn sample(films: Vec<FilmRecord>) -> ScrapeResult {
        ScrapeResult::success(
            CinemaInfo::default(),
            Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap(),
            films,
        )
    }

    fn film(title: &str) -> FilmRecord {
        FilmRecord {
            title: title.to_string(),
            poster_url: String::new(),
            detail_url: String::new(),
            duration: "2h 46min".to_string(),
            genre: "Science-fiction".to_string(),
            showtimes: vec!["20:00".to_string()],
        }
    }

    #[test]
    fn test_write_creates_directories_and_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data").join("cinema-magic.json");

        let result = sample(vec![film("Dune")]);
        write_result(&path, &result).unwrap();

        assert_eq!(read_result(&path).unwrap(), result);
        assert!(fs::read_to_string(&path).unwrap().ends_with("}\n"));
    }

    #[test]
    fn test_write_replaces_previous_capture() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cinema-magic.json");

        write_result(&path, &sample(vec![film("Dune"), film("Alien")])).unwrap();
        let failed = ScrapeResult::failure(
            CinemaInfo::default(),
            Utc.with_ymd_and_hms(2026, 3, 15, 9, 30, 0).unwrap(),
            "timed out",
        );
        write_result(&path, &failed).unwrap();

        let back = read_result(&path).unwrap();
        assert!(back.films.is_empty());
        assert_eq!(back.error.as_deref(), Some("timed out"));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cinema-magic.json");
        write_result(&path, &sample(vec![film("Dune")])).unwrap();

        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("cinema-magic.json")]);
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/srv/data/magic.json"));
        assert_eq!(tmp.parent(), Some(Path::new("/srv/data")));
        assert!(tmp
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("magic.json."));
    }
}
