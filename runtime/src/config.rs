//! Run configuration.
//!
//! Layered, later layers win: built-in defaults, then an optional JSON file,
//! then environment variables, then command-line flags (applied by the CLI).

use crate::error::{Result, ScrapeError};
use crate::extraction::SelectorProfile;
use crate::model::CinemaInfo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Chromium executable override.
pub const ENV_CHROMIUM_PATH: &str = "MAGIC_CHROMIUM_PATH";
/// Executable override honoured for compatibility with puppeteer setups.
pub const ENV_PUPPETEER_PATH: &str = "PUPPETEER_EXECUTABLE_PATH";
pub const ENV_OUTPUT: &str = "MAGIC_OUTPUT";
pub const ENV_DEBUG_DIR: &str = "MAGIC_DEBUG_DIR";
pub const ENV_CINEMA_URL: &str = "MAGIC_CINEMA_URL";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Everything one capture needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub cinema: CinemaInfo,
    /// Where the result document is written.
    pub output: PathBuf,
    /// Where debug artifacts go on failure; none are written when unset.
    pub debug_dir: Option<PathBuf>,
    pub browser: BrowserSettings,
    pub selectors: SelectorProfile,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            cinema: CinemaInfo::default(),
            output: PathBuf::from("data/cinema-magic.json"),
            debug_dir: None,
            browser: BrowserSettings::default(),
            selectors: SelectorProfile::default(),
        }
    }
}

/// How the page-loading browser is driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Chromium binary; auto-detected when unset.
    pub executable: Option<PathBuf>,
    pub user_agent: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Budget for the initial page load.
    pub navigation_timeout_ms: u64,
    /// Budget for the first film card to show up.
    pub selector_timeout_ms: u64,
    /// Cookie-consent buttons clicked when present.
    pub consent_selectors: Vec<String>,
    /// Pause after dismissing the consent overlay.
    pub consent_settle_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            executable: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            window_width: 1366,
            window_height: 900,
            navigation_timeout_ms: 60_000,
            selector_timeout_ms: 30_000,
            consent_selectors: vec!["#didomi-notice-agree-button".to_string()],
            consent_settle_ms: 1_000,
        }
    }
}

impl ScrapeConfig {
    /// Defaults, overlaid with `path` when given, then with the process
    /// environment. Not validated: command-line overrides still apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
        let config = serde_json::from_str(&raw)
            .map_err(|e| ScrapeError::Config(format!("{}: {e}", path.display())))?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`. Empty values are
    /// ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = var(ENV_CHROMIUM_PATH).or_else(|| var(ENV_PUPPETEER_PATH)) {
            self.browser.executable = Some(PathBuf::from(path));
        }
        if let Some(output) = var(ENV_OUTPUT) {
            self.output = PathBuf::from(output);
        }
        if let Some(dir) = var(ENV_DEBUG_DIR) {
            self.debug_dir = Some(PathBuf::from(dir));
        }
        if let Some(url) = var(ENV_CINEMA_URL) {
            self.cinema.url = url;
        }
    }

    /// Check the page URL, timeouts and every selector.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.cinema.url).map_err(|e| {
            ScrapeError::Config(format!("invalid cinema url {}: {e}", self.cinema.url))
        })?;
        if self.browser.navigation_timeout_ms == 0 {
            return Err(ScrapeError::Config(
                "navigation_timeout_ms must be positive".to_string(),
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err(ScrapeError::Config("output path is empty".to_string()));
        }
        self.selectors.compile()?;
        Ok(())
    }
}
