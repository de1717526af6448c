//! Environment readiness check.
//!
//! Verifies that a capture can run here: a Chromium binary that starts
//! headless, a usable configuration, and an output location that accepts
//! writes. Every failure comes with a fix instruction.

use crate::cli::output::{self, Styled};
use crate::config::{ScrapeConfig, ENV_CHROMIUM_PATH, ENV_PUPPETEER_PATH};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Binaries looked up on `PATH`, in order.
const CHROMIUM_NAMES: &[&str] = &["google-chrome", "chromium", "chromium-browser"];

/// Run every check. Returns the process exit code.
pub async fn run(config: &ScrapeConfig) -> Result<i32> {
    let s = Styled::new();
    let mut ready = true;

    output::print_header(&s);

    // Browser
    output::print_section(&s, "Browser");
    let chromium = config.browser.executable.clone().or_else(find_chromium);
    match &chromium {
        Some(path) if path.exists() => {
            let version = chromium_version(path);
            output::print_check(
                s.ok_sym(),
                "Chromium:",
                &format!(
                    "{} at {}",
                    version.as_deref().unwrap_or("unknown version"),
                    path.display()
                ),
            );
            match headless_launch(path) {
                Ok(ms) => output::print_check(
                    s.ok_sym(),
                    "Headless test:",
                    &format!("launched and closed in {}", output::format_elapsed(ms)),
                ),
                Err(e) => {
                    output::print_check(s.fail_sym(), "Headless test:", &s.red(&e.to_string()));
                    output::print_detail("Check that Chromium's shared libraries are installed.");
                    ready = false;
                }
            }
        }
        Some(path) => {
            output::print_check(
                s.fail_sym(),
                "Chromium:",
                &format!("{} does not exist", path.display()),
            );
            output::print_detail(&format!("Fix: point {ENV_CHROMIUM_PATH} at a Chromium binary"));
            ready = false;
        }
        None => {
            output::print_check(s.fail_sym(), "Chromium:", "NOT FOUND");
            output::print_detail("Fix: install chromium, or");
            output::print_detail(&format!("set {ENV_CHROMIUM_PATH}=/path/to/chrome"));
            ready = false;
        }
    }
    eprintln!();

    // Configuration
    output::print_section(&s, "Configuration");
    match config.validate() {
        Ok(()) => output::print_check(
            s.ok_sym(),
            "Selectors:",
            &format!("{} container selectors", config.selectors.containers.len()),
        ),
        Err(e) => {
            output::print_check(s.fail_sym(), "Selectors:", &s.red(&e.to_string()));
            ready = false;
        }
    }
    output::print_check(s.ok_sym(), "Page:", &config.cinema.url);
    eprintln!();

    // Output
    output::print_section(&s, "Output");
    match check_writable(&config.output) {
        Ok(dir) => output::print_check(
            s.ok_sym(),
            "Result file:",
            &format!("{} ({} writable)", config.output.display(), dir.display()),
        ),
        Err(e) => {
            output::print_check(s.fail_sym(), "Result file:", &s.red(&e));
            output::print_detail("Fix: pass --output or set MAGIC_OUTPUT to a writable path");
            ready = false;
        }
    }
    match &config.debug_dir {
        Some(dir) => match check_writable(&dir.join("probe")) {
            Ok(_) => output::print_check(s.ok_sym(), "Debug dir:", &dir.display().to_string()),
            Err(e) => output::print_check(s.warn_sym(), "Debug dir:", &s.yellow(&e)),
        },
        None => output::print_check(s.ok_sym(), "Debug dir:", &s.dim("disabled")),
    }

    if ready {
        output::print_status(&s, &s.green("READY"), "a capture can run");
        Ok(0)
    } else {
        output::print_status(&s, &s.red("NOT READY"), "see fixes above");
        Ok(1)
    }
}

/// Find a Chromium binary: explicit env overrides first, then the private
/// install directory, then `PATH`.
pub fn find_chromium() -> Option<PathBuf> {
    locate_chromium(
        |key| std::env::var(key).ok(),
        dirs::home_dir().as_deref(),
        |name| which::which(name).ok(),
    )
}

fn locate_chromium(
    env: impl Fn(&str) -> Option<String>,
    home: Option<&Path>,
    on_path: impl Fn(&str) -> Option<PathBuf>,
) -> Option<PathBuf> {
    for key in [ENV_CHROMIUM_PATH, ENV_PUPPETEER_PATH] {
        if let Some(path) = env(key).filter(|p| !p.trim().is_empty()).map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }
    }

    if let Some(home) = home {
        let base = home.join(".magic-showtimes/chromium");
        let candidates = if cfg!(target_os = "macos") {
            vec![
                base.join("Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                base.join("chrome"),
            ]
        } else {
            vec![base.join("chrome"), base.join("chrome-linux64/chrome")]
        };
        if let Some(found) = candidates.into_iter().find(|c| c.exists()) {
            return Some(found);
        }
    }

    CHROMIUM_NAMES.iter().find_map(|&name| on_path(name))
}

/// Version string reported by the binary, e.g. "124.0.6367.91".
fn chromium_version(path: &Path) -> Option<String> {
    let output = Command::new(path).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let raw = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Some(
        raw.replace("Google Chrome for Testing ", "")
            .replace("Google Chrome ", "")
            .replace("Chromium ", ""),
    )
}

/// Start Chromium headless on a blank page and wait for it to exit.
fn headless_launch(path: &Path) -> Result<u128> {
    let start = std::time::Instant::now();
    let output = Command::new(path)
        .args([
            "--headless",
            "--no-sandbox",
            "--disable-gpu",
            "--dump-dom",
            "about:blank",
        ])
        .output()
        .map_err(|e| anyhow::anyhow!("failed to launch: {e}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{}", stderr.lines().next().unwrap_or("unknown error"));
    }
    Ok(start.elapsed().as_millis())
}

/// Create the parent directory of `file` if needed and probe it with a
/// throwaway file. Returns the directory.
fn check_writable(file: &Path) -> std::result::Result<PathBuf, String> {
    let dir = match file.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| format!("cannot create {}: {e}", dir.display()))?;
    let probe = dir.join(format!(".magic-showtimes-probe-{}", std::process::id()));
    std::fs::write(&probe, b"")
        .map_err(|e| format!("{} is not writable: {e}", dir.display()))?;
    let _ = std::fs::remove_file(&probe);
    Ok(dir)
}
