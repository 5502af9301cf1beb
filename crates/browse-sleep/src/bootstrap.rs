use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sleep_core::settings::ConfigFile;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Create the parent directory of every given output path.
pub fn ensure_parent_dirs<'a>(paths: impl IntoIterator<Item = &'a Path>) -> anyhow::Result<()> {
    for path in paths {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name to an [`EnvFilter`] directive.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        other => other.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr, or is appended to `log_file` (without ANSI colours)
/// when one is given. Unrecognised levels fall back to `"info"`.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(filter_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            ensure_parent_dirs([path])?;
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()?;
        }
        None => {
            registry
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init()?;
        }
    }

    Ok(())
}

// ── Config discovery ───────────────────────────────────────────────────────────

/// Locate a config file in the home directory.
///
/// Checks the following paths in order and returns the first that exists:
/// 1. `~/.browse-sleep/config.json`
/// 2. `~/.config/browse-sleep/config.json`
pub fn discover_config_file() -> Option<PathBuf> {
    ConfigFile::default_paths()
        .into_iter()
        .find(|p| p.is_file())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    static HOME_LOCK: Mutex<()> = Mutex::new(());

    fn with_home<T>(home: &Path, f: impl FnOnce() -> T) -> T {
        let _guard = HOME_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let original_home = std::env::var_os("HOME");
        std::env::set_var("HOME", home);

        let result = f();

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }
        result
    }

    // ── ensure_parent_dirs ────────────────────────────────────────────────────

    #[test]
    fn test_ensure_parent_dirs_creates_nested() {
        let tmp = TempDir::new().expect("tempdir");
        let report = tmp.path().join("out").join("report.csv");
        let chart = tmp.path().join("charts").join("2025").join("sleep.svg");

        ensure_parent_dirs([report.as_path(), chart.as_path()]).expect("create dirs");

        assert!(tmp.path().join("out").is_dir());
        assert!(tmp.path().join("charts").join("2025").is_dir());
    }

    #[test]
    fn test_ensure_parent_dirs_bare_file_name() {
        ensure_parent_dirs([Path::new("report.csv")]).expect("no parent to create");
    }

    // ── filter_directive ──────────────────────────────────────────────────────

    #[test]
    fn test_filter_directive_levels() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("info"), "info");
        assert_eq!(filter_directive("WARNING"), "warn");
        assert_eq!(filter_directive("CRITICAL"), "error");
    }

    // ── discover_config_file ──────────────────────────────────────────────────

    #[test]
    fn test_discover_config_file_returns_none_when_absent() {
        let tmp = TempDir::new().expect("tempdir");
        let path = with_home(tmp.path(), discover_config_file);
        assert!(path.is_none(), "should return None when no config exists");
    }

    #[test]
    fn test_discover_config_file_prefers_dot_browse_sleep() {
        let tmp = TempDir::new().expect("tempdir");
        let primary = tmp.path().join(".browse-sleep").join("config.json");
        let secondary = tmp
            .path()
            .join(".config")
            .join("browse-sleep")
            .join("config.json");
        for p in [&primary, &secondary] {
            std::fs::create_dir_all(p.parent().unwrap()).expect("create dir");
            std::fs::write(p, "{}").expect("write config");
        }

        let path = with_home(tmp.path(), discover_config_file);
        assert_eq!(path, Some(primary));
    }

    #[test]
    fn test_discover_config_file_finds_dot_config() {
        let tmp = TempDir::new().expect("tempdir");
        let config = tmp
            .path()
            .join(".config")
            .join("browse-sleep")
            .join("config.json");
        std::fs::create_dir_all(config.parent().unwrap()).expect("create dir");
        std::fs::write(&config, "{}").expect("write config");

        let path = with_home(tmp.path(), discover_config_file);
        assert_eq!(path, Some(config));
    }
}
