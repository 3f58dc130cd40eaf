//! WebDriver environment check for the `setup` command.
//!
//! Every step runs regardless of the others; the command succeeds even when
//! some of them fail and leaves it to the summary to say what is missing.

use crate::output::ProgressReporter;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use todoprobe::BrowserKind;

/// Outcome of one setup step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Step name
    pub name: String,
    /// Whether the step succeeded
    pub ok: bool,
    /// What was found or what went wrong
    pub detail: String,
}

impl StepOutcome {
    fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: true,
            detail: detail.into(),
        }
    }

    fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Run all steps against `dir`, resolving binaries through `path_var`
#[must_use]
pub fn check_environment(dir: &Path, path_var: Option<&OsStr>) -> Vec<StepOutcome> {
    let mut steps = vec![create_dir(dir)];
    for browser in BrowserKind::ALL {
        steps.push(locate_driver(dir, browser, path_var));
    }
    steps.push(check_on_path(dir, path_var));
    steps
}

fn create_dir(dir: &Path) -> StepOutcome {
    const NAME: &str = "create driver directory";
    match std::fs::create_dir_all(dir) {
        Ok(()) => StepOutcome::ok(NAME, dir.display().to_string()),
        Err(err) => StepOutcome::failed(NAME, format!("{}: {err}", dir.display())),
    }
}

fn search_path(path_var: Option<&OsStr>) -> Vec<PathBuf> {
    path_var.map(|p| std::env::split_paths(p).collect()).unwrap_or_default()
}

fn locate_driver(dir: &Path, browser: BrowserKind, path_var: Option<&OsStr>) -> StepOutcome {
    let binary = browser.driver_binary();
    let name = format!("locate {binary}");
    let local = dir.join(&binary);
    if local.is_file() {
        return StepOutcome::ok(name, local.display().to_string());
    }
    match search_path(path_var)
        .into_iter()
        .map(|p| p.join(&binary))
        .find(|candidate| candidate.is_file())
    {
        Some(found) => StepOutcome::ok(name, found.display().to_string()),
        None => StepOutcome::failed(
            name,
            format!(
                "not found in {} or on PATH; {browser} scenarios cannot run",
                dir.display()
            ),
        ),
    }
}

fn check_on_path(dir: &Path, path_var: Option<&OsStr>) -> StepOutcome {
    const NAME: &str = "driver directory on PATH";
    let absolute = std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
    let listed = search_path(path_var).iter().any(|entry| {
        std::fs::canonicalize(entry).map_or_else(|_| entry == &absolute, |c| c == absolute)
    });
    if listed {
        StepOutcome::ok(NAME, absolute.display().to_string())
    } else {
        StepOutcome::failed(
            NAME,
            format!("add it with: export PATH=\"$PATH:{}\"", absolute.display()),
        )
    }
}

/// Run the checks and report them
pub fn run_setup(dir: &Path, reporter: &ProgressReporter) {
    reporter.header("WebDriver setup");
    let path_var = std::env::var_os("PATH");
    let steps = check_environment(dir, path_var.as_deref());
    for step in &steps {
        tracing::debug!(step = %step.name, ok = step.ok, detail = %step.detail, "setup step");
        let line = format!("{}: {}", step.name, step.detail);
        if step.ok {
            reporter.success(&line);
        } else {
            reporter.warning(&line);
        }
    }

    let failed = steps.iter().filter(|s| !s.ok).count();
    if failed == 0 {
        reporter.info("environment ready");
    } else {
        reporter.info(&format!("{failed} of {} steps need attention", steps.len()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("webdrivers");
        let steps = check_environment(&dir, None);
        assert!(dir.is_dir());
        assert_eq!(steps.len(), 4);
        assert!(steps[0].ok);
    }

    #[test]
    fn test_missing_drivers_reported_independently() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("webdrivers");
        let steps = check_environment(&dir, None);
        assert!(!steps[1].ok);
        assert!(!steps[2].ok);
        assert!(!steps[3].ok);
        assert!(steps[3].detail.contains("export PATH="));
    }

    #[test]
    fn test_drivers_found_in_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        touch(&dir.join(BrowserKind::Chrome.driver_binary()));
        let steps = check_environment(&dir, None);
        assert!(steps[1].ok, "{:?}", steps[1]);
        assert!(!steps[2].ok);
    }

    #[test]
    fn test_drivers_found_on_path() {
        let tmp = TempDir::new().unwrap();
        let bin = tmp.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        touch(&bin.join(BrowserKind::Firefox.driver_binary()));
        let path_var = std::env::join_paths([&bin]).unwrap();
        let steps = check_environment(&tmp.path().join("webdrivers"), Some(path_var.as_os_str()));
        assert!(steps[2].ok, "{:?}", steps[2]);
        assert!(steps[2].detail.contains(&*bin.to_string_lossy()));
    }

    #[test]
    fn test_directory_on_path() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("webdrivers");
        std::fs::create_dir_all(&dir).unwrap();
        let path_var = std::env::join_paths([&dir]).unwrap();
        let steps = check_environment(&dir, Some(path_var.as_os_str()));
        assert!(steps[3].ok, "{:?}", steps[3]);
    }

    #[test]
    fn test_unwritable_location_still_runs_other_steps() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        touch(&blocker);
        let steps = check_environment(&blocker.join("webdrivers"), None);
        assert!(!steps[0].ok);
        assert_eq!(steps.len(), 4);
    }
}
