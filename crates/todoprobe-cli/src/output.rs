//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use todoprobe::{ScenarioResult, SuiteReport};

/// Output format for suite results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON report on stdout
    Json,
}

/// Progress reporter for suite execution.
///
/// Everything goes to stderr; only the JSON report is written to stdout.
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar for multiple scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Increment progress
    pub fn increment(&self, delta: u64) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(delta);
        }
    }

    /// Update progress message
    pub fn set_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_message(message.to_string());
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Print a line without tearing the progress bar
    fn write_line(&self, line: &str) {
        match self.progress_bar {
            Some(ref pb) if !pb.is_finished() => pb.println(line),
            _ => {
                let _ = self.term.write_line(line);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // failures are printed even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        self.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.write_line("");
        self.write_line(&styled);
    }

    /// Print the outcome of one scenario
    pub fn scenario(&self, result: &ScenarioResult) {
        let ScenarioResult {
            id,
            title,
            duration_ms,
            ..
        } = result;
        let line = format!("{id} {title} ({duration_ms}ms)");
        match &result.error {
            None => self.success(&line),
            Some(error) => self.failure(&format!("{line}\n    {error}")),
        }
    }

    /// Print suite summary
    pub fn summary(&self, passed: usize, failed: usize, duration: Duration) {
        if self.quiet && failed == 0 {
            return;
        }

        self.write_line("");
        self.write_line(&summary_line(passed, failed, duration, self.use_color));
    }
}

/// One-line suite summary
#[must_use]
pub fn summary_line(passed: usize, failed: usize, duration: Duration, use_color: bool) -> String {
    let total = passed + failed;
    let duration_secs = duration.as_secs_f64();

    if use_color {
        let passed_style = Style::new().green().bold();
        let failed_style = Style::new().red().bold();

        let status = if failed > 0 {
            failed_style.apply_to("FAILED")
        } else {
            passed_style.apply_to("PASSED")
        };

        format!(
            "{} {} scenarios in {:.2}s ({} passed, {} failed)",
            status,
            total,
            duration_secs,
            passed_style.apply_to(passed),
            if failed > 0 {
                failed_style.apply_to(failed).to_string()
            } else {
                failed.to_string()
            },
        )
    } else {
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        format!(
            "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed)"
        )
    }
}

/// Render the suite report as pretty-printed JSON
pub fn report_json(report: &SuiteReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use todoprobe::BrowserKind;

    mod output_format_tests {
        use super::*;

        #[test]
        fn test_default_format() {
            assert_eq!(OutputFormat::default(), OutputFormat::Text);
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_quiet_reporter() {
            let reporter = ProgressReporter::new(false, true);
            assert!(reporter.quiet);
        }

        #[test]
        fn test_messages_do_not_panic() {
            let reporter = ProgressReporter::new(false, false);
            reporter.header("TodoMVC");
            reporter.info("starting");
            reporter.warning("slow");
            reporter.success("passed");
            reporter.failure("failed");
            reporter.summary(3, 1, Duration::from_millis(1500));
        }

        #[test]
        fn test_scenario_lines() {
            let reporter = ProgressReporter::new(false, false);
            reporter.scenario(&ScenarioResult::pass("TodoMVC-0", "title"));
            reporter.scenario(&ScenarioResult::fail(
                "TodoMVC-1",
                "add",
                "Assertion failed: expected 1, got 0",
            ));
        }

        #[test]
        fn test_progress_bar() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(3, "running");
            reporter.increment(1);
            reporter.set_message("TodoMVC-1");
            reporter.success("inside the bar");
            reporter.finish();
        }

        #[test]
        fn test_quiet_skips_progress_bar() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(3, "running");
            assert!(reporter.progress_bar.is_none());
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn test_summary_line_passed() {
            let line = summary_line(14, 0, Duration::from_millis(2500), false);
            assert_eq!(line, "PASSED 14 scenarios in 2.50s (14 passed, 0 failed)");
        }

        #[test]
        fn test_summary_line_failed() {
            let line = summary_line(12, 2, Duration::from_secs(3), false);
            assert!(line.starts_with("FAILED 14 scenarios"));
        }

        #[test]
        fn test_summary_line_colored_mentions_counts() {
            let line = summary_line(1, 1, Duration::from_secs(1), true);
            assert!(line.contains("FAILED"));
            assert!(line.contains("2 scenarios"));
        }
    }

    mod report_tests {
        use super::*;
        use std::str::FromStr;

        #[test]
        fn test_report_json() {
            let report = SuiteReport {
                browser: BrowserKind::from_str("firefox").unwrap(),
                app_url: "http://todo.test/".to_string(),
                started_at: "2024-01-01T00:00:00Z".parse().unwrap(),
                results: vec![ScenarioResult::pass("TodoMVC-0", "title")],
                duration_ms: 42,
            };
            let json: serde_json::Value =
                serde_json::from_str(&report_json(&report).unwrap()).unwrap();
            assert_eq!(json["browser"], "firefox");
            assert_eq!(json["results"][0]["id"], "TodoMVC-0");
            assert_eq!(json["duration_ms"], 42);
        }
    }
}
