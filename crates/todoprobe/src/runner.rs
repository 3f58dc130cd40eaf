//! Suite runner: executes scenarios one after another in a single session.

use crate::browser::BrowserKind;
use crate::driver::Driver;
use crate::fixture::AppFixture;
use crate::scenario::Scenario;
use crate::session::Session;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

/// Options controlling which scenarios run and when to stop
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Only run scenarios whose id or title contains this text
    pub filter: Option<String>,
    /// Stop after the first failure
    pub fail_fast: bool,
}

impl RunOptions {
    /// Create options that run everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the run to matching scenarios
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario id
    pub id: String,
    /// Scenario title
    pub title: String,
    /// Whether the scenario passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub fn pass(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            passed: true,
            error: None,
            duration_ms: 0,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(id: impl Into<String>, title: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            passed: false,
            error: Some(error.into()),
            duration_ms: 0,
        }
    }

    /// Set duration
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Duration as `Duration`
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Report of a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Browser the suite ran in
    pub browser: BrowserKind,
    /// Application URL
    pub app_url: String,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
    /// Individual scenario results, in execution order
    pub results: Vec<ScenarioResult>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Get total scenario count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }

    /// Total duration as `Duration`
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Runs scenarios sequentially, each inside a fresh [`AppFixture`]
#[derive(Debug, Clone, Default)]
pub struct SuiteRunner {
    options: RunOptions,
}

impl SuiteRunner {
    /// Create a runner
    #[must_use]
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    /// Run options
    #[must_use]
    pub const fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Scenarios selected by the filter, in catalog order
    #[must_use]
    pub fn select<D: Driver>(&self, scenarios: &[Scenario<D>]) -> Vec<Scenario<D>> {
        scenarios
            .iter()
            .filter(|s| self.options.filter.as_deref().map_or(true, |f| s.matches(f)))
            .copied()
            .collect()
    }

    /// Run the selected scenarios
    pub async fn run<D: Driver>(
        &self,
        session: &mut Session<D>,
        scenarios: &[Scenario<D>],
    ) -> SuiteReport {
        self.run_with_progress(session, scenarios, |_| {}).await
    }

    /// Run the selected scenarios, reporting each result as it completes
    pub async fn run_with_progress<D, P>(
        &self,
        session: &mut Session<D>,
        scenarios: &[Scenario<D>],
        mut on_result: P,
    ) -> SuiteReport
    where
        D: Driver,
        P: FnMut(&ScenarioResult),
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::new();

        for scenario in self.select(scenarios) {
            tracing::info!(id = scenario.id, title = scenario.title, "running scenario");
            let scenario_start = Instant::now();
            let mut fixture = AppFixture::new();
            let outcome = AssertUnwindSafe(fixture.run(session, scenario.run))
                .catch_unwind()
                .await;
            let result = match outcome {
                Ok(Ok(())) => ScenarioResult::pass(scenario.id, scenario.title),
                Ok(Err(err)) => ScenarioResult::fail(scenario.id, scenario.title, err.to_string()),
                Err(panic) => ScenarioResult::fail(
                    scenario.id,
                    scenario.title,
                    format!("panicked: {}", panic_message(panic.as_ref())),
                ),
            }
            .with_duration(scenario_start.elapsed());

            if let Some(error) = &result.error {
                tracing::warn!(id = scenario.id, %error, "scenario failed");
            }
            on_result(&result);
            let failed = !result.passed;
            results.push(result);
            if failed && self.options.fail_fast {
                tracing::info!("stopping after first failure");
                break;
            }
        }

        SuiteReport {
            browser: session.config().browser,
            app_url: session.config().app_url.clone(),
            started_at,
            results,
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::SessionConfig;
    use crate::fake::FakeTodoApp;
    use crate::result::{ProbeError, ProbeResult};
    use crate::scenario::catalog;
    use crate::wait::WaitOptions;
    use futures::future::BoxFuture;

    const URL: &str = "http://todo.test/";

    fn session() -> Session<FakeTodoApp> {
        let config = SessionConfig::default()
            .with_app_url(URL)
            .with_implicit_wait(WaitOptions::new().with_timeout(10).with_poll_interval(1));
        Session::new(FakeTodoApp::new(URL), config)
    }

    fn failing(_: &mut Session<FakeTodoApp>) -> BoxFuture<'_, ProbeResult<()>> {
        async { Err(ProbeError::assertion("expected 1, got 2")) }.boxed()
    }

    fn panicking(session: &mut Session<FakeTodoApp>) -> BoxFuture<'_, ProbeResult<()>> {
        async move {
            if session.config().headless {
                return Ok(());
            }
            panic!("boom")
        }
        .boxed()
    }

    fn passing(_: &mut Session<FakeTodoApp>) -> BoxFuture<'_, ProbeResult<()>> {
        async { Ok(()) }.boxed()
    }

    fn scenario(id: &'static str, run: crate::scenario::ScenarioFn<FakeTodoApp>) -> Scenario<FakeTodoApp> {
        Scenario {
            id,
            title: "synthetic",
            run,
        }
    }

    mod result_tests {
        use super::*;

        #[test]
        fn test_counts() {
            let report = SuiteReport {
                browser: BrowserKind::Firefox,
                app_url: URL.to_string(),
                started_at: Utc::now(),
                results: vec![
                    ScenarioResult::pass("a", "a"),
                    ScenarioResult::fail("b", "b", "nope"),
                ],
                duration_ms: 5,
            };
            assert!(!report.all_passed());
            assert_eq!(report.passed_count(), 1);
            assert_eq!(report.failed_count(), 1);
            assert_eq!(report.total(), 2);
            assert_eq!(report.failures()[0].id, "b");
        }

        #[test]
        fn test_report_serializes() {
            let report = SuiteReport {
                browser: BrowserKind::Chrome,
                app_url: URL.to_string(),
                started_at: Utc::now(),
                results: vec![ScenarioResult::pass("TodoMVC-0", "title")
                    .with_duration(Duration::from_millis(12))],
                duration_ms: 12,
            };
            let json = serde_json::to_value(&report).unwrap();
            assert_eq!(json["browser"], "chrome");
            assert_eq!(json["results"][0]["duration_ms"], 12);
        }
    }

    mod runner_tests {
        use super::*;

        #[tokio::test]
        async fn test_full_catalog_passes() {
            let mut s = session();
            let report = SuiteRunner::default()
                .run(&mut s, &catalog::<FakeTodoApp>())
                .await;
            assert!(report.all_passed(), "failures: {:?}", report.failures());
            assert_eq!(report.total(), catalog::<FakeTodoApp>().len());
            s.release().await.unwrap();
        }

        #[tokio::test]
        async fn test_filter_selects_subset() {
            let mut s = session();
            let runner = SuiteRunner::new(RunOptions::new().with_filter("filter"));
            let report = runner.run(&mut s, &catalog::<FakeTodoApp>()).await;
            let ids: Vec<_> = report.results.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(ids, ["TodoMVC-10", "TodoMVC-11"]);
            s.release().await.unwrap();
        }

        #[tokio::test]
        async fn test_failure_and_panic_do_not_stop_run() {
            let mut s = session();
            let scenarios = [
                scenario("fail", failing),
                scenario("panic", panicking),
                scenario("pass", passing),
            ];
            let mut seen = Vec::new();
            let report = SuiteRunner::default()
                .run_with_progress(&mut s, &scenarios, |r| seen.push(r.id.clone()))
                .await;
            assert_eq!(seen, ["fail", "panic", "pass"]);
            assert_eq!(report.failed_count(), 2);
            assert!(report.results[1]
                .error
                .as_deref()
                .is_some_and(|e| e.contains("panicked: boom")));
            assert!(report.results[2].passed);
            s.release().await.unwrap();
        }

        #[tokio::test]
        async fn test_fail_fast_stops_after_first_failure() {
            let mut s = session();
            let scenarios = [scenario("fail", failing), scenario("pass", passing)];
            let runner = SuiteRunner::new(RunOptions::new().with_fail_fast(true));
            let report = runner.run(&mut s, &scenarios).await;
            assert_eq!(report.total(), 1);
            s.release().await.unwrap();
        }
    }
}
