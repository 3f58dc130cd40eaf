//! Suite execution for the `run` command

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{report_json, OutputFormat, ProgressReporter};
use futures::FutureExt;
use todoprobe::{
    with_session, Driver, RunOptions, Scenario, Session, SessionConfig, SuiteReport, SuiteRunner,
    WaitOptions,
};

/// Build the session configuration from the command line.
///
/// Fails on an unknown browser name, before anything is launched.
pub fn session_config(args: &RunArgs) -> CliResult<SessionConfig> {
    let mut config = SessionConfig::for_browser(&args.browser)?
        .with_headless(args.headless)
        .with_app_url(args.url.clone())
        .with_webdriver_dir(args.webdriver_dir.clone())
        .with_implicit_wait(WaitOptions::new().with_timeout(args.implicit_wait_ms));
    if let Some(url) = &args.webdriver_url {
        config = config.with_webdriver_url(url.clone());
    }
    Ok(config)
}

/// Runner options from the command line
#[must_use]
pub fn run_options(args: &RunArgs, config: &CliConfig) -> RunOptions {
    let options = RunOptions::new().with_fail_fast(config.fail_fast);
    match &args.filter {
        Some(filter) => options.with_filter(filter.clone()),
        None => options,
    }
}

/// Print the final report and turn failures into an error
pub fn finish_report(
    report: &SuiteReport,
    config: &CliConfig,
    reporter: &ProgressReporter,
) -> CliResult<()> {
    match config.format {
        OutputFormat::Json => println!("{}", report_json(report)?),
        OutputFormat::Text if !report.all_passed() => {
            reporter.header("Failures");
            for failure in report.failures() {
                reporter.failure(&format!(
                    "{}: {}",
                    failure.id,
                    failure.error.as_deref().unwrap_or("failed")
                ));
            }
        }
        OutputFormat::Text => {}
    }
    reporter.summary(report.passed_count(), report.failed_count(), report.duration());

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::test_execution(format!(
            "{} of {} scenarios failed",
            report.failed_count(),
            report.total()
        )))
    }
}

/// Run `scenarios` in `session`, releasing the session on every path,
/// panics included. The reporter is handed back for the final report.
pub async fn run_in_session<D: Driver>(
    session: Session<D>,
    runner: SuiteRunner,
    scenarios: Vec<Scenario<D>>,
    mut reporter: ProgressReporter,
) -> CliResult<(SuiteReport, ProgressReporter)> {
    reporter.header("TodoMVC");
    reporter.start_progress(scenarios.len() as u64, "running");
    let outcome = with_session(session, move |s| {
        async move {
            let report = runner
                .run_with_progress(s, &scenarios, |result| {
                    reporter.set_message(&result.id);
                    reporter.scenario(result);
                    reporter.increment(1);
                })
                .await;
            reporter.finish();
            Ok((report, reporter))
        }
        .boxed()
    })
    .await?;
    Ok(outcome)
}

/// Launch the browser, run the suite and release the session
#[cfg(feature = "webdriver")]
pub async fn run_suite(
    args: &RunArgs,
    config: &CliConfig,
    reporter: ProgressReporter,
) -> CliResult<()> {
    use todoprobe::{acquire_session, catalog, WebDriverBackend};

    let session_config = session_config(args)?;
    let runner = SuiteRunner::new(run_options(args, config));
    let scenarios = runner.select(&catalog::<WebDriverBackend>());
    if scenarios.is_empty() {
        reporter.warning("no scenario matches the filter");
        return Ok(());
    }

    reporter.info(&format!(
        "launching {}{} for {}",
        session_config.browser,
        if session_config.headless { " (headless)" } else { "" },
        session_config.app_url
    ));
    if config.verbosity.is_verbose() {
        reporter.info(&format!(
            "driver {}, implicit wait {}ms",
            session_config
                .webdriver_url
                .clone()
                .unwrap_or_else(|| session_config.driver_path().display().to_string()),
            session_config.implicit_wait.timeout_ms
        ));
    }
    let session = acquire_session(session_config).await?;

    let (report, reporter) = run_in_session(session, runner, scenarios, reporter).await?;
    finish_report(&report, config, &reporter)
}

/// Without browser support only argument validation is performed
#[cfg(not(feature = "webdriver"))]
pub async fn run_suite(
    args: &RunArgs,
    _config: &CliConfig,
    _reporter: ProgressReporter,
) -> CliResult<()> {
    session_config(args)?;
    Err(CliError::config(
        "todoprobe was built without the `webdriver` feature",
    ))
}
