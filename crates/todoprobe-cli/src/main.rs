//! todoprobe: TodoMVC end-to-end suite runner

use clap::Parser;
use std::process::ExitCode;
use todoprobe::{catalog, fake::FakeTodoApp};
use todoprobe_cli::{
    logging, run_setup, run_suite, Cli, CliConfig, CliError, CliResult, Commands, OutputFormat,
    ProgressReporter, RunArgs, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    let use_color = config.color.should_color();
    logging::init(config.verbosity, use_color);

    match cli.command {
        Commands::Run(args) => run_tests(&args, config),
        Commands::List => {
            list_scenarios();
            Ok(())
        }
        Commands::Setup(args) => {
            let reporter = ProgressReporter::new(use_color, config.verbosity.is_quiet());
            run_setup(&args.webdriver_dir, &reporter);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
}

fn run_tests(args: &RunArgs, config: CliConfig) -> CliResult<()> {
    let config = config
        .with_fail_fast(args.fail_fast)
        .with_format(OutputFormat::from(args.format));
    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::test_execution(format!("Failed to create runtime: {e}")))?;
    rt.block_on(run_suite(args, &config, reporter))
}

fn list_scenarios() {
    for scenario in catalog::<FakeTodoApp>() {
        println!("{:<12} {}", scenario.id, scenario.title);
    }
}
