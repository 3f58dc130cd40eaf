//! todoprobe command-line interface.
//!
//! `todoprobe run` drives the TodoMVC scenario suite in Chrome or Firefox,
//! `todoprobe list` prints the suite and `todoprobe setup` checks that the
//! driver binaries can be found.

#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;
pub mod setup;

pub use commands::{Cli, ColorArg, Commands, FormatArg, RunArgs, SetupArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{report_json, summary_line, OutputFormat, ProgressReporter};
pub use runner::{finish_report, run_in_session, run_options, run_suite, session_config};
pub use setup::{check_environment, run_setup, StepOutcome};
