//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use todoprobe::{DEFAULT_APP_URL, DEFAULT_IMPLICIT_WAIT_MS, DEFAULT_WEBDRIVER_DIR};

/// todoprobe: end-to-end checks for the TodoMVC application
#[derive(Parser, Debug)]
#[command(name = "todoprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scenario suite in a browser
    Run(RunArgs),

    /// List the scenarios in the suite
    List,

    /// Check the WebDriver environment
    Setup(SetupArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Browser to drive (chrome or firefox)
    #[arg(short, long, env = "TODOPROBE_BROWSER", default_value = "firefox")]
    pub browser: String,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// URL of the application under test
    #[arg(long, env = "TODOPROBE_URL", default_value = DEFAULT_APP_URL)]
    pub url: String,

    /// Directory searched for driver binaries before PATH
    #[arg(long, default_value = DEFAULT_WEBDRIVER_DIR)]
    pub webdriver_dir: PathBuf,

    /// Use an already running WebDriver server instead of spawning one
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// How long element lookups wait, in milliseconds
    #[arg(long, default_value_t = DEFAULT_IMPLICIT_WAIT_MS)]
    pub implicit_wait_ms: u64,

    /// Only run scenarios whose id or title contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Stop at the first failing scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the setup command
#[derive(Parser, Debug)]
pub struct SetupArgs {
    /// Directory that holds the driver binaries
    #[arg(long, default_value = DEFAULT_WEBDRIVER_DIR)]
    pub webdriver_dir: PathBuf,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum FormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON report on stdout
    Json,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
        }
    }
}
