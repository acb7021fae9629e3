use clap::{Args, Parser, Subcommand, ValueEnum};
use decommenter::ExitPolicy;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "decommenter")]
#[command(about = "Strip comments from C-family, shell, PowerShell and AutoHotkey sources", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub strip: StripArgs,

    /// Configuration file to use instead of ./Config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless TRACING_LEVEL says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print configuration values
    PrintConfig,
    /// Show which grammar each file would be processed with
    Detect {
        /// Files or directories to inspect (defaults to the configured roots)
        paths: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct StripArgs {
    /// Files or directories to process (defaults to the configured roots)
    pub paths: Vec<PathBuf>,

    /// Report what would change without writing files
    #[arg(long)]
    pub dry_run: bool,

    /// Exit status policy
    #[arg(long, value_enum)]
    pub exit_policy: Option<ExitPolicyArg>,

    /// Glob pattern of paths to skip; may be repeated
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore_patterns: Vec<String>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExitPolicyArg {
    AlwaysSuccess,
    FailOnError,
    FailOnChange,
}

impl From<ExitPolicyArg> for ExitPolicy {
    fn from(arg: ExitPolicyArg) -> Self {
        match arg {
            ExitPolicyArg::AlwaysSuccess => ExitPolicy::AlwaysSuccess,
            ExitPolicyArg::FailOnError => ExitPolicy::FailOnError,
            ExitPolicyArg::FailOnChange => ExitPolicy::FailOnChange,
        }
    }
}
