mod cli;
mod logging;
mod reporter;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, StripArgs};
use colored::*;
use decommenter::{walk, AppConfig, ProgressReporter, RunSummary, SilentReporter, StripEngine};
use dotenv::dotenv;
use reporter::CliReporter;
use tracing::{error, info, warn};

fn main() {
    dotenv().ok();

    let args = Cli::parse();
    let guard = logging::init_logger(args.verbose);

    let exit_code = match run(args) {
        Ok(code) => code,
        Err(err) => {
            error!("Error: {:#}", err);
            1
        }
    };

    // Flush the file appender before exiting.
    drop(guard);
    process::exit(exit_code);
}

fn run(args: Cli) -> anyhow::Result<i32> {
    let config = decommenter::config::load_configuration(args.config.as_deref())
        .context("Error loading configuration")?;

    match args.command {
        Some(Commands::PrintConfig) => {
            let rendered =
                toml::to_string_pretty(&config).context("Error rendering configuration")?;
            println!("{}", rendered);
            Ok(0)
        }
        Some(Commands::Detect { paths }) => {
            run_detect(config, paths)?;
            Ok(0)
        }
        None => run_strip(config, args.strip),
    }
}

fn apply_args(mut config: AppConfig, args: &StripArgs) -> AppConfig {
    if !args.paths.is_empty() {
        config.root_paths = args
            .paths
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
    }
    config.ignore_patterns.extend(args.ignore_patterns.iter().cloned());
    if args.dry_run {
        config.dry_run = true;
    }
    if let Some(policy) = args.exit_policy {
        config.exit_policy = policy.into();
    }
    config
}

fn run_strip(config: AppConfig, args: StripArgs) -> anyhow::Result<i32> {
    let config = apply_args(config, &args);
    let policy = config.exit_policy;
    let engine = StripEngine::new(config);

    let reporter: Box<dyn ProgressReporter> = if args.no_progress {
        Box::new(SilentReporter)
    } else {
        Box::new(CliReporter::new())
    };
    let summary = engine.run(reporter.as_ref()).context("Error processing files")?;

    print_summary(&summary);

    let exit_code = summary.exit_code(policy);
    info!("Exit policy {} -> status {}", policy, exit_code);
    Ok(exit_code)
}

fn print_summary(summary: &RunSummary) {
    let verb = if summary.dry_run { "would change" } else { "changed" };
    println!(
        "Processed {} files; {} {} files",
        format!("{}", summary.files_found).green(),
        verb,
        format!("{}", summary.changed.len()).yellow(),
    );
    for path in &summary.changed {
        println!(" - {}", path.display());
    }

    info!(
        "{} stripped, {} skipped (no grammar), {} failed",
        summary.processed, summary.skipped, summary.failed.len()
    );
    if summary.warnings > 0 {
        warn!("{} warnings, see log for details", summary.warnings);
    }
    for (path, err) in &summary.failed {
        eprintln!("{} {}: {}", "failed".red(), path.display(), err);
    }
}

fn run_detect(config: AppConfig, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let roots: Vec<PathBuf> = if paths.is_empty() {
        config.root_paths.iter().map(PathBuf::from).collect()
    } else {
        paths
    };
    let engine = StripEngine::new(config);
    let files = walk::collect_files(&roots, &engine.config().ignore_patterns)
        .context("Error collecting files")?;

    for file in files {
        match engine.grammar_table().select(&file) {
            Some(grammar) => println!("{}\t{}", grammar.to_string().cyan(), file.display()),
            None => println!("{}\t{}", "skipped".dimmed(), file.display()),
        }
    }

    Ok(())
}
