use crate::config::{AppConfig, ExitPolicy};
use crate::error::Error;
use crate::grammar::GrammarTable;
use crate::process::{self, FileOutcome, FileStatus, ProcessOptions};
use crate::progress::ProgressReporter;
use crate::walk;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub struct StripEngine {
    config: AppConfig,
    table: GrammarTable,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub files_found: usize,
    pub processed: usize,
    pub skipped: usize,
    pub changed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub warnings: usize,
    pub dry_run: bool,
    pub discover_duration: Duration,
    pub process_duration: Duration,
}

impl RunSummary {
    pub fn exit_code(&self, policy: ExitPolicy) -> i32 {
        match policy {
            ExitPolicy::AlwaysSuccess => 0,
            ExitPolicy::FailOnError if !self.failed.is_empty() => 1,
            ExitPolicy::FailOnError => 0,
            ExitPolicy::FailOnChange if !self.failed.is_empty() => 2,
            ExitPolicy::FailOnChange if !self.changed.is_empty() => 1,
            ExitPolicy::FailOnChange => 0,
        }
    }
}

impl StripEngine {
    pub fn new(config: AppConfig) -> Self {
        let table = GrammarTable::default().with_overrides(&config.extensions);
        Self { config, table }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn grammar_table(&self) -> &GrammarTable {
        &self.table
    }

    /// Discover candidate files under the configured roots, then strip
    /// comments from each of them in parallel.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunSummary, Error> {
        let roots: Vec<PathBuf> = self.config.root_paths.iter().map(PathBuf::from).collect();
        info!("Processing roots: {:?}", roots);

        reporter.on_discover_start();
        let discover_start = Instant::now();
        let files = walk::collect_files(&roots, &self.config.ignore_patterns)?;
        let discover_duration = discover_start.elapsed();
        reporter.on_discover_complete(files.len(), discover_duration.as_secs_f64());
        debug!(
            "Discovery completed in {:.2}s: {} files",
            discover_duration.as_secs_f64(),
            files.len()
        );

        let options = ProcessOptions {
            dry_run: self.config.dry_run,
        };
        let total = files.len();
        let done = AtomicUsize::new(0);

        reporter.on_process_start(total);
        let process_start = Instant::now();
        let results: Vec<(PathBuf, Result<FileOutcome, Error>)> = files
            .into_par_iter()
            .map(|path| {
                let result = process::process_file(&path, &self.table, options);
                let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                reporter.on_file_processed(finished, total);
                (path, result)
            })
            .collect();
        let process_duration = process_start.elapsed();

        let mut summary = RunSummary {
            files_found: total,
            dry_run: options.dry_run,
            discover_duration,
            process_duration,
            ..RunSummary::default()
        };

        for (path, result) in results {
            match result {
                Ok(outcome) => {
                    summary.warnings += outcome.diagnostics.warning_count();
                    match outcome.status {
                        FileStatus::Skipped => summary.skipped += 1,
                        FileStatus::Unchanged => summary.processed += 1,
                        FileStatus::Changed => {
                            summary.processed += 1;
                            summary.changed.push(outcome.path);
                        }
                    }
                }
                Err(err) => {
                    error!("Error processing {}: {}", path.display(), err);
                    summary.failed.push((path, err.to_string()));
                }
            }
        }

        summary.changed.sort();
        summary.failed.sort_by(|a, b| a.0.cmp(&b.0));

        reporter.on_process_complete(summary.changed.len(), process_duration.as_secs_f64());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_with(changed: usize, failed: usize) -> RunSummary {
        RunSummary {
            changed: (0..changed).map(|i| PathBuf::from(format!("f{i}.c"))).collect(),
            failed: (0..failed)
                .map(|i| (PathBuf::from(format!("e{i}.c")), "boom".to_string()))
                .collect(),
            ..RunSummary::default()
        }
    }

    #[test]
    fn test_always_success_ignores_outcome() {
        assert_eq!(summary_with(3, 2).exit_code(ExitPolicy::AlwaysSuccess), 0);
    }

    #[test]
    fn test_fail_on_error() {
        assert_eq!(summary_with(3, 0).exit_code(ExitPolicy::FailOnError), 0);
        assert_eq!(summary_with(0, 1).exit_code(ExitPolicy::FailOnError), 1);
    }

    #[test]
    fn test_fail_on_change() {
        assert_eq!(summary_with(0, 0).exit_code(ExitPolicy::FailOnChange), 0);
        assert_eq!(summary_with(1, 0).exit_code(ExitPolicy::FailOnChange), 1);
        assert_eq!(summary_with(1, 1).exit_code(ExitPolicy::FailOnChange), 2);
    }
}
