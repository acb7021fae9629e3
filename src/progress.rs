/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif bars; library callers can pass
/// [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_discover_start(&self) {}
    fn on_discover_complete(&self, _files_found: usize, _duration_secs: f64) {}
    fn on_process_start(&self, _total_files: usize) {}
    fn on_file_processed(&self, _files_done: usize, _total_files: usize) {}
    fn on_process_complete(&self, _files_changed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
