pub mod config;
pub mod engine;
pub mod error;
pub mod grammar;
pub mod process;
pub mod progress;
pub mod reconcile;
pub mod scanner;
pub mod walk;

pub use config::{AppConfig, ExitPolicy};
pub use engine::{RunSummary, StripEngine};
pub use error::Error;
pub use grammar::{Grammar, GrammarTable, GrammarTag};
pub use process::{process_text, ProcessResult};
pub use progress::{ProgressReporter, SilentReporter};
pub use scanner::Scanner;
