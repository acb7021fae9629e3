use crate::error::Error;
use crate::grammar::{Grammar, GrammarTable};
use crate::reconcile;
use crate::scanner::{Scanner, Unterminated};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub unterminated: Option<Unterminated>,
    /// Multi-line block comments forced the blank-line-dropping fallback.
    pub realigned: bool,
    pub dropped_lines: usize,
}

impl Diagnostics {
    pub fn warning_count(&self) -> usize {
        usize::from(self.unterminated.is_some()) + usize::from(self.realigned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub changed: bool,
    pub final_text: String,
    pub diagnostics: Diagnostics,
}

/// Strip comments from already-decoded text.
pub fn process_text(grammar: Grammar, text: &str) -> ProcessResult {
    let scanned = Scanner::new(grammar).scan(text);

    if scanned.text == text {
        return ProcessResult {
            changed: false,
            final_text: text.to_string(),
            diagnostics: Diagnostics {
                unterminated: scanned.unterminated,
                ..Diagnostics::default()
            },
        };
    }

    let reconciled = reconcile::reconcile(text, &scanned.text);
    ProcessResult {
        changed: reconciled.text != text,
        final_text: reconciled.text,
        diagnostics: Diagnostics {
            unterminated: scanned.unterminated,
            realigned: reconciled.realigned,
            dropped_lines: reconciled.dropped,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Utf8 => f.write_str("utf-8"),
            Encoding::Latin1 => f.write_str("latin-1"),
        }
    }
}

/// Decode as UTF-8, falling back to Latin-1 which accepts every byte.
pub fn decode(bytes: Vec<u8>) -> (String, Encoding) {
    match String::from_utf8(bytes) {
        Ok(text) => (text, Encoding::Utf8),
        Err(err) => {
            let text = err.into_bytes().iter().map(|&b| char::from(b)).collect();
            (text, Encoding::Latin1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Skipped,
    Unchanged,
    Changed,
}

#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub grammar: Option<Grammar>,
    pub status: FileStatus,
    pub encoding: Option<Encoding>,
    pub diagnostics: Diagnostics,
}

impl FileOutcome {
    fn skipped(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            grammar: None,
            status: FileStatus::Skipped,
            encoding: None,
            diagnostics: Diagnostics::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// Compute the result without writing anything back.
    pub dry_run: bool,
}

/// Read, transform and (when changed) rewrite a single file as UTF-8.
pub fn process_file(
    path: &Path,
    table: &GrammarTable,
    options: ProcessOptions,
) -> Result<FileOutcome, Error> {
    let Some(grammar) = table.select(path) else {
        debug!("Skipping {}: no grammar", path.display());
        return Ok(FileOutcome::skipped(path));
    };

    let bytes = fs::read(path).map_err(|e| Error::file(path, e))?;
    let (text, encoding) = decode(bytes);
    if encoding == Encoding::Latin1 {
        debug!("{} is not valid UTF-8, decoded as {}", path.display(), encoding);
    }

    let result = process_text(grammar, &text);

    if let Some(unterminated) = &result.diagnostics.unterminated {
        warn!("{}: {}", path.display(), unterminated);
    }
    if result.diagnostics.realigned {
        warn!(
            "{}: multi-line block comment removed, blank lines were not preserved",
            path.display()
        );
    }

    let status = if result.changed {
        if !options.dry_run {
            fs::write(path, result.final_text.as_bytes()).map_err(|e| Error::file(path, e))?;
        }
        debug!(
            "{} changed ({} lines dropped)",
            path.display(),
            result.diagnostics.dropped_lines
        );
        FileStatus::Changed
    } else {
        FileStatus::Unchanged
    };

    Ok(FileOutcome {
        path: path.to_path_buf(),
        grammar: Some(grammar),
        status,
        encoding: Some(encoding),
        diagnostics: result.diagnostics,
    })
}
