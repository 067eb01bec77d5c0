pub mod cache;
pub mod checker;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod parser;
pub mod report;

pub use checker::Scanner;
pub use config::Config;
pub use corpus::{Corpus, Document};

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Misspelled word, exactly as it appeared, mapped to the ordered,
/// de-duplicated list of file identifiers it was found in.
pub type FailureSet = BTreeMap<String, Vec<String>>;

/// Result of one full scan over the corpus.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub failures: FailureSet,
    pub occurrences: Vec<Occurrence>,
    pub file_errors: Vec<FileError>,
    pub checked: usize,
    pub skipped: usize,
    /// False when `fail_errors` is enabled and unknown words were found.
    pub passed: bool,
}

/// A single unknown-word sighting, with its position in the extracted text.
#[derive(Debug, Clone, Serialize)]
pub struct Occurrence {
    pub file: String,
    pub word: String,
    pub line: usize,
    pub column: usize,
}

/// A per-file error that did not abort the scan (e.g. an unreadable file).
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

/// Fatal run errors. Spelling failures are never represented here; they are
/// recorded in the [`RunOutcome`] and only affect the pass/fail signal.
#[derive(Debug, Error)]
pub enum RunError {
    /// Missing or unreadable dictionary files, a malformed exception store,
    /// or malformed configuration. Raised before any file is scanned.
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    /// A report artifact could not be persisted. Fails the run regardless of
    /// the `fail_errors` setting.
    #[error("failed to write {kind} report {path:?}: {source:#}")]
    ReportWrite {
        kind: &'static str,
        path: PathBuf,
        source: anyhow::Error,
    },
}
