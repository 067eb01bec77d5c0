pub mod dictionary;
pub mod exceptions;
pub mod tokenizer;

use crate::cache::{self, CacheStore};
use crate::corpus::Corpus;
use crate::{parser, report, Config, FileError, Occurrence, RunError, RunOutcome};
use anyhow::Context;
use colored::*;
use dictionary::Dictionary;
use exceptions::ExceptionEngine;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs;

/// Orchestrates one run over the corpus: dictionary and exception rules are
/// built once, files are scanned in parallel, and per-file results are merged
/// sequentially in corpus order so the persisted reports are deterministic.
pub struct Scanner {
    config: Config,
    dictionary: Dictionary,
    engine: ExceptionEngine,
}

/// Partial result for one document, produced by a scan worker.
struct FileResult {
    id: String,
    hash: String,
    /// Whether the file participates in the cache mapping.
    tracked: bool,
    cache_hit: bool,
    error: Option<String>,
    failures: Vec<(String, usize, usize)>,
}

impl Scanner {
    /// Build the dictionary and compile exception rules from all three
    /// sources. Any failure here is a configuration error, raised before a
    /// single file is scanned.
    pub fn new(config: Config, metadata_exceptions: &[String]) -> Result<Self, RunError> {
        let dictionary =
            Dictionary::load(&config.dic_file, &config.aff_file).map_err(RunError::Config)?;
        let store = exceptions::load_store(&config.exception_file).map_err(RunError::Config)?;
        let engine = ExceptionEngine::compile(&store, metadata_exceptions, &config.exceptions)
            .map_err(RunError::Config)?;

        if config.verbose {
            eprintln!(
                "{} {} dictionary words, {} exception rules",
                "loaded".cyan(),
                dictionary.len(),
                engine.len()
            );
        }

        Ok(Self {
            config,
            dictionary,
            engine,
        })
    }

    /// Run the full scan. The failure report (and cache report, when caching
    /// is enabled) is persisted before the outcome is returned.
    pub fn run(&self, corpus: &Corpus) -> Result<RunOutcome, RunError> {
        let mut cache = CacheStore::load(&self.config);

        if cache.enabled() {
            for path in [&self.config.dic_file, &self.config.aff_file] {
                let bytes = fs::read(path)
                    .with_context(|| format!("failed to hash dictionary file {}", path.display()))
                    .map_err(RunError::Config)?;
                let id = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                cache.track_dictionary(&id, cache::content_hash(&bytes));
            }
        }

        let progress = ProgressBar::new(corpus.documents.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30.cyan}] {pos}/{len}")
                .unwrap()
                .progress_chars("=> "),
        );

        let results: Vec<FileResult> = corpus
            .documents
            .par_iter()
            .map(|doc| {
                let result = self.scan_document(doc, &cache);
                progress.inc(1);
                result
            })
            .collect();
        progress.finish_and_clear();

        let mut outcome = RunOutcome::default();
        for result in results {
            if let Some(error) = result.error {
                // A broken file is re-scanned next run; it is not cached.
                outcome.file_errors.push(FileError {
                    file: result.id,
                    error,
                });
                continue;
            }
            if result.cache_hit {
                cache.record(&result.id, &result.hash);
                outcome.skipped += 1;
                if self.config.verbose {
                    eprintln!("{} {} (unchanged)", "skipped".dimmed(), result.id);
                }
                continue;
            }
            if !result.tracked {
                continue;
            }
            // Only cleanly scanned files enter the cache mapping; a file that
            // contributed failures is re-scanned every run.
            if result.failures.is_empty() {
                cache.record(&result.id, &result.hash);
            }
            outcome.checked += 1;
            if self.config.verbose {
                eprintln!(
                    "{} {} ({} unknown)",
                    "checked".cyan(),
                    result.id,
                    result.failures.len()
                );
            }
            for (word, line, column) in result.failures {
                let files = outcome.failures.entry(word.clone()).or_default();
                if !files.iter().any(|f| f == &result.id) {
                    files.push(result.id.clone());
                }
                outcome.occurrences.push(Occurrence {
                    file: result.id.clone(),
                    word,
                    line,
                    column,
                });
            }
        }
        outcome.file_errors.extend(corpus.errors.iter().cloned());

        outcome.passed = !(self.config.fail_errors && !outcome.failures.is_empty());

        report::write_failures(&self.config.fail_file, &outcome.failures)?;
        if cache.enabled() {
            report::write_cache(&self.config.check_file, &cache.report())?;
        }

        Ok(outcome)
    }

    fn scan_document(&self, doc: &crate::Document, cache: &CacheStore) -> FileResult {
        let hash = cache::content_hash(doc.content.as_bytes());
        let mut result = FileResult {
            id: doc.id.clone(),
            hash,
            tracked: false,
            cache_hit: false,
            error: None,
            failures: Vec::new(),
        };

        let Some(text) = parser::extract(&doc.id, &doc.content) else {
            return result;
        };
        result.tracked = true;

        if cache.should_skip(&doc.id, &result.hash) {
            result.cache_hit = true;
            return result;
        }

        let engine: Cow<ExceptionEngine> = if doc.exceptions.is_empty() {
            Cow::Borrowed(&self.engine)
        } else {
            match self.engine.extended(&doc.exceptions) {
                Ok(extended) => Cow::Owned(extended),
                Err(err) => {
                    result.tracked = false;
                    result.error = Some(format!("invalid spelling exceptions: {err:#}"));
                    return result;
                }
            }
        };

        let phrase_spans = engine.phrase_spans(&text);
        for token in tokenizer::tokens(&text) {
            if engine.is_suppressed(&token, &doc.id, &phrase_spans) {
                continue;
            }
            if self.dictionary.is_known(&token.text) {
                continue;
            }
            result
                .failures
                .push((token.text, token.line, token.column));
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Document;
    use tempfile::{tempdir, TempDir};

    const DIC: &str = "10\na\nand\nis\nit\nthe\ntesting\nwrote\ngeoffrey\ndoesn't\nclean\n";

    fn fixture_config(dir: &TempDir) -> Config {
        let root = dir.path();
        fs::write(root.join("en_US.dic"), DIC).unwrap();
        fs::write(root.join("en_US.aff"), "SET UTF-8\n").unwrap();
        Config::default().resolved(root)
    }

    fn fixture_corpus() -> Corpus {
        Corpus::from_documents(vec![
            Document::new("broken.html", "<p>Challen wrote a wrd.</p>"),
            Document::new("working.html", "<p>Geoffrey Challen is testing a smartphoone and it doesn't break.</p>"),
        ])
    }

    fn failure_words(outcome: &RunOutcome) -> Vec<&str> {
        outcome.failures.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_unknown_words_are_reported_with_their_files() {
        let dir = tempdir().unwrap();
        let config = fixture_config(&dir);
        let scanner = Scanner::new(config, &[]).unwrap();
        let outcome = scanner.run(&fixture_corpus()).unwrap();

        assert!(!outcome.passed);
        assert_eq!(
            failure_words(&outcome),
            vec!["Challen", "break", "smartphoone", "wrd"]
        );
        assert_eq!(
            outcome.failures["Challen"],
            vec!["broken.html", "working.html"]
        );
        assert_eq!(outcome.checked, 2);
        assert!(dir.path().join("spelling_errors.json").exists());
    }

    #[test]
    fn test_fail_errors_disabled_passes_but_still_reports() {
        let dir = tempdir().unwrap();
        let config = Config {
            fail_errors: false,
            ..fixture_config(&dir)
        };
        let scanner = Scanner::new(config, &[]).unwrap();
        let outcome = scanner.run(&fixture_corpus()).unwrap();

        assert!(outcome.passed);
        assert!(!outcome.failures.is_empty());
        assert!(dir.path().join("spelling_errors.json").exists());
    }

    #[test]
    fn test_metadata_and_config_exceptions_are_unioned() {
        let dir = tempdir().unwrap();
        let mut config = fixture_config(&dir);
        config.exceptions = vec!["/smartphoones?/i".to_string(), "break".to_string()];
        let metadata = vec!["/chall\\w+/i".to_string()];
        let scanner = Scanner::new(config, &metadata).unwrap();
        let outcome = scanner.run(&fixture_corpus()).unwrap();

        assert_eq!(failure_words(&outcome), vec!["wrd"]);
        assert_eq!(outcome.failures["wrd"], vec!["broken.html"]);
    }

    #[test]
    fn test_file_level_exceptions_apply_to_that_file_only() {
        let dir = tempdir().unwrap();
        let mut config = fixture_config(&dir);
        config.exceptions = vec!["/smartphoones?/i".to_string(), "break".to_string(), "wrd".to_string()];
        let scanner = Scanner::new(config, &[]).unwrap();

        let corpus = Corpus::from_documents(vec![
            Document::new(
                "broken.html",
                "<p>Challen wrote a wrd.</p><!-- spelling-exceptions: /chall\\w+/i -->",
            ),
            Document::new("working.html", "<p>Geoffrey Challen is testing.</p>"),
        ]);
        let outcome = scanner.run(&corpus).unwrap();

        // The directive suppresses Challen in broken.html but not elsewhere.
        assert_eq!(failure_words(&outcome), vec!["Challen"]);
        assert_eq!(outcome.failures["Challen"], vec!["working.html"]);
    }

    #[test]
    fn test_cache_skips_clean_unchanged_files() {
        let dir = tempdir().unwrap();
        let config = Config {
            cache_checks: true,
            fail_errors: false,
            exceptions: vec!["/chall\\w+/i".to_string(), "/smartphoones?/i".to_string(), "break".to_string()],
            ..fixture_config(&dir)
        };
        let scanner = Scanner::new(config.clone(), &[]).unwrap();

        let first = scanner.run(&fixture_corpus()).unwrap();
        assert_eq!(first.checked, 2);
        assert_eq!(failure_words(&first), vec!["wrd"]);

        let second = scanner.run(&fixture_corpus()).unwrap();
        // broken.html carried a failure, so only working.html is skipped.
        assert_eq!(second.skipped, 1);
        assert_eq!(second.checked, 1);
        assert_eq!(failure_words(&second), vec!["wrd"]);

        // broken.html failed, so it never enters the cache mapping.
        let data = fs::read_to_string(&config.check_file).unwrap();
        let report: crate::cache::CacheReport = serde_json::from_str(&data).unwrap();
        let ids: Vec<&str> = report.files.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["en_US.aff", "en_US.dic", "working.html"]);
    }

    #[test]
    fn test_failing_files_are_rescanned_without_a_prior_report() {
        let dir = tempdir().unwrap();
        let config = Config {
            cache_checks: true,
            fail_errors: false,
            exceptions: vec![
                "/chall\\w+/i".to_string(),
                "/smartphoones?/i".to_string(),
                "break".to_string(),
            ],
            ..fixture_config(&dir)
        };
        let scanner = Scanner::new(config.clone(), &[]).unwrap();

        let first = scanner.run(&fixture_corpus()).unwrap();
        assert_eq!(failure_words(&first), vec!["wrd"]);

        // A host may clear old artifacts between runs; the skip decision must
        // not depend on the failure report surviving.
        fs::remove_file(&config.fail_file).unwrap();
        let second = scanner.run(&fixture_corpus()).unwrap();
        assert_eq!(failure_words(&second), vec!["wrd"]);
        assert_eq!(second.checked, 1);
        assert_eq!(second.skipped, 1);
    }

    #[test]
    fn test_dictionary_change_forces_full_rescan() {
        let dir = tempdir().unwrap();
        let config = Config {
            cache_checks: true,
            fail_errors: false,
            exceptions: vec!["/chall\\w+/i".to_string(), "/smartphoones?/i".to_string(), "break".to_string(), "wrd".to_string()],
            ..fixture_config(&dir)
        };
        let scanner = Scanner::new(config.clone(), &[]).unwrap();
        let first = scanner.run(&fixture_corpus()).unwrap();
        assert_eq!(first.checked, 2);

        let cached = scanner.run(&fixture_corpus()).unwrap();
        assert_eq!(cached.skipped, 2);

        // Grow the dictionary; every file must be re-checked.
        fs::write(dir.path().join("en_US.dic"), format!("{DIC}wrd\n")).unwrap();
        let rescanned = Scanner::new(config, &[]).unwrap();
        let third = rescanned.run(&fixture_corpus()).unwrap();
        assert_eq!(third.skipped, 0);
        assert_eq!(third.checked, 2);
    }

    #[test]
    fn test_missing_dictionary_is_a_config_error() {
        let dir = tempdir().unwrap();
        let config = Config::default().resolved(dir.path());
        let err = Scanner::new(config, &[]).map(|_| ()).unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }
}
