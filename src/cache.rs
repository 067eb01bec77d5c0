use crate::config::Config;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;

/// Persisted shape of the cache report: tracked identifier (every cleanly
/// scanned file plus the two dictionary files) mapped to its content hash.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheReport {
    pub files: BTreeMap<String, String>,
}

/// Hex-encoded SHA-256 of file content.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Content-hash cache used to skip re-scanning unchanged files.
///
/// Only files whose last scan found no failures enter the mapping, so a
/// file is skipped exactly when the dictionary files are unchanged and its
/// own hash matches a cleanly scanned prior run. Failing files stay out of
/// the mapping and are re-scanned every run; the skip decision needs no
/// artifact beyond the cache report itself.
#[derive(Debug)]
pub struct CacheStore {
    enabled: bool,
    previous: BTreeMap<String, String>,
    current: BTreeMap<String, String>,
    dictionary_changed: bool,
}

impl CacheStore {
    /// Load prior cache state. Stale or unreadable state degrades to a full
    /// re-scan, never a failed run.
    pub fn load(config: &Config) -> Self {
        let mut previous = BTreeMap::new();

        if config.cache_checks {
            if let Ok(data) = fs::read_to_string(&config.check_file) {
                if let Ok(report) = serde_json::from_str::<CacheReport>(&data) {
                    previous = report.files;
                }
            }
        }

        Self {
            enabled: config.cache_checks,
            previous,
            current: BTreeMap::new(),
            dictionary_changed: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Dictionary files participate in cache validity: a change to either one
    /// can alter results for any file, so it invalidates every entry.
    pub fn track_dictionary(&mut self, id: &str, hash: String) {
        if self.previous.get(id) != Some(&hash) {
            self.dictionary_changed = true;
        }
        self.current.insert(id.to_string(), hash);
    }

    pub fn should_skip(&self, id: &str, hash: &str) -> bool {
        self.enabled
            && !self.dictionary_changed
            && self.previous.get(id).map(String::as_str) == Some(hash)
    }

    /// Add a cleanly scanned file to the mapping. Files that contributed
    /// failures must not be recorded, so they are re-scanned next run.
    pub fn record(&mut self, id: &str, hash: &str) {
        self.current.insert(id.to_string(), hash.to_string());
    }

    /// Snapshot of every identifier recorded during this run.
    pub fn report(&self) -> CacheReport {
        CacheReport {
            files: self.current.clone(),
        }
    }
}
