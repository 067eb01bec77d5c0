use anyhow::{Context, Result};
use dashmap::DashMap;
use fst::Set;
use std::fs;
use std::path::Path;

/// Case-aware lookup over the word list referenced by configuration.
///
/// The affix file is validated at load time and tracked by the cache, but
/// affix expansion itself is not applied; the adapter is a plain membership
/// check over the word list. Read-only after load and safe to query from
/// multiple scan workers.
pub struct Dictionary {
    set: Set<Vec<u8>>,
    // The same words recur across files, so lookups are memoized per run.
    memo: DashMap<String, bool>,
}

impl Dictionary {
    /// Load the word list and affix file. Failure to read either one is a
    /// fatal configuration error, not a per-word failure.
    pub fn load(dic_path: &Path, aff_path: &Path) -> Result<Self> {
        fs::read(aff_path).with_context(|| {
            format!("failed to read dictionary affix file {}", aff_path.display())
        })?;

        let raw = fs::read_to_string(dic_path).with_context(|| {
            format!("failed to read dictionary word list {}", dic_path.display())
        })?;

        let mut words: Vec<&str> = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            // Hunspell-style word lists open with an entry count.
            if idx == 0 && line.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            // Strip affix flags ("word/ABC").
            words.push(line.split('/').next().unwrap_or(line));
        }
        words.sort_unstable();
        words.dedup();

        let set = Set::from_iter(words).context("failed to index dictionary word list")?;

        Ok(Self {
            set,
            memo: DashMap::new(),
        })
    }

    /// Check whether a token is a known word: an exact entry, or a cased
    /// variant of a lowercase entry ("The" is known when "the" is listed).
    pub fn is_known(&self, word: &str) -> bool {
        if let Some(hit) = self.memo.get(word) {
            return *hit;
        }
        let known = self.set.contains(word.as_bytes()) || {
            let lower = word.to_lowercase();
            lower != word && self.set.contains(lower.as_bytes())
        };
        self.memo.insert(word.to_string(), known);
        known
    }

    /// Number of entries in the word list.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
