use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Immutable per-run configuration, resolved once before any file is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log cache decisions and per-file results to stderr.
    pub verbose: bool,

    /// Fail the run when any unsuppressed unknown word is found.
    pub fail_errors: bool,

    /// Skip re-checking files unchanged since the last completed run.
    pub cache_checks: bool,

    /// Dictionary affix file.
    pub aff_file: PathBuf,

    /// Dictionary word list.
    pub dic_file: PathBuf,

    /// Persisted exception store (JSON).
    pub exception_file: PathBuf,

    /// Failure report, rewritten on every run.
    pub fail_file: PathBuf,

    /// Cache report, written only when `cache_checks` is enabled.
    pub check_file: PathBuf,

    /// Inline exception rules (literal words, `/pattern/flags`, or phrases).
    pub exceptions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            fail_errors: true,
            cache_checks: false,
            aff_file: PathBuf::from("en_US.aff"),
            dic_file: PathBuf::from("en_US.dic"),
            exception_file: PathBuf::from("spelling_exceptions.json"),
            fail_file: PathBuf::from("spelling_errors.json"),
            check_file: PathBuf::from("spelling_checked.json"),
            exceptions: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults.
    /// CLI overrides are applied by the caller on top of the returned value.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config = config.merge(Self::from_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".spellgate.toml");
        if local_path.exists() {
            config = config.merge(Self::from_file(&local_path)?);
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // Merge logic: other's values override self's if they differ from defaults
        let defaults = Self::default();
        if other.verbose != defaults.verbose {
            self.verbose = other.verbose;
        }
        if other.fail_errors != defaults.fail_errors {
            self.fail_errors = other.fail_errors;
        }
        if other.cache_checks != defaults.cache_checks {
            self.cache_checks = other.cache_checks;
        }
        if other.aff_file != defaults.aff_file {
            self.aff_file = other.aff_file;
        }
        if other.dic_file != defaults.dic_file {
            self.dic_file = other.dic_file;
        }
        if other.exception_file != defaults.exception_file {
            self.exception_file = other.exception_file;
        }
        if other.fail_file != defaults.fail_file {
            self.fail_file = other.fail_file;
        }
        if other.check_file != defaults.check_file {
            self.check_file = other.check_file;
        }
        if !other.exceptions.is_empty() {
            self.exceptions = other.exceptions;
        }
        self
    }

    /// Resolve relative file locations against the corpus root.
    pub fn resolved(mut self, root: &Path) -> Self {
        for field in [
            &mut self.aff_file,
            &mut self.dic_file,
            &mut self.exception_file,
            &mut self.fail_file,
            &mut self.check_file,
        ] {
            if field.is_relative() {
                *field = root.join(field.as_path());
            }
        }
        self
    }

    /// File names of run artifacts and dictionary files. These are never
    /// scanned as corpus documents even when they live under the corpus root.
    pub fn artifact_names(&self) -> HashSet<String> {
        [
            &self.aff_file,
            &self.dic_file,
            &self.exception_file,
            &self.fail_file,
            &self.check_file,
        ]
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spellgate").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.fail_errors);
        assert!(!config.cache_checks);
        assert!(!config.verbose);
        assert_eq!(config.fail_file, PathBuf::from("spelling_errors.json"));
    }

    #[test]
    fn test_merge_configs() {
        let base = Config::default();
        let override_config = Config {
            fail_errors: false,
            cache_checks: true,
            dic_file: PathBuf::from("words.dic"),
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert!(!merged.fail_errors);
        assert!(merged.cache_checks);
        assert_eq!(merged.dic_file, PathBuf::from("words.dic"));
        assert_eq!(merged.aff_file, PathBuf::from("en_US.aff"));
    }

    #[test]
    fn test_resolved_joins_relative_paths() {
        let config = Config::default().resolved(Path::new("/srv/site"));
        assert_eq!(config.dic_file, PathBuf::from("/srv/site/en_US.dic"));
        assert_eq!(
            config.fail_file,
            PathBuf::from("/srv/site/spelling_errors.json")
        );

        let absolute = Config {
            dic_file: PathBuf::from("/dicts/en.dic"),
            ..Default::default()
        }
        .resolved(Path::new("/srv/site"));
        assert_eq!(absolute.dic_file, PathBuf::from("/dicts/en.dic"));
    }

    #[test]
    fn test_artifact_names() {
        let names = Config::default().artifact_names();
        assert!(names.contains("en_US.aff"));
        assert!(names.contains("en_US.dic"));
        assert!(names.contains("spelling_errors.json"));
        assert!(names.contains("spelling_checked.json"));
        assert!(names.contains("spelling_exceptions.json"));
    }
}
