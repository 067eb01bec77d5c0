use crate::parser::FileType;
use crate::FileError;
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Metadata key recognized for exception rules, both in the pipeline
/// metadata file and in per-document directives.
pub const METADATA_KEY: &str = "spelling_exceptions";

lazy_static! {
    static ref DIRECTIVE: Regex =
        Regex::new(r"<!--\s*spelling-exceptions:\s*(?P<rules>[^>]*?)\s*-->").unwrap();
}

/// One document supplied by the host: an identifier (path relative to the
/// corpus root), raw content, and any file-level exception rules.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub content: String,
    /// File-level exception rules; they extend the run-wide rules for this
    /// document only.
    pub exceptions: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let exceptions = parse_directives(&content);
        Self {
            id: id.into(),
            content,
            exceptions,
        }
    }
}

/// The set of files a run operates on, plus per-file read errors that did
/// not abort enumeration.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub documents: Vec<Document>,
    pub errors: Vec<FileError>,
}

impl Corpus {
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self {
            documents,
            errors: Vec::new(),
        }
    }
}

fn parse_directives(content: &str) -> Vec<String> {
    let mut rules = Vec::new();
    for caps in DIRECTIVE.captures_iter(content) {
        for rule in caps["rules"].split(',') {
            let rule = rule.trim();
            if !rule.is_empty() {
                rules.push(rule.to_string());
            }
        }
    }
    rules
}

/// Enumerate the corpus under `root` in deterministic (file-name) order.
///
/// Binary/asset files, hidden files, and the run's own artifacts are left
/// out. An unreadable file becomes a per-file error entry; the rest of the
/// corpus still loads.
pub fn load_dir(root: &Path, exclude: &HashSet<String>) -> Result<Corpus> {
    let mut corpus = Corpus::default();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry =
            entry.with_context(|| format!("failed to enumerate corpus at {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') || exclude.contains(name.as_ref()) {
            continue;
        }
        if FileType::from_path(entry.path()) == FileType::Binary {
            continue;
        }

        let id = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");

        match fs::read_to_string(entry.path()) {
            Ok(content) => corpus.documents.push(Document::new(id, content)),
            Err(err) => corpus.errors.push(FileError {
                file: id,
                error: err.to_string(),
            }),
        }
    }

    Ok(corpus)
}

/// Read the pipeline metadata file: a JSON object whose `spelling_exceptions`
/// key holds an array of rule strings. A missing key means no rules.
pub fn load_metadata(path: &Path) -> Result<Vec<String>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read metadata file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&data)
        .with_context(|| format!("malformed metadata file {}", path.display()))?;

    match value.get(METADATA_KEY) {
        None => Ok(Vec::new()),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).with_context(|| {
                    format!("{} entries must be strings in {}", METADATA_KEY, path.display())
                })
            })
            .collect(),
        Some(_) => bail!(
            "{} must be an array of strings in {}",
            METADATA_KEY,
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_directive_parsing() {
        let doc = Document::new(
            "page.html",
            "<p>text</p><!-- spelling-exceptions: wrd, /chall\\w+/i, Geoffrey Challen -->",
        );
        assert_eq!(
            doc.exceptions,
            vec!["wrd", "/chall\\w+/i", "Geoffrey Challen"]
        );

        let plain = Document::new("page.html", "<p>no directives</p>");
        assert!(plain.exceptions.is_empty());
    }

    #[test]
    fn test_load_dir_filters_and_orders() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("working.html"), "<p>hi</p>").unwrap();
        fs::write(dir.path().join("broken.html"), "<p>hi</p>").unwrap();
        fs::write(dir.path().join("logo.png"), [0u8, 159, 146, 150]).unwrap();
        fs::write(dir.path().join(".hidden.html"), "<p>hi</p>").unwrap();
        fs::write(dir.path().join("spelling_errors.json"), "{}").unwrap();

        let exclude: HashSet<String> = ["spelling_errors.json".to_string()].into_iter().collect();
        let corpus = load_dir(dir.path(), &exclude).unwrap();

        let ids: Vec<&str> = corpus.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["broken.html", "working.html"]);
        assert!(corpus.errors.is_empty());
    }

    #[test]
    fn test_load_dir_walks_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("posts")).unwrap();
        fs::write(dir.path().join("posts/a.md"), "words").unwrap();

        let corpus = load_dir(dir.path(), &HashSet::new()).unwrap();
        assert_eq!(corpus.documents[0].id, "posts/a.md");
    }

    #[test]
    fn test_load_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meta.json");
        fs::write(&path, r#"{"spelling_exceptions": ["wrd", "/x/i"]}"#).unwrap();
        assert_eq!(load_metadata(&path).unwrap(), vec!["wrd", "/x/i"]);

        fs::write(&path, r#"{"title": "site"}"#).unwrap();
        assert!(load_metadata(&path).unwrap().is_empty());

        fs::write(&path, r#"{"spelling_exceptions": "wrd"}"#).unwrap();
        assert!(load_metadata(&path).is_err());
    }
}
