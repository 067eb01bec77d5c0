pub mod html;
pub mod markdown;

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Html,
    Markdown,
    PlainText,
    /// Binary/asset files are never tokenized or tracked.
    Binary,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "html" | "htm" | "xhtml" => FileType::Html,
            "md" | "mdx" | "markdown" => FileType::Markdown,
            "txt" | "text" => FileType::PlainText,
            _ => FileType::Binary,
        }
    }
}

/// Extract the checkable plain text of a document, dispatching on the file
/// identifier's extension. Returns None for binary/asset files.
pub fn extract(id: &str, content: &str) -> Option<String> {
    match FileType::from_path(Path::new(id)) {
        FileType::Html => Some(html::extract(content)),
        FileType::Markdown => Some(markdown::extract(content)),
        FileType::PlainText => Some(content.to_string()),
        FileType::Binary => None,
    }
}
