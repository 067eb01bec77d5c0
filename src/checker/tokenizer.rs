use unicode_segmentation::UnicodeSegmentation;

/// A word-like unit extracted from document text, exactly as it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Byte offset into the extracted text where the token starts.
    pub start: usize,
    /// Byte offset one past the end of the token.
    pub end: usize,
    /// 1-indexed line in the extracted text.
    pub line: usize,
    /// 1-indexed byte column within the line.
    pub column: usize,
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Lazily extract candidate words from text.
///
/// Word boundaries follow UAX #29, which keeps apostrophes between letters
/// inside the word ("don't" is one token). Leading and trailing apostrophes
/// are stripped, so `'quoted'` yields `quoted`. Tokens without any alphabetic
/// character (pure numbers, stray punctuation) are dropped.
pub fn tokens(text: &str) -> impl Iterator<Item = Token> + '_ {
    let mut line = 1usize;
    let mut line_start = 0usize;

    text.split_word_bound_indices().filter_map(move |(offset, segment)| {
        let token_line = line;
        let token_column = offset - line_start + 1;

        for (i, c) in segment.char_indices() {
            if c == '\n' {
                line += 1;
                line_start = offset + i + 1;
            }
        }

        let trimmed = segment.trim_matches(is_apostrophe);
        if trimmed.is_empty() || !trimmed.chars().any(|c| c.is_alphabetic()) {
            return None;
        }

        let lead = segment.len() - segment.trim_start_matches(is_apostrophe).len();
        let start = offset + lead;
        Some(Token {
            text: trimmed.to_string(),
            start,
            end: start + trimmed.len(),
            line: token_line,
            column: token_column + lead,
        })
    })
}
