use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Extract checkable text from markdown (skip code blocks, inline code, URLs)
pub fn extract(content: &str) -> String {
    let mut text = String::new();
    let parser = Parser::new(content);

    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
            }
            Event::Text(chunk) if !in_code_block => {
                text.push_str(&chunk);
                text.push('\n');
            }
            Event::SoftBreak | Event::HardBreak => {
                text.push('\n');
            }
            _ => {}
        }
    }

    text
}
