//! Markdown rendering and text statistics for post bodies.
//!
//! Bodies are CommonMark with the GitHub extensions writers expect (tables,
//! footnotes, strikethrough, task lists). Fenced code keeps its language as
//! `class="language-swift"` so a client-side highlighter can pick it up; the
//! snippets are never executed or validated.
//!
//! Raw HTML in a body is passed through unchanged. Posts come from the site's
//! own repository, and embeds (`<iframe>`, `<video>`, `<details>`) are part of
//! how they are written. Front-matter values are always escaped.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};

/// Average reading speed used for `read_minutes`.
const WORDS_PER_MINUTE: usize = 200;

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Convert a Markdown body to HTML.
pub fn to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Count prose words, skipping fenced and inline code.
pub fn word_count(markdown: &str) -> usize {
    let mut words = 0;
    let mut in_code_block = false;

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if !in_code_block => {
                words += words_count::count(&text).words;
            }
            _ => {}
        }
    }
    words
}

/// Minutes to read `words`, never less than one.
pub fn read_minutes(words: usize) -> u32 {
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Plain text of the first paragraph, truncated at a word boundary.
///
/// Headings, code blocks, and images are skipped; inline code keeps its text.
pub fn excerpt(markdown: &str, max_chars: usize) -> String {
    let mut text = String::new();
    let mut in_paragraph = false;
    let mut image_depth = 0usize;

    for event in Parser::new_ext(markdown, options()) {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) => {
                if !text.trim().is_empty() {
                    break;
                }
                in_paragraph = false;
            }
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            Event::Text(t) | Event::Code(t) if in_paragraph && image_depth == 0 => {
                text.push_str(&t)
            }
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }

    truncate_words(text.trim(), max_chars)
}

/// Truncate to at most `max_chars` characters at a word boundary, appending `…`.
pub fn truncate_words(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}…", cut.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == '.'))
}
