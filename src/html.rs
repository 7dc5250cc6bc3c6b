//! Paragraph extraction from reference-page HTML, built on `scraper`.

use scraper::{Html, Selector};
use std::borrow::Cow;

/// Returns the first `<p>` in document order whose collapsed text is non-empty.
///
/// Whitespace runs inside the paragraph fold to single spaces, so markup-only
/// paragraphs such as MediaWiki's `mw-empty-elt` placeholders are skipped.
pub fn first_paragraph(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = paragraph_selector();
    document
        .select(&selector)
        .map(|paragraph| collapse_whitespace(&paragraph.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

/// Decodes a response body, falling back to lossy UTF-8.
pub fn decode_body(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn paragraph_selector() -> Selector {
    Selector::parse("p").expect("paragraph selector")
}

fn collapse_whitespace(input: &str) -> String {
    let mut buf = String::with_capacity(input.len());
    let mut last_space = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !last_space && !buf.is_empty() {
                buf.push(' ');
            }
            last_space = true;
        } else {
            buf.push(ch);
            last_space = false;
        }
    }
    buf.trim().to_string()
}
