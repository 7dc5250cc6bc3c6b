//! Plain-text rendering of a search outcome: the article region, then the ranked links.

use std::fmt::Write;

use crate::content::ExcerptStatus;
use crate::pipeline::SearchOutcome;

/// Renders `outcome` as two regions separated by a blank line.
pub fn render_outcome(outcome: &SearchOutcome) -> String {
    let mut out = String::new();
    let excerpt = &outcome.excerpt;
    let _ = writeln!(out, "# {}", outcome.title);
    let _ = writeln!(out, "Read full article: {}", excerpt.source_url);
    out.push('\n');
    match excerpt.status {
        ExcerptStatus::Found | ExcerptStatus::Unavailable => {
            let _ = writeln!(out, "{}", excerpt.text);
        }
        ExcerptStatus::Empty => out.push_str("(no summary paragraph available)\n"),
    }

    out.push('\n');
    out.push_str("## Top similar articles\n");
    if outcome.results.is_empty() {
        out.push_str("No similar articles found.\n");
    }
    for article in &outcome.results {
        let _ = writeln!(out, "{}. {} - {}", article.rank, article.title, article.url);
    }
    out
}

/// Renders the selectable titles one per line.
pub fn render_titles(titles: &[String]) -> String {
    let mut out = String::new();
    for title in titles {
        out.push_str(title);
        out.push('\n');
    }
    out
}
