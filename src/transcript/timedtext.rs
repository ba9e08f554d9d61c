use crate::error::TranscriptError;
use scraper::{Html, Selector};

/// Flatten a timed-text caption document into plain text.
///
/// Each `<text>` element is one caption fragment. Fragment text is entity
/// encoded, sometimes twice (`&amp;#39;`), so it is decoded once more after the
/// markup parser has done its pass. Whitespace is collapsed and fragments are
/// joined with single spaces.
pub fn parse_timed_text(xml: &str) -> Result<String, TranscriptError> {
    let document = Html::parse_fragment(xml);
    let selector =
        Selector::parse("text").map_err(|e| TranscriptError::Malformed(e.to_string()))?;

    let fragments: Vec<String> = document
        .select(&selector)
        .map(|el| {
            let text = el.text().collect::<String>();
            let decoded = html_escape::decode_html_entities(&text);
            decoded.split_whitespace().collect::<Vec<_>>().join(" ")
        })
        .filter(|fragment| !fragment.is_empty())
        .collect();

    Ok(fragments.join(" "))
}
