//! Thin wrapper over feed-rs: turns a fetched document into entry records.
//!
//! The parser is a black box to the rest of the crate — entries come out as
//! an opaque, JSON-serializable sequence that the entity stores verbatim in
//! its `entries` column.

use feed_rs::parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("feed parse failed: {0}")]
pub struct ParseError(#[from] parser::ParseFeedError);

/// One entry of a parsed feed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedEntry {
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub published: Option<i64>,
    pub summary: Option<String>,
}

/// Parse a feed document into its entry records.
pub fn parse_entries(text: &str) -> Result<Vec<ParsedEntry>, ParseError> {
    let feed = parser::parse(text.as_bytes())?;

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let url = entry.links.first().map(|l| l.href.clone());
            let published = entry.published.or(entry.updated).map(|dt| dt.timestamp());
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body));
            ParsedEntry {
                id: entry.id,
                title: entry.title.map(|t| t.content),
                url,
                published,
                summary,
            }
        })
        .collect();

    Ok(entries)
}
