//! History search
//!
//! Case-insensitive substring match over text entries. Image entries carry no
//! searchable text and never match a non-blank query.

use crate::interface::ClipboardEntry;

/// True if `query` is absent or blank, meaning "return everything"
pub fn is_blank_query(query: Option<&str>) -> bool {
    query.map_or(true, |q| q.trim().is_empty())
}

/// `query_lower` must already be lowercased
fn matches(entry: &ClipboardEntry, query_lower: &str) -> bool {
    entry
        .content
        .text()
        .is_some_and(|text| text.to_lowercase().contains(query_lower))
}

/// Filter `entries` down to those matching `query`, preserving order
pub fn filter_entries(entries: &[ClipboardEntry], query: Option<&str>) -> Vec<ClipboardEntry> {
    match query {
        Some(q) if !is_blank_query(Some(q)) => {
            let query_lower = q.to_lowercase();
            entries
                .iter()
                .filter(|entry| matches(entry, &query_lower))
                .cloned()
                .collect()
        }
        _ => entries.to_vec(),
    }
}
