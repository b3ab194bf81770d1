//! Core data models for ClipStack
//!
//! `StoredEntry` is the on-disk record shape; the FFI-facing `ClipboardEntry`
//! lives in `interface.rs`. Conversions between the two, plus the data URL
//! helpers used for image payloads, live here.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::interface::{ClipboardContent, ClipboardEntry, ClipboardSnapshot, EntryKind};

/// Fallback MIME type when image bytes can't be sniffed
const DEFAULT_IMAGE_MIME: &str = "image/png";

// ─────────────────────────────────────────────────────────────────────────────
// STORED ENTRY (not exposed via FFI, used for the history file)
// ─────────────────────────────────────────────────────────────────────────────

/// Kind tag as written to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredKind {
    Text,
    Image,
}

/// One record of the persisted history array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    #[serde(rename = "type")]
    pub kind: StoredKind,
    pub content: String,
    pub creation_time: i64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl From<&ClipboardEntry> for StoredEntry {
    fn from(entry: &ClipboardEntry) -> Self {
        let kind = match entry.kind() {
            EntryKind::Text => StoredKind::Text,
            EntryKind::Image => StoredKind::Image,
        };
        Self {
            kind,
            content: entry.content.as_str().to_string(),
            creation_time: entry.creation_time,
            state: entry.state.clone(),
            color: entry.color.clone(),
            order: entry.order,
        }
    }
}

impl From<StoredEntry> for ClipboardEntry {
    fn from(stored: StoredEntry) -> Self {
        let content = match stored.kind {
            StoredKind::Text => ClipboardContent::Text {
                value: stored.content,
            },
            StoredKind::Image => ClipboardContent::Image {
                data_url: stored.content,
            },
        };
        Self {
            creation_time: stored.creation_time,
            content,
            state: stored.state,
            color: stored.color,
            order: stored.order,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CANDIDATE CONSTRUCTION
// ─────────────────────────────────────────────────────────────────────────────

impl ClipboardContent {
    /// Build candidate content from a watcher snapshot.
    /// The image representation wins when both are present.
    /// Returns `None` when the snapshot carries nothing usable.
    pub fn from_snapshot(snapshot: ClipboardSnapshot) -> Option<Self> {
        if let Some(bytes) = snapshot.image.filter(|b| !b.is_empty()) {
            return Some(ClipboardContent::Image {
                data_url: encode_data_url(&bytes),
            });
        }
        snapshot
            .text
            .filter(|t| !t.is_empty())
            .map(|value| ClipboardContent::Text { value })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DATA URLS
// ─────────────────────────────────────────────────────────────────────────────

/// Sniff the MIME type of encoded image bytes
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or(DEFAULT_IMAGE_MIME)
}

/// Encode image bytes as `data:<mime>;base64,<payload>`
pub fn encode_data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", sniff_image_mime(bytes), STANDARD.encode(bytes))
}

/// Decode a base64 data URL into (mime, bytes).
/// Returns `None` for anything that isn't a well-formed base64 data URL.
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    let mime = if mime.is_empty() {
        DEFAULT_IMAGE_MIME.to_string()
    } else {
        mime.to_string()
    };
    Some((mime, bytes))
}
