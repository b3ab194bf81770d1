//! ClipStack FFI Interface Definition
//!
//! This file defines the public interface exposed to the native shell via UniFFI.
//! It acts as the source of truth for shared types and for the platform
//! collaborators (clipboard writer, paste injector, history observer) that the
//! shell implements on its side.

use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// Entry kind tag, derived from the content variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, uniffi::Enum)]
pub enum EntryKind {
    Text,
    Image,
}

/// Type-safe clipboard content representation.
///
/// Kinds are exclusive: an entry is either text or an image, never both.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum ClipboardContent {
    Text { value: String },
    /// `data:<mime>;base64,<payload>`
    Image { data_url: String },
}

impl ClipboardContent {
    pub fn kind(&self) -> EntryKind {
        match self {
            ClipboardContent::Text { .. } => EntryKind::Text,
            ClipboardContent::Image { .. } => EntryKind::Image,
        }
    }

    /// The raw payload string (text or data URL)
    pub fn as_str(&self) -> &str {
        match self {
            ClipboardContent::Text { value } => value,
            ClipboardContent::Image { data_url } => data_url,
        }
    }

    /// Searchable text, `None` for images
    pub fn text(&self) -> Option<&str> {
        match self {
            ClipboardContent::Text { value } => Some(value),
            ClipboardContent::Image { .. } => None,
        }
    }
}

/// What the capture path did with a clipboard notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum CaptureOutcome {
    /// Appended as the new head
    Recorded { creation_time: i64 },
    /// Dropped because the engine itself was writing to the clipboard
    Suppressed,
    /// Identical to the current head
    Duplicate,
    /// No usable representation (blank text, no image)
    Empty,
    /// Persisting failed; the history is unchanged
    Failed,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS (Structs)
// ═══════════════════════════════════════════════════════════════════════════════

/// One recorded clipboard snapshot with its user-editable annotations
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ClipboardEntry {
    /// Milliseconds since the Unix epoch. Unique within a history.
    pub creation_time: i64,
    pub content: ClipboardContent,
    pub state: String,
    pub color: String,
    /// Position hint persisted when the user reorders the list
    pub order: Option<i64>,
}

impl ClipboardEntry {
    pub fn new(creation_time: i64, content: ClipboardContent) -> Self {
        Self {
            creation_time,
            content,
            state: String::new(),
            color: String::new(),
            order: None,
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.content.kind()
    }

    /// Same kind and same payload
    pub fn same_content(&self, other: &ClipboardEntry) -> bool {
        self.content == other.content
    }
}

/// Partial edit for `update`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct EntryPatch {
    pub state: Option<String>,
    pub color: Option<String>,
    /// Replacement payload: text for text entries, a data URL for image entries
    pub content: Option<String>,
}

/// Raw representations read from the OS clipboard by the platform watcher
#[derive(Debug, Clone, Default, PartialEq, Eq, uniffi::Record)]
pub struct ClipboardSnapshot {
    pub text: Option<String>,
    /// Encoded image bytes (PNG, JPEG, GIF or WebP)
    pub image: Option<Vec<u8>>,
}

impl ClipboardSnapshot {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            image: None,
        }
    }

    pub fn image(bytes: Vec<u8>) -> Self {
        Self {
            text: None,
            image: Some(bytes),
        }
    }
}

/// Retention bounds applied after every capture-path append.
/// `None` disables a bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, uniffi::Record)]
pub struct RetentionLimits {
    pub max_count: Option<u32>,
    pub max_age_ms: Option<u64>,
}

/// Error type for ClipStack operations
#[derive(Debug, Error, uniffi::Error)]
pub enum ClipStackError {
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("No entry with creation time {0}")]
    NotFound(i64),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Platform error: {0}")]
    Platform(String),
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLATFORM COLLABORATORS (implemented by the native shell)
// ═══════════════════════════════════════════════════════════════════════════════

/// Writes to the system clipboard
#[uniffi::export(with_foreign)]
pub trait ClipboardWriter: Send + Sync {
    fn write_text(&self, text: String) -> Result<(), ClipStackError>;

    fn write_image(&self, data: Vec<u8>, mime_type: String) -> Result<(), ClipStackError>;
}

/// Simulates key combinations in the focused application
#[uniffi::export(with_foreign)]
pub trait PasteInjector: Send + Sync {
    /// Send the platform paste shortcut (Ctrl/Cmd+V)
    fn inject_paste(&self) -> Result<(), ClipStackError>;

    /// Send the platform copy shortcut (Ctrl/Cmd+C)
    fn inject_copy(&self) -> Result<(), ClipStackError>;
}

/// Receives the full history after each successful capture
#[uniffi::export(with_foreign)]
pub trait HistoryObserver: Send + Sync {
    fn on_history_changed(&self, entries: Vec<ClipboardEntry>);
}

impl From<crate::persistence::StoreError> for ClipStackError {
    fn from(e: crate::persistence::StoreError) -> Self {
        ClipStackError::Persistence(e.to_string())
    }
}

impl From<uniffi::UnexpectedUniFFICallbackError> for ClipStackError {
    fn from(e: uniffi::UnexpectedUniFFICallbackError) -> Self {
        ClipStackError::Platform(e.reason)
    }
}
