//! HistoryEngine - Main API for the native shell
//!
//! Owns the in-memory history, the durable `EntryStore`, and the feedback
//! guard. Every mutation is a read-modify-persist unit:
//!
//! 1. take `write_lock` (one writer at a time, capture path included)
//! 2. clone the current history and apply the change to the copy
//! 3. rewrite the history file
//! 4. swap the copy in under the `history` write lock
//!
//! If step 3 fails the copy is dropped, so memory and disk both keep the
//! pre-mutation state. Queries only take the `history` read lock and never
//! wait on disk I/O.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::guard::FeedbackGuard;
use crate::interface::{
    CaptureOutcome, ClipStackError, ClipboardContent, ClipboardEntry, ClipboardSnapshot,
    ClipboardWriter, EntryKind, EntryPatch, HistoryObserver, PasteInjector, RetentionLimits,
};
use crate::models::decode_data_url;
use crate::persistence::EntryStore;
use crate::policy::{evict, should_record};
use crate::search;

/// Result of a mutation closure: whether the file needs rewriting
enum Mutation<T> {
    Unchanged(T),
    Changed(T),
}

/// Thread-safe clipboard history engine
///
/// Concurrency Model:
/// - `write_lock` serializes mutations, including capture-path appends
/// - `history` is only write-locked to swap in an already persisted list
/// - platform callbacks (writer, injector, observer) run with no lock held
#[derive(uniffi::Object)]
pub struct HistoryEngine {
    store: EntryStore,
    history: RwLock<Vec<ClipboardEntry>>,
    write_lock: Mutex<()>,
    limits: RwLock<RetentionLimits>,
    guard: FeedbackGuard,
    writer: Arc<dyn ClipboardWriter>,
    injector: Arc<dyn PasteInjector>,
    observer: RwLock<Option<Arc<dyn HistoryObserver>>>,
}

// Internal implementation (not exported via FFI)
impl HistoryEngine {
    /// Build an engine around an explicit store
    pub fn with_store(
        store: EntryStore,
        limits: RetentionLimits,
        writer: Arc<dyn ClipboardWriter>,
        injector: Arc<dyn PasteInjector>,
    ) -> Result<Self, ClipStackError> {
        limits.validate()?;
        let history = store.load();
        info!(
            path = %store.path().display(),
            entries = history.len(),
            "history loaded"
        );

        Ok(Self {
            store,
            history: RwLock::new(history),
            write_lock: Mutex::new(()),
            limits: RwLock::new(limits),
            guard: FeedbackGuard::new(),
            writer,
            injector,
            observer: RwLock::new(None),
        })
    }

    pub fn guard(&self) -> &FeedbackGuard {
        &self.guard
    }

    /// Run one read-modify-persist unit
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut Vec<ClipboardEntry>) -> Result<Mutation<T>, ClipStackError>,
    ) -> Result<T, ClipStackError> {
        let _serial = self.write_lock.lock();
        let mut next = self.history.read().clone();

        match op(&mut next)? {
            Mutation::Unchanged(value) => Ok(value),
            Mutation::Changed(value) => {
                self.store.save(&next)?;
                *self.history.write() = next;
                Ok(value)
            }
        }
    }

    /// Capture timestamp: now, bumped past the newest entry so ids stay unique.
    /// `None` once the newest id is `i64::MAX`.
    fn next_creation_time(history: &[ClipboardEntry]) -> Option<i64> {
        let now = Utc::now().timestamp_millis();
        match history.iter().map(|e| e.creation_time).max() {
            Some(newest) if newest >= now => newest.checked_add(1),
            _ => Some(now),
        }
    }

    fn notify_observer(&self) {
        let observer = self.observer.read().clone();
        if let Some(observer) = observer {
            observer.on_history_changed(self.query(None));
        }
    }

    fn write_to_clipboard(&self, content: &ClipboardContent) -> Result<(), ClipStackError> {
        match content {
            ClipboardContent::Text { value } => self.writer.write_text(value.clone()),
            ClipboardContent::Image { data_url } => {
                let (mime, bytes) = decode_data_url(data_url).ok_or_else(|| {
                    ClipStackError::InvalidInput("stored image is not a base64 data URL".into())
                })?;
                self.writer.write_image(bytes, mime)
            }
        }
    }

    fn apply_patch(entry: &mut ClipboardEntry, patch: EntryPatch) -> Result<bool, ClipStackError> {
        let mut changed = false;
        if let Some(state) = patch.state {
            changed |= entry.state != state;
            entry.state = state;
        }
        if let Some(color) = patch.color {
            changed |= entry.color != color;
            entry.color = color;
        }
        if let Some(content) = patch.content {
            let replacement = match &entry.content {
                ClipboardContent::Text { .. } => ClipboardContent::Text { value: content },
                ClipboardContent::Image { .. } => {
                    if decode_data_url(&content).is_none() {
                        return Err(ClipStackError::InvalidInput(
                            "image content must be a base64 data URL".into(),
                        ));
                    }
                    ClipboardContent::Image { data_url: content }
                }
            };
            changed |= entry.content != replacement;
            entry.content = replacement;
        }
        Ok(changed)
    }
}

// FFI-exported constructor (must be in standalone impl block)
#[uniffi::export]
impl HistoryEngine {
    /// Open (or create) the history at `config.history_path`
    #[uniffi::constructor]
    pub fn new(
        config: EngineConfig,
        writer: Arc<dyn ClipboardWriter>,
        injector: Arc<dyn PasteInjector>,
    ) -> Result<Self, ClipStackError> {
        config.validate()?;
        Self::with_store(
            EntryStore::new(&config.history_path),
            config.retention_limits(),
            writer,
            injector,
        )
    }
}

#[uniffi::export]
impl HistoryEngine {
    // ─────────────────────────────────────────────────────────────────────────────
    // Capture Path
    // ─────────────────────────────────────────────────────────────────────────────

    /// Handle a clipboard change raised by the platform watcher.
    ///
    /// Best effort: failures are logged and reported as an outcome, never
    /// raised. The observer is notified only when an entry was recorded.
    pub fn on_clipboard_change(&self, snapshot: ClipboardSnapshot) -> CaptureOutcome {
        if self.guard.is_suppressed() {
            debug!("clipboard change dropped: engine write in progress");
            return CaptureOutcome::Suppressed;
        }

        let Some(content) = ClipboardContent::from_snapshot(snapshot) else {
            debug!("clipboard change dropped: nothing usable");
            return CaptureOutcome::Empty;
        };
        if content.text().is_some_and(|t| t.trim().is_empty()) {
            debug!("clipboard change dropped: blank text");
            return CaptureOutcome::Empty;
        }

        let limits = *self.limits.read();
        let result = self.mutate(|history| {
            let creation_time = Self::next_creation_time(history).ok_or_else(|| {
                ClipStackError::InvalidInput("no creation time left past the newest entry".into())
            })?;
            let candidate = ClipboardEntry::new(creation_time, content);
            if !should_record(&candidate, history.first()) {
                return Ok(Mutation::Unchanged(CaptureOutcome::Duplicate));
            }

            history.insert(0, candidate);
            let before = history.len();
            *history = evict(std::mem::take(history), &limits);
            let evicted = before - history.len();
            if evicted > 0 {
                debug!(evicted, "retention limits applied");
            }
            Ok(Mutation::Changed(CaptureOutcome::Recorded { creation_time }))
        });

        match result {
            Ok(outcome @ CaptureOutcome::Recorded { creation_time }) => {
                debug!(creation_time, "clipboard entry recorded");
                self.notify_observer();
                outcome
            }
            Ok(outcome) => {
                debug!(?outcome, "clipboard change not recorded");
                outcome
            }
            Err(e) => {
                warn!(error = %e, "failed to record clipboard change");
                CaptureOutcome::Failed
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Full history, or the text entries containing `search` (case-insensitive)
    pub fn query(&self, search: Option<String>) -> Vec<ClipboardEntry> {
        let history = self.history.read();
        search::filter_entries(&history, search.as_deref())
    }

    /// Look up a single entry
    pub fn get(&self, creation_time: i64) -> Option<ClipboardEntry> {
        self.history
            .read()
            .iter()
            .find(|e| e.creation_time == creation_time)
            .cloned()
    }

    pub fn entry_count(&self) -> u64 {
        self.history.read().len() as u64
    }

    pub fn history_path(&self) -> String {
        self.store.path().to_string_lossy().into_owned()
    }

    pub fn is_capture_suppressed(&self) -> bool {
        self.guard.is_suppressed()
    }

    pub fn retention_limits(&self) -> RetentionLimits {
        *self.limits.read()
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Remove an entry. Absent ids are a no-op.
    pub fn delete(&self, creation_time: i64) -> Result<(), ClipStackError> {
        let removed = self.mutate(|history| {
            match history.iter().position(|e| e.creation_time == creation_time) {
                Some(index) => {
                    history.remove(index);
                    Ok(Mutation::Changed(true))
                }
                None => Ok(Mutation::Unchanged(false)),
            }
        })?;
        if removed {
            info!(creation_time, "entry deleted");
        }
        Ok(())
    }

    /// Merge `patch` into the matching entry and return the result
    pub fn update(&self, creation_time: i64, patch: EntryPatch) -> Result<ClipboardEntry, ClipStackError> {
        let (updated, changed) = self.mutate(|history| {
            let entry = history
                .iter_mut()
                .find(|e| e.creation_time == creation_time)
                .ok_or(ClipStackError::NotFound(creation_time))?;
            let changed = Self::apply_patch(entry, patch)?;
            let snapshot = entry.clone();
            Ok(if changed {
                Mutation::Changed((snapshot, true))
            } else {
                Mutation::Unchanged((snapshot, false))
            })
        })?;
        if changed {
            info!(creation_time, "entry updated");
        }
        Ok(updated)
    }

    /// Replace the whole history verbatim (user reorder). No dedup or
    /// eviction is applied; duplicate creation times are rejected.
    pub fn replace_all(&self, entries: Vec<ClipboardEntry>) -> Result<(), ClipStackError> {
        let mut seen = HashSet::with_capacity(entries.len());
        if let Some(dup) = entries.iter().find(|e| !seen.insert(e.creation_time)) {
            return Err(ClipStackError::InvalidInput(format!(
                "duplicate creation time {}",
                dup.creation_time
            )));
        }

        let count = entries.len();
        self.mutate(move |history| {
            *history = entries;
            Ok(Mutation::Changed(()))
        })?;
        info!(entries = count, "history replaced");
        Ok(())
    }

    /// Drop every entry
    pub fn clear(&self) -> Result<(), ClipStackError> {
        self.replace_all(Vec::new())
    }

    /// Change retention limits. They apply from the next capture onward.
    pub fn set_retention_limits(&self, limits: RetentionLimits) -> Result<(), ClipStackError> {
        limits.validate()?;
        *self.limits.write() = limits;
        Ok(())
    }

    pub fn set_observer(&self, observer: Arc<dyn HistoryObserver>) {
        *self.observer.write() = Some(observer);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Clipboard Actions
    // ─────────────────────────────────────────────────────────────────────────────

    /// Write an entry back to the system clipboard and paste it into the
    /// focused application. Capture is suppressed for the whole sequence.
    ///
    /// `field` optionally names the representation the caller expects; it
    /// must match the entry's kind.
    pub fn paste_back(&self, creation_time: i64, field: Option<EntryKind>) -> Result<(), ClipStackError> {
        let entry = self
            .get(creation_time)
            .ok_or(ClipStackError::NotFound(creation_time))?;
        if let Some(kind) = field {
            if kind != entry.kind() {
                return Err(ClipStackError::InvalidInput(format!(
                    "entry {creation_time} is {:?}, not {:?}",
                    entry.kind(),
                    kind
                )));
            }
        }

        let _suppressed = self.guard.suppress();
        self.write_to_clipboard(&entry.content)?;
        self.injector.inject_paste()?;
        info!(creation_time, kind = ?entry.kind(), "entry pasted back");
        Ok(())
    }

    /// Send the copy shortcut to the focused application without recording
    /// the resulting clipboard change.
    pub fn copy_without_recording(&self) -> Result<(), ClipStackError> {
        let _suppressed = self.guard.suppress();
        self.injector.inject_copy()?;
        debug!("copied without recording");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{OnceLock, Weak};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq)]
    enum Write {
        Text(String),
        Image(Vec<u8>, String),
    }

    #[derive(Default)]
    struct FakeClipboard {
        writes: Mutex<Vec<Write>>,
    }

    impl ClipboardWriter for FakeClipboard {
        fn write_text(&self, text: String) -> Result<(), ClipStackError> {
            self.writes.lock().push(Write::Text(text));
            Ok(())
        }

        fn write_image(&self, data: Vec<u8>, mime_type: String) -> Result<(), ClipStackError> {
            self.writes.lock().push(Write::Image(data, mime_type));
            Ok(())
        }
    }

    /// Injector that can fail and that raises a clipboard change mid-paste
    #[derive(Default)]
    struct FakeInjector {
        engine: OnceLock<Weak<HistoryEngine>>,
        echo: Mutex<Option<ClipboardSnapshot>>,
        echo_outcomes: Mutex<Vec<CaptureOutcome>>,
        fail: Mutex<bool>,
        pastes: Mutex<u32>,
        copies: Mutex<u32>,
    }

    impl FakeInjector {
        fn echo_capture(&self) {
            let snapshot = self.echo.lock().clone();
            if let (Some(snapshot), Some(engine)) = (snapshot, self.engine.get().and_then(Weak::upgrade)) {
                let outcome = engine.on_clipboard_change(snapshot);
                self.echo_outcomes.lock().push(outcome);
            }
        }
    }

    impl PasteInjector for FakeInjector {
        fn inject_paste(&self) -> Result<(), ClipStackError> {
            *self.pastes.lock() += 1;
            self.echo_capture();
            if *self.fail.lock() {
                return Err(ClipStackError::Platform("key simulation failed".into()));
            }
            Ok(())
        }

        fn inject_copy(&self) -> Result<(), ClipStackError> {
            *self.copies.lock() += 1;
            self.echo_capture();
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeObserver {
        notifications: Mutex<Vec<usize>>,
    }

    impl HistoryObserver for FakeObserver {
        fn on_history_changed(&self, entries: Vec<ClipboardEntry>) {
            self.notifications.lock().push(entries.len());
        }
    }

    struct Harness {
        engine: Arc<HistoryEngine>,
        clipboard: Arc<FakeClipboard>,
        injector: Arc<FakeInjector>,
        _dir: TempDir,
    }

    fn harness_with(limits: RetentionLimits) -> Harness {
        let dir = TempDir::new().unwrap();
        let clipboard = Arc::new(FakeClipboard::default());
        let injector = Arc::new(FakeInjector::default());
        let engine = Arc::new(
            HistoryEngine::with_store(
                EntryStore::new(dir.path().join("history.json")),
                limits,
                clipboard.clone(),
                injector.clone(),
            )
            .unwrap(),
        );
        injector.engine.set(Arc::downgrade(&engine)).unwrap();
        Harness {
            engine,
            clipboard,
            injector,
            _dir: dir,
        }
    }

    fn harness() -> Harness {
        harness_with(RetentionLimits::default())
    }

    fn capture(engine: &HistoryEngine, text: &str) -> CaptureOutcome {
        engine.on_clipboard_change(ClipboardSnapshot::text(text))
    }

    fn contents(engine: &HistoryEngine) -> Vec<String> {
        engine
            .query(None)
            .iter()
            .map(|e| e.content.as_str().to_string())
            .collect()
    }

    fn recorded_time(outcome: CaptureOutcome) -> i64 {
        match outcome {
            CaptureOutcome::Recorded { creation_time } => creation_time,
            other => panic!("expected Recorded, got {other:?}"),
        }
    }

    #[test]
    fn test_capture_dedup_and_search_scenario() {
        let h = harness();

        assert!(matches!(capture(&h.engine, "A"), CaptureOutcome::Recorded { .. }));
        assert_eq!(contents(&h.engine), vec!["A"]);

        assert_eq!(capture(&h.engine, "A"), CaptureOutcome::Duplicate);
        assert_eq!(contents(&h.engine), vec!["A"]);

        assert!(matches!(capture(&h.engine, "B"), CaptureOutcome::Recorded { .. }));
        assert_eq!(contents(&h.engine), vec!["B", "A"]);

        let found = h.engine.query(Some("a".to_string()));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content.as_str(), "A");
    }

    #[test]
    fn test_creation_times_unique_within_same_millisecond() {
        let h = harness();
        for i in 0..50 {
            capture(&h.engine, &format!("entry {i}"));
        }
        let entries = h.engine.query(None);
        let unique: HashSet<i64> = entries.iter().map(|e| e.creation_time).collect();
        assert_eq!(unique.len(), 50);
        // Newest first
        assert!(entries.windows(2).all(|w| w[0].creation_time > w[1].creation_time));
    }

    #[test]
    fn test_capture_fails_when_creation_times_are_exhausted() {
        let h = harness();
        h.engine
            .replace_all(vec![ClipboardEntry::new(
                i64::MAX,
                ClipboardContent::Text { value: "x".into() },
            )])
            .unwrap();

        assert_eq!(capture(&h.engine, "y"), CaptureOutcome::Failed);
        assert_eq!(contents(&h.engine), vec!["x"]);
        assert_eq!(h.engine.query(None)[0].creation_time, i64::MAX);
    }

    #[test]
    fn test_blank_and_empty_snapshots() {
        let h = harness();
        assert_eq!(capture(&h.engine, "   "), CaptureOutcome::Empty);
        assert_eq!(h.engine.on_clipboard_change(ClipboardSnapshot::default()), CaptureOutcome::Empty);
        assert_eq!(h.engine.entry_count(), 0);
    }

    #[test]
    fn test_capture_applies_count_limit() {
        let h = harness_with(RetentionLimits { max_count: Some(3), max_age_ms: None });
        for value in ["1", "2", "3", "4", "5"] {
            capture(&h.engine, value);
        }
        assert_eq!(contents(&h.engine), vec!["5", "4", "3"]);
    }

    #[test]
    fn test_capture_persists_before_returning() {
        let h = harness();
        capture(&h.engine, "durable");
        let reloaded = EntryStore::new(h.engine.history_path()).load();
        assert_eq!(reloaded, h.engine.query(None));
    }

    #[test]
    fn test_observer_notified_only_on_record() {
        let h = harness();
        let observer = Arc::new(FakeObserver::default());
        h.engine.set_observer(observer.clone());

        capture(&h.engine, "x");
        capture(&h.engine, "x");
        capture(&h.engine, "y");
        assert_eq!(*observer.notifications.lock(), vec![1, 2]);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let h = harness();
        capture(&h.engine, "keep");
        let before = h.engine.query(None);
        h.engine.delete(42).unwrap();
        assert_eq!(h.engine.query(None), before);
    }

    #[test]
    fn test_delete_removes_entry() {
        let h = harness();
        let a = recorded_time(capture(&h.engine, "a"));
        capture(&h.engine, "b");
        h.engine.delete(a).unwrap();
        assert_eq!(contents(&h.engine), vec!["b"]);
        assert!(h.engine.get(a).is_none());
    }

    #[test]
    fn test_update_color_only() {
        let h = harness();
        let a = recorded_time(capture(&h.engine, "a"));
        let b = recorded_time(capture(&h.engine, "b"));
        let before_b = h.engine.get(b).unwrap();
        let before_a = h.engine.get(a).unwrap();

        let patch = EntryPatch { color: Some("red".into()), ..Default::default() };
        let updated = h.engine.update(a, patch).unwrap();

        assert_eq!(updated.color, "red");
        assert_eq!(
            updated,
            ClipboardEntry { color: "red".into(), ..before_a }
        );
        assert_eq!(h.engine.get(b).unwrap(), before_b);
    }

    #[test]
    fn test_update_without_change_skips_rewrite() {
        let h = harness();
        let ts = recorded_time(capture(&h.engine, "keep"));
        let patch = EntryPatch {
            color: Some("blue".into()),
            ..Default::default()
        };
        h.engine.update(ts, patch.clone()).unwrap();

        let path = h.engine.history_path();
        std::fs::write(&path, "sentinel").unwrap();
        let unchanged = h.engine.update(ts, patch).unwrap();

        assert_eq!(unchanged.color, "blue");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "sentinel");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let h = harness();
        let result = h.engine.update(7, EntryPatch::default());
        assert!(matches!(result, Err(ClipStackError::NotFound(7))));
    }

    #[test]
    fn test_update_image_content_requires_data_url() {
        let h = harness();
        let outcome = h.engine.on_clipboard_change(ClipboardSnapshot::image(vec![1, 2, 3]));
        let id = recorded_time(outcome);

        let patch = EntryPatch { content: Some("plain text".into()), ..Default::default() };
        assert!(matches!(h.engine.update(id, patch), Err(ClipStackError::InvalidInput(_))));

        let patch = EntryPatch { content: Some("data:image/gif;base64,AQID".into()), ..Default::default() };
        let updated = h.engine.update(id, patch).unwrap();
        assert_eq!(updated.content.as_str(), "data:image/gif;base64,AQID");
    }

    #[test]
    fn test_replace_all_is_verbatim() {
        let h = harness_with(RetentionLimits { max_count: Some(1), max_age_ms: None });
        let reordered = vec![
            ClipboardEntry::new(1, ClipboardContent::Text { value: "old".into() }),
            ClipboardEntry::new(2, ClipboardContent::Text { value: "same".into() }),
            ClipboardEntry::new(3, ClipboardContent::Text { value: "same".into() }),
        ];
        h.engine.replace_all(reordered.clone()).unwrap();
        assert_eq!(h.engine.query(None), reordered);
    }

    #[test]
    fn test_replace_all_rejects_duplicate_ids() {
        let h = harness();
        capture(&h.engine, "kept");
        let result = h.engine.replace_all(vec![
            ClipboardEntry::new(1, ClipboardContent::Text { value: "a".into() }),
            ClipboardEntry::new(1, ClipboardContent::Text { value: "b".into() }),
        ]);
        assert!(matches!(result, Err(ClipStackError::InvalidInput(_))));
        assert_eq!(contents(&h.engine), vec!["kept"]);
    }

    #[test]
    fn test_clear() {
        let h = harness();
        capture(&h.engine, "a");
        h.engine.clear().unwrap();
        assert_eq!(h.engine.entry_count(), 0);
        assert!(EntryStore::new(h.engine.history_path()).load().is_empty());
    }

    #[test]
    fn test_paste_back_suppresses_mid_call_capture() {
        let h = harness();
        let a = recorded_time(capture(&h.engine, "A"));
        capture(&h.engine, "B");
        *h.injector.echo.lock() = Some(ClipboardSnapshot::text("A"));

        h.engine.paste_back(a, None).unwrap();

        assert_eq!(*h.clipboard.writes.lock(), vec![Write::Text("A".into())]);
        assert_eq!(*h.injector.echo_outcomes.lock(), vec![CaptureOutcome::Suppressed]);
        assert_eq!(contents(&h.engine), vec!["B", "A"]);
        assert!(!h.engine.is_capture_suppressed());

        // After the call completes the same change is recorded normally
        assert!(matches!(capture(&h.engine, "A"), CaptureOutcome::Recorded { .. }));
        assert_eq!(contents(&h.engine), vec!["A", "B", "A"]);
    }

    #[test]
    fn test_paste_back_releases_guard_on_injector_failure() {
        let h = harness();
        let a = recorded_time(capture(&h.engine, "A"));
        *h.injector.fail.lock() = true;

        let result = h.engine.paste_back(a, None);
        assert!(matches!(result, Err(ClipStackError::Platform(_))));
        assert!(!h.engine.is_capture_suppressed());
        assert!(matches!(capture(&h.engine, "next"), CaptureOutcome::Recorded { .. }));
    }

    #[test]
    fn test_paste_back_image_decodes_data_url() {
        let h = harness();
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];
        let id = recorded_time(h.engine.on_clipboard_change(ClipboardSnapshot::image(png.clone())));

        h.engine.paste_back(id, Some(EntryKind::Image)).unwrap();
        assert_eq!(
            *h.clipboard.writes.lock(),
            vec![Write::Image(png, "image/png".into())]
        );
        assert_eq!(*h.injector.pastes.lock(), 1);
    }

    #[test]
    fn test_paste_back_missing_and_wrong_field() {
        let h = harness();
        assert!(matches!(h.engine.paste_back(99, None), Err(ClipStackError::NotFound(99))));

        let id = recorded_time(capture(&h.engine, "text"));
        let result = h.engine.paste_back(id, Some(EntryKind::Image));
        assert!(matches!(result, Err(ClipStackError::InvalidInput(_))));
        assert!(h.clipboard.writes.lock().is_empty());
        assert_eq!(*h.injector.pastes.lock(), 0);
    }

    #[test]
    fn test_copy_without_recording() {
        let h = harness();
        *h.injector.echo.lock() = Some(ClipboardSnapshot::text("selection"));

        h.engine.copy_without_recording().unwrap();

        assert_eq!(*h.injector.copies.lock(), 1);
        assert_eq!(*h.injector.echo_outcomes.lock(), vec![CaptureOutcome::Suppressed]);
        assert_eq!(h.engine.entry_count(), 0);
    }

    #[test]
    fn test_set_retention_limits_validates() {
        let h = harness();
        let bad = RetentionLimits { max_count: Some(0), max_age_ms: None };
        assert!(h.engine.set_retention_limits(bad).is_err());

        let good = RetentionLimits { max_count: Some(2), max_age_ms: Some(1_000) };
        h.engine.set_retention_limits(good).unwrap();
        assert_eq!(h.engine.retention_limits(), good);
    }
}
