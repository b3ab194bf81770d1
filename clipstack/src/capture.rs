//! Capture feed: the channel between the platform clipboard watcher and the
//! engine.
//!
//! The watcher pushes immutable snapshots; a single worker task drains them in
//! order and hands each one to `HistoryEngine::on_clipboard_change` on a
//! blocking thread. One consumer means capture never races itself.
//!
//! The feedback guard is checked when a snapshot is pushed, not only when it
//! is drained. A change raised while the engine is pasting is dropped even if
//! the worker gets to it after the paste has finished.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::engine::HistoryEngine;
use crate::interface::ClipboardSnapshot;

/// Global fallback Tokio runtime for when the feed is started outside any runtime context.
/// Shared across all CaptureFeed instances and never dropped.
/// Used by UniFFI which doesn't provide a tokio runtime.
static FALLBACK_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("clipstack-capture")
        .enable_all()
        .build()
        .expect("Failed to create fallback tokio runtime")
});

/// Get a tokio runtime handle - uses current runtime if available, otherwise global fallback
fn runtime_handle() -> tokio::runtime::Handle {
    tokio::runtime::Handle::try_current().unwrap_or_else(|_| FALLBACK_RUNTIME.handle().clone())
}

enum FeedMessage {
    Snapshot(ClipboardSnapshot),
    /// Acknowledged once every snapshot queued before it has been handled
    Flush(oneshot::Sender<()>),
}

/// Single-consumer capture queue in front of a `HistoryEngine`
#[derive(uniffi::Object)]
pub struct CaptureFeed {
    engine: Arc<HistoryEngine>,
    tx: mpsc::UnboundedSender<FeedMessage>,
    token: CancellationToken,
}

impl CaptureFeed {
    async fn drain(
        engine: Arc<HistoryEngine>,
        mut rx: mpsc::UnboundedReceiver<FeedMessage>,
        token: CancellationToken,
    ) {
        loop {
            let message = tokio::select! {
                _ = token.cancelled() => break,
                message = rx.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            match message {
                FeedMessage::Snapshot(snapshot) => {
                    let engine = Arc::clone(&engine);
                    let handled =
                        tokio::task::spawn_blocking(move || engine.on_clipboard_change(snapshot)).await;
                    if let Err(e) = handled {
                        warn!(error = %e, "capture task panicked");
                    }
                }
                FeedMessage::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        debug!("capture feed stopped");
    }

    /// Wait until everything pushed so far has been handled.
    /// Returns immediately if the feed has been stopped.
    pub async fn flush_async(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(FeedMessage::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

#[uniffi::export]
impl CaptureFeed {
    /// Start draining snapshots into `engine`
    #[uniffi::constructor]
    pub fn new(engine: Arc<HistoryEngine>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        runtime_handle().spawn(Self::drain(Arc::clone(&engine), rx, token.clone()));
        debug!("capture feed started");
        Self { engine, tx, token }
    }

    /// Queue a clipboard change. Returns false if it was dropped, either
    /// because the engine is writing to the clipboard or the feed is stopped.
    pub fn push(&self, snapshot: ClipboardSnapshot) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        if self.engine.is_capture_suppressed() {
            debug!("clipboard change dropped at enqueue: engine write in progress");
            return false;
        }
        self.tx.send(FeedMessage::Snapshot(snapshot)).is_ok()
    }

    /// Blocking flush for callers outside a tokio runtime (the native shell).
    pub fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(FeedMessage::Flush(ack)).is_ok() {
            let _ = done.blocking_recv();
        }
    }

    /// Stop the worker. Snapshots still queued are discarded.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled() || self.tx.is_closed()
    }
}

impl Drop for CaptureFeed {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
