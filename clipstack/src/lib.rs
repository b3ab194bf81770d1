//! ClipStack Core - Rust clipboard history engine
//!
//! Records clipboard changes into a persistent, newest-first history, keeps
//! consecutive duplicates out, applies retention limits, and writes entries
//! back to the system clipboard without re-recording its own writes.
//!
//! # Architecture
//! - `persistence`: whole-file JSON store with atomic rewrites
//! - `policy`: dedup and retention decisions
//! - `guard`: feedback guard around engine-initiated clipboard writes
//! - `engine`: `HistoryEngine`, the single owner of the history
//! - `capture`: single-consumer channel from the platform watcher to the engine
//!
//! Types are exported via UniFFI proc-macros (#[derive(uniffi::Record/Enum)]).

pub mod capture;
pub mod config;
pub mod engine;
pub mod guard;
pub mod interface;
pub mod logging;
pub mod models;
pub mod persistence;
pub mod policy;
mod search;

pub use capture::CaptureFeed;
pub use config::EngineConfig;
pub use engine::HistoryEngine;
pub use interface::*;
pub use logging::init_logging;
pub use persistence::{EntryStore, StoreError};

uniffi::setup_scaffolding!("clipstack");
