//! Shared data model for the age prediction client and service.
//!
//! This crate owns the history entry shapes persisted by the client, the
//! key-value storage they live in, and the JSON bodies exchanged with the
//! predict endpoint. Both `server` and `cli` depend on it so the wire contract
//! is defined once.

pub mod dataurl;
pub mod history;
pub mod session;
pub mod storage;
pub mod wire;

pub use dataurl::{DataUrl, DataUrlError};
pub use history::{
    DatedEntry, EntryShape, HISTORY_KEY, HistoryEntry, HistoryError, HistoryStore, Prediction, ScoredEntry,
    UnknownShape,
};
pub use session::{LoginError, Session};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
