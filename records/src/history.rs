//! Prediction history: an append-only log kept under one storage key.
//!
//! DESIGN
//! ======
//! The whole history is a single JSON array stored under [`HISTORY_KEY`].
//! Every mutation loads the array, edits it, and writes the full array back.
//! Newest entries sit at the front.
//!
//! Two entry shapes are in circulation and neither is migrated to the other:
//! the scored shape (`image`, `age`, `confidence`) written after a real
//! endpoint call, and the dated shape (`id`, `image`, `predictedAge`,
//! `uploadedAt`) written by the stub flow. A stored array may mix both.
//!
//! TRADE-OFFS
//! ==========
//! Dated ids are `previous length + 1`, so after a delete a later insert can
//! reuse an id still held by an older entry. `delete` removes every entry
//! with the given id.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, info};

use crate::storage::{Storage, StorageError};

/// Storage key holding the JSON-encoded history array.
pub const HISTORY_KEY: &str = "predictionHistory";

/// `uploadedAt` layout for new entries: UTC with millisecond precision.
const UPLOADED_AT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

// =============================================================================
// TYPES
// =============================================================================

/// Entry written after a real endpoint call.
///
/// Numbers are kept as written, so `27.5` or `30.0` survive a reload.
/// Fields this crate does not know are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredEntry {
    /// Image as a base64 data URL.
    pub image: String,
    pub age: Number,
    /// Confidence percentage.
    pub confidence: Number,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry written by the stub flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatedEntry {
    pub id: u64,
    /// Image as a base64 data URL.
    pub image: String,
    pub predicted_age: Number,
    /// Timestamp exactly as stored.
    pub uploaded_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One persisted prediction record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryEntry {
    Dated(DatedEntry),
    Scored(ScoredEntry),
}

impl HistoryEntry {
    /// Id of a dated entry; scored entries have none.
    #[must_use]
    pub fn id(&self) -> Option<u64> {
        match self {
            Self::Dated(entry) => Some(entry.id),
            Self::Scored(_) => None,
        }
    }

    #[must_use]
    pub fn image(&self) -> &str {
        match self {
            Self::Dated(entry) => &entry.image,
            Self::Scored(entry) => &entry.image,
        }
    }

    #[must_use]
    pub fn age(&self) -> &Number {
        match self {
            Self::Dated(entry) => &entry.predicted_age,
            Self::Scored(entry) => &entry.age,
        }
    }

    /// Build an entry for `shape`. `previous_len` is the history length before
    /// insertion and seeds the dated id.
    ///
    /// # Errors
    ///
    /// Fails only if `now` cannot be formatted as a timestamp.
    pub fn from_prediction(
        shape: EntryShape,
        image: String,
        prediction: Prediction,
        previous_len: usize,
        now: OffsetDateTime,
    ) -> Result<Self, time::error::Format> {
        let entry = match shape {
            EntryShape::Scored => Self::Scored(ScoredEntry {
                image,
                age: prediction.age,
                confidence: prediction.confidence.unwrap_or_else(|| Number::from(0u32)),
                extra: Map::new(),
            }),
            EntryShape::Dated => Self::Dated(DatedEntry {
                id: previous_len as u64 + 1,
                image,
                predicted_age: prediction.age,
                uploaded_at: now.to_offset(UtcOffset::UTC).format(UPLOADED_AT_FORMAT)?,
                extra: Map::new(),
            }),
        };
        Ok(entry)
    }
}

/// Which entry shape new predictions are recorded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryShape {
    Scored,
    Dated,
}

impl EntryShape {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scored => "scored",
            Self::Dated => "dated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entry shape `{0}`; expected `scored` or `dated`")]
pub struct UnknownShape(pub String);

impl FromStr for EntryShape {
    type Err = UnknownShape;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scored" => Ok(Self::Scored),
            "dated" => Ok(Self::Dated),
            _ => Err(UnknownShape(raw.to_owned())),
        }
    }
}

/// Outcome of one predict call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub age: Number,
    /// Confidence percentage, when the predictor reports one.
    pub confidence: Option<Number>,
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("stored history is not a valid history array: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to encode history: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to format upload time: {0}")]
    Timestamp(#[from] time::error::Format),
}

// =============================================================================
// STORE
// =============================================================================

/// History log over a [`Storage`] backend.
#[derive(Debug)]
pub struct HistoryStore<S> {
    storage: S,
}

impl<S: Storage> HistoryStore<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Load the stored history. An absent key reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Corrupt`] if the stored value is not a JSON
    /// array of history entries. The stored value is left untouched.
    pub fn load(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        match self.storage.get_item(HISTORY_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(HistoryError::Corrupt),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the stored history with `entries`.
    pub fn save(&mut self, entries: &[HistoryEntry]) -> Result<(), HistoryError> {
        let raw = serde_json::to_string(entries).map_err(HistoryError::Encode)?;
        self.storage.set_item(HISTORY_KEY, &raw)?;
        debug!(entries = entries.len(), "history saved");
        Ok(())
    }

    /// Insert `entry` at the front and persist. Returns the updated history.
    pub fn prepend(&mut self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.load()?;
        entries.insert(0, entry);
        self.save(&entries)?;
        Ok(entries)
    }

    /// Build the entry for a successful prediction and prepend it.
    pub fn record(
        &mut self,
        prediction: Prediction,
        image: String,
        shape: EntryShape,
        now: OffsetDateTime,
    ) -> Result<HistoryEntry, HistoryError> {
        let previous_len = self.load()?.len();
        let entry = HistoryEntry::from_prediction(shape, image, prediction, previous_len, now)?;
        let entries = self.prepend(entry.clone())?;
        info!(age = %entry.age(), shape = shape.as_str(), total = entries.len(), "prediction recorded");
        Ok(entry)
    }

    /// Remove every entry carrying `id` and persist. Returns how many were
    /// removed; the order of the rest is unchanged.
    pub fn delete(&mut self, id: u64) -> Result<usize, HistoryError> {
        let mut entries = self.load()?;
        let before = entries.len();
        entries.retain(|entry| entry.id() != Some(id));
        let removed = before - entries.len();
        self.save(&entries)?;
        info!(id, removed, "history entry deleted");
        Ok(removed)
    }

    /// Look up an entry by id without touching storage contents.
    pub fn preview(&self, id: u64) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(self.load()?.into_iter().find(|entry| entry.id() == Some(id)))
    }

    /// Drop the stored history entirely.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.storage.remove_item(HISTORY_KEY)?;
        info!("history cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
