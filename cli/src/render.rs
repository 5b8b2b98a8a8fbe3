//! Plain-text rendering of the history view.

use records::{DataUrl, HistoryEntry};
use serde_json::Number;

pub const EMPTY_STATE: &str = "No history available yet.";

/// One line per entry, newest first, or the empty-state line.
#[must_use]
pub fn history_lines(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![EMPTY_STATE.to_owned()];
    }
    entries.iter().map(entry_line).collect()
}

fn entry_line(entry: &HistoryEntry) -> String {
    match entry {
        HistoryEntry::Dated(dated) => format!(
            "#{:<4} Predicted Age: {:<3}  Uploaded on: {}  [{}]",
            dated.id,
            number(&dated.predicted_age),
            dated.uploaded_at,
            image_summary(&dated.image)
        ),
        HistoryEntry::Scored(scored) => format!(
            "-     Age: {:<3}  Confidence: {}%  [{}]",
            number(&scored.age),
            number(&scored.confidence),
            image_summary(&scored.image)
        ),
    }
}

/// Multi-line detail view of one entry.
#[must_use]
pub fn preview(entry: &HistoryEntry) -> String {
    match entry {
        HistoryEntry::Dated(dated) => format!(
            "Id: {}\nPredicted Age: {}\nUploaded on: {}\nImage: {}",
            dated.id,
            number(&dated.predicted_age),
            dated.uploaded_at,
            image_summary(&dated.image)
        ),
        HistoryEntry::Scored(scored) => format!(
            "Age: {}\nConfidence: {}%\nImage: {}",
            number(&scored.age),
            number(&scored.confidence),
            image_summary(&scored.image)
        ),
    }
}

/// A stored number for display: `30.0` shows as `30`, `27.5` as is.
#[must_use]
pub fn number(value: &Number) -> String {
    match value.as_f64() {
        Some(f) if value.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        _ => value.to_string(),
    }
}

fn image_summary(image: &str) -> String {
    match DataUrl::parse(image) {
        Ok(url) => format!("{}, {} bytes", url.mime, url.bytes.len()),
        Err(_) => "unreadable image".to_owned(),
    }
}
