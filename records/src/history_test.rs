use time::macros::datetime;

use super::*;
use crate::storage::MemoryStorage;

const IMAGE: &str = "data:image/png;base64,iVBORw0KGgo=";

fn dated(id: u64, age: u32) -> HistoryEntry {
    HistoryEntry::Dated(DatedEntry {
        id,
        image: IMAGE.to_owned(),
        predicted_age: Number::from(age),
        uploaded_at: "2025-03-01T12:00:00.000Z".to_owned(),
        extra: Map::new(),
    })
}

fn scored(age: u32, confidence: u32) -> HistoryEntry {
    HistoryEntry::Scored(ScoredEntry {
        image: IMAGE.to_owned(),
        age: Number::from(age),
        confidence: Number::from(confidence),
        extra: Map::new(),
    })
}

fn prediction(age: u32, confidence: Option<u32>) -> Prediction {
    Prediction { age: Number::from(age), confidence: confidence.map(Number::from) }
}

fn store_with(entries: &[HistoryEntry]) -> HistoryStore<MemoryStorage> {
    let mut store = HistoryStore::new(MemoryStorage::new());
    store.save(entries).unwrap();
    store
}

fn stored_json(store: &HistoryStore<MemoryStorage>) -> serde_json::Value {
    let raw = store.storage().get_item(HISTORY_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

// =============================================================================
// load / save
// =============================================================================

#[test]
fn load_without_stored_history_is_empty() {
    let store = HistoryStore::new(MemoryStorage::new());
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn reload_reproduces_stored_history() {
    let entries = vec![dated(2, 31), scored(40, 87), dated(1, 25)];
    let store = store_with(&entries);
    assert_eq!(store.load().unwrap(), entries);

    let reopened = HistoryStore::new(store.into_inner());
    assert_eq!(reopened.load().unwrap(), entries);
}

#[test]
fn load_reads_browser_written_shapes() {
    let mut storage = MemoryStorage::new();
    storage
        .set_item(
            HISTORY_KEY,
            r#"[
                {"id":2,"image":"data:image/png;base64,AA==","predictedAge":25,"uploadedAt":"2025-03-01T12:00:00.000Z"},
                {"image":"data:image/png;base64,AA==","age":33,"confidence":91}
            ]"#,
        )
        .unwrap();
    let entries = HistoryStore::new(storage).load().unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id(), Some(2));
    assert_eq!(entries[0].age(), &Number::from(25));
    assert_eq!(entries[1].id(), None);
    assert_eq!(entries[1].age(), &Number::from(33));
    assert!(matches!(&entries[1], HistoryEntry::Scored(s) if s.confidence == Number::from(91)));
}

#[test]
fn load_accepts_fractional_numbers() {
    let raw = r#"[{"image":"data:image/png;base64,AA==","age":27.5,"confidence":91},{"id":1,"image":"data:image/png;base64,AA==","predictedAge":30.0,"uploadedAt":"2025-03-01T12:00:00.000Z"}]"#;
    let mut storage = MemoryStorage::new();
    storage.set_item(HISTORY_KEY, raw).unwrap();
    let mut store = HistoryStore::new(storage);

    let entries = store.load().unwrap();
    assert_eq!(entries[0].age().as_f64(), Some(27.5));
    assert_eq!(entries[1].age().as_f64(), Some(30.0));

    store.save(&entries).unwrap();
    assert_eq!(store.storage().get_item(HISTORY_KEY).unwrap().as_deref(), Some(raw));
}

#[test]
fn save_uses_camel_case_for_dated_entries() {
    let store = store_with(&[dated(1, 25)]);
    let json = stored_json(&store);
    let first = &json[0];
    assert_eq!(first["id"], 1);
    assert_eq!(first["predictedAge"], 25);
    assert_eq!(first["uploadedAt"], "2025-03-01T12:00:00.000Z");
    assert!(first.get("predicted_age").is_none());
}

#[test]
fn load_corrupt_value_is_reported_and_left_alone() {
    let mut storage = MemoryStorage::new();
    storage.set_item(HISTORY_KEY, "{not json").unwrap();
    let store = HistoryStore::new(storage);

    assert!(matches!(store.load(), Err(HistoryError::Corrupt(_))));
    assert_eq!(store.storage().get_item(HISTORY_KEY).unwrap().as_deref(), Some("{not json"));
}

#[test]
fn load_non_array_is_corrupt() {
    let mut storage = MemoryStorage::new();
    storage.set_item(HISTORY_KEY, r#"{"id":1}"#).unwrap();
    assert!(matches!(HistoryStore::new(storage).load(), Err(HistoryError::Corrupt(_))));
}

// =============================================================================
// prepend / record
// =============================================================================

#[test]
fn prepend_puts_entry_first_and_persists() {
    let mut store = store_with(&[dated(1, 25)]);
    let updated = store.prepend(scored(44, 80)).unwrap();

    assert_eq!(updated, vec![scored(44, 80), dated(1, 25)]);
    assert_eq!(store.load().unwrap(), updated);
}

#[test]
fn record_dated_assigns_length_plus_one() {
    let mut store = store_with(&[dated(2, 30), dated(1, 25)]);
    let now = datetime!(2025-04-02 08:30:00 UTC);
    let entry = store.record(prediction(25, None), IMAGE.to_owned(), EntryShape::Dated, now).unwrap();

    assert_eq!(entry.id(), Some(3));
    let entries = store.load().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0], entry);
    assert!(matches!(&entries[0], HistoryEntry::Dated(d) if d.uploaded_at == "2025-04-02T08:30:00.000Z"));
}

#[test]
fn record_scored_keeps_confidence() {
    let mut store = HistoryStore::new(MemoryStorage::new());
    let entry = store
        .record(
            prediction(41, Some(93)),
            IMAGE.to_owned(),
            EntryShape::Scored,
            datetime!(2025-04-02 08:30:00 UTC),
        )
        .unwrap();
    assert_eq!(entry, scored(41, 93));
    assert_eq!(store.load().unwrap(), vec![scored(41, 93)]);
}

#[test]
fn record_scored_without_confidence_stores_zero() {
    let entry = HistoryEntry::from_prediction(
        EntryShape::Scored,
        IMAGE.to_owned(),
        prediction(25, None),
        0,
        datetime!(2025-04-02 08:30:00 UTC),
    )
    .unwrap();
    assert_eq!(entry, scored(25, 0));
}

#[test]
fn record_after_delete_can_reuse_an_id() {
    let mut store = store_with(&[dated(2, 30), dated(1, 25)]);
    store.delete(1).unwrap();
    let entry = store
        .record(
            prediction(50, None),
            IMAGE.to_owned(),
            EntryShape::Dated,
            datetime!(2025-04-02 08:30:00 UTC),
        )
        .unwrap();
    assert_eq!(entry.id(), Some(2));
    let ids: Vec<_> = store.load().unwrap().iter().map(HistoryEntry::id).collect();
    assert_eq!(ids, vec![Some(2), Some(2)]);
}

// =============================================================================
// delete / preview / clear
// =============================================================================

#[test]
fn delete_scenario_leaves_only_other_id() {
    let mut store = store_with(&[dated(1, 25), dated(2, 30)]);
    assert_eq!(store.delete(1).unwrap(), 1);

    assert_eq!(store.load().unwrap(), vec![dated(2, 30)]);
    let json = stored_json(&store);
    assert_eq!(json.as_array().map(Vec::len), Some(1));
    assert_eq!(json[0]["id"], 2);
}

#[test]
fn delete_leaves_other_entries_byte_identical() {
    let kept = r#"{"id":2,"image":"x","predictedAge":25,"uploadedAt":"2025-03-01T12:00:00.000Z","note":{"by":"webcam"}}"#;
    let mut storage = MemoryStorage::new();
    storage
        .set_item(
            HISTORY_KEY,
            &format!(r#"[{{"id":1,"image":"x","predictedAge":30,"uploadedAt":"2025-03-02T09:15:30.250Z"}},{kept}]"#),
        )
        .unwrap();
    let mut store = HistoryStore::new(storage);

    assert_eq!(store.delete(1).unwrap(), 1);
    assert_eq!(store.storage().get_item(HISTORY_KEY).unwrap(), Some(format!("[{kept}]")));
}

#[test]
fn delete_keeps_order_of_remaining_entries() {
    let mut store = store_with(&[dated(4, 40), scored(33, 90), dated(3, 30), dated(2, 20), dated(1, 10)]);
    store.delete(3).unwrap();
    assert_eq!(store.load().unwrap(), vec![dated(4, 40), scored(33, 90), dated(2, 20), dated(1, 10)]);
}

#[test]
fn delete_absent_id_removes_nothing() {
    let entries = vec![dated(1, 25), scored(30, 85)];
    let mut store = store_with(&entries);
    assert_eq!(store.delete(9).unwrap(), 0);
    assert_eq!(store.load().unwrap(), entries);
}

#[test]
fn delete_removes_all_colliding_ids() {
    let mut store = store_with(&[dated(2, 50), dated(2, 30), dated(1, 25)]);
    assert_eq!(store.delete(2).unwrap(), 2);
    assert_eq!(store.load().unwrap(), vec![dated(1, 25)]);
}

#[test]
fn preview_finds_entry_without_changing_storage() {
    let store = store_with(&[dated(2, 30), dated(1, 25)]);
    let before = store.storage().get_item(HISTORY_KEY).unwrap();
    assert_eq!(store.preview(1).unwrap(), Some(dated(1, 25)));
    assert_eq!(store.preview(7).unwrap(), None);
    assert_eq!(store.storage().get_item(HISTORY_KEY).unwrap(), before);
}

#[test]
fn clear_removes_key() {
    let mut store = store_with(&[dated(1, 25)]);
    store.clear().unwrap();
    assert_eq!(store.storage().get_item(HISTORY_KEY).unwrap(), None);
    assert!(store.load().unwrap().is_empty());
}

// =============================================================================
// EntryShape
// =============================================================================

#[test]
fn entry_shape_parses_case_insensitively() {
    assert_eq!("Scored".parse::<EntryShape>(), Ok(EntryShape::Scored));
    assert_eq!(" dated ".parse::<EntryShape>(), Ok(EntryShape::Dated));
    assert_eq!("other".parse::<EntryShape>(), Err(UnknownShape("other".to_owned())));
    assert_eq!(EntryShape::Dated.as_str(), "dated");
}
