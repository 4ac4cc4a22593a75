use readlater_core::db::{open_db, open_db_in_memory};
use readlater_core::model::timestamp::{now, parse_iso};
use readlater_core::{
    ItemDraft, ItemPatch, ItemRepository, KeyValueStore, KvError, KvItemRepository, KvResult,
    MemoryKeyValueStore, RepoError, SqliteKeyValueStore, ITEMS_KEY,
};
use std::collections::HashSet;

fn draft_with_due(name: &str, due: &str) -> ItemDraft {
    let mut draft = ItemDraft::new(name);
    draft.due_date = Some(parse_iso(due).unwrap());
    draft
}

#[test]
fn add_update_delete_scenario() {
    let store = MemoryKeyValueStore::new();
    let repo = KvItemRepository::new(&store);
    assert!(repo.list_items().is_empty());

    let created = repo
        .add_item(&draft_with_due("Read paper", "2024-01-01T00:00:00.000Z"))
        .unwrap();
    let listed = repo.list_items();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], created);
    assert_eq!(listed[0].name, "Read paper");
    assert!(!listed[0].read_later);

    let mut patch = ItemPatch::new(created.id.clone());
    patch.read_later = Some(true);
    repo.update_item(&patch).unwrap();

    let listed = repo.list_items();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].read_later);
    assert_eq!(listed[0].name, created.name);
    assert_eq!(listed[0].due_date, created.due_date);
    assert_eq!(listed[0].created_at, created.created_at);

    assert!(repo.delete_item(&created.id).unwrap());
    assert!(repo.list_items().is_empty());
}

#[test]
fn rapid_adds_produce_pairwise_distinct_ids() {
    let store = MemoryKeyValueStore::new();
    let repo = KvItemRepository::new(&store);

    let ids: Vec<String> = (0..200)
        .map(|index| repo.add_item(&ItemDraft::new(format!("item {index}"))).unwrap().id)
        .collect();

    let unique: HashSet<&String> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(repo.list_items().len(), 200);
}

#[test]
fn add_sets_equal_timestamps_no_earlier_than_call() {
    let store = MemoryKeyValueStore::new();
    let repo = KvItemRepository::new(&store);
    let before = now();

    let mut draft = ItemDraft::new("Watch talk");
    draft.category = "video".to_string();
    draft.url = Some("https://example.com/talk".to_string());
    let created = repo.add_item(&draft).unwrap();

    assert_eq!(created.created_at, created.updated_at);
    assert!(created.created_at >= before);
    assert!(created.due_date >= before);

    let matching: Vec<_> = repo
        .list_items()
        .into_iter()
        .filter(|item| {
            item.name == "Watch talk"
                && item.category == "video"
                && item.url.as_deref() == Some("https://example.com/talk")
        })
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].id, created.id);
}

#[test]
fn update_merges_patch_and_strictly_advances_updated_at() {
    let store = MemoryKeyValueStore::new();
    let repo = KvItemRepository::new(&store);

    let mut draft = draft_with_due("Draft", "2024-02-01T00:00:00.000Z");
    draft.notes = Some("keep me".to_string());
    draft.url = Some("https://example.com".to_string());
    let created = repo.add_item(&draft).unwrap();

    let mut patch = ItemPatch::new(created.id.clone());
    patch.name = Some("Final".to_string());
    patch.category = Some("work".to_string());
    let first = repo.update_item(&patch).unwrap();
    let second = repo.update_item(&patch).unwrap();

    assert_eq!(first.name, "Final");
    assert_eq!(first.category, "work");
    assert_eq!(first.notes, created.notes);
    assert_eq!(first.url, created.url);
    assert_eq!(first.due_date, created.due_date);
    assert_eq!(first.read_later, created.read_later);
    assert_eq!(first.created_at, created.created_at);
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);

    let stored = repo.get_item(&created.id).unwrap().unwrap();
    assert_eq!(stored, second);
}

#[test]
fn update_missing_id_returns_not_found_and_leaves_collection_unchanged() {
    let store = MemoryKeyValueStore::new();
    let repo = KvItemRepository::new(&store);
    repo.add_item(&ItemDraft::new("existing")).unwrap();
    let before_raw = store.get_item(ITEMS_KEY).unwrap();
    let before = repo.list_items();

    let mut patch = ItemPatch::new("no-such-id");
    patch.name = Some("ghost".to_string());
    let err = repo.update_item(&patch).unwrap_err();

    assert!(matches!(err, RepoError::NotFound(ref id) if id == "no-such-id"));
    assert_eq!(repo.list_items(), before);
    assert_eq!(store.get_item(ITEMS_KEY).unwrap(), before_raw);
}

#[test]
fn delete_existing_removes_exactly_that_record() {
    let store = MemoryKeyValueStore::new();
    let repo = KvItemRepository::new(&store);
    let keep = repo.add_item(&ItemDraft::new("keep")).unwrap();
    let removed = repo.add_item(&ItemDraft::new("drop")).unwrap();

    assert!(repo.delete_item(&removed.id).unwrap());

    let remaining = repo.list_items();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0], keep);
    assert!(repo.get_item(&removed.id).unwrap().is_none());
}

#[test]
fn delete_missing_id_returns_false_and_keeps_stored_bytes() {
    let store = MemoryKeyValueStore::new();
    let repo = KvItemRepository::new(&store);

    assert!(!repo.delete_item("nothing-here").unwrap());
    assert_eq!(store.get_item(ITEMS_KEY).unwrap(), None);

    repo.add_item(&ItemDraft::new("only")).unwrap();
    let before_raw = store.get_item(ITEMS_KEY).unwrap();
    assert!(!repo.delete_item("nothing-here").unwrap());
    assert_eq!(store.get_item(ITEMS_KEY).unwrap(), before_raw);
}

#[test]
fn blank_ids_are_rejected_for_lookup_update_and_delete() {
    let repo = KvItemRepository::new(MemoryKeyValueStore::new());

    assert!(matches!(repo.get_item("  "), Err(RepoError::InvalidId)));
    assert!(matches!(
        repo.update_item(&ItemPatch::new("")),
        Err(RepoError::InvalidId)
    ));
    assert!(matches!(repo.delete_item(""), Err(RepoError::InvalidId)));
}

#[test]
fn collection_survives_reopening_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.sqlite3");

    let before = {
        let conn = open_db(&path).unwrap();
        let repo = KvItemRepository::new(SqliteKeyValueStore::new(&conn));
        let mut draft = draft_with_due("Paper", "2024-01-01T00:00:00.000Z");
        draft.notes = Some("ch. 2".to_string());
        repo.add_item(&draft).unwrap();
        let second = repo.add_item(&ItemDraft::new("Podcast")).unwrap();
        let mut patch = ItemPatch::new(second.id);
        patch.read_later = Some(true);
        repo.update_item(&patch).unwrap();
        repo.list_items()
    };

    let conn = open_db(&path).unwrap();
    let repo = KvItemRepository::new(SqliteKeyValueStore::new(&conn));
    assert_eq!(repo.list_items(), before);
}

#[test]
fn sqlite_store_persists_collection_under_items_key() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvItemRepository::new(SqliteKeyValueStore::new(&conn));
    let created = repo.add_item(&ItemDraft::new("stored")).unwrap();

    let raw: String = conn
        .query_row(
            "SELECT value FROM kv_entries WHERE key = ?1;",
            [ITEMS_KEY],
            |row| row.get(0),
        )
        .unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded.as_array().map(Vec::len), Some(1));
    assert_eq!(decoded[0]["id"], created.id.as_str());
    assert_eq!(decoded[0]["name"], "stored");
}

#[test]
fn corrupt_collection_lists_empty_and_blocks_mutations() {
    let store = MemoryKeyValueStore::new();
    store.set_item(ITEMS_KEY, "{not json").unwrap();
    let repo = KvItemRepository::new(&store);

    assert!(repo.list_items().is_empty());
    assert!(matches!(
        repo.load_items(),
        Err(RepoError::InvalidData(_))
    ));
    assert!(matches!(
        repo.add_item(&ItemDraft::new("new")),
        Err(RepoError::InvalidData(_))
    ));
    assert!(matches!(
        repo.delete_item("any"),
        Err(RepoError::InvalidData(_))
    ));
    assert_eq!(
        store.get_item(ITEMS_KEY).unwrap().as_deref(),
        Some("{not json")
    );
}

#[test]
fn legacy_record_with_notes_and_todos_stays_listable_and_mutable() {
    let store = MemoryKeyValueStore::new();
    let stored = serde_json::json!([{
        "id": "a",
        "name": "x",
        "dueDate": "2024-01-01T00:00:00.000Z",
        "createdAt": "2024-01-01T00:00:00.000Z",
        "updatedAt": "2024-01-01T00:00:00.000Z",
        "todos": "t",
        "notes": "n"
    }]);
    store.set_item(ITEMS_KEY, &stored.to_string()).unwrap();
    let repo = KvItemRepository::new(&store);

    let listed = repo.list_items();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].notes.as_deref(), Some("n"));

    let mut patch = ItemPatch::new("a");
    patch.read_later = Some(true);
    repo.update_item(&patch).unwrap();
    repo.add_item(&ItemDraft::new("fresh")).unwrap();

    let raw = store.get_item(ITEMS_KEY).unwrap().unwrap();
    assert!(!raw.contains("todos"));
    assert_eq!(repo.list_items().len(), 2);
}

#[test]
fn separate_keys_hold_independent_collections() {
    let store = MemoryKeyValueStore::new();
    let primary = KvItemRepository::new(&store);
    let archive = KvItemRepository::with_key(&store, "items_archive");

    primary.add_item(&ItemDraft::new("primary")).unwrap();

    assert_eq!(archive.key(), "items_archive");
    assert_eq!(primary.list_items().len(), 1);
    assert!(archive.list_items().is_empty());
}

struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get_item(&self, _key: &str) -> KvResult<Option<String>> {
        Err(KvError::Unavailable("disk detached".to_string()))
    }

    fn set_item(&self, _key: &str, _value: &str) -> KvResult<()> {
        Err(KvError::Unavailable("disk detached".to_string()))
    }
}

struct ReadOnlyStore(MemoryKeyValueStore);

impl KeyValueStore for ReadOnlyStore {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        self.0.get_item(key)
    }

    fn set_item(&self, _key: &str, _value: &str) -> KvResult<()> {
        Err(KvError::Unavailable("quota exceeded".to_string()))
    }
}

#[test]
fn unreadable_storage_degrades_list_and_surfaces_on_mutation() {
    let repo = KvItemRepository::new(UnavailableStore);

    assert!(repo.list_items().is_empty());
    let err = repo.add_item(&ItemDraft::new("lost?")).unwrap_err();
    assert!(matches!(err, RepoError::Storage(KvError::Unavailable(_))));
    assert!(err.to_string().contains("disk detached"));
}

#[test]
fn failed_write_is_reported_and_previous_collection_kept() {
    let seed = MemoryKeyValueStore::new();
    let seeded = KvItemRepository::new(&seed).add_item(&ItemDraft::new("seed")).unwrap();
    let repo = KvItemRepository::new(ReadOnlyStore(seed));

    let err = repo.add_item(&ItemDraft::new("second")).unwrap_err();
    assert!(matches!(err, RepoError::Storage(_)));

    let mut patch = ItemPatch::new(seeded.id.clone());
    patch.name = Some("renamed".to_string());
    assert!(matches!(
        repo.update_item(&patch),
        Err(RepoError::Storage(_))
    ));

    assert_eq!(repo.list_items(), vec![seeded]);
}
