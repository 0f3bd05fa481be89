// 📚 Record Store - sole owner of the certification collection
//
// Every mutation persists the full collection before it is committed
// in memory: if the write fails, nothing changes.

use crate::db::BlobStorage;
use crate::error::StoreError;
use crate::record::{new_record_id, seed_records, Record, RecordFields};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Fixed key the collection is persisted under
pub const STORAGE_KEY: &str = "msftExamTracker.v1";

pub struct RecordStore<S: BlobStorage> {
    storage: S,
    key: String,
    records: Vec<Record>,
    /// Dialog state: `Some(id)` while editing, `None` while adding
    editing_id: Option<String>,
    seeded: bool,
}

impl<S: BlobStorage> RecordStore<S> {
    /// Load the collection from storage, falling back to seed data
    pub fn open(storage: S) -> Self {
        Self::open_with_key(storage, STORAGE_KEY)
    }

    pub fn open_with_key(storage: S, key: &str) -> Self {
        let (records, seeded) = match load_records(&storage, key) {
            Some(records) => (records, false),
            None => (seed_records(), true),
        };

        info!(count = records.len(), seeded, "record store opened");

        RecordStore {
            storage,
            key: key.to_string(),
            records,
            editing_id: None,
            seeded,
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// Records in stored order
    pub fn list(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True while the collection is the unpersisted seed set
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Key the collection blob is persisted under
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Add a new record at the front of the list (most recent first)
    pub fn create(&mut self, fields: RecordFields) -> Result<Record, StoreError> {
        if fields.name.trim().is_empty() {
            return Err(StoreError::blank_name());
        }

        let record = Record::from_fields(new_record_id(), fields.with_defaults());

        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record.clone());
        next.extend(self.records.iter().cloned());
        self.commit(next)?;

        info!(id = %record.id, name = %record.name, "record created");
        Ok(record)
    }

    /// Replace the record with this id in place (position preserved)
    pub fn update(&mut self, id: &str, fields: RecordFields) -> Result<Record, StoreError> {
        if fields.name.trim().is_empty() {
            return Err(StoreError::blank_name());
        }

        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let record = Record::from_fields(id.to_string(), fields.with_defaults());
        let mut next = self.records.clone();
        next[index] = record.clone();
        self.commit(next)?;

        info!(id = %record.id, "record updated");
        Ok(record)
    }

    /// Remove the record with this id. Absent ids are not an error.
    pub fn delete(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.records.iter().any(|r| r.id == id) {
            debug!(id, "delete ignored, record not present");
            return Ok(false);
        }

        // an open edit of this id keeps its pointer; saving it reports NotFound
        let next: Vec<Record> = self.records.iter().filter(|r| r.id != id).cloned().collect();
        self.commit(next)?;

        info!(id, "record deleted");
        Ok(true)
    }

    /// Overwrite the whole collection
    pub fn replace_all(&mut self, records: Vec<Record>) -> Result<(), StoreError> {
        validate_collection(&records)?;

        let count = records.len();
        self.commit(records.into_iter().map(Record::with_defaults).collect())?;

        info!(count, "collection replaced");
        Ok(())
    }

    /// Empty the collection (reset)
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.commit(Vec::new())?;
        self.editing_id = None;

        info!("collection cleared");
        Ok(())
    }

    fn commit(&mut self, next: Vec<Record>) -> Result<(), StoreError> {
        let blob = serde_json::to_string(&next).map_err(anyhow::Error::from)?;
        self.storage.write(&self.key, &blob)?;

        self.records = next;
        self.seeded = false;
        Ok(())
    }

    // ========================================================================
    // EDIT DIALOG FLOW
    // ========================================================================

    /// Start adding a record: clears the editing pointer, returns defaults
    pub fn begin_create(&mut self) -> RecordFields {
        self.editing_id = None;
        RecordFields::default()
    }

    /// Start editing an existing record
    pub fn begin_edit(&mut self, id: &str) -> Result<RecordFields, StoreError> {
        let fields = self
            .get(id)
            .map(Record::fields)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        self.editing_id = Some(id.to_string());
        Ok(fields)
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
    }

    /// Save the dialog: update when editing, create otherwise.
    ///
    /// On a validation or storage failure the pointer is kept so the dialog
    /// can stay open. When the edited record has vanished the save is a
    /// no-op: `NotFound` is returned and the pointer is dropped.
    pub fn save_draft(&mut self, fields: RecordFields) -> Result<Record, StoreError> {
        let result = match self.editing_id.clone() {
            Some(id) => self.update(&id, fields),
            None => self.create(fields),
        };

        match &result {
            Ok(_) | Err(StoreError::NotFound(_)) => self.editing_id = None,
            Err(_) => {}
        }
        result
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// `None` means "use seed data": key absent, storage unreadable or blob corrupt
fn load_records<S: BlobStorage>(storage: &S, key: &str) -> Option<Vec<Record>> {
    let blob = match storage.read(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "storage unreadable, using seed data");
            return None;
        }
    };

    let parsed: Option<Vec<Record>> = match serde_json::from_str(&blob) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "persisted collection is corrupt, using seed data");
            return None;
        }
    };

    // A literal `null` blob behaves like an absent key
    parsed.map(repair_loaded)
}

fn repair_loaded(records: Vec<Record>) -> Vec<Record> {
    let mut seen = HashSet::new();
    let mut repaired = Vec::with_capacity(records.len());

    for mut record in records {
        if !record.has_name() {
            warn!(id = %record.id, "dropping stored record with blank name");
            continue;
        }
        if record.id.is_empty() || !seen.insert(record.id.clone()) {
            let fresh = new_record_id();
            warn!(old = %record.id, new = %fresh, "re-minting duplicate record id");
            record.id = fresh.clone();
            seen.insert(fresh);
        }
        repaired.push(record);
    }

    repaired
}

fn validate_collection(records: &[Record]) -> Result<(), StoreError> {
    let mut seen = HashSet::new();

    for record in records {
        if !record.has_name() {
            return Err(StoreError::blank_name());
        }
        if record.id.is_empty() || !seen.insert(record.id.as_str()) {
            return Err(StoreError::Validation {
                field: "id",
                message: format!("duplicate or empty id: {:?}", record.id),
            });
        }
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStorage, SqliteStorage};

    fn create_test_fields(name: &str, codes: &str) -> RecordFields {
        RecordFields {
            codes: codes.to_string(),
            domain: "Security".to_string(),
            expiration: "2027-06-30".to_string(),
            ..RecordFields::named(name)
        }
    }

    fn empty_store() -> RecordStore<MemoryStorage> {
        RecordStore::open(MemoryStorage::with_blob(STORAGE_KEY, "[]"))
    }

    #[test]
    fn test_open_empty_storage_uses_seed() {
        let store = RecordStore::open(MemoryStorage::new());

        assert_eq!(store.len(), 5);
        assert!(store.is_seeded());
        assert_eq!(store.storage().get(STORAGE_KEY), None, "seed is not persisted");
    }

    #[test]
    fn test_open_corrupt_blob_uses_seed() {
        let store = RecordStore::open(MemoryStorage::with_blob(STORAGE_KEY, "{not json"));
        assert_eq!(store.len(), 5);
        assert!(store.is_seeded());

        let store = RecordStore::open(MemoryStorage::with_blob(STORAGE_KEY, "null"));
        assert!(store.is_seeded());

        let store = RecordStore::open(MemoryStorage::with_blob(STORAGE_KEY, r#"{"a":1}"#));
        assert!(store.is_seeded());
    }

    #[test]
    fn test_open_persisted_empty_collection() {
        let store = empty_store();
        assert!(store.is_empty());
        assert!(!store.is_seeded());
    }

    #[test]
    fn test_create_prepends_and_persists() {
        let mut store = empty_store();

        let first = store.create(create_test_fields("First", "AZ-104")).unwrap();
        let second = store.create(create_test_fields("Second", "AZ-305")).unwrap();

        let ids: Vec<&str> = store.list().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert_ne!(first.id, second.id);

        let reopened = RecordStore::open(store.storage().clone());
        assert_eq!(reopened.list(), store.list());
    }

    #[test]
    fn test_create_preserves_fields_verbatim() {
        let mut store = empty_store();
        let mut fields = create_test_fields("  Spaced Name ", "SC-100");
        fields.notes = " keep me ".to_string();

        let record = store.create(fields.clone()).unwrap();

        assert_eq!(record.fields(), fields);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_create_blank_name_rejected() {
        let mut store = empty_store();
        store.create(create_test_fields("Keep", "K-1")).unwrap();
        let before = store.list().to_vec();
        let blob_before = store.storage().get(STORAGE_KEY).map(str::to_string);

        let result = store.create(create_test_fields("   ", "X-1"));

        assert!(matches!(result, Err(StoreError::Validation { field: "name", .. })));
        assert_eq!(store.list(), before.as_slice());
        assert_eq!(store.storage().get(STORAGE_KEY).map(str::to_string), blob_before);
    }

    #[test]
    fn test_create_on_seed_persists_seed_too() {
        let mut store = RecordStore::open(MemoryStorage::new());
        store.create(create_test_fields("New", "N-1")).unwrap();

        assert!(!store.is_seeded());
        let reopened = RecordStore::open(store.storage().clone());
        assert_eq!(reopened.len(), 6);
    }

    #[test]
    fn test_update_preserves_position() {
        let mut store = empty_store();
        let c = store.create(create_test_fields("C", "C-1")).unwrap();
        let b = store.create(create_test_fields("B", "B-1")).unwrap();
        let a = store.create(create_test_fields("A", "A-1")).unwrap();

        let mut fields = b.fields();
        fields.status = "Scheduled".to_string();
        let updated = store.update(&b.id, fields).unwrap();

        assert_eq!(updated.id, b.id);
        let list = store.list();
        assert_eq!(list[0].id, a.id);
        assert_eq!(list[1].id, b.id);
        assert_eq!(list[1].status, "Scheduled");
        assert_eq!(list[1].codes, "B-1");
        assert_eq!(list[2].id, c.id);
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let mut store = empty_store();
        let result = store.update("nope", create_test_fields("X", "X-1"));
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "nope"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = empty_store();
        let keep = store.create(create_test_fields("Keep", "K-1")).unwrap();
        let gone = store.create(create_test_fields("Gone", "G-1")).unwrap();

        assert!(store.delete(&gone.id).unwrap());
        let after_once = store.list().to_vec();
        assert!(!store.delete(&gone.id).unwrap());

        assert_eq!(store.list(), after_once.as_slice());
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].id, keep.id);
    }

    #[test]
    fn test_clear_persists_empty_collection() {
        let mut store = RecordStore::open(MemoryStorage::new());
        store.clear().unwrap();

        assert!(store.is_empty());
        assert_eq!(store.storage().get(STORAGE_KEY), Some("[]"));

        let reopened = RecordStore::open(store.storage().clone());
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_replace_all_rejects_duplicates_and_blank_names() {
        let mut store = empty_store();
        let r = Record::from_fields("same".to_string(), RecordFields::named("One"));

        let dup = store.replace_all(vec![r.clone(), r.clone()]);
        assert!(matches!(dup, Err(StoreError::Validation { field: "id", .. })));

        let blank = Record::from_fields("other".to_string(), RecordFields::named(""));
        assert!(store.replace_all(vec![blank]).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_storage_failure_leaves_collection_unchanged() {
        let mut storage = MemoryStorage::with_blob(STORAGE_KEY, "[]");
        storage.set_fail_writes(true);
        let mut store = RecordStore::open(storage);

        let result = store.create(create_test_fields("Lost", "L-1"));

        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_repairs_duplicate_ids_and_blank_names() {
        let blob = r#"[
            {"id":"dup","name":"One"},
            {"id":"dup","name":"Two"},
            {"id":"blank","name":"  "}
        ]"#;
        let store = RecordStore::open(MemoryStorage::with_blob(STORAGE_KEY, blob));

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].id, "dup");
        assert_ne!(store.list()[1].id, "dup");
        assert_eq!(store.list()[1].name, "Two");
    }

    #[test]
    fn test_dialog_flow_create_then_edit() {
        let mut store = empty_store();

        let mut draft = store.begin_create();
        assert_eq!(store.editing_id(), None);
        draft.name = "Azure Fundamentals".to_string();
        let created = store.save_draft(draft).unwrap();

        let mut draft = store.begin_edit(&created.id).unwrap();
        assert_eq!(store.editing_id(), Some(created.id.as_str()));
        draft.codes = "AZ-900".to_string();
        let edited = store.save_draft(draft).unwrap();

        assert_eq!(edited.id, created.id);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].codes, "AZ-900");
        assert_eq!(store.editing_id(), None);
    }

    #[test]
    fn test_dialog_failed_save_keeps_pointer() {
        let mut store = empty_store();
        let created = store.create(create_test_fields("Named", "N-1")).unwrap();

        let mut draft = store.begin_edit(&created.id).unwrap();
        draft.name.clear();

        assert!(store.save_draft(draft).is_err());
        assert_eq!(store.editing_id(), Some(created.id.as_str()));
        assert_eq!(store.list()[0].name, "Named");
    }

    #[test]
    fn test_dialog_edit_of_deleted_record() {
        let mut store = empty_store();
        let created = store.create(create_test_fields("Named", "N-1")).unwrap();
        let draft = store.begin_edit(&created.id).unwrap();

        let kept = store.create(create_test_fields("Keep", "K-1")).unwrap();
        store.delete(&created.id).unwrap();
        assert_eq!(store.editing_id(), Some(created.id.as_str()));

        let result = store.save_draft(draft);

        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == created.id));
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].id, kept.id);
        assert_eq!(store.editing_id(), None);
    }

    #[test]
    fn test_blank_level_and_status_get_defaults() {
        let mut store = empty_store();
        let mut fields = create_test_fields("Blank Pickers", "BP-1");
        fields.level = "  ".to_string();
        fields.status = String::new();

        let created = store.create(fields).unwrap();
        assert_eq!(created.level, "Associate");
        assert_eq!(created.status, "Planned");

        let mut draft = store.begin_edit(&created.id).unwrap();
        draft.level.clear();
        draft.status = "Scheduled".to_string();
        let edited = store.save_draft(draft).unwrap();
        assert_eq!(edited.level, "Associate");
        assert_eq!(edited.status, "Scheduled");
    }

    #[test]
    fn test_sqlite_backed_store() {
        let mut store = RecordStore::open(SqliteStorage::open_in_memory().unwrap());
        assert!(store.is_seeded());
        assert_eq!(store.storage().updated_at(store.storage_key()).unwrap(), None);

        let created = store.create(create_test_fields("Stored", "S-1")).unwrap();

        let blob = store.storage().read(STORAGE_KEY).unwrap().unwrap();
        let persisted: Vec<Record> = serde_json::from_str(&blob).unwrap();
        assert_eq!(persisted.len(), 6);
        assert_eq!(persisted[0].id, created.id);
        assert!(store.storage().updated_at(store.storage_key()).unwrap().is_some());
    }
}
