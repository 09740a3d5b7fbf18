//! Draft store
//!
//! All drafts live in one JSON array under the `invoice-drafts` key. Every
//! mutation is a full read-modify-write of that array: load, change, write
//! back. There is no locking, so two writers racing on the same backend can
//! lose one another's last write.
//!
//! Reads fail soft. A missing key, unreadable data or a blob that doesn't
//! parse all come back as "no drafts". Writes don't: a failed `set` is
//! returned to the caller so the in-memory document can be saved again.

use tracing::{info, warn};

use crate::models::{Document, DocumentType, RecordId};
use crate::settings::CompanySettings;
use crate::storage::{KeyValueStore, StorageError, StorageResult};

/// Storage key for the draft collection
pub const DRAFTS_KEY: &str = "invoice-drafts";

/// Key a malformed collection is copied to before it gets overwritten
pub const CORRUPT_BACKUP_KEY: &str = "invoice-drafts.corrupt";

/// What was found under the drafts key
enum Stored {
    Absent,
    Parsed(Vec<Document>),
    Malformed(String),
}

/// Draft collection over a key-value backend
pub struct DraftStore<B> {
    backend: B,
}

impl<B: KeyValueStore> DraftStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn read(&self) -> StorageResult<Stored> {
        let Some(raw) = self.backend.get(DRAFTS_KEY)? else {
            return Ok(Stored::Absent);
        };

        match serde_json::from_str::<Vec<Document>>(&raw) {
            Ok(docs) => Ok(Stored::Parsed(docs)),
            Err(e) => {
                warn!(error = %e, "stored drafts are malformed, treating as empty");
                Ok(Stored::Malformed(raw))
            }
        }
    }

    /// Load the collection for a write cycle
    ///
    /// Backend read errors propagate here, unlike `load_all`: writing after
    /// a failed read would replace the stored drafts with an empty list.
    fn read_for_write(&self) -> StorageResult<(Vec<Document>, Option<String>)> {
        Ok(match self.read()? {
            Stored::Absent => (Vec::new(), None),
            Stored::Parsed(docs) => (docs, None),
            Stored::Malformed(raw) => (Vec::new(), Some(raw)),
        })
    }

    fn write(&self, docs: &[Document], malformed: Option<String>) -> StorageResult<()> {
        if let Some(raw) = malformed {
            warn!(
                backup = CORRUPT_BACKUP_KEY,
                "backing up malformed drafts before overwriting"
            );
            self.backend.set(CORRUPT_BACKUP_KEY, &raw)?;
        }

        let json = serde_json::to_string(docs).map_err(|e| StorageError::Serialize {
            key: DRAFTS_KEY.to_string(),
            source: e,
        })?;
        self.backend.set(DRAFTS_KEY, &json)
    }

    /// All stored drafts in stored order; empty on any read problem
    pub fn load_all(&self) -> Vec<Document> {
        match self.read() {
            Ok(Stored::Parsed(docs)) => docs,
            Ok(Stored::Absent) | Ok(Stored::Malformed(_)) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read drafts, treating as empty");
                Vec::new()
            }
        }
    }

    /// Insert or replace a draft by ID
    ///
    /// An existing entry keeps its position; a new one is appended.
    pub fn upsert(&self, doc: &Document) -> StorageResult<()> {
        let (mut docs, malformed) = self.read_for_write()?;

        match docs.iter().position(|d| d.id() == doc.id()) {
            Some(pos) => docs[pos] = doc.clone(),
            None => docs.push(doc.clone()),
        }

        self.write(&docs, malformed)?;
        info!(id = %doc.id(), number = doc.number(), "saved draft");
        Ok(())
    }

    /// Delete a draft by ID
    ///
    /// Returns whether a draft was removed. An unknown ID is not an error
    /// and leaves storage untouched.
    pub fn delete_by_id(&self, id: &RecordId) -> StorageResult<bool> {
        let (mut docs, malformed) = self.read_for_write()?;

        let before = docs.len();
        docs.retain(|d| d.id() != id);
        if docs.len() == before {
            return Ok(false);
        }

        self.write(&docs, malformed)?;
        info!(%id, "deleted draft");
        Ok(true)
    }

    /// Find a draft by ID
    pub fn find_by_id(&self, id: &RecordId) -> Option<Document> {
        self.load_all().into_iter().find(|d| d.id() == id)
    }

    /// Load a draft for editing, or start a fresh invoice if it is gone
    pub fn open_for_edit(&self, id: &RecordId, settings: &CompanySettings) -> Document {
        self.find_by_id(id).unwrap_or_else(|| {
            warn!(%id, "draft not found, starting a new one");
            Document::new(DocumentType::Invoice, settings)
        })
    }

    pub fn count(&self) -> usize {
        self.load_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClientField, LineItemUpdate};
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn draft(kind: DocumentType) -> Document {
        Document::new(kind, &CompanySettings::default())
    }

    #[test]
    fn test_empty_when_absent() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);

        assert!(store.load_all().is_empty());
        assert!(store.is_empty());
        assert!(store.find_by_id(&RecordId::generate()).is_none());
    }

    #[test]
    fn test_empty_when_corrupted() {
        let backend = MemoryStore::new();
        backend.set(DRAFTS_KEY, "this is not json").unwrap();
        let store = DraftStore::new(&backend);

        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_empty_when_wrong_shape() {
        let backend = MemoryStore::new();
        backend.set(DRAFTS_KEY, r#"{"drafts": []}"#).unwrap();
        let store = DraftStore::new(&backend);

        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_upsert_then_find() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);

        let mut doc = draft(DocumentType::Invoice);
        let item = doc.items()[0].id().clone();
        doc.update_line_item(
            &item,
            LineItemUpdate {
                description: Some("Panel upgrade".to_string()),
                quantity: Some(2.0),
                rate: Some(450.0),
            },
        );
        doc.set_tax_rate(7.5);
        doc.update_client_field(ClientField::Name, "Globex");

        store.upsert(&doc).unwrap();

        let found = store.find_by_id(doc.id()).unwrap();
        assert_eq!(found, doc);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);
        let doc = draft(DocumentType::Quotation);

        store.upsert(&doc).unwrap();
        store.upsert(&doc).unwrap();

        let all = store.load_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], doc);
    }

    #[test]
    fn test_upsert_appends_new_drafts_in_order() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);

        let docs: Vec<Document> = (0..3).map(|_| draft(DocumentType::Invoice)).collect();
        for doc in &docs {
            store.upsert(doc).unwrap();
        }

        let ids: Vec<RecordId> = store.load_all().iter().map(|d| d.id().clone()).collect();
        let expected: Vec<RecordId> = docs.iter().map(|d| d.id().clone()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);

        let first = draft(DocumentType::Invoice);
        let mut second = draft(DocumentType::Invoice);
        let third = draft(DocumentType::Quotation);
        for doc in [&first, &second, &third] {
            store.upsert(doc).unwrap();
        }

        second.update_client_field(ClientField::Name, "Updated Client");
        second.set_tax_rate(12.0);
        store.upsert(&second).unwrap();

        let all = store.load_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id(), first.id());
        assert_eq!(all[1], second);
        assert_eq!(all[1].client().name, "Updated Client");
        assert_eq!(all[2].id(), third.id());
    }

    #[test]
    fn test_delete_by_id() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);

        let keep = draft(DocumentType::Invoice);
        let remove = draft(DocumentType::Invoice);
        store.upsert(&keep).unwrap();
        store.upsert(&remove).unwrap();
        assert_eq!(store.count(), 2);

        assert!(store.delete_by_id(remove.id()).unwrap());

        assert_eq!(store.count(), 1);
        assert!(store.find_by_id(remove.id()).is_none());
        assert!(store.find_by_id(keep.id()).is_some());
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);
        let doc = draft(DocumentType::Invoice);
        store.upsert(&doc).unwrap();

        assert!(!store.delete_by_id(&RecordId::generate()).unwrap());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_failed_write_keeps_previous_collection() {
        let backend = MemoryStore::with_quota(1500);
        let store = DraftStore::new(&backend);

        let doc = draft(DocumentType::Invoice);
        store.upsert(&doc).unwrap();

        let mut big = draft(DocumentType::Invoice);
        big.update_client_field(ClientField::Address, "x".repeat(4000));
        let err = store.upsert(&big).unwrap_err();

        assert!(matches!(err, StorageError::QuotaExceeded { .. }));
        assert!(err.is_recoverable());
        let all = store.load_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), doc.id());
    }

    #[test]
    fn test_malformed_collection_is_backed_up_on_write() {
        let backend = MemoryStore::new();
        backend.set(DRAFTS_KEY, "[{broken").unwrap();
        let store = DraftStore::new(&backend);

        let doc = draft(DocumentType::Invoice);
        store.upsert(&doc).unwrap();

        assert_eq!(
            backend.get(CORRUPT_BACKUP_KEY).unwrap().as_deref(),
            Some("[{broken")
        );
        assert_eq!(store.load_all().len(), 1);
    }

    #[test]
    fn test_delete_on_malformed_collection_leaves_it_alone() {
        let backend = MemoryStore::new();
        backend.set(DRAFTS_KEY, "garbage").unwrap();
        let store = DraftStore::new(&backend);

        assert!(!store.delete_by_id(&RecordId::generate()).unwrap());
        assert_eq!(backend.get(DRAFTS_KEY).unwrap().as_deref(), Some("garbage"));
        assert!(backend.get(CORRUPT_BACKUP_KEY).unwrap().is_none());
    }

    #[test]
    fn test_open_for_edit() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);
        let settings = CompanySettings::default();

        let doc = draft(DocumentType::Quotation);
        store.upsert(&doc).unwrap();
        assert_eq!(store.open_for_edit(doc.id(), &settings), doc);

        let missing = RecordId::generate();
        let fresh = store.open_for_edit(&missing, &settings);
        assert_ne!(fresh.id(), &missing);
        assert_eq!(fresh.kind(), DocumentType::Invoice);
        assert!(fresh.number().starts_with("INV-"));
    }

    #[test]
    fn test_stored_blob_is_json_array() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);
        let doc = draft(DocumentType::Quotation);
        store.upsert(&doc).unwrap();

        let raw = backend.get(DRAFTS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["id"], doc.id().to_string());
        assert_eq!(entries[0]["type"], "quotation");
        assert_eq!(entries[0]["invoiceNumber"], doc.number());
    }

    #[test]
    fn test_file_backend_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let doc = draft(DocumentType::Invoice);

        {
            let store = DraftStore::new(FileStore::new(temp_dir.path()));
            store.upsert(&doc).unwrap();
        }

        let store = DraftStore::new(FileStore::new(temp_dir.path()));
        assert_eq!(store.find_by_id(doc.id()), Some(doc));
    }

    #[test]
    fn test_record_with_empty_id_does_not_hide_others() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);
        let good = draft(DocumentType::Invoice);
        store.upsert(&good).unwrap();

        // A draft saved with an empty id next to a normal one
        let raw = backend.get(DRAFTS_KEY).unwrap().unwrap();
        let mut entries: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
        let mut blank = entries[0].clone();
        blank["id"] = serde_json::json!("");
        blank["invoiceNumber"] = serde_json::json!("INV-000000");
        entries.push(blank);
        backend
            .set(DRAFTS_KEY, &serde_json::to_string(&entries).unwrap())
            .unwrap();

        assert_eq!(store.count(), 2);
        assert_eq!(store.find_by_id(good.id()), Some(good.clone()));
        let blank = store.find_by_id(&RecordId::from("")).unwrap();
        assert_eq!(blank.number(), "INV-000000");

        let next = draft(DocumentType::Quotation);
        store.upsert(&next).unwrap();

        let all = store.load_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], good);
        assert_eq!(all[2], next);
        assert!(backend.get(CORRUPT_BACKUP_KEY).unwrap().is_none());
    }

    #[test]
    fn test_fractional_amounts_survive_reload() {
        let backend = MemoryStore::new();
        let store = DraftStore::new(&backend);

        for n in 1..=2000u32 {
            let mut doc = draft(DocumentType::Invoice);
            let item = doc.items()[0].id().clone();
            doc.update_line_item(
                &item,
                LineItemUpdate {
                    quantity: Some(f64::from(n) / 3.0),
                    rate: Some(f64::from(n) / 7.0 / 1000.0),
                    ..Default::default()
                },
            );
            doc.set_tax_rate(f64::from(n) / 13.0);

            store.upsert(&doc).unwrap();
            assert_eq!(store.find_by_id(doc.id()), Some(doc.clone()));
            assert!(store.delete_by_id(doc.id()).unwrap());
        }
    }
}
