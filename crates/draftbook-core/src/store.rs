//! Unified storage interface
//!
//! The `Store` owns the file-backed key-value store and hands out the
//! draft and settings views over it:
//! - `invoice-drafts`: every saved invoice and quotation draft
//! - `company-settings`: branding defaults for new drafts
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open()?;
//!
//! let mut draft = store.new_draft(DocumentType::Invoice);
//! draft.set_tax_rate(7.5);
//! store.save_draft(&draft)?;
//!
//! let drafts = store.all_drafts();
//! ```

use anyhow::{Context, Result};

use crate::config::Config;
use crate::drafts::{DraftStore, DRAFTS_KEY};
use crate::models::{Document, DocumentType, RecordId};
use crate::settings::{CompanySettings, SettingsStore, SETTINGS_KEY};
use crate::storage::{FileStore, StorageResult};

/// Sizes of the stored blobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub drafts_exists: bool,
    pub settings_exists: bool,
    pub drafts_size: u64,
    pub settings_size: u64,
}

impl StorageStats {
    pub fn total_size(&self) -> u64 {
        self.drafts_size + self.settings_size
    }

    /// Total size formatted as B / KB / MB
    pub fn total_size_human(&self) -> String {
        let size = self.total_size();
        if size < 1024 {
            format!("{} B", size)
        } else if size < 1024 * 1024 {
            format!("{:.1} KB", size as f64 / 1024.0)
        } else {
            format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
        }
    }
}

/// Unified storage interface for drafts and settings
pub struct Store {
    backend: FileStore,
    config: Config,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the store with a specific configuration
    pub fn open_with_config(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", config.data_dir))?;

        Ok(Self {
            backend: FileStore::new(&config.data_dir),
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn drafts(&self) -> DraftStore<&FileStore> {
        DraftStore::new(&self.backend)
    }

    fn settings_store(&self) -> SettingsStore<&FileStore> {
        SettingsStore::new(&self.backend)
    }

    // ==================== Draft Operations ====================

    /// Start a new unsaved draft seeded from the current settings
    pub fn new_draft(&self, kind: DocumentType) -> Document {
        Document::new(kind, &self.settings())
    }

    /// Insert or replace a draft
    pub fn save_draft(&self, doc: &Document) -> Result<()> {
        self.drafts()
            .upsert(doc)
            .with_context(|| format!("Failed to save draft {}", doc.number()))
    }

    /// Delete a draft; returns whether it existed
    pub fn delete_draft(&self, id: &RecordId) -> Result<bool> {
        self.drafts()
            .delete_by_id(id)
            .with_context(|| format!("Failed to delete draft {}", id))
    }

    /// Get a draft by ID
    pub fn get_draft(&self, id: &RecordId) -> Option<Document> {
        self.drafts().find_by_id(id)
    }

    /// All drafts in stored order
    pub fn all_drafts(&self) -> Vec<Document> {
        self.drafts().load_all()
    }

    /// Load a draft for editing, or a fresh invoice when it is gone
    pub fn open_draft_for_edit(&self, id: &RecordId) -> Document {
        self.drafts().open_for_edit(id, &self.settings())
    }

    pub fn draft_count(&self) -> usize {
        self.drafts().count()
    }

    // ==================== Settings ====================

    pub fn settings(&self) -> CompanySettings {
        self.settings_store().load()
    }

    pub fn save_settings(&self, settings: &CompanySettings) -> Result<()> {
        self.settings_store()
            .save(settings)
            .context("Failed to save settings")
    }

    // ==================== Stats ====================

    /// Existence and sizes of the stored blobs
    pub fn storage_stats(&self) -> StorageResult<StorageStats> {
        let drafts = self.backend.size_of(DRAFTS_KEY)?;
        let settings = self.backend.size_of(SETTINGS_KEY)?;

        Ok(StorageStats {
            drafts_exists: drafts.is_some(),
            settings_exists: settings.is_some(),
            drafts_size: drafts.unwrap_or(0),
            settings_size: settings.unwrap_or(0),
        })
    }
}
