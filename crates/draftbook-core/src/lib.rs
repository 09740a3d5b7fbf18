//! Draftbook Core Library
//!
//! This crate provides the core functionality for Draftbook, a local-first
//! tool for drafting invoices and quotations.
//!
//! # Architecture
//!
//! - **Documents**: invoices and quotations with line items and tax, whose
//!   totals are recomputed on every change
//! - **Key-value storage**: drafts and branding settings are stored as JSON
//!   blobs, one per key, in the same layout the browser app writes
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open()?;
//!
//! // Start an invoice
//! let mut doc = store.new_draft(DocumentType::Invoice);
//! let item = doc.add_line_item();
//! doc.update_line_item(&item, LineItemUpdate { quantity: Some(2.0), rate: Some(50.0), ..Default::default() });
//! store.save_draft(&doc)?;
//!
//! // List drafts
//! let drafts = store.all_drafts();
//! ```
//!
//! # Modules
//!
//! - `store`: Unified storage interface (main entry point)
//! - `models`: Documents, line items and totals
//! - `drafts`: The persisted draft collection
//! - `settings`: Company branding defaults
//! - `numbering`: Document number generation
//! - `amount`: Lenient number parsing and currency formatting
//! - `storage`: Key-value backends
//! - `config`: Application configuration

pub mod amount;
pub mod config;
pub mod drafts;
pub mod models;
pub mod numbering;
pub mod settings;
pub mod storage;
pub mod store;

pub use amount::{format_currency, parse_amount};
pub use config::Config;
pub use drafts::DraftStore;
pub use models::{
    compute_totals, ClientField, ClientInfo, CompanyField, CompanyInfo, Document, DocumentType,
    LineItem, LineItemUpdate, ParseError, RecordId, Template, Totals,
};
pub use settings::{CompanySettings, SettingsField, SettingsStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use store::{StorageStats, Store};
