//! Data models for draftbook
//!
//! Defines the invoice/quotation `Document`, its `LineItem`s and the party
//! snapshots it carries. Totals are derived: every operation that touches
//! items or the tax rate recomputes them before returning, and nothing
//! outside this module can set them.
//!
//! The persisted shape is the camelCase record the browser app stored in
//! local storage (`invoiceNumber`, `invoiceDate`, `logoUrl`, ...), so drafts
//! written by either side read back on the other.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::amount;
use crate::numbering;
use crate::settings::CompanySettings;

/// Error returned when parsing a type, template or field name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}

/// Invoice or quotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Invoice,
    Quotation,
}

impl DocumentType {
    /// Prefix used for generated document numbers
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "INV",
            DocumentType::Quotation => "QUO",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "Invoice",
            DocumentType::Quotation => "Quotation",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Quotation => "quotation",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invoice" | "inv" => Ok(DocumentType::Invoice),
            "quotation" | "quote" | "quo" => Ok(DocumentType::Quotation),
            _ => Err(ParseError::new("document type", s, "invoice, quotation")),
        }
    }
}

/// Visual layout used when rendering a document
///
/// Has no effect on totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    #[default]
    Classic,
    Modern,
    Professional,
    Ginyard,
    Vss,
    Cvs,
}

impl Template {
    pub const ALL: [Template; 6] = [
        Template::Classic,
        Template::Modern,
        Template::Professional,
        Template::Ginyard,
        Template::Vss,
        Template::Cvs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Classic => "classic",
            Template::Modern => "modern",
            Template::Professional => "professional",
            Template::Ginyard => "ginyard",
            Template::Vss => "vss",
            Template::Cvs => "cvs",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Template {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Template::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                ParseError::new(
                    "template",
                    s,
                    "classic, modern, professional, ginyard, vss, cvs",
                )
            })
    }
}

/// Issuing company details, copied into each document at creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub website: String,
}

/// Billed party
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Editable field of `CompanyInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Email,
    Phone,
    Address,
    Website,
}

impl FromStr for CompanyField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(CompanyField::Name),
            "email" => Ok(CompanyField::Email),
            "phone" => Ok(CompanyField::Phone),
            "address" => Ok(CompanyField::Address),
            "website" => Ok(CompanyField::Website),
            _ => Err(ParseError::new(
                "company field",
                s,
                "name, email, phone, address, website",
            )),
        }
    }
}

impl CompanyInfo {
    /// Set one field
    pub fn set(&mut self, field: CompanyField, value: impl Into<String>) {
        let slot = match field {
            CompanyField::Name => &mut self.name,
            CompanyField::Email => &mut self.email,
            CompanyField::Phone => &mut self.phone,
            CompanyField::Address => &mut self.address,
            CompanyField::Website => &mut self.website,
        };
        *slot = value.into();
    }
}

/// Editable field of `ClientInfo`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    Name,
    Phone,
    Address,
}

impl FromStr for ClientField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(ClientField::Name),
            "phone" => Ok(ClientField::Phone),
            "address" => Ok(ClientField::Address),
            _ => Err(ParseError::new("client field", s, "name, phone, address")),
        }
    }
}

impl ClientInfo {
    /// Set one field
    pub fn set(&mut self, field: ClientField, value: impl Into<String>) {
        let slot = match field {
            ClientField::Name => &mut self.name,
            ClientField::Phone => &mut self.phone,
            ClientField::Address => &mut self.address,
        };
        *slot = value.into();
    }
}

/// Opaque identifier of a document or line item
///
/// New IDs are v4 UUIDs, but stored drafts may carry any string (the browser
/// app saves a draft with an empty id when it cannot find the one it opened),
/// so no format is enforced when reading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// A fresh random ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    /// Strings are kept verbatim; numbers are kept as their text; null is empty
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => RecordId(s),
            serde_json::Value::Null => RecordId::default(),
            other => RecordId(other.to_string()),
        })
    }
}

/// One billable row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    id: RecordId,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "amount::lenient")]
    pub rate: f64,
}

impl LineItem {
    /// Create a line item with a fresh ID
    pub fn new(description: impl Into<String>, quantity: f64, rate: f64) -> Self {
        Self {
            id: RecordId::generate(),
            description: description.into(),
            quantity,
            rate,
        }
    }

    /// The empty row new documents start with: quantity 1, rate 0
    pub fn blank() -> Self {
        Self::new("", 1.0, 0.0)
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// `quantity * rate`
    pub fn line_total(&self) -> f64 {
        self.quantity * self.rate
    }
}

/// Partial update of a line item; `None` leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemUpdate {
    pub description: Option<String>,
    pub quantity: Option<f64>,
    pub rate: Option<f64>,
}

impl LineItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.quantity.is_none() && self.rate.is_none()
    }
}

/// Derived money values of a document
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub tax_amount: f64,
    pub total: f64,
}

/// Compute subtotal, tax and total for a set of items and a tax percentage
pub fn compute_totals(items: &[LineItem], tax_rate: f64) -> Totals {
    let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
    let tax_amount = subtotal * tax_rate / 100.0;
    Totals {
        subtotal,
        tax_amount,
        total: subtotal + tax_amount,
    }
}

/// An invoice or quotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocumentRecord", into = "DocumentRecord")]
pub struct Document {
    id: RecordId,
    kind: DocumentType,
    number: String,
    company: CompanyInfo,
    client: ClientInfo,
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    items: Vec<LineItem>,
    tax_rate: f64,
    totals: Totals,
    logo_url: String,
    template: Template,
}

impl Document {
    /// Create a new draft of `kind` branded from `settings`
    ///
    /// Gets a fresh ID, a generated number, today's issue date, one blank
    /// line item, zero tax and the settings' default template.
    pub fn new(kind: DocumentType, settings: &CompanySettings) -> Self {
        Self::with_number(
            kind,
            numbering::next_number(kind),
            Some(Local::now().date_naive()),
            settings,
        )
    }

    /// Create a new draft with an explicit number and issue date
    pub fn with_number(
        kind: DocumentType,
        number: impl Into<String>,
        issue_date: Option<NaiveDate>,
        settings: &CompanySettings,
    ) -> Self {
        let mut doc = Self {
            id: RecordId::generate(),
            kind,
            number: number.into(),
            company: settings.company.clone(),
            client: ClientInfo::default(),
            issue_date,
            due_date: None,
            items: vec![LineItem::blank()],
            tax_rate: 0.0,
            totals: Totals::default(),
            logo_url: settings.logo_url.clone(),
            template: settings.default_template,
        };
        doc.recompute_totals();
        doc
    }

    /// A fresh draft of the same type, as if the form were cleared
    pub fn cleared(&self, settings: &CompanySettings) -> Self {
        Self::new(self.kind, settings)
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn kind(&self) -> DocumentType {
        self.kind
    }

    /// "Invoice" or "Quotation"
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn company(&self) -> &CompanyInfo {
        &self.company
    }

    pub fn client(&self) -> &ClientInfo {
        &self.client
    }

    pub fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Find a line item by ID
    pub fn item(&self, id: &RecordId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Tax percentage
    pub fn tax_rate(&self) -> f64 {
        self.tax_rate
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn subtotal(&self) -> f64 {
        self.totals.subtotal
    }

    pub fn tax_amount(&self) -> f64 {
        self.totals.tax_amount
    }

    pub fn total(&self) -> f64 {
        self.totals.total
    }

    pub fn logo_url(&self) -> &str {
        &self.logo_url
    }

    pub fn template(&self) -> Template {
        self.template
    }

    /// Recalculate subtotal, tax and total from the items and tax rate
    pub fn recompute_totals(&mut self) {
        self.totals = compute_totals(&self.items, self.tax_rate);
    }

    // ==================== Line Items ====================

    /// Append a blank line item (quantity 1, rate 0) and return its ID
    pub fn add_line_item(&mut self) -> RecordId {
        let item = LineItem::blank();
        let id = item.id.clone();
        self.items.push(item);
        self.recompute_totals();
        id
    }

    /// Remove a line item, returning it if it was present
    ///
    /// Removing the last item is allowed and leaves zero totals.
    pub fn remove_line_item(&mut self, id: &RecordId) -> Option<LineItem> {
        let pos = self.items.iter().position(|item| &item.id == id)?;
        let removed = self.items.remove(pos);
        self.recompute_totals();
        Some(removed)
    }

    /// Apply a partial update to a line item
    ///
    /// Returns `false` if no item has that ID. Negative values are stored
    /// as given.
    pub fn update_line_item(&mut self, id: &RecordId, update: LineItemUpdate) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| &item.id == id) else {
            return false;
        };

        if let Some(description) = update.description {
            item.description = description;
        }
        if let Some(quantity) = update.quantity {
            item.quantity = quantity;
        }
        if let Some(rate) = update.rate {
            item.rate = rate;
        }

        self.recompute_totals();
        true
    }

    /// Set the tax percentage
    pub fn set_tax_rate(&mut self, rate: f64) {
        self.tax_rate = rate;
        self.recompute_totals();
    }

    // ==================== Other Fields ====================

    pub fn update_company_field(&mut self, field: CompanyField, value: impl Into<String>) {
        self.company.set(field, value);
    }

    pub fn update_client_field(&mut self, field: ClientField, value: impl Into<String>) {
        self.client.set(field, value);
    }

    /// Override the generated number
    pub fn set_document_number(&mut self, number: impl Into<String>) {
        self.number = number.into();
    }

    pub fn set_issue_date(&mut self, date: Option<NaiveDate>) {
        self.issue_date = date;
    }

    pub fn set_due_date(&mut self, date: Option<NaiveDate>) {
        self.due_date = date;
    }

    pub fn set_logo_url(&mut self, url: impl Into<String>) {
        self.logo_url = url.into();
    }

    pub fn set_template(&mut self, template: Template) {
        self.template = template;
    }
}

/// The stored shape of a document
///
/// `taxAmount` is not stored; subtotal and total are written for readers
/// of the raw data but recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentRecord {
    #[serde(default)]
    id: RecordId,
    #[serde(default)]
    invoice_number: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_enum")]
    kind: DocumentType,
    #[serde(default)]
    company: CompanyInfo,
    #[serde(default)]
    client: ClientInfo,
    #[serde(default, with = "date_field")]
    invoice_date: Option<NaiveDate>,
    #[serde(default, with = "date_field")]
    due_date: Option<NaiveDate>,
    #[serde(default)]
    items: Vec<LineItem>,
    #[serde(default, deserialize_with = "amount::lenient")]
    tax: f64,
    #[serde(default, deserialize_with = "amount::lenient")]
    subtotal: f64,
    #[serde(default, deserialize_with = "amount::lenient")]
    total: f64,
    #[serde(default)]
    logo_url: String,
    #[serde(default, deserialize_with = "lenient_enum")]
    template: Template,
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        let mut doc = Document {
            id: record.id,
            kind: record.kind,
            number: record.invoice_number,
            company: record.company,
            client: record.client,
            issue_date: record.invoice_date,
            due_date: record.due_date,
            items: record.items,
            tax_rate: record.tax,
            totals: Totals::default(),
            logo_url: record.logo_url,
            template: record.template,
        };
        doc.recompute_totals();

        if doc.total() != record.total || doc.subtotal() != record.subtotal {
            debug!(
                id = %doc.id,
                stored_total = record.total,
                total = doc.total(),
                "stored totals differ from recomputed totals"
            );
        }
        doc
    }
}

impl From<Document> for DocumentRecord {
    fn from(doc: Document) -> Self {
        DocumentRecord {
            id: doc.id,
            invoice_number: doc.number,
            kind: doc.kind,
            company: doc.company,
            client: doc.client,
            invoice_date: doc.issue_date,
            due_date: doc.due_date,
            items: doc.items,
            tax: doc.tax_rate,
            subtotal: doc.totals.subtotal,
            total: doc.totals.total,
            logo_url: doc.logo_url,
            template: doc.template,
        }
    }
}

/// Deserialize a string enum, falling back to its default on anything
/// missing, mistyped or unrecognized
pub(crate) fn lenient_enum<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

/// `YYYY-MM-DD` dates where an absent date is the empty string
pub(crate) mod date_field {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(raw
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s.trim(), FORMAT).ok()))
    }
}
