//! Draft command handlers

use anyhow::{bail, Context, Result};

use draftbook_core::{ClientField, CompanyField, Document, DocumentType, Store, Template};

use super::{parse_amount_arg, parse_assignment, parse_date_arg, parse_draft_id};
use crate::editor::{confirm, is_interactive, prompt_with_default};
use crate::output::{short_id, Output};

/// Client details given on `new`
#[derive(Debug, Default)]
pub struct ClientArgs {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Field changes requested by `edit`
#[derive(Debug, Default)]
pub struct EditArgs {
    pub number: Option<String>,
    pub tax: Option<String>,
    pub template: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub logo_url: Option<String>,
    pub client: Vec<String>,
    pub company: Vec<String>,
}

impl EditArgs {
    fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.tax.is_none()
            && self.template.is_none()
            && self.issue_date.is_none()
            && self.due_date.is_none()
            && self.logo_url.is_none()
            && self.client.is_empty()
            && self.company.is_empty()
    }
}

/// Create and save a new draft
pub fn create(
    store: &Store,
    kind: String,
    client: ClientArgs,
    due_date: Option<String>,
    output: &Output,
) -> Result<()> {
    let kind: DocumentType = kind.parse()?;
    let mut doc = store.new_draft(kind);

    for (field, value) in [
        (ClientField::Name, client.name),
        (ClientField::Phone, client.phone),
        (ClientField::Address, client.address),
    ] {
        if let Some(value) = value {
            doc.update_client_field(field, value);
        }
    }
    if let Some(ref due) = due_date {
        doc.set_due_date(parse_date_arg(due)?);
    }

    store.save_draft(&doc)?;

    output.success(&format!("Created {}: {}", doc.label(), doc.number()));
    output.print_draft(&doc);

    Ok(())
}

/// List all drafts
pub fn list(store: &Store, output: &Output) -> Result<()> {
    output.print_drafts(&store.all_drafts());
    Ok(())
}

/// Show a single draft
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let doc = load(store, &id)?;
    output.print_draft(&doc);
    Ok(())
}

/// Delete a draft
pub fn delete(store: &Store, id: String, output: &Output) -> Result<()> {
    let doc = load(store, &id)?;

    // Confirm deletion
    if output.should_prompt() {
        println!(
            "Delete {}: {} - {}",
            doc.label().to_lowercase(),
            short_id(&doc.id().to_string()),
            doc.number()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete_draft(doc.id())?;

    output.success(&format!("Deleted {}: {}", doc.label().to_lowercase(), doc.number()));

    Ok(())
}

/// Start a fresh draft of the same type; the original stays as it is
pub fn clear(store: &Store, id: String, output: &Output) -> Result<()> {
    let doc = load(store, &id)?;
    let fresh = doc.cleared(&store.settings());

    store.save_draft(&fresh)?;

    output.success(&format!("Started new {}: {}", fresh.label(), fresh.number()));
    output.print_draft(&fresh);

    Ok(())
}

/// Apply field updates to a draft and save it
///
/// With no field flags on an interactive terminal, prompts for the common
/// fields instead. A full ID that no longer resolves starts a fresh invoice.
pub fn edit(store: &Store, id: String, args: EditArgs, output: &Output) -> Result<()> {
    let draft_id = parse_draft_id(&id, store)?;
    let mut doc = match store.get_draft(&draft_id) {
        Some(doc) => doc,
        None => {
            output.warn(&format!("Draft {} not found, starting a new invoice", id));
            store.open_draft_for_edit(&draft_id)
        }
    };

    if args.is_empty() {
        if !(output.should_prompt() && is_interactive()) {
            bail!("Nothing to change. Pass at least one field flag.");
        }
        edit_interactive(&mut doc, output)?;
    } else {
        apply_edits(&mut doc, args, output)?;
    }

    store.save_draft(&doc)?;

    output.success(&format!("{} updated", doc.label()));
    output.print_draft(&doc);

    Ok(())
}

fn apply_edits(doc: &mut Document, args: EditArgs, output: &Output) -> Result<()> {
    if let Some(number) = args.number {
        doc.set_document_number(number);
    }
    if let Some(ref tax) = args.tax {
        doc.set_tax_rate(parse_amount_arg("tax", tax, output));
    }
    if let Some(ref template) = args.template {
        doc.set_template(template.parse::<Template>()?);
    }
    if let Some(ref date) = args.issue_date {
        doc.set_issue_date(parse_date_arg(date)?);
    }
    if let Some(ref date) = args.due_date {
        doc.set_due_date(parse_date_arg(date)?);
    }
    if let Some(url) = args.logo_url {
        doc.set_logo_url(url);
    }
    for arg in &args.client {
        let (field, value) = parse_assignment(arg)?;
        let field: ClientField = field.parse()?;
        doc.update_client_field(field, value);
    }
    for arg in &args.company {
        let (field, value) = parse_assignment(arg)?;
        let field: CompanyField = field.parse()?;
        doc.update_company_field(field, value);
    }
    Ok(())
}

fn edit_interactive(doc: &mut Document, output: &Output) -> Result<()> {
    println!("Editing {} {}", doc.label().to_lowercase(), doc.number());
    println!("Press Enter to keep current value, or type new value.\n");

    if let Some(number) = prompt_with_default("Number", doc.number())? {
        doc.set_document_number(number);
    }

    let client_name = doc.client().name.clone();
    if let Some(name) = prompt_with_default("Client name", &client_name)? {
        doc.update_client_field(ClientField::Name, name);
    }

    if let Some(tax) = prompt_with_default("Tax rate (%)", &doc.tax_rate().to_string())? {
        doc.set_tax_rate(parse_amount_arg("tax", &tax, output));
    }

    let due = doc
        .due_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    if let Some(date) = prompt_with_default("Due date (YYYY-MM-DD or none)", &due)? {
        doc.set_due_date(parse_date_arg(&date)?);
    }

    Ok(())
}

/// Resolve an ID argument and load the draft
pub(crate) fn load(store: &Store, id: &str) -> Result<Document> {
    let draft_id = parse_draft_id(id, store)?;
    store
        .get_draft(&draft_id)
        .with_context(|| format!("Draft not found: {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use draftbook_core::{CompanySettings, Config};
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet, "$")
    }

    fn test_store(temp_dir: &TempDir) -> Store {
        Store::open_with_config(Config {
            data_dir: temp_dir.path().to_path_buf(),
            log_file: None,
            currency_symbol: "$".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_create_saves_draft_with_client() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let client = ClientArgs {
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        };
        create(
            &store,
            "quote".to_string(),
            client,
            Some("2024-05-01".to_string()),
            &quiet(),
        )
        .unwrap();

        let drafts = store.all_drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind(), DocumentType::Quotation);
        assert_eq!(drafts[0].client().name, "Jane Doe");
        assert_eq!(
            drafts[0].due_date(),
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn test_create_rejects_unknown_type() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        assert!(create(
            &store,
            "receipt".to_string(),
            ClientArgs::default(),
            None,
            &quiet()
        )
        .is_err());
        assert_eq!(store.draft_count(), 0);
    }

    #[test]
    fn test_apply_edits() {
        let mut doc = Document::new(DocumentType::Invoice, &CompanySettings::default());
        let args = EditArgs {
            number: Some("INV-2024-001".to_string()),
            tax: Some("7.5".to_string()),
            template: Some("modern".to_string()),
            client: vec!["name=Jane Doe".to_string(), "phone=555-0100".to_string()],
            company: vec!["email=billing@acme.test".to_string()],
            ..Default::default()
        };

        apply_edits(&mut doc, args, &quiet()).unwrap();

        assert_eq!(doc.number(), "INV-2024-001");
        assert_eq!(doc.tax_rate(), 7.5);
        assert_eq!(doc.template(), Template::Modern);
        assert_eq!(doc.client().name, "Jane Doe");
        assert_eq!(doc.client().phone, "555-0100");
        assert_eq!(doc.company().email, "billing@acme.test");
    }

    #[test]
    fn test_apply_edits_rejects_unknown_field() {
        let mut doc = Document::new(DocumentType::Invoice, &CompanySettings::default());
        let args = EditArgs {
            client: vec!["email=jane@example.com".to_string()],
            ..Default::default()
        };
        assert!(apply_edits(&mut doc, args, &quiet()).is_err());
    }

    #[test]
    fn test_edit_without_flags_in_quiet_mode_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = store.new_draft(DocumentType::Invoice);
        store.save_draft(&doc).unwrap();

        assert!(edit(&store, doc.id().to_string(), EditArgs::default(), &quiet()).is_err());
    }

    #[test]
    fn test_edit_missing_draft_starts_invoice() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let args = EditArgs {
            tax: Some("5".to_string()),
            ..Default::default()
        };

        edit(&store, uuid::Uuid::new_v4().to_string(), args, &quiet()).unwrap();

        let drafts = store.all_drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].kind(), DocumentType::Invoice);
        assert_eq!(drafts[0].tax_rate(), 5.0);
    }

    #[test]
    fn test_edit_unknown_prefix_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let args = EditArgs {
            tax: Some("5".to_string()),
            ..Default::default()
        };

        assert!(edit(&store, "ffff".to_string(), args, &quiet()).is_err());
        assert_eq!(store.draft_count(), 0);
    }

    #[test]
    fn test_clear_keeps_original() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        let mut doc = store.new_draft(DocumentType::Quotation);
        doc.set_tax_rate(5.0);
        store.save_draft(&doc).unwrap();

        clear(&store, doc.id().to_string(), &quiet()).unwrap();

        let drafts = store.all_drafts();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0], doc);
        assert_eq!(drafts[1].kind(), DocumentType::Quotation);
        assert_ne!(drafts[1].id(), doc.id());
        assert_eq!(drafts[1].tax_rate(), 0.0);
    }

    #[test]
    fn test_delete_in_quiet_mode_skips_prompt() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = store.new_draft(DocumentType::Invoice);
        store.save_draft(&doc).unwrap();

        let prefix = doc.id().to_string()[..8].to_string();
        delete(&store, prefix, &quiet()).unwrap();

        assert_eq!(store.draft_count(), 0);
    }
}
