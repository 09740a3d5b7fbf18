//! Line item command handlers

use anyhow::{bail, Result};

use draftbook_core::{LineItemUpdate, Store};

use super::draft::load;
use super::{parse_amount_arg, parse_item_id};
use crate::output::{short_id, Output};

/// Item fields given on the command line
#[derive(Debug, Default)]
pub struct ItemArgs {
    pub description: Option<String>,
    pub quantity: Option<String>,
    pub rate: Option<String>,
}

impl ItemArgs {
    fn into_update(self, output: &Output) -> LineItemUpdate {
        LineItemUpdate {
            description: self.description,
            quantity: self
                .quantity
                .map(|q| parse_amount_arg("quantity", &q, output)),
            rate: self.rate.map(|r| parse_amount_arg("rate", &r, output)),
        }
    }
}

/// Append a line item to a draft
pub fn add(store: &Store, id: String, args: ItemArgs, output: &Output) -> Result<()> {
    let mut doc = load(store, &id)?;

    let item_id = doc.add_line_item();
    let update = args.into_update(output);
    if !update.is_empty() {
        doc.update_line_item(&item_id, update);
    }

    store.save_draft(&doc)?;

    output.success(&format!(
        "Added item {} to {}",
        short_id(&item_id.to_string()),
        doc.number()
    ));
    output.print_draft(&doc);

    Ok(())
}

/// Change fields of a line item
pub fn update(
    store: &Store,
    id: String,
    item_id: String,
    args: ItemArgs,
    output: &Output,
) -> Result<()> {
    let mut doc = load(store, &id)?;
    let target = parse_item_id(&item_id, &doc)?;

    let update = args.into_update(output);
    if update.is_empty() {
        bail!("Nothing to change. Pass --description, --quantity or --rate.");
    }
    if !doc.update_line_item(&target, update) {
        bail!("Item not found: {}", item_id);
    }

    store.save_draft(&doc)?;

    output.success("Item updated");
    output.print_draft(&doc);

    Ok(())
}

/// Remove a line item from a draft
pub fn remove(store: &Store, id: String, item_id: String, output: &Output) -> Result<()> {
    let mut doc = load(store, &id)?;
    let target = parse_item_id(&item_id, &doc)?;

    if doc.remove_line_item(&target).is_none() {
        bail!("Item not found: {}", item_id);
    }

    store.save_draft(&doc)?;

    output.success(&format!("Removed item {}", short_id(target.as_str())));
    output.print_draft(&doc);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use draftbook_core::{Config, DocumentType};
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
    fn test_add_update_remove_item() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = store.new_draft(DocumentType::Invoice);
        store.save_draft(&doc).unwrap();
        let id = doc.id().to_string();

        let args = ItemArgs {
            description: Some("Wiring".to_string()),
            quantity: Some("2".to_string()),
            rate: Some("50".to_string()),
        };
        add(&store, id.clone(), args, &quiet()).unwrap();

        let saved = store.get_draft(doc.id()).unwrap();
        assert_eq!(saved.items().len(), 2);
        assert_eq!(saved.subtotal(), 100.0);
        let added = saved.items()[1].id().to_string();

        let args = ItemArgs {
            rate: Some("75".to_string()),
            ..Default::default()
        };
        update(&store, id.clone(), added[..8].to_string(), args, &quiet()).unwrap();
        assert_eq!(store.get_draft(doc.id()).unwrap().subtotal(), 150.0);

        remove(&store, id, added, &quiet()).unwrap();
        let saved = store.get_draft(doc.id()).unwrap();
        assert_eq!(saved.items().len(), 1);
        assert_eq!(saved.total(), 0.0);
    }

    #[test]
    fn test_update_without_fields_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = store.new_draft(DocumentType::Invoice);
        store.save_draft(&doc).unwrap();

        let item = doc.items()[0].id().to_string();
        assert!(update(
            &store,
            doc.id().to_string(),
            item,
            ItemArgs::default(),
            &quiet()
        )
        .is_err());
    }

    #[test]
    fn test_remove_unknown_item_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);
        let doc = store.new_draft(DocumentType::Invoice);
        store.save_draft(&doc).unwrap();

        let missing = uuid::Uuid::new_v4().to_string();
        assert!(remove(&store, doc.id().to_string(), missing, &quiet()).is_err());
        assert_eq!(store.get_draft(doc.id()).unwrap().items().len(), 1);
    }
}
