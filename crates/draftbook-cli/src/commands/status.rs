//! Status command handler

use anyhow::Result;

use draftbook_core::{format_currency, DocumentType, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let stats = store.storage_stats()?;
    let config = store.config();
    let drafts = store.all_drafts();
    let settings = store.settings();
    let outstanding: f64 = drafts.iter().map(|d| d.total()).sum();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "storage": {
                        "drafts_exists": stats.drafts_exists,
                        "settings_exists": stats.settings_exists,
                        "drafts_size": stats.drafts_size,
                        "settings_size": stats.settings_size,
                        "total_size": stats.total_size()
                    },
                    "counts": {
                        "drafts": drafts.len(),
                        "invoices": drafts.iter().filter(|d| d.kind() == DocumentType::Invoice).count(),
                        "quotations": drafts.iter().filter(|d| d.kind() == DocumentType::Quotation).count()
                    },
                    "drafts_total": outstanding,
                    "company": settings.company.name
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", drafts.len());
        }
        OutputFormat::Human => {
            println!("Draftbook Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Size:     {}", stats.total_size_human());
            println!();
            println!("Contents:");
            println!("  Drafts:   {}", drafts.len());
            println!(
                "  Value:    {}",
                format_currency(outstanding, &config.currency_symbol)
            );
            println!();
            println!("Branding:");
            println!(
                "  Company:  {}",
                if settings.company.name.is_empty() {
                    "(not set)"
                } else {
                    settings.company.name.as_str()
                }
            );
            println!("  Template: {}", settings.default_template);
        }
    }

    Ok(())
}
