//! Branding settings command handlers

use anyhow::Result;

use draftbook_core::{SettingsField, Store};

use crate::output::Output;

/// Show the stored branding settings
pub fn show(store: &Store, output: &Output) -> Result<()> {
    output.print_settings(&store.settings());
    Ok(())
}

/// Set one branding field
///
/// Only affects drafts created afterwards.
pub fn set(store: &Store, key: String, value: String, output: &Output) -> Result<()> {
    let field: SettingsField = key.parse()?;

    let mut settings = store.settings();
    settings.update_field(field, &value)?;
    store.save_settings(&settings)?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
