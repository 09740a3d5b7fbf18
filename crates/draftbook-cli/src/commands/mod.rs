//! Command handlers and the argument parsing they share

pub mod config;
pub mod draft;
pub mod item;
pub mod settings;
pub mod status;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use draftbook_core::{parse_amount, Document, RecordId, Store};

use crate::output::Output;

/// Parse a draft ID (supports full UUID or prefix)
pub fn parse_draft_id(id: &str, store: &Store) -> Result<RecordId> {
    let candidates: Vec<(RecordId, String)> = store
        .all_drafts()
        .iter()
        .map(|d| (d.id().clone(), format!("{} {}", d.label(), d.number())))
        .collect();
    match_prefix(id, &candidates, "draft")
}

/// Parse a line item ID within a draft (supports full UUID or prefix)
pub fn parse_item_id(id: &str, doc: &Document) -> Result<RecordId> {
    let candidates: Vec<(RecordId, String)> = doc
        .items()
        .iter()
        .map(|item| (item.id().clone(), item.description.clone()))
        .collect();
    match_prefix(id, &candidates, "item")
}

/// Resolve `input` against `(id, label)` candidates
///
/// An exact id wins, then any well-formed UUID is taken as-is, otherwise
/// `input` must prefix exactly one candidate.
fn match_prefix(input: &str, candidates: &[(RecordId, String)], what: &str) -> Result<RecordId> {
    if let Some((id, _)) = candidates.iter().find(|(id, _)| id.as_str() == input) {
        return Ok(id.clone());
    }
    if Uuid::parse_str(input).is_ok() {
        return Ok(RecordId::from(input));
    }

    let prefix = input.trim().to_lowercase();
    if prefix.is_empty() {
        bail!("Empty {} ID", what);
    }

    let matches: Vec<_> = candidates
        .iter()
        .filter(|(id, _)| id.as_str().to_lowercase().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [] => bail!("No {} found matching: {}", what, input),
        [(id, _)] => Ok(id.clone()),
        _ => {
            let listing: Vec<String> = matches
                .iter()
                .map(|(id, label)| format!("  {} - {}", id, label))
                .collect();
            bail!(
                "Multiple {}s match '{}':\n{}\nPlease provide more characters.",
                what,
                input,
                listing.join("\n")
            );
        }
    }
}

/// Split a `field=value` argument
pub fn parse_assignment(arg: &str) -> Result<(&str, &str)> {
    arg.split_once('=')
        .map(|(field, value)| (field.trim(), value))
        .with_context(|| format!("Expected <field>=<value>, got '{}'", arg))
}

/// Parse a `YYYY-MM-DD` date; empty or `none` clears it
pub fn parse_date_arg(value: &str) -> Result<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD.", value))
}

/// Parse a numeric argument leniently, warning about negative values
pub fn parse_amount_arg(name: &str, value: &str, output: &Output) -> f64 {
    let amount = parse_amount(value);
    if amount < 0.0 {
        output.warn(&format!("{} is negative ({})", name, amount));
    } else if amount == 0.0 && !value.trim().is_empty() && value.trim().parse::<f64>().is_err() {
        output.warn(&format!("{} '{}' is not a number, using 0", name, value));
    }
    amount
}
