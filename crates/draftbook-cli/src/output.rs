//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use draftbook_core::{format_currency, CompanySettings, Document};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
    /// Symbol printed in front of amounts
    pub currency: String,
}

impl Output {
    pub fn new(format: OutputFormat, currency: impl Into<String>) -> Self {
        Self {
            format,
            currency: currency.into(),
        }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    fn money(&self, value: f64) -> String {
        format_currency(value, &self.currency)
    }

    /// Print a single draft with its items and totals
    pub fn print_draft(&self, doc: &Document) {
        match self.format {
            OutputFormat::Human => {
                println!("{} {}", doc.label(), doc.number());
                println!("ID:        {}", doc.id());
                println!("Issued:    {}", date_or_unset(doc.issue_date()));
                println!("Due:       {}", date_or_unset(doc.due_date()));
                println!("Template:  {}", doc.template());

                let company = doc.company();
                let from: Vec<&str> = [
                    &company.name,
                    &company.email,
                    &company.phone,
                    &company.address,
                    &company.website,
                ]
                .into_iter()
                .map(String::as_str)
                .filter(|s| !s.is_empty())
                .collect();
                if !from.is_empty() {
                    println!("From:      {}", from.join(" · "));
                }

                let client = doc.client();
                let to: Vec<&str> = [&client.name, &client.phone, &client.address]
                    .into_iter()
                    .map(String::as_str)
                    .filter(|s| !s.is_empty())
                    .collect();
                if !to.is_empty() {
                    println!("Bill to:   {}", to.join(" · "));
                }

                println!();
                println!("── Items ({}) ──", doc.items().len());
                for item in doc.items() {
                    let description = if item.description.is_empty() {
                        "(no description)"
                    } else {
                        item.description.as_str()
                    };
                    println!(
                        "{} | {} | {} x {} | {}",
                        short_id(&item.id().to_string()),
                        truncate(description, 35),
                        item.quantity,
                        self.money(item.rate),
                        self.money(item.line_total())
                    );
                }

                println!();
                println!("Subtotal:  {}", self.money(doc.subtotal()));
                println!("Tax ({}%): {}", doc.tax_rate(), self.money(doc.tax_amount()));
                println!("Total:     {}", self.money(doc.total()));
            }
            OutputFormat::Json => print_json(doc),
            OutputFormat::Quiet => {
                println!("{}", doc.id());
            }
        }
    }

    /// Print the draft dashboard
    pub fn print_drafts(&self, docs: &[Document]) {
        match self.format {
            OutputFormat::Human => {
                if docs.is_empty() {
                    println!("No drafts found.");
                    return;
                }
                for doc in docs {
                    let client = if doc.client().name.is_empty() {
                        "(no client)"
                    } else {
                        doc.client().name.as_str()
                    };
                    println!(
                        "{} | {} | {:<9} | {} | {}",
                        short_id(&doc.id().to_string()),
                        doc.number(),
                        doc.label(),
                        truncate(client, 30),
                        self.money(doc.total())
                    );
                }
                println!("\n{} draft(s)", docs.len());
            }
            OutputFormat::Json => print_json(docs),
            OutputFormat::Quiet => {
                for doc in docs {
                    println!("{}", doc.id());
                }
            }
        }
    }

    /// Print branding settings
    pub fn print_settings(&self, settings: &CompanySettings) {
        match self.format {
            OutputFormat::Human => {
                let company = &settings.company;
                println!("Company settings:");
                println!("  name:             {}", or_unset(&company.name));
                println!("  email:            {}", or_unset(&company.email));
                println!("  phone:            {}", or_unset(&company.phone));
                println!("  address:          {}", or_unset(&company.address));
                println!("  website:          {}", or_unset(&company.website));
                println!("  logo_url:         {}", or_unset(&truncate(&settings.logo_url, 50)));
                println!("  default_template: {}", settings.default_template);
                println!(
                    "  theme_color:      {}",
                    settings.theme_color.as_deref().unwrap_or("(not set)")
                );
            }
            OutputFormat::Json => print_json(settings),
            OutputFormat::Quiet => {
                println!("{}", settings.company.name);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a warning to stderr unless quiet
    pub fn warn(&self, message: &str) {
        if !self.is_quiet() {
            eprintln!("⚠ {}", message);
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON: {}", e),
    }
}

/// First eight characters of an ID
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn date_or_unset(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}

fn or_unset(s: &str) -> &str {
    if s.is_empty() {
        "(not set)"
    } else {
        s
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
