//! Draftbook CLI
//!
//! Command-line interface for Draftbook - invoice and quotation drafts.

use std::fs::File;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use draftbook_core::{Config, StorageError, Store};

mod commands;
mod editor;
mod output;

use commands::draft::{ClientArgs, EditArgs};
use commands::item::ItemArgs;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "draftbook")]
#[command(about = "Draftbook - Local invoice and quotation drafts")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new draft
    New {
        /// Document type (invoice or quotation)
        kind: String,
        /// Client name
        #[arg(long)]
        client_name: Option<String>,
        /// Client phone
        #[arg(long)]
        client_phone: Option<String>,
        /// Client address
        #[arg(long)]
        client_address: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due_date: Option<String>,
    },
    /// List all drafts
    #[command(alias = "ls")]
    List,
    /// Show draft details
    Show {
        /// Draft ID (full UUID or prefix)
        id: String,
    },
    /// Delete a draft
    #[command(alias = "rm")]
    Delete {
        /// Draft ID (full UUID or prefix)
        id: String,
    },
    /// Start a fresh draft of the same type (the original is kept)
    Clear {
        /// Draft ID (full UUID or prefix)
        id: String,
    },
    /// Edit draft fields
    Edit {
        /// Draft ID (full UUID or prefix)
        id: String,
        /// Document number
        #[arg(long)]
        number: Option<String>,
        /// Tax rate in percent
        #[arg(long, allow_hyphen_values = true)]
        tax: Option<String>,
        /// Template (classic, modern, professional, ginyard, vss, cvs)
        #[arg(long)]
        template: Option<String>,
        /// Issue date (YYYY-MM-DD, or "none")
        #[arg(long)]
        issue_date: Option<String>,
        /// Due date (YYYY-MM-DD, or "none")
        #[arg(long)]
        due_date: Option<String>,
        /// Logo URL
        #[arg(long)]
        logo_url: Option<String>,
        /// Client field, e.g. --client name="Jane Doe"
        #[arg(long, value_name = "FIELD=VALUE")]
        client: Vec<String>,
        /// Company field, e.g. --company email=billing@example.com
        #[arg(long, value_name = "FIELD=VALUE")]
        company: Vec<String>,
    },
    /// Manage line items on a draft
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Show or set company branding defaults
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage location, sizes and draft counts
    Status,
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Add a line item
    Add {
        /// Draft ID (full UUID or prefix)
        id: String,
        #[command(flatten)]
        fields: ItemFields,
    },
    /// Update a line item
    Update {
        /// Draft ID (full UUID or prefix)
        id: String,
        /// Item ID (full UUID or prefix)
        item_id: String,
        #[command(flatten)]
        fields: ItemFields,
    },
    /// Remove a line item
    #[command(alias = "rm")]
    Remove {
        /// Draft ID (full UUID or prefix)
        id: String,
        /// Item ID (full UUID or prefix)
        item_id: String,
    },
}

#[derive(clap::Args)]
struct ItemFields {
    /// Item description
    #[arg(short, long)]
    description: Option<String>,
    /// Quantity
    #[arg(long, allow_hyphen_values = true)]
    quantity: Option<String>,
    /// Unit rate
    #[arg(long, allow_hyphen_values = true)]
    rate: Option<String>,
}

impl From<ItemFields> for ItemArgs {
    fn from(fields: ItemFields) -> Self {
        ItemArgs {
            description: fields.description,
            quantity: fields.quantity,
            rate: fields.rate,
        }
    }
}

#[derive(Subcommand, Clone)]
enum SettingsCommands {
    /// Show branding settings
    Show,
    /// Set a branding field
    Set {
        /// Field (name, email, phone, address, website, logo_url, default_template, theme_color)
        key: String,
        /// Value
        value: String,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, log_file, currency_symbol)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = OutputFormat::from_flags(cli.json, cli.quiet);

    let result = run(cli, format);

    if let Err(ref e) = result {
        let hint = e
            .chain()
            .find_map(|cause| cause.downcast_ref::<StorageError>())
            .and_then(StorageError::recovery_suggestion);
        if let Some(hint) = hint {
            eprintln!("hint: {}", hint);
        }
    }

    result
}

fn run(cli: Cli, format: OutputFormat) -> Result<()> {
    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        let output = Output::new(format, Config::default().currency_symbol);
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())?;
    init_logging(&config);

    let output = Output::new(format, config.currency_symbol.clone());
    let store = Store::open_with_config(config)?;

    match cli.command {
        Commands::New {
            kind,
            client_name,
            client_phone,
            client_address,
            due_date,
        } => {
            let client = ClientArgs {
                name: client_name,
                phone: client_phone,
                address: client_address,
            };
            commands::draft::create(&store, kind, client, due_date, &output)
        }
        Commands::List => commands::draft::list(&store, &output),
        Commands::Show { id } => commands::draft::show(&store, id, &output),
        Commands::Delete { id } => commands::draft::delete(&store, id, &output),
        Commands::Clear { id } => commands::draft::clear(&store, id, &output),
        Commands::Edit {
            id,
            number,
            tax,
            template,
            issue_date,
            due_date,
            logo_url,
            client,
            company,
        } => {
            let args = EditArgs {
                number,
                tax,
                template,
                issue_date,
                due_date,
                logo_url,
                client,
                company,
            };
            commands::draft::edit(&store, id, args, &output)
        }
        Commands::Item { command } => handle_item_command(command, &store, &output),
        Commands::Settings { command } => handle_settings_command(command, &store, &output),
        Commands::Status => commands::status::show(&store, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_item_command(command: ItemCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        ItemCommands::Add { id, fields } => commands::item::add(store, id, fields.into(), output),
        ItemCommands::Update {
            id,
            item_id,
            fields,
        } => commands::item::update(store, id, item_id, fields.into(), output),
        ItemCommands::Remove { id, item_id } => commands::item::remove(store, id, item_id, output),
    }
}

fn handle_settings_command(
    command: Option<SettingsCommands>,
    store: &Store,
    output: &Output,
) -> Result<()> {
    match command {
        Some(SettingsCommands::Show) | None => commands::settings::show(store, output),
        Some(SettingsCommands::Set { key, value }) => {
            commands::settings::set(store, key, value, output)
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Install a tracing subscriber when DRAFTBOOK_LOG is set
///
/// Logs go to the configured log file, or stderr when none is set.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("DRAFTBOOK_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "draftbook_core={},draftbook_cli={}",
        log_level, log_level
    ));

    match &config.log_file {
        Some(log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };

            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(log_file)
                .try_init();

            info!("logging initialized to {:?}", log_path);
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
