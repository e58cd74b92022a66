mod app;
mod commands;
mod logging;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use flashdeck_lib::AppConfig;

#[derive(Parser)]
#[command(name = "flashdeck", about = "Manage flashcard decks from the terminal", version)]
struct Cli {
    /// Use a specific database file (default: from config, then the data directory)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create, delete and list decks
    #[command(subcommand)]
    Deck(DeckCommand),

    /// Add, edit, delete and list cards
    #[command(subcommand)]
    Card(CardCommand),

    /// Export a deck's cards as CSV
    Export {
        /// Deck name
        deck: String,
        /// Output file ("-" for stdout)
        path: String,
    },

    /// Import cards from CSV into a deck
    Import {
        /// Deck name
        deck: String,
        /// Input file ("-" for stdin)
        path: String,
    },

    /// Verify the database schema
    Check,
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Create a new deck
    Create {
        /// Deck name (must be unique)
        name: String,
    },

    /// Delete a deck and all of its cards
    Delete {
        /// Deck name
        name: String,
    },

    /// List all decks
    List,
}

#[derive(Subcommand)]
enum CardCommand {
    /// List the cards of a deck
    List {
        /// Deck name
        deck: String,
    },

    /// Show one card
    Show {
        /// Card id
        id: String,
    },

    /// Add a card to a deck
    Add {
        /// Deck name
        deck: String,
        question: String,
        answer: String,
    },

    /// Edit a card; omitted fields keep their current value
    Edit {
        /// Card id
        id: String,
        #[arg(long)]
        question: Option<String>,
        #[arg(long)]
        answer: Option<String>,
    },

    /// Delete a card
    Delete {
        /// Card id
        id: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("Failed to load configuration")?;

    logging::init(&config)?;
    log::info!("Application started.");

    let db_path = cli.database.unwrap_or_else(|| config.database_path.clone());
    let format = cli.format;

    match cli.command {
        // Inspects the file as it is; opening through App would create it.
        Command::Check => commands::check::run(&db_path, &format),
        Command::Deck(subcmd) => with_app(&db_path, |app| run_deck(app, subcmd, &format)),
        Command::Card(subcmd) => with_app(&db_path, |app| run_card(app, subcmd, &format)),
        Command::Export { deck, path } => with_app(&db_path, |app| {
            commands::transfer::run_export(app, &deck, &path, &format)
        }),
        Command::Import { deck, path } => with_app(&db_path, |app| {
            commands::transfer::run_import(app, &deck, &path, &format)
        }),
    }
}

/// Open the store, run one command against it, and close it again.
fn with_app(
    db_path: &Path,
    command: impl FnOnce(&mut app::App) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut app = app::App::open(db_path)?;
    let result = command(&mut app);
    finish(result, app.close())
}

/// A failing command keeps its own error even if closing the store also fails.
fn finish(result: anyhow::Result<()>, closed: anyhow::Result<()>) -> anyhow::Result<()> {
    match (result, closed) {
        (result, Ok(())) => {
            log::info!("Application closed.");
            result
        }
        (Err(e), Err(close_err)) => {
            log::error!("{:#}", close_err);
            Err(e)
        }
        (Ok(()), Err(close_err)) => {
            log::error!("{:#}", close_err);
            Err(close_err)
        }
    }
}

fn run_deck(app: &mut app::App, command: DeckCommand, format: &OutputFormat) -> anyhow::Result<()> {
    match command {
        DeckCommand::Create { name } => commands::deck::run_create(app, &name, format),
        DeckCommand::Delete { name } => commands::deck::run_delete(app, &name, format),
        DeckCommand::List => commands::deck::run_list(app, format),
    }
}

fn run_card(app: &mut app::App, command: CardCommand, format: &OutputFormat) -> anyhow::Result<()> {
    match command {
        CardCommand::List { deck } => commands::card::run_list(app, &deck, format),
        CardCommand::Show { id } => commands::card::run_show(app, &id, format),
        CardCommand::Add { deck, question, answer } => {
            commands::card::run_add(app, &deck, &question, &answer, format)
        }
        CardCommand::Edit { id, question, answer } => {
            commands::card::run_edit(app, &id, question, answer, format)
        }
        CardCommand::Delete { id } => commands::card::run_delete(app, &id, format),
    }
}
