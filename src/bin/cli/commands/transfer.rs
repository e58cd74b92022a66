use std::io;
use std::path::Path;

use anyhow::{anyhow, Result};

use flashdeck_lib::flashcards::transfer;

use crate::app::App;
use crate::OutputFormat;

const STDIO: &str = "-";

pub fn run_export(app: &App, deck_name: &str, path: &str, format: &OutputFormat) -> Result<()> {
    let deck_id = app.resolve_deck(deck_name)?;

    let written = if path == STDIO {
        transfer::export_deck(&app.store, deck_id, io::stdout().lock())?
    } else {
        transfer::export_deck_to_path(&app.store, deck_id, Path::new(path))?
    };
    log::info!("Exported deck {} to {}", deck_name, path);

    let status = format!("Exported {} cards to {}", written, path);
    report(&status, written, path == STDIO, format)
}

pub fn run_import(app: &mut App, deck_name: &str, path: &str, format: &OutputFormat) -> Result<()> {
    let deck_id = app.resolve_deck(deck_name)?;

    let result = if path == STDIO {
        transfer::import_cards(&mut app.store, deck_id, io::stdin().lock())
    } else {
        transfer::import_cards_from_path(&mut app.store, deck_id, Path::new(path))
    };

    let imported = match result {
        Ok(n) => n,
        Err(e) => {
            log::error!("Import failed from {}: {}", path, e);
            return Err(anyhow!("Import failed: {}", e));
        }
    };
    log::info!("Imported {} cards into deck {} from {}", imported, deck_name, path);

    let status = format!("Imported {} cards from {}", imported, path);
    report(&status, imported, false, format)
}

/// Print the status line; when stdout carries CSV it goes to stderr instead.
fn report(status: &str, count: usize, stdout_is_data: bool, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "count": count, "status": status });
            if stdout_is_data {
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        OutputFormat::Plain => {
            if stdout_is_data {
                eprintln!("{}", status);
            } else {
                println!("{}", status);
            }
        }
    }
    Ok(())
}
