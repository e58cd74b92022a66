use anyhow::{bail, Result};

use flashdeck_lib::FlashcardStorageError;

use crate::app::App;
use crate::OutputFormat;

pub fn run_create(app: &mut App, name: &str, format: &OutputFormat) -> Result<()> {
    if name.is_empty() {
        bail!("Deck name must not be empty.");
    }

    let id = match app.store.create_deck(name) {
        Ok(id) => id,
        Err(FlashcardStorageError::DuplicateName(_)) => {
            log::warn!("Deck creation failed: '{}' already exists.", name);
            bail!("Deck name must be unique.");
        }
        Err(e) => return Err(e.into()),
    };
    log::info!("Deck '{}' created.", name);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": id, "name": name });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deck '{}' created.", name),
    }

    Ok(())
}

pub fn run_delete(app: &mut App, name: &str, format: &OutputFormat) -> Result<()> {
    let deleted = app.store.delete_deck(name)?;
    if deleted {
        log::info!("Deck '{}' deleted.", name);
    } else {
        log::info!("Deck '{}' not found; nothing deleted.", name);
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "name": name, "deleted": deleted });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if deleted {
                println!("Deck '{}' deleted.", name);
            } else {
                println!("No deck named '{}'; nothing deleted.", name);
            }
        }
    }

    Ok(())
}

pub fn run_list(app: &App, format: &OutputFormat) -> Result<()> {
    let decks = app.store.list_decks()?;

    match format {
        OutputFormat::Json => {
            let mut output = Vec::new();
            for deck in &decks {
                output.push(serde_json::json!({
                    "id": deck.id,
                    "name": deck.name,
                    "cardCount": app.store.count_cards(deck.id)?,
                }));
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if decks.is_empty() {
                println!("No decks.");
                return Ok(());
            }
            for deck in &decks {
                let count = app.store.count_cards(deck.id)?;
                println!("{} ({} cards)", deck.name, count);
            }
        }
    }

    Ok(())
}
