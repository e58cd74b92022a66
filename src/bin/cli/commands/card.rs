use anyhow::{bail, Result};

use crate::app::{parse_card_id, App};
use crate::OutputFormat;

pub fn run_list(app: &App, deck_name: &str, format: &OutputFormat) -> Result<()> {
    let deck_id = app.resolve_deck(deck_name)?;
    let cards = app.store.list_cards(deck_id)?;
    log::info!("Deck selected: {}", deck_name);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards in deck '{}'.", deck_name);
                return Ok(());
            }
            for card in &cards {
                println!("{}: {}", card.id, card.question);
            }
        }
    }

    Ok(())
}

pub fn run_show(app: &App, raw_id: &str, format: &OutputFormat) -> Result<()> {
    let card = app.require_card(parse_card_id(raw_id)?)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("Q: {}", card.question);
            println!("A: {}", card.answer);
        }
    }

    Ok(())
}

pub fn run_add(
    app: &mut App,
    deck_name: &str,
    question: &str,
    answer: &str,
    format: &OutputFormat,
) -> Result<()> {
    if question.is_empty() || answer.is_empty() {
        bail!("Both a question and an answer are required.");
    }

    let deck_id = app.resolve_deck(deck_name)?;
    let card_id = app.store.add_card(deck_id, question, answer)?;
    log::info!("Card added to deck {}: {}", deck_id, question);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": card_id,
                "deckId": deck_id,
                "question": question,
                "answer": answer,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Card {} added to deck '{}'.", card_id, deck_name),
    }

    Ok(())
}

pub fn run_edit(
    app: &mut App,
    raw_id: &str,
    question: Option<String>,
    answer: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    if question.is_none() && answer.is_none() {
        bail!("Nothing to change: pass --question and/or --answer.");
    }

    let current = app.require_card(parse_card_id(raw_id)?)?;
    let question = question.unwrap_or(current.question);
    let answer = answer.unwrap_or(current.answer);
    if question.is_empty() || answer.is_empty() {
        bail!("Both a question and an answer are required.");
    }

    app.store.update_card(current.id, &question, &answer)?;
    log::info!("Card {} updated.", current.id);

    match format {
        OutputFormat::Json => {
            let card = app.require_card(current.id)?;
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => println!("Card {} updated.", current.id),
    }

    Ok(())
}

pub fn run_delete(app: &mut App, raw_id: &str, format: &OutputFormat) -> Result<()> {
    let card_id = parse_card_id(raw_id)?;
    let deleted = app.store.delete_card(card_id)?;
    if deleted {
        log::info!("Card {} deleted.", card_id);
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "id": card_id, "deleted": deleted });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if deleted {
                println!("Card {} deleted.", card_id);
            } else {
                println!("Card {} not found; nothing deleted.", card_id);
            }
        }
    }

    Ok(())
}
