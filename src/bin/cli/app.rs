use std::path::Path;

use anyhow::{bail, Context, Result};

use flashdeck_lib::flashcards::{Card, CardId, DeckId, FlashcardStore};

/// Shared application state for CLI commands
pub struct App {
    pub store: FlashcardStore,
}

impl App {
    /// Open the store at `db_path`, creating the schema on first use
    pub fn open(db_path: &Path) -> Result<Self> {
        let store = FlashcardStore::open(db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;
        log::info!("Database ready at {}", db_path.display());
        Ok(Self { store })
    }

    pub fn close(&mut self) -> Result<()> {
        self.store.close().context("Failed to close database")
    }

    /// Resolve a deck name to its current id
    pub fn resolve_deck(&self, name: &str) -> Result<DeckId> {
        if let Some(id) = self.store.resolve_deck_id(name)? {
            return Ok(id);
        }

        let names = self.store.list_deck_names()?;
        if names.is_empty() {
            bail!("No deck named '{}'. There are no decks yet.", name);
        }
        bail!(
            "No deck named '{}'. Available decks:\n{}",
            name,
            names.iter().map(|n| format!("  - {}", n)).collect::<Vec<_>>().join("\n")
        )
    }

    /// Fetch a card that the user expects to exist
    pub fn require_card(&self, id: CardId) -> Result<Card> {
        self.store
            .get_card(id)?
            .with_context(|| format!("Card {} not found", id))
    }
}

/// Parse a card id from a command-line argument
pub fn parse_card_id(raw: &str) -> Result<CardId> {
    raw.parse()
        .with_context(|| format!("Invalid card id '{}'", raw))
}
