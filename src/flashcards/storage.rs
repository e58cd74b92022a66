//! Storage operations for flashcards
//!
//! One SQLite file holds every deck and card:
//! ```text
//! decks(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL UNIQUE)
//! cards(id INTEGER PRIMARY KEY AUTOINCREMENT, deck_id -> decks(id) ON DELETE CASCADE,
//!       question TEXT NOT NULL, answer TEXT NOT NULL)
//! ```
//!
//! Every public operation runs as a single statement or a single transaction and
//! commits before returning.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use thiserror::Error;

use super::models::*;

/// Why the database file could not be opened, read or written
#[derive(Error, Debug)]
pub enum StorageFailure {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum FlashcardStorageError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageFailure),

    #[error("A deck named '{0}' already exists")]
    DuplicateName(String),

    #[error("Deck not found: {0}")]
    DeckNotFound(DeckId),

    #[error("Card not found: {0}")]
    CardNotFound(CardId),

    #[error("Deck {0} does not exist; card rejected")]
    ForeignKeyViolation(DeckId),

    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("Store is closed")]
    Closed,
}

impl FlashcardStorageError {
    /// True for both the deck and the card flavour of "no such row".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DeckNotFound(_) | Self::CardNotFound(_))
    }
}

impl From<rusqlite::Error> for FlashcardStorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageUnavailable(StorageFailure::Sqlite(err))
    }
}

impl From<std::io::Error> for FlashcardStorageError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageUnavailable(StorageFailure::Io(err))
    }
}

pub type Result<T> = std::result::Result<T, FlashcardStorageError>;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS decks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS cards (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        deck_id INTEGER NOT NULL,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
    );

    CREATE INDEX IF NOT EXISTS idx_cards_deck_id ON cards(deck_id);
"#;

/// Owner of the flashcard database connection.
///
/// Callers hold deck names and card ids only transiently and resolve them again
/// before each mutation; nothing here caches row ids across calls.
pub struct FlashcardStore {
    conn: Option<Connection>,
    db_path: Option<PathBuf>,
}

impl FlashcardStore {
    /// Open (or create) the database at `db_path` and make sure both tables exist.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::init(conn, Some(db_path))
    }

    /// Open an existing database read-only, without creating the file or the schema.
    ///
    /// Used to inspect a database as it is on disk.
    pub fn open_existing(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let conn = Connection::open_with_flags(&db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        // Reading the schema forces SQLite to validate the file.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))?;

        Ok(Self {
            conn: Some(conn),
            db_path: Some(db_path),
        })
    }

    /// Open a private in-memory database with the same schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, db_path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Some(conn),
            db_path,
        })
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(FlashcardStorageError::Closed)
    }

    fn conn_mut(&mut self) -> Result<&mut Connection> {
        self.conn.as_mut().ok_or(FlashcardStorageError::Closed)
    }

    /// Release the connection. Calling this again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, e)| FlashcardStorageError::from(e))?;
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Names of the user tables in the database, sorted.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    // ==================== Deck Operations ====================

    /// Create a new deck. Fails with `DuplicateName` if the name is taken.
    pub fn create_deck(&mut self, name: &str) -> Result<DeckId> {
        if name.is_empty() {
            return Err(FlashcardStorageError::EmptyField("name"));
        }

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO decks (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
            params![name],
        )?;
        if inserted == 0 {
            return Err(FlashcardStorageError::DuplicateName(name.to_string()));
        }

        Ok(DeckId(conn.last_insert_rowid()))
    }

    /// Delete a deck and all its cards.
    ///
    /// Returns `false` when no deck has that name; that is not an error.
    pub fn delete_deck(&mut self, name: &str) -> Result<bool> {
        let tx = self.conn_mut()?.transaction()?;

        let deck_id: Option<i64> = tx
            .query_row("SELECT id FROM decks WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(deck_id) = deck_id else {
            return Ok(false);
        };

        tx.execute("DELETE FROM cards WHERE deck_id = ?1", params![deck_id])?;
        tx.execute("DELETE FROM decks WHERE id = ?1", params![deck_id])?;

        tx.commit()?;
        Ok(true)
    }

    /// List deck names in creation order
    pub fn list_deck_names(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT name FROM decks ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// List decks with their ids in creation order
    pub fn list_decks(&self) -> Result<Vec<Deck>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM decks ORDER BY id")?;
        let decks = stmt
            .query_map([], |row| {
                Ok(Deck {
                    id: DeckId(row.get(0)?),
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(decks)
    }

    /// Look up the id of the deck called `name`.
    pub fn resolve_deck_id(&self, name: &str) -> Result<Option<DeckId>> {
        let id = self
            .conn()?
            .query_row("SELECT id FROM decks WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id.map(DeckId))
    }

    pub fn deck_exists(&self, deck_id: DeckId) -> Result<bool> {
        let found = self
            .conn()?
            .query_row(
                "SELECT 1 FROM decks WHERE id = ?1",
                params![deck_id.0],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ==================== Card Operations ====================

    /// List `(id, question)` for every card in a deck, oldest first.
    ///
    /// An unknown deck simply has no cards.
    pub fn list_cards(&self, deck_id: DeckId) -> Result<Vec<CardSummary>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, question FROM cards WHERE deck_id = ?1 ORDER BY id")?;
        let cards = stmt
            .query_map(params![deck_id.0], |row| {
                Ok(CardSummary {
                    id: CardId(row.get(0)?),
                    question: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    /// Question and answer of every card in a deck, in listing order.
    pub fn list_card_contents(&self, deck_id: DeckId) -> Result<Vec<CardContent>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT question, answer FROM cards WHERE deck_id = ?1 ORDER BY id")?;
        let cards = stmt
            .query_map(params![deck_id.0], |row| {
                Ok(CardContent {
                    question: row.get(0)?,
                    answer: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    pub fn count_cards(&self, deck_id: DeckId) -> Result<usize> {
        let count: i64 = self.conn()?.query_row(
            "SELECT COUNT(*) FROM cards WHERE deck_id = ?1",
            params![deck_id.0],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get a card, or `None` if it no longer exists
    pub fn get_card(&self, card_id: CardId) -> Result<Option<Card>> {
        let card = self
            .conn()?
            .query_row(
                "SELECT id, deck_id, question, answer FROM cards WHERE id = ?1",
                params![card_id.0],
                |row| {
                    Ok(Card {
                        id: CardId(row.get(0)?),
                        deck_id: DeckId(row.get(1)?),
                        question: row.get(2)?,
                        answer: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(card)
    }

    /// Add a card to an existing deck.
    ///
    /// Fails with `ForeignKeyViolation` if the deck is gone.
    pub fn add_card(&mut self, deck_id: DeckId, question: &str, answer: &str) -> Result<CardId> {
        validate_content(question, answer)?;

        let conn = self.conn()?;
        let inserted = conn.execute(
            "INSERT INTO cards (deck_id, question, answer)
             SELECT ?1, ?2, ?3 WHERE EXISTS (SELECT 1 FROM decks WHERE id = ?1)",
            params![deck_id.0, question, answer],
        )?;
        if inserted == 0 {
            return Err(FlashcardStorageError::ForeignKeyViolation(deck_id));
        }

        Ok(CardId(conn.last_insert_rowid()))
    }

    /// Add many cards to a deck in one transaction: all of them or none.
    pub fn add_cards(&mut self, deck_id: DeckId, cards: &[CardContent]) -> Result<usize> {
        for card in cards {
            validate_content(&card.question, &card.answer)?;
        }

        let tx = self.conn_mut()?.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM decks WHERE id = ?1",
                params![deck_id.0],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(FlashcardStorageError::ForeignKeyViolation(deck_id));
        }

        {
            let mut stmt =
                tx.prepare("INSERT INTO cards (deck_id, question, answer) VALUES (?1, ?2, ?3)")?;
            for card in cards {
                stmt.execute(params![deck_id.0, card.question, card.answer])?;
            }
        }

        tx.commit()?;
        Ok(cards.len())
    }

    /// Replace question and answer of a card; id and deck stay the same.
    pub fn update_card(&mut self, card_id: CardId, question: &str, answer: &str) -> Result<()> {
        validate_content(question, answer)?;

        let updated = self.conn()?.execute(
            "UPDATE cards SET question = ?1, answer = ?2 WHERE id = ?3",
            params![question, answer, card_id.0],
        )?;
        if updated == 0 {
            return Err(FlashcardStorageError::CardNotFound(card_id));
        }
        Ok(())
    }

    /// Delete a card. Returns `false` if it was already gone.
    pub fn delete_card(&mut self, card_id: CardId) -> Result<bool> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM cards WHERE id = ?1", params![card_id.0])?;
        Ok(deleted > 0)
    }
}

impl Drop for FlashcardStore {
    fn drop(&mut self) {
        // Errors on drop have nowhere to go; close() reports them.
        let _ = self.close();
    }
}

fn validate_content(question: &str, answer: &str) -> Result<()> {
    if question.is_empty() {
        return Err(FlashcardStorageError::EmptyField("question"));
    }
    if answer.is_empty() {
        return Err(FlashcardStorageError::EmptyField("answer"));
    }
    Ok(())
}
