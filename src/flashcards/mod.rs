//! Flashcard decks for flashdeck
//!
//! This module provides:
//! - Deck management (named, unique collections of cards)
//! - Card CRUD against a single SQLite file
//! - CSV import/export of a deck's cards

pub mod models;
pub mod storage;
pub mod transfer;

pub use models::*;
pub use storage::{FlashcardStorageError, FlashcardStore, StorageFailure};
pub use transfer::TransferError;
