//! Core of flashdeck: a local flashcard store plus CSV import/export.
//!
//! The library never logs and never talks to the user; the `flashdeck` binary
//! layers status output and logging on top of these return values.

pub mod config;
pub mod flashcards;

pub use config::AppConfig;
pub use flashcards::{FlashcardStorageError, FlashcardStore, TransferError};
