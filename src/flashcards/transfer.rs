//! CSV import and export of a single deck
//!
//! Export always writes the header `question,answer` followed by one row per card.
//! Import looks columns up by header name, so column order and extra columns do
//! not matter.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::models::{CardContent, DeckId};
use super::storage::{FlashcardStorageError, FlashcardStore};

pub const QUESTION_HEADER: &str = "question";
pub const ANSWER_HEADER: &str = "answer";

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Could not parse CSV: {0}")]
    ImportParseFailure(csv::Error),

    #[error("Export failed: {0}")]
    ExportWrite(csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] FlashcardStorageError),
}

pub type Result<T> = std::result::Result<T, TransferError>;

/// Write every card of `deck_id` as CSV. Returns the number of cards written.
pub fn export_deck<W: Write>(store: &FlashcardStore, deck_id: DeckId, writer: W) -> Result<usize> {
    if !store.deck_exists(deck_id)? {
        return Err(FlashcardStorageError::DeckNotFound(deck_id).into());
    }
    let cards = store.list_card_contents(deck_id)?;

    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    csv_writer
        .write_record([QUESTION_HEADER, ANSWER_HEADER])
        .map_err(TransferError::ExportWrite)?;
    for card in &cards {
        csv_writer
            .write_record([card.question.as_str(), card.answer.as_str()])
            .map_err(TransferError::ExportWrite)?;
    }
    csv_writer.flush()?;

    Ok(cards.len())
}

/// Export a deck to `path`, replacing any existing file.
///
/// The CSV is rendered in memory, written to a `.tmp` sibling and renamed over
/// `path`, so a failed export leaves an existing file untouched.
pub fn export_deck_to_path(store: &FlashcardStore, deck_id: DeckId, path: &Path) -> Result<usize> {
    let mut buf = Vec::new();
    let written = export_deck(store, deck_id, &mut buf)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    fs::write(&tmp_path, &buf)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(written)
}

/// Parse CSV text into card contents.
///
/// Rows without a non-empty `question` and `answer` are skipped, as are rows that
/// are not valid UTF-8. An unreadable header or an I/O error fails the whole parse.
pub fn parse_cards<R: Read>(reader: R) -> Result<Vec<CardContent>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(TransferError::ImportParseFailure)?
        .clone();
    let question_col = header_position(&headers, QUESTION_HEADER);
    let answer_col = header_position(&headers, ANSWER_HEADER);

    let mut cards = Vec::new();
    for result in csv_reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => continue,
            Err(e) => return Err(TransferError::ImportParseFailure(e)),
        };

        let (Some(q), Some(a)) = (question_col, answer_col) else {
            continue;
        };
        match (record.get(q), record.get(a)) {
            (Some(question), Some(answer)) if !question.is_empty() && !answer.is_empty() => {
                cards.push(CardContent::new(question, answer));
            }
            _ => {}
        }
    }

    Ok(cards)
}

fn header_position(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}

/// Import CSV cards into `deck_id`. Returns the number of cards imported.
///
/// Nothing is written unless the whole input parses and the deck exists.
pub fn import_cards<R: Read>(store: &mut FlashcardStore, deck_id: DeckId, reader: R) -> Result<usize> {
    let cards = parse_cards(reader)?;
    let imported = store.add_cards(deck_id, &cards)?;
    Ok(imported)
}

/// Import cards from the CSV file at `path`.
pub fn import_cards_from_path(
    store: &mut FlashcardStore,
    deck_id: DeckId,
    path: &Path,
) -> Result<usize> {
    let file = File::open(path)?;
    import_cards(store, deck_id, BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::TempDir;

    fn store_with_deck(name: &str, cards: &[(&str, &str)]) -> (FlashcardStore, DeckId) {
        let mut store = FlashcardStore::open_in_memory().unwrap();
        let deck = store.create_deck(name).unwrap();
        for (q, a) in cards {
            store.add_card(deck, q, a).unwrap();
        }
        (store, deck)
    }

    fn sorted(mut cards: Vec<CardContent>) -> Vec<CardContent> {
        cards.sort();
        cards
    }

    /// Yields some bytes and then fails, like a disk read error mid-file.
    struct FailingReader {
        data: &'static [u8],
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "disk went away"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_spanish_scenario() {
        let (mut store, deck) = store_with_deck("Spanish", &[("hola", "hello"), ("adiós", "goodbye")]);

        let mut out = Vec::new();
        let written = export_deck(&store, deck, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(written, 2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["question,answer", "hola,hello", "adiós,goodbye"]);

        store.delete_deck("Spanish").unwrap();
        assert!(!store.list_deck_names().unwrap().contains(&"Spanish".to_string()));
    }

    #[test]
    fn test_export_empty_deck_writes_header() {
        let (store, deck) = store_with_deck("Empty", &[]);

        let mut out = Vec::new();
        assert_eq!(export_deck(&store, deck, &mut out).unwrap(), 0);
        assert_eq!(String::from_utf8(out).unwrap().trim_end(), "question,answer");
    }

    #[test]
    fn test_export_missing_deck() {
        let store = FlashcardStore::open_in_memory().unwrap();

        let err = export_deck(&store, DeckId(7), Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            TransferError::Store(FlashcardStorageError::DeckNotFound(DeckId(7)))
        ));
    }

    #[test]
    fn test_export_quotes_special_fields() {
        let (store, deck) = store_with_deck(
            "Tricky",
            &[("a, b", "say \"hi\""), ("line\nbreak", "plain")],
        );

        let mut out = Vec::new();
        export_deck(&store, deck, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("\"a, b\",\"say \"\"hi\"\"\""));
        assert!(text.contains("\"line\nbreak\",plain"));
    }

    #[test]
    fn test_round_trip_preserves_cards() {
        let original = [
            ("hola", "hello"),
            ("a, b", "say \"hi\""),
            ("multi\nline", "answer\r\nwith crlf"),
            ("hola", "hello"),
        ];
        let (mut store, source) = store_with_deck("Source", &original);
        let target = store.create_deck("Target").unwrap();

        let mut buf = Vec::new();
        export_deck(&store, source, &mut buf).unwrap();
        let imported = import_cards(&mut store, target, buf.as_slice()).unwrap();

        assert_eq!(imported, original.len());
        assert_eq!(
            sorted(store.list_card_contents(target).unwrap()),
            sorted(store.list_card_contents(source).unwrap())
        );
    }

    #[test]
    fn test_import_reordered_and_extra_columns() {
        let (mut store, deck) = store_with_deck("Spanish", &[]);
        let input = "tag,answer,notes,question\nx,hello,n1,hola\ny,goodbye,n2,adiós\n";

        let imported = import_cards(&mut store, deck, input.as_bytes()).unwrap();

        assert_eq!(imported, 2);
        assert_eq!(
            store.list_card_contents(deck).unwrap(),
            vec![
                CardContent::new("hola", "hello"),
                CardContent::new("adiós", "goodbye")
            ]
        );
    }

    #[test]
    fn test_import_skips_incomplete_rows() {
        let (mut store, deck) = store_with_deck("Spanish", &[]);
        let input = "question,answer\nhola,hello\nsolo\n,empty question\ngracias,\nadiós,goodbye\n";

        let imported = import_cards(&mut store, deck, input.as_bytes()).unwrap();

        assert_eq!(imported, 2);
        assert_eq!(store.count_cards(deck).unwrap(), 2);
    }

    #[test]
    fn test_import_without_answer_column_imports_nothing() {
        let (mut store, deck) = store_with_deck("Spanish", &[]);
        let input = "question,notes\nhola,hello\n";

        assert_eq!(import_cards(&mut store, deck, input.as_bytes()).unwrap(), 0);
    }

    #[test]
    fn test_import_empty_input() {
        let (mut store, deck) = store_with_deck("Spanish", &[]);

        assert_eq!(import_cards(&mut store, deck, io::empty()).unwrap(), 0);
        assert_eq!(store.count_cards(deck).unwrap(), 0);
    }

    #[test]
    fn test_import_header_with_bom() {
        let cards = parse_cards("\u{feff}question,answer\nhola,hello\n".as_bytes()).unwrap();
        assert_eq!(cards, vec![CardContent::new("hola", "hello")]);
    }

    #[test]
    fn test_import_skips_invalid_utf8_row() {
        let mut input = b"question,answer\nhola,hello\n".to_vec();
        input.extend_from_slice(b"bad,\xff\xfe\n");
        input.extend_from_slice(b"adios,goodbye\n");

        let cards = parse_cards(input.as_slice()).unwrap();
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn test_import_aborts_on_read_failure() {
        let (mut store, deck) = store_with_deck("Spanish", &[]);
        let reader = FailingReader {
            data: b"question,answer\nhola,hello\nadios,goodbye\n",
        };

        let result = import_cards(&mut store, deck, reader);

        assert!(matches!(result, Err(TransferError::ImportParseFailure(_))));
        assert_eq!(store.count_cards(deck).unwrap(), 0);
    }

    #[test]
    fn test_import_aborts_on_unreadable_header() {
        let (mut store, deck) = store_with_deck("Spanish", &[]);
        let input: &[u8] = b"qu\xffestion,answer\nhola,hello\n";

        assert!(import_cards(&mut store, deck, input).is_err());
        assert_eq!(store.count_cards(deck).unwrap(), 0);
    }

    #[test]
    fn test_import_into_missing_deck() {
        let mut store = FlashcardStore::open_in_memory().unwrap();

        let err = import_cards(&mut store, DeckId(1), "question,answer\nq,a\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            TransferError::Store(FlashcardStorageError::ForeignKeyViolation(_))
        ));
    }

    #[test]
    fn test_failed_export_keeps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("keep.csv");
        fs::write(&path, "question,answer\nprecious,data\n").unwrap();
        let store = FlashcardStore::open_in_memory().unwrap();

        let err = export_deck_to_path(&store, DeckId(42), &path).unwrap_err();

        assert!(matches!(
            err,
            TransferError::Store(FlashcardStorageError::DeckNotFound(DeckId(42)))
        ));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "question,answer\nprecious,data\n"
        );
        assert!(!temp_dir.path().join("keep.csv.tmp").exists());
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("spanish.csv");
        fs::write(&path, "stale contents that are longer than the export\n").unwrap();
        let (store, deck) = store_with_deck("Spanish", &[("hola", "hello")]);

        assert_eq!(export_deck_to_path(&store, deck, &path).unwrap(), 1);

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["question,answer", "hola,hello"]);
        assert!(!temp_dir.path().join("spanish.csv.tmp").exists());
    }

    #[test]
    fn test_parse_failure_message_has_no_status_prefix() {
        let err = parse_cards(&b"qu\xffestion,answer\n"[..]).unwrap_err();

        assert!(matches!(err, TransferError::ImportParseFailure(_)));
        let message = err.to_string();
        assert!(message.starts_with("Could not parse CSV"));
        assert!(!message.contains("Import failed"));
    }

    #[test]
    fn test_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("spanish.csv");
        let (mut store, deck) = store_with_deck("Spanish", &[("hola", "hello"), ("adiós", "goodbye")]);

        assert_eq!(export_deck_to_path(&store, deck, &path).unwrap(), 2);

        let copy = store.create_deck("Spanish copy").unwrap();
        assert_eq!(import_cards_from_path(&mut store, copy, &path).unwrap(), 2);
        assert_eq!(
            store.list_card_contents(copy).unwrap(),
            store.list_card_contents(deck).unwrap()
        );

        let missing = temp_dir.path().join("missing.csv");
        assert!(matches!(
            import_cards_from_path(&mut store, copy, &missing),
            Err(TransferError::Io(_))
        ));
    }
}
