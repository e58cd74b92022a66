use std::path::Path;

use anyhow::{bail, Context, Result};

use flashdeck_lib::FlashcardStore;

use crate::OutputFormat;

const REQUIRED_TABLES: [&str; 2] = ["decks", "cards"];

/// Tables found in an existing database file, and the required ones it lacks.
struct SchemaReport {
    tables: Vec<String>,
    missing: Vec<&'static str>,
}

/// Read the schema without creating the file or any table.
fn inspect(db_path: &Path) -> Result<SchemaReport> {
    if !db_path.exists() {
        bail!("No database at {}", db_path.display());
    }

    let mut store = FlashcardStore::open_existing(db_path)
        .with_context(|| format!("Could not read database at {}", db_path.display()))?;
    let tables = store.table_names();
    if let Err(e) = store.close() {
        log::warn!("Failed to close {}: {}", db_path.display(), e);
    }
    let tables = tables?;

    let missing = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|t| !tables.iter().any(|have| have.as_str() == *t))
        .collect();
    Ok(SchemaReport { tables, missing })
}

pub fn run(db_path: &Path, format: &OutputFormat) -> Result<()> {
    let report = inspect(db_path)?;
    let location = db_path.display().to_string();

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "database": location,
                "tables": report.tables,
                "missing": report.missing,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Database: {}", location);
            for table in REQUIRED_TABLES {
                let mark = if report.missing.contains(&table) { "missing" } else { "ok" };
                println!("  {}: {}", table, mark);
            }
        }
    }

    if !report.missing.is_empty() {
        bail!("Database is missing tables: {}", report.missing.join(", "));
    }
    Ok(())
}
