use crate::errors::AppError;
use crate::store::{self, VocabEntry, VocabStore};
use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::instrument;

/// One line of the word list. Columns other than these two are ignored.
#[derive(Debug, Deserialize)]
struct ImportRow {
    #[serde(rename = "Word")]
    word: String,
    #[serde(rename = "Definition")]
    definition: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub new_entries: u64,
    pub errors: u64,
    pub total: i64,
}

impl ImportSummary {
    /// The record appended to the summary log after every import.
    pub fn log_record(&self, at: DateTime<Local>) -> String {
        format!(
            "Update Date: {}\nTotal Words: {}\nNew Words Added: {}\nErrors: {}\n\n",
            at.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.total,
            self.new_entries,
            self.errors
        )
    }
}

/// Adds every pair from the csv at `source` that the store does not already
/// hold. A bad row is counted and skipped; only an unreadable source file or a
/// failed commit aborts the batch.
#[instrument(name = "updating vocabulary database", skip(store))]
pub async fn import_words(
    store: &VocabStore,
    source: &Path,
    summary_log: &Path,
) -> Result<ImportSummary, AppError> {
    let file = File::open(source)?;
    // Surplus fields (an unquoted comma in a definition) are dropped; a row
    // shorter than the header still fails with a missing field.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut transaction = store.pool().begin().await?;
    let mut summary = ImportSummary::default();

    for (row_number, record) in reader.deserialize::<ImportRow>().enumerate() {
        let row_number = row_number + 1;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                summary.errors += 1;
                tracing::warn!(row_number, error = %e, "skipping unreadable row");
                continue;
            }
        };

        let entry = VocabEntry::new(&row.word, &row.definition);
        match insert_if_new(&mut transaction, &entry).await {
            Ok(true) => summary.new_entries += 1,
            Ok(false) => {}
            Err(e) => {
                summary.errors += 1;
                tracing::warn!(
                    row_number,
                    word = %entry.word,
                    error = %e,
                    "error storing row"
                );
            }
        }
    }

    transaction.commit().await?;
    summary.total = store.count().await?;

    tracing::info!(
        new_entries = summary.new_entries,
        errors = summary.errors,
        total = summary.total,
        "database update completed"
    );

    append_summary(summary_log, &summary.log_record(Local::now()))?;
    Ok(summary)
}

async fn insert_if_new(
    transaction: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    entry: &VocabEntry,
) -> Result<bool, AppError> {
    if store::contains(&mut **transaction, entry).await? {
        return Ok(false);
    }
    store::insert(&mut **transaction, entry).await?;
    Ok(true)
}

fn append_summary(path: &Path, record: &str) -> Result<(), AppError> {
    let mut log = OpenOptions::new().create(true).append(true).open(path)?;
    log.write_all(record.as_bytes())?;
    Ok(())
}
