use crate::configuration::DatabaseSettings;
use crate::errors::AppError;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Executor, Sqlite, SqlitePool};

/// A (word, definition) pair. Both fields are stored trimmed; two entries are
/// the same vocabulary word when the trimmed pair matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VocabEntry {
    pub word: String,
    pub definition: String,
}

impl VocabEntry {
    pub fn new(word: &str, definition: &str) -> Self {
        Self {
            word: word.trim().to_string(),
            definition: definition.trim().to_string(),
        }
    }
}

/// A row of the `words` table. `id` is the insertion order.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredEntry {
    pub id: i64,
    pub word: String,
    pub definition: String,
}

impl StoredEntry {
    pub fn key(&self) -> VocabEntry {
        VocabEntry::new(&self.word, &self.definition)
    }
}

#[derive(Clone, Debug)]
pub struct VocabStore {
    pool: SqlitePool,
}

impl VocabStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if configured) the database file and applies migrations.
    pub async fn connect(conf: &DatabaseSettings) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(conf.connection_options())
            .await?;
        let store = Self::new(pool);
        store.migrate().await?;
        tracing::info!(path = %conf.path.display(), "database setup complete");
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::MigrationError(e.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        count(&self.pool).await
    }

    /// Every row, oldest first.
    pub async fn all_entries(&self) -> Result<Vec<StoredEntry>, AppError> {
        let rows = sqlx::query_as::<_, StoredEntry>(
            "SELECT id, word, definition FROM words ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn contains(&self, entry: &VocabEntry) -> Result<bool, AppError> {
        contains(&self.pool, entry).await
    }

    pub async fn random_entry(&self) -> Result<Option<VocabEntry>, AppError> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT word, definition FROM words ORDER BY RANDOM() LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(word, definition)| VocabEntry { word, definition }))
    }
}

// The free functions take any executor so the importer can run them inside
// its transaction.

pub(crate) async fn count<'e, E>(executor: E) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM words")
        .fetch_one(executor)
        .await?;
    Ok(total)
}

pub(crate) async fn contains<'e, E>(executor: E, entry: &VocabEntry) -> Result<bool, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let (matches,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM words WHERE word = ? AND definition = ?")
            .bind(&entry.word)
            .bind(&entry.definition)
            .fetch_one(executor)
            .await?;
    Ok(matches > 0)
}

pub(crate) async fn insert<'e, E>(executor: E, entry: &VocabEntry) -> Result<i64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let res = sqlx::query("INSERT INTO words (word, definition) VALUES (?, ?)")
        .bind(&entry.word)
        .bind(&entry.definition)
        .execute(executor)
        .await?;
    Ok(res.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::VocabEntry;

    #[test]
    fn entries_are_trimmed_on_construction() {
        let entry = VocabEntry::new("  cat\t", "\nan animal ");
        assert_eq!(entry.word, "cat");
        assert_eq!(entry.definition, "an animal");
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_ne!(VocabEntry::new("Cat", "an animal"), VocabEntry::new("cat", "an animal"));
    }
}
