//! SQLite backend for question history and saved recipes.
//!
//! One database file, two tables:
//! - `history`: append-only log of user questions
//! - `saved_recipes`: immutable snapshots of agent answers, keyed by `recipe_id`

use async_trait::async_trait;
use chefai_core::error::StoreError;
use chefai_core::history::{HistoryRecord, HistoryStore, SavedRecipe, SavedRecipeStore};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// SQLite-backed history and saved-recipe store.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `url`.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral database (useful for tests).
    pub async fn new(url: &str) -> Result<Self, StoreError> {
        let in_memory = url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite URL: {e}")))?
            .create_if_missing(true)
            .synchronous(SqliteSynchronous::Normal);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        // Every connection to `:memory:` is a separate database.
        let max_connections = if in_memory { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {url}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                question    TEXT NOT NULL,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("history table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_history_created_at ON history(created_at DESC)")
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::MigrationFailed(format!("history index: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS saved_recipes (
                recipe_id   TEXT PRIMARY KEY,
                query       TEXT NOT NULL,
                answer      TEXT NOT NULL,
                trace       TEXT NOT NULL DEFAULT '[]',
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("saved_recipes table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    /// Fixed-width RFC 3339 so lexical order matches time order.
    fn encode_time(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn decode_time(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_recipe(row: &sqlx::sqlite::SqliteRow) -> Result<SavedRecipe, StoreError> {
        let column = |name: &str, e: sqlx::Error| StoreError::QueryFailed(format!("{name} column: {e}"));

        let recipe_id: String = row.try_get("recipe_id").map_err(|e| column("recipe_id", e))?;
        let query: String = row.try_get("query").map_err(|e| column("query", e))?;
        let answer: String = row.try_get("answer").map_err(|e| column("answer", e))?;
        let trace_json: String = row.try_get("trace").map_err(|e| column("trace", e))?;
        let created_at: String = row.try_get("created_at").map_err(|e| column("created_at", e))?;

        let trace = serde_json::from_str(&trace_json)
            .map_err(|e| StoreError::QueryFailed(format!("trace for {recipe_id}: {e}")))?;

        Ok(SavedRecipe {
            recipe_id,
            query,
            answer,
            trace,
            timestamp: Self::decode_time(&created_at),
        })
    }
}

#[async_trait]
impl HistoryStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, record: HistoryRecord) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO history (question, created_at) VALUES (?1, ?2)")
            .bind(&record.question)
            .bind(Self::encode_time(&record.timestamp))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(format!("INSERT history failed: {e}")))?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT question, created_at FROM history ORDER BY created_at DESC, id DESC LIMIT ?1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(format!("Recent history: {e}")))?;

        rows.iter()
            .map(|row| {
                let question: String = row
                    .try_get("question")
                    .map_err(|e| StoreError::QueryFailed(format!("question column: {e}")))?;
                let created_at: String = row
                    .try_get("created_at")
                    .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;
                Ok(HistoryRecord {
                    question,
                    timestamp: Self::decode_time(&created_at),
                })
            })
            .collect()
    }
}

#[async_trait]
impl SavedRecipeStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn save(&self, recipe: SavedRecipe) -> Result<(), StoreError> {
        let trace_json = serde_json::to_string(&recipe.trace)
            .map_err(|e| StoreError::Storage(format!("Trace serialization: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO saved_recipes (recipe_id, query, answer, trace, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&recipe.recipe_id)
        .bind(&recipe.query)
        .bind(&recipe.answer)
        .bind(&trace_json)
        .bind(Self::encode_time(&recipe.timestamp))
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT recipe {} failed: {e}", recipe.recipe_id)))?;

        debug!(recipe_id = %recipe.recipe_id, "Saved recipe");
        Ok(())
    }

    async fn get(&self, recipe_id: &str) -> Result<Option<SavedRecipe>, StoreError> {
        let row = sqlx::query("SELECT * FROM saved_recipes WHERE recipe_id = ?1")
            .bind(recipe_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Get recipe: {e}")))?;

        row.as_ref().map(Self::row_to_recipe).transpose()
    }

    async fn list(&self) -> Result<Vec<SavedRecipe>, StoreError> {
        let rows = sqlx::query("SELECT * FROM saved_recipes ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("List recipes: {e}")))?;

        rows.iter().map(Self::row_to_recipe).collect()
    }
}
