//! Database layer for Foodgram.
//!
//! Provides SQLite connection pooling and query modules
//! for all domain entities.

mod follows;
mod ingredients;
mod marks;
mod recipes;
mod shopping;
mod short_links;
mod tokens;
mod users;

pub use follows::*;
pub use ingredients::*;
pub use marks::*;
pub use recipes::*;
pub use shopping::*;
pub use short_links::*;
pub use tokens::*;
pub use users::*;

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Type alias for the SQLite connection pool.
pub type DbPool = sqlx::SqlitePool;

const IN_MEMORY: &str = ":memory:";

/// Initialize the database connection pool.
///
/// Creates parent directories if needed. An in-memory database is held
/// on a single connection so every query sees the same data.
pub async fn init_pool(path: &str) -> Result<DbPool> {
    let in_memory = path == IN_MEMORY || path == "sqlite::memory:";

    if !in_memory {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    let mut options = SqliteConnectOptions::from_str(path)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(30))
        .foreign_keys(true);

    if !in_memory {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Increase cache size (negative = KB)
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");
    }

    let max_connections = if in_memory { 1 } else { 10 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;

    info!("Database pool initialized: {}", path);

    Ok(pool)
}

/// Initialize the database schema.
///
/// Applies the complete schema from schema.sql. Uses IF NOT EXISTS
/// clauses so it's safe to run multiple times.
pub async fn initialize_schema(pool: &DbPool) -> Result<()> {
    let schema = include_str!("../../schema.sql");

    info!("Initializing database schema");

    for statement in schema.split(';') {
        // Strip comment lines, keeping only actual SQL
        let clean_stmt: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let clean_stmt = clean_stmt.trim();
        if clean_stmt.is_empty() {
            continue;
        }
        sqlx::query(clean_stmt).execute(pool).await?;
    }

    info!("Database schema initialized successfully");

    Ok(())
}

/// Storage constraint classes that callers translate into domain errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Violation {
    Unique,
    ForeignKey,
    Check,
}

/// Classify a constraint violation, if `err` is one.
pub(crate) fn violation(err: &sqlx::Error) -> Option<Violation> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Some(Violation::Unique),
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Some(Violation::ForeignKey)
        }
        sqlx::Error::Database(db_err) if db_err.is_check_violation() => Some(Violation::Check),
        _ => None,
    }
}

/// Whether a unique violation names `table.column`.
pub(crate) fn violates_column(err: &sqlx::Error, column: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.message().contains(column)
        }
        _ => false,
    }
}

/// Escape `%`, `_` and `\` so user input matches literally in a LIKE pattern.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_pool_in_memory() {
        let pool = init_pool(":memory:").await.unwrap();
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
    }

    #[tokio::test]
    async fn test_schema_initialization_is_idempotent() {
        let pool = init_pool(":memory:").await.unwrap();
        initialize_schema(&pool).await.unwrap();
        initialize_schema(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let table_names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

        for expected in [
            "users",
            "api_tokens",
            "ingredients",
            "recipes",
            "recipe_ingredients",
            "favorites",
            "shopping_cart",
            "follows",
            "short_links",
        ] {
            assert!(table_names.contains(&expected), "{} table missing", expected);
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("sa"), "sa");
        assert_eq!(escape_like("50%_\\"), "50\\%\\_\\\\");
    }
}
