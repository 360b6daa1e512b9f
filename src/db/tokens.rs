//! API token database queries.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;

/// API token record. Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct ApiToken {
    pub id: String,
    pub user_id: i64,
    pub token_prefix: String,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Input for creating an API token.
#[derive(Debug, Clone)]
pub struct CreateApiToken {
    pub id: String,
    pub user_id: i64,
    pub token_prefix: String,
    pub token_hash: String,
}

/// Create a new API token.
pub async fn create_api_token(pool: &DbPool, input: CreateApiToken) -> Result<ApiToken> {
    sqlx::query_as::<_, ApiToken>(
        r#"
        INSERT INTO api_tokens (id, user_id, token_prefix, token_hash, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.id)
    .bind(input.user_id)
    .bind(&input.token_prefix)
    .bind(&input.token_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}

/// Get an API token by its lookup prefix.
/// Uses the unique index on token_prefix.
pub async fn get_api_token_by_prefix(pool: &DbPool, prefix: &str) -> Result<Option<ApiToken>> {
    sqlx::query_as::<_, ApiToken>("SELECT * FROM api_tokens WHERE token_prefix = ?")
        .bind(prefix)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Update token's last_used_at timestamp.
pub async fn touch_api_token(pool: &DbPool, id: &str) -> Result<()> {
    sqlx::query("UPDATE api_tokens SET last_used_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete an API token.
pub async fn delete_api_token(pool: &DbPool, id: &str) -> Result<()> {
    let result = sqlx::query("DELETE FROM api_tokens WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("API token not found: {}", id)));
    }

    Ok(())
}
