//! Short link queries: one code per recipe.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;

/// Short link record from the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ShortLink {
    pub code: String,
    pub recipe_id: i64,
    /// Canonical recipe path, e.g. `/recipes/7`.
    pub destination: String,
    pub created_at: DateTime<Utc>,
}

pub async fn get_short_link(pool: &DbPool, code: &str) -> Result<Option<ShortLink>> {
    sqlx::query_as::<_, ShortLink>("SELECT * FROM short_links WHERE code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

pub async fn get_short_link_for_recipe(pool: &DbPool, recipe_id: i64) -> Result<Option<ShortLink>> {
    sqlx::query_as::<_, ShortLink>("SELECT * FROM short_links WHERE recipe_id = ?")
        .bind(recipe_id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Insert a mapping. The raw sqlx error is returned so callers can tell a
/// code collision or a racing insert for the same recipe from other faults.
pub async fn insert_short_link(
    pool: &DbPool,
    code: &str,
    recipe_id: i64,
    destination: &str,
) -> std::result::Result<ShortLink, sqlx::Error> {
    sqlx::query_as::<_, ShortLink>(
        r#"
        INSERT INTO short_links (code, recipe_id, destination, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(code)
    .bind(recipe_id)
    .bind(destination)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{ingredient, recipe, setup_test_db, user};
    use crate::db::{violation, Violation};

    #[tokio::test]
    async fn test_one_link_per_recipe() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let soup = recipe(&pool, julia.id, "Soup", &[(salt.id, 5)]).await;

        let link = insert_short_link(&pool, "abcdefgh", soup.id, "/recipes/1").await.unwrap();
        assert_eq!(get_short_link(&pool, "abcdefgh").await.unwrap(), Some(link.clone()));
        assert_eq!(get_short_link_for_recipe(&pool, soup.id).await.unwrap(), Some(link));

        let err = insert_short_link(&pool, "zzzzzzzz", soup.id, "/recipes/1")
            .await
            .unwrap_err();
        assert_eq!(violation(&err), Some(Violation::Unique));
    }

    #[tokio::test]
    async fn test_code_collision_is_unique_violation() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let soup = recipe(&pool, julia.id, "Soup", &[(salt.id, 5)]).await;
        let stew = recipe(&pool, julia.id, "Stew", &[(salt.id, 5)]).await;

        insert_short_link(&pool, "samecode", soup.id, "/recipes/1").await.unwrap();
        let err = insert_short_link(&pool, "samecode", stew.id, "/recipes/2")
            .await
            .unwrap_err();
        assert_eq!(violation(&err), Some(Violation::Unique));
    }
}
