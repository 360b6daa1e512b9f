//! Ingredient catalog queries.

use crate::{Error, Result};
use serde::Serialize;
use sqlx::FromRow;

use super::{escape_like, DbPool};

/// Catalog entry, unique by `(name, measurement_unit)`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Get an ingredient by ID.
pub async fn get_ingredient(pool: &DbPool, id: i64) -> Result<Ingredient> {
    sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Ingredient not found: {}", id)))
}

/// List ingredients, optionally restricted to names starting with `prefix`.
///
/// Matching is case-insensitive for any script: names are stored with a
/// lowercased copy that the prefix is compared against.
pub async fn search_ingredients(pool: &DbPool, prefix: Option<&str>) -> Result<Vec<Ingredient>> {
    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT * FROM ingredients
            WHERE search_name LIKE ? ESCAPE '\'
            ORDER BY name, id
            "#,
        )
        .bind(format!("{}%", escape_like(&prefix.to_lowercase())))
        .fetch_all(pool)
        .await
        .map_err(Error::Database),
        None => sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients ORDER BY name, id")
            .fetch_all(pool)
            .await
            .map_err(Error::Database),
    }
}

/// IDs from `ids` that have no catalog entry.
pub async fn missing_ingredient_ids(pool: &DbPool, ids: &[i64]) -> Result<Vec<i64>> {
    let mut missing = Vec::new();
    for &id in ids {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM ingredients WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            missing.push(id);
        }
    }
    Ok(missing)
}

/// Insert a catalog entry unless the `(name, unit)` pair is already present.
pub async fn get_or_create_ingredient(
    pool: &DbPool,
    name: &str,
    measurement_unit: &str,
) -> Result<Ingredient> {
    sqlx::query(
        r#"
        INSERT INTO ingredients (name, measurement_unit, search_name)
        VALUES (?, ?, ?)
        ON CONFLICT (name, measurement_unit) DO NOTHING
        "#,
    )
    .bind(name)
    .bind(measurement_unit)
    .bind(name.to_lowercase())
    .execute(pool)
    .await?;

    sqlx::query_as::<_, Ingredient>(
        "SELECT * FROM ingredients WHERE name = ? AND measurement_unit = ?",
    )
    .bind(name)
    .bind(measurement_unit)
    .fetch_one(pool)
    .await
    .map_err(Error::Database)
}
