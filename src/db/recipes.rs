//! Recipe and recipe-ingredient queries.
//!
//! A recipe owns its ingredient lines: they are written together with the
//! recipe in one transaction and replaced wholesale on update.

use crate::error::FieldErrors;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection};

use super::{violation, violates_column, DbPool, Violation};

// ============================================================================
// Recipe Types
// ============================================================================

/// Recipe record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub author_id: i64,
    pub name: String,
    pub text: String,
    /// Media-relative image path.
    pub image: String,
    pub cooking_time: i64,
    pub created_at: DateTime<Utc>,
}

/// An ingredient line of a recipe joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct RecipeLine {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Clone)]
pub struct NewRecipeLine {
    pub ingredient_id: i64,
    pub amount: i64,
}

/// Input for creating a recipe.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author_id: i64,
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i64,
    pub ingredients: Vec<NewRecipeLine>,
}

/// Input for replacing a recipe's content. The author never changes.
#[derive(Debug, Clone)]
pub struct UpdateRecipe {
    pub name: String,
    pub text: String,
    pub image: String,
    pub cooking_time: i64,
    pub ingredients: Vec<NewRecipeLine>,
}

/// Listing filters; `None` means "don't filter".
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeFilter {
    pub author_id: Option<i64>,
    /// Only recipes this user marked as favorite.
    pub favorited_by: Option<i64>,
    /// Only recipes in this user's shopping cart.
    pub in_cart_of: Option<i64>,
}

impl RecipeFilter {
    fn where_clause(&self) -> (String, Vec<i64>) {
        let mut conditions = Vec::new();
        let mut bindings = Vec::new();

        if let Some(author_id) = self.author_id {
            conditions.push("r.author_id = ?");
            bindings.push(author_id);
        }
        if let Some(user_id) = self.favorited_by {
            conditions.push("EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ?)");
            bindings.push(user_id);
        }
        if let Some(user_id) = self.in_cart_of {
            conditions.push("EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ?)");
            bindings.push(user_id);
        }

        if conditions.is_empty() {
            (String::new(), bindings)
        } else {
            (format!("WHERE {}", conditions.join(" AND ")), bindings)
        }
    }
}

// ============================================================================
// Recipe Queries
// ============================================================================

/// Create a recipe with its ingredient lines.
pub async fn create_recipe(pool: &DbPool, input: NewRecipe) -> Result<Recipe> {
    let mut tx = pool.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (author_id, name, text, image, cooking_time, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(input.author_id)
    .bind(&input.name)
    .bind(&input.text)
    .bind(&input.image)
    .bind(input.cooking_time)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await
    .map_err(recipe_write_error)?;

    insert_lines(&mut *tx, recipe.id, &input.ingredients).await?;

    tx.commit().await?;

    Ok(recipe)
}

/// Replace a recipe's fields and its full set of ingredient lines.
pub async fn update_recipe(pool: &DbPool, id: i64, input: UpdateRecipe) -> Result<Recipe> {
    let mut tx = pool.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipes
        SET name = ?, text = ?, image = ?, cooking_time = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&input.name)
    .bind(&input.text)
    .bind(&input.image)
    .bind(input.cooking_time)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(recipe_write_error)?
    .ok_or_else(|| Error::NotFound(format!("Recipe not found: {}", id)))?;

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    insert_lines(&mut *tx, id, &input.ingredients).await?;

    tx.commit().await?;

    Ok(recipe)
}

async fn insert_lines(conn: &mut SqliteConnection, recipe_id: i64, lines: &[NewRecipeLine]) -> Result<()> {
    for line in lines {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(line.ingredient_id)
        .bind(line.amount)
        .execute(&mut *conn)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::ForeignKey) => Error::field(
                "ingredients",
                format!("Ingredient {} does not exist.", line.ingredient_id),
            ),
            Some(Violation::Unique) => Error::field("ingredients", "Ingredients must not repeat."),
            Some(Violation::Check) => Error::field("ingredients", "Amount is out of range."),
            None => Error::Database(e),
        })?;
    }
    Ok(())
}

fn recipe_write_error(e: sqlx::Error) -> Error {
    if violates_column(&e, "recipes.name") || violates_column(&e, "recipes.author_id") {
        Error::Validation(FieldErrors::single(
            "name",
            "You already have a recipe with this name.",
        ))
    } else if violation(&e) == Some(Violation::Check) {
        Error::field("cooking_time", "Cooking time is out of range.")
    } else {
        Error::Database(e)
    }
}

/// Get a recipe by ID.
pub async fn get_recipe(pool: &DbPool, id: i64) -> Result<Recipe> {
    sqlx::query_as::<_, Recipe>("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Recipe not found: {}", id)))
}

/// Delete a recipe; lines, marks and its short link cascade.
pub async fn delete_recipe(pool: &DbPool, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Recipe not found: {}", id)));
    }

    Ok(())
}

/// Ingredient lines of a recipe, in insertion order.
pub async fn recipe_lines(pool: &DbPool, recipe_id: i64) -> Result<Vec<RecipeLine>> {
    sqlx::query_as::<_, RecipeLine>(
        r#"
        SELECT i.id AS id, i.name AS name, i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?
        ORDER BY ri.id
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

/// List recipes newest first.
pub async fn list_recipes(
    pool: &DbPool,
    filter: &RecipeFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Recipe>> {
    let (where_clause, bindings) = filter.where_clause();
    let query = format!(
        "SELECT r.* FROM recipes r {} ORDER BY r.created_at DESC, r.id DESC LIMIT ? OFFSET ?",
        where_clause
    );

    let mut q = sqlx::query_as::<_, Recipe>(&query);
    for binding in &bindings {
        q = q.bind(*binding);
    }
    q.bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

pub async fn count_recipes(pool: &DbPool, filter: &RecipeFilter) -> Result<i64> {
    let (where_clause, bindings) = filter.where_clause();
    let query = format!("SELECT COUNT(*) FROM recipes r {}", where_clause);

    let mut q = sqlx::query_as::<_, (i64,)>(&query);
    for binding in &bindings {
        q = q.bind(*binding);
    }
    let (count,) = q.fetch_one(pool).await?;
    Ok(count)
}

/// An author's recipes, newest first, optionally capped.
pub async fn recipes_by_author(
    pool: &DbPool,
    author_id: i64,
    limit: Option<i64>,
) -> Result<Vec<Recipe>> {
    // SQLite treats a negative LIMIT as "no limit".
    sqlx::query_as::<_, Recipe>(
        "SELECT * FROM recipes WHERE author_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(author_id)
    .bind(limit.unwrap_or(-1))
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn count_recipes_by_author(pool: &DbPool, author_id: i64) -> Result<i64> {
    count_recipes(
        pool,
        &RecipeFilter {
            author_id: Some(author_id),
            ..Default::default()
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{ingredient, recipe, setup_test_db, user};

    #[tokio::test]
    async fn test_create_recipe_with_lines() {
        let pool = setup_test_db().await;
        let author = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let milk = ingredient(&pool, "Milk", "ml").await;

        let created = recipe(&pool, author.id, "Pancakes", &[(milk.id, 250), (salt.id, 5)]).await;

        let lines = recipe_lines(&pool, created.id).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].name, "Milk");
        assert_eq!(lines[0].amount, 250);
        assert_eq!(lines[1].measurement_unit, "g");
    }

    #[tokio::test]
    async fn test_same_name_same_author_rejected() {
        let pool = setup_test_db().await;
        let author = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        recipe(&pool, author.id, "Soup", &[(salt.id, 5)]).await;

        let err = create_recipe(
            &pool,
            NewRecipe {
                author_id: author.id,
                name: "Soup".to_string(),
                text: "Again".to_string(),
                image: "recipes/images/x.png".to_string(),
                cooking_time: 5,
                ingredients: vec![NewRecipeLine {
                    ingredient_id: salt.id,
                    amount: 1,
                }],
            },
        )
        .await
        .unwrap_err();

        match err {
            Error::Validation(fields) => assert!(fields.contains("name")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_same_name_different_author_allowed() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let jamie = user(&pool, "jamie").await;
        let salt = ingredient(&pool, "Salt", "g").await;

        recipe(&pool, julia.id, "Soup", &[(salt.id, 5)]).await;
        recipe(&pool, jamie.id, "Soup", &[(salt.id, 5)]).await;

        assert_eq!(count_recipes(&pool, &RecipeFilter::default()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ingredient_rolls_back_recipe() {
        let pool = setup_test_db().await;
        let author = user(&pool, "julia").await;

        let err = create_recipe(
            &pool,
            NewRecipe {
                author_id: author.id,
                name: "Ghost".to_string(),
                text: "Nothing".to_string(),
                image: "recipes/images/x.png".to_string(),
                cooking_time: 5,
                ingredients: vec![NewRecipeLine {
                    ingredient_id: 999,
                    amount: 1,
                }],
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(count_recipes(&pool, &RecipeFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_replaces_lines() {
        let pool = setup_test_db().await;
        let author = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let milk = ingredient(&pool, "Milk", "ml").await;
        let created = recipe(&pool, author.id, "Pancakes", &[(salt.id, 5)]).await;

        let updated = update_recipe(
            &pool,
            created.id,
            UpdateRecipe {
                name: "Crepes".to_string(),
                text: "Thinner".to_string(),
                image: created.image.clone(),
                cooking_time: 15,
                ingredients: vec![NewRecipeLine {
                    ingredient_id: milk.id,
                    amount: 300,
                }],
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.name, "Crepes");
        let lines = recipe_lines(&pool, created.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "Milk");
    }

    #[tokio::test]
    async fn test_delete_recipe_cascades_lines() {
        let pool = setup_test_db().await;
        let author = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let created = recipe(&pool, author.id, "Soup", &[(salt.id, 5)]).await;

        delete_recipe(&pool, created.id).await.unwrap();

        assert!(recipe_lines(&pool, created.id).await.unwrap().is_empty());
        assert!(matches!(get_recipe(&pool, created.id).await, Err(Error::NotFound(_))));
        assert!(matches!(delete_recipe(&pool, created.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filters_and_author_limit() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let jamie = user(&pool, "jamie").await;
        let salt = ingredient(&pool, "Salt", "g").await;

        for name in ["A", "B", "C"] {
            recipe(&pool, julia.id, name, &[(salt.id, 1)]).await;
        }
        recipe(&pool, jamie.id, "D", &[(salt.id, 1)]).await;

        let by_julia = RecipeFilter {
            author_id: Some(julia.id),
            ..Default::default()
        };
        assert_eq!(count_recipes(&pool, &by_julia).await.unwrap(), 3);
        assert_eq!(list_recipes(&pool, &by_julia, 2, 0).await.unwrap().len(), 2);

        let capped = recipes_by_author(&pool, julia.id, Some(2)).await.unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].name, "C");
        assert_eq!(recipes_by_author(&pool, julia.id, None).await.unwrap().len(), 3);
        assert_eq!(count_recipes_by_author(&pool, jamie.id).await.unwrap(), 1);
    }
}
