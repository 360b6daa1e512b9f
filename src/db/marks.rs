//! Favorite and shopping-cart marks: `(user, recipe)` join rows, unique per pair.

use crate::{Error, Result};

use super::{violation, DbPool, Violation};

/// Which per-user recipe collection a mark belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeMark {
    Favorite,
    ShoppingCart,
}

impl RecipeMark {
    fn table(&self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping_cart",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Favorite => "favorites",
            Self::ShoppingCart => "shopping cart",
        }
    }
}

/// Insert a mark.
///
/// A second insert of the same pair (including a concurrent one) fails
/// with `AlreadyExists`; a vanished user or recipe with `NotFound`.
pub async fn add_recipe_mark(pool: &DbPool, mark: RecipeMark, user_id: i64, recipe_id: i64) -> Result<()> {
    let query = format!(
        "INSERT INTO {} (user_id, recipe_id) VALUES (?, ?)",
        mark.table()
    );

    sqlx::query(&query)
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => {
                Error::AlreadyExists(format!("Recipe {} is already in {}", recipe_id, mark.label()))
            }
            Some(Violation::ForeignKey) => {
                Error::NotFound(format!("Recipe not found: {}", recipe_id))
            }
            _ => Error::Database(e),
        })?;

    Ok(())
}

/// Delete a mark; `NotFound` when the pair was never marked.
pub async fn remove_recipe_mark(pool: &DbPool, mark: RecipeMark, user_id: i64, recipe_id: i64) -> Result<()> {
    let query = format!(
        "DELETE FROM {} WHERE user_id = ? AND recipe_id = ?",
        mark.table()
    );

    let result = sqlx::query(&query)
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "Recipe {} is not in {}",
            recipe_id,
            mark.label()
        )));
    }

    Ok(())
}

pub async fn has_recipe_mark(pool: &DbPool, mark: RecipeMark, user_id: i64, recipe_id: i64) -> Result<bool> {
    let query = format!(
        "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = ? AND recipe_id = ?)",
        mark.table()
    );

    let (exists,): (bool,) = sqlx::query_as(&query)
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Number of recipes a user holds in `mark`.
pub async fn count_recipe_marks(pool: &DbPool, mark: RecipeMark, user_id: i64) -> Result<i64> {
    let query = format!("SELECT COUNT(*) FROM {} WHERE user_id = ?", mark.table());

    let (count,): (i64,) = sqlx::query_as(&query)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{ingredient, recipe, setup_test_db, user};
    use rstest::rstest;

    #[rstest]
    #[case(RecipeMark::Favorite)]
    #[case(RecipeMark::ShoppingCart)]
    #[tokio::test]
    async fn test_mark_toggle_cycle(#[case] mark: RecipeMark) {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let soup = recipe(&pool, julia.id, "Soup", &[(salt.id, 5)]).await;

        assert!(!has_recipe_mark(&pool, mark, julia.id, soup.id).await.unwrap());

        add_recipe_mark(&pool, mark, julia.id, soup.id).await.unwrap();
        assert!(has_recipe_mark(&pool, mark, julia.id, soup.id).await.unwrap());
        assert_eq!(count_recipe_marks(&pool, mark, julia.id).await.unwrap(), 1);

        assert!(matches!(
            add_recipe_mark(&pool, mark, julia.id, soup.id).await,
            Err(Error::AlreadyExists(_))
        ));

        remove_recipe_mark(&pool, mark, julia.id, soup.id).await.unwrap();
        assert!(matches!(
            remove_recipe_mark(&pool, mark, julia.id, soup.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_mark_on_missing_recipe() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;

        assert!(matches!(
            add_recipe_mark(&pool, RecipeMark::Favorite, julia.id, 404).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_collections_are_independent() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let soup = recipe(&pool, julia.id, "Soup", &[(salt.id, 5)]).await;

        add_recipe_mark(&pool, RecipeMark::Favorite, julia.id, soup.id).await.unwrap();

        assert!(!has_recipe_mark(&pool, RecipeMark::ShoppingCart, julia.id, soup.id).await.unwrap());
        add_recipe_mark(&pool, RecipeMark::ShoppingCart, julia.id, soup.id).await.unwrap();
    }
}
