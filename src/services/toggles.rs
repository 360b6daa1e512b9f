//! Favorite and shopping-cart toggles.

use tracing::{debug, info};

use crate::db::{self, DbPool, Recipe, RecipeMark};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct ToggleService {
    db: DbPool,
}

impl ToggleService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Mark a recipe and return it for the compact view.
    ///
    /// `NotFound` when the recipe does not exist, `AlreadyExists` when the
    /// pair is already marked (including a racing duplicate insert).
    pub async fn add(&self, mark: RecipeMark, user_id: i64, recipe_id: i64) -> Result<Recipe> {
        let recipe = db::get_recipe(&self.db, recipe_id).await?;

        if let Err(e) = db::add_recipe_mark(&self.db, mark, user_id, recipe_id).await {
            if matches!(e, Error::AlreadyExists(_)) {
                debug!(user_id, recipe_id, collection = mark.label(), "Duplicate mark rejected");
            }
            return Err(e);
        }

        info!(user_id, recipe_id, collection = mark.label(), "Recipe marked");
        Ok(recipe)
    }

    /// Unmark a recipe; `NotFound` when it was not marked.
    pub async fn remove(&self, mark: RecipeMark, user_id: i64, recipe_id: i64) -> Result<()> {
        db::get_recipe(&self.db, recipe_id).await?;
        db::remove_recipe_mark(&self.db, mark, user_id, recipe_id).await?;

        info!(user_id, recipe_id, collection = mark.label(), "Recipe unmarked");
        Ok(())
    }

    pub async fn is_marked(&self, mark: RecipeMark, user_id: i64, recipe_id: i64) -> Result<bool> {
        db::has_recipe_mark(&self.db, mark, user_id, recipe_id).await
    }
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
    async fn test_add_twice_then_remove_twice(#[case] mark: RecipeMark) {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let soup = recipe(&pool, julia.id, "Soup", &[(salt.id, 5)]).await;
        let toggles = ToggleService::new(pool);

        let marked = toggles.add(mark, julia.id, soup.id).await.unwrap();
        assert_eq!(marked.id, soup.id);
        assert!(toggles.is_marked(mark, julia.id, soup.id).await.unwrap());

        assert!(matches!(
            toggles.add(mark, julia.id, soup.id).await,
            Err(Error::AlreadyExists(_))
        ));

        toggles.remove(mark, julia.id, soup.id).await.unwrap();
        assert!(matches!(
            toggles.remove(mark, julia.id, soup.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_recipe() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let toggles = ToggleService::new(pool);

        assert!(matches!(
            toggles.add(RecipeMark::Favorite, julia.id, 42).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            toggles.remove(RecipeMark::ShoppingCart, julia.id, 42).await,
            Err(Error::NotFound(_))
        ));
    }
}
