//! Recipe writes: validation, image storage and ownership checks.

use tracing::info;

use crate::db::{self, DbPool, NewRecipe, NewRecipeLine, Recipe, UpdateRecipe};
use crate::error::{Error, FieldErrors, Result};
use crate::models::{RecipeDraft, RecipeInput};

use super::media::{MediaKind, MediaStorage};

/// Who is acting on a recipe.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i64,
    pub is_admin: bool,
}

impl Actor {
    fn can_edit(&self, recipe: &Recipe) -> bool {
        self.is_admin || recipe.author_id == self.user_id
    }
}

#[derive(Clone)]
pub struct RecipeService {
    db: DbPool,
    media: MediaStorage,
}

impl RecipeService {
    pub fn new(db: DbPool, media: MediaStorage) -> Self {
        Self { db, media }
    }

    /// Publish a recipe authored by `author_id`.
    pub async fn create(&self, author_id: i64, input: RecipeInput) -> Result<Recipe> {
        let draft = self.validate(input).await?;
        let image = self.store_image(&draft.image).await?;
        let ingredients = lines(&draft);

        let result = db::create_recipe(
            &self.db,
            NewRecipe {
                author_id,
                name: draft.name,
                text: draft.text,
                image: image.clone(),
                cooking_time: draft.cooking_time,
                ingredients,
            },
        )
        .await;

        match result {
            Ok(recipe) => {
                info!(user_id = author_id, recipe_id = recipe.id, "Created recipe");
                Ok(recipe)
            }
            Err(e) => {
                self.media.remove(&image).await;
                Err(e)
            }
        }
    }

    /// Replace a recipe's content. Only its author or an admin may do so.
    pub async fn update(&self, actor: Actor, recipe_id: i64, input: RecipeInput) -> Result<Recipe> {
        let existing = db::get_recipe(&self.db, recipe_id).await?;
        if !actor.can_edit(&existing) {
            return Err(Error::Forbidden);
        }

        let draft = self.validate(input).await?;
        let image = self.store_image(&draft.image).await?;
        let ingredients = lines(&draft);

        let result = db::update_recipe(
            &self.db,
            recipe_id,
            UpdateRecipe {
                name: draft.name,
                text: draft.text,
                image: image.clone(),
                cooking_time: draft.cooking_time,
                ingredients,
            },
        )
        .await;

        match result {
            Ok(recipe) => {
                self.media.remove(&existing.image).await;
                info!(user_id = actor.user_id, recipe_id, "Updated recipe");
                Ok(recipe)
            }
            Err(e) => {
                self.media.remove(&image).await;
                Err(e)
            }
        }
    }

    /// Delete a recipe and, best-effort, its image.
    pub async fn delete(&self, actor: Actor, recipe_id: i64) -> Result<()> {
        let existing = db::get_recipe(&self.db, recipe_id).await?;
        if !actor.can_edit(&existing) {
            return Err(Error::Forbidden);
        }

        db::delete_recipe(&self.db, recipe_id).await?;
        self.media.remove(&existing.image).await;

        info!(user_id = actor.user_id, recipe_id, "Deleted recipe");
        Ok(())
    }

    /// Shape checks plus catalog existence, reported together.
    async fn validate(&self, input: RecipeInput) -> Result<RecipeDraft> {
        let draft = input.validate()?;

        let ids: Vec<i64> = draft.ingredients.iter().map(|line| line.id).collect();
        let missing = db::missing_ingredient_ids(&self.db, &ids).await?;
        let mut errors = FieldErrors::new();
        for id in missing {
            errors.add("ingredients", format!("Ingredient {} does not exist.", id));
        }
        errors.into_result()?;

        Ok(draft)
    }

    async fn store_image(&self, data_url: &str) -> Result<String> {
        self.media
            .save_data_url(MediaKind::RecipeImage, data_url)
            .await
            .map_err(|e| match e {
                Error::InvalidInput(msg) => Error::field("image", msg),
                Error::InvalidFileType(mime) => {
                    Error::field("image", format!("Unsupported image type: {}", mime))
                }
                other => other,
            })
    }
}

fn lines(draft: &RecipeDraft) -> Vec<NewRecipeLine> {
    draft
        .ingredients
        .iter()
        .map(|line| NewRecipeLine {
            ingredient_id: line.id,
            amount: line.amount,
        })
        .collect()
}
