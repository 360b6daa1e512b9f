//! Recipe write models and their validation rules.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{Error, FieldErrors, Result};

pub const MIN_AMOUNT: i64 = 1;
pub const MAX_AMOUNT: i64 = 32000;
pub const MIN_COOKING_TIME: i64 = 1;
pub const MAX_COOKING_TIME: i64 = 32000;
pub const MAX_RECIPE_NAME_LENGTH: usize = 200;
pub const MAX_RECIPE_TEXT_LENGTH: usize = 256;

/// One `{id, amount}` entry of a recipe write request.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmountInput {
    pub id: i64,
    pub amount: i64,
}

/// Body of `POST /recipes/` and `PATCH /recipes/{id}/`.
///
/// Every field is optional at the wire level so that all missing fields
/// can be reported at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeInput {
    pub ingredients: Option<Vec<IngredientAmountInput>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

/// A recipe write request that passed [`RecipeInput::validate`].
///
/// Ingredient existence is checked against the catalog separately.
#[derive(Debug, Clone)]
pub struct RecipeDraft {
    pub ingredients: Vec<IngredientAmountInput>,
    /// Base64 data URL, not yet decoded.
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

impl RecipeInput {
    pub fn validate(self) -> Result<RecipeDraft> {
        let mut errors = FieldErrors::new();

        let ingredients = match self.ingredients {
            None => {
                errors.add("ingredients", "This field is required.");
                None
            }
            Some(lines) if lines.is_empty() => {
                errors.add("ingredients", "Choose at least one ingredient.");
                None
            }
            Some(lines) => {
                validate_lines(&mut errors, &lines);
                Some(lines)
            }
        };

        let image = match self.image {
            Some(image) if !image.trim().is_empty() => Some(image),
            _ => {
                errors.add("image", "This field is required.");
                None
            }
        };

        let name = text_field(&mut errors, "name", self.name, MAX_RECIPE_NAME_LENGTH);
        let text = text_field(&mut errors, "text", self.text, MAX_RECIPE_TEXT_LENGTH);

        match self.cooking_time {
            None => errors.add("cooking_time", "This field is required."),
            Some(t) if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&t) => errors.add(
                "cooking_time",
                format!(
                    "Cooking time must be between {} and {} minutes.",
                    MIN_COOKING_TIME, MAX_COOKING_TIME
                ),
            ),
            Some(_) => {}
        }

        match (ingredients, image, name, text, self.cooking_time) {
            (Some(ingredients), Some(image), Some(name), Some(text), Some(cooking_time))
                if errors.is_empty() =>
            {
                Ok(RecipeDraft {
                    ingredients,
                    image,
                    name,
                    text,
                    cooking_time,
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }
}

fn validate_lines(errors: &mut FieldErrors, lines: &[IngredientAmountInput]) {
    let mut seen = HashSet::new();
    if !lines.iter().all(|line| seen.insert(line.id)) {
        errors.add("ingredients", "Ingredients must not repeat.");
    }

    if lines
        .iter()
        .any(|line| !(MIN_AMOUNT..=MAX_AMOUNT).contains(&line.amount))
    {
        errors.add(
            "ingredients",
            format!("Amount must be between {} and {}.", MIN_AMOUNT, MAX_AMOUNT),
        );
    }
}

fn text_field(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_length: usize,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if v.is_empty() => {
            errors.add(field, "This field may not be blank.");
            None
        }
        Some(v) if v.chars().count() > max_length => {
            errors.add(
                field,
                format!("Ensure this field has no more than {} characters.", max_length),
            );
            None
        }
        Some(v) => Some(v),
        None => {
            errors.add(field, "This field is required.");
            None
        }
    }
}
