//! Ingredient catalog endpoints (read-only, public).

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db::{self, Ingredient},
    error::Result,
    AppState,
};

use super::extract::PathParam;

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    /// Name prefix.
    pub name: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients/", get(list_ingredients))
        .route("/ingredients/:id/", get(get_ingredient))
}

/// Unpaginated; filtered by name prefix when `name` is given.
async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<Ingredient>>> {
    let ingredients = db::search_ingredients(&state.db, query.name.as_deref()).await?;
    Ok(Json(ingredients))
}

async fn get_ingredient(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<Ingredient>> {
    Ok(Json(db::get_ingredient(&state.db, id).await?))
}
