//! Recipe API endpoints.
//!
//! Reads are public. Writes need a token; updates and deletes are limited
//! to the recipe's author or an admin.

use axum::{
    extract::{OriginalUri, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{self, RecipeFilter, RecipeMark},
    error::{Error, Result},
    middleware::AuthUser,
    models::{RecipeInput, SHOPPING_LIST_FILENAME},
    AppState,
};

use super::extract::{JsonBody, PathParam};
use super::pagination::{Page, PageParams};
use super::views::{recipe_summary, recipe_view, RecipeSummary, RecipeView};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub author: Option<String>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart/", get(download_shopping_cart))
        .route(
            "/recipes/:id/",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/:id/get-link/", get(get_link))
        .route("/recipes/:id/favorite/", post(add_favorite).delete(remove_favorite))
        .route(
            "/recipes/:id/shopping_cart/",
            post(add_to_cart).delete(remove_from_cart),
        )
}

fn flag(raw: Option<&str>) -> bool {
    matches!(raw, Some("1") | Some("true") | Some("True"))
}

impl RecipeListQuery {
    /// `None` when a flag filter was asked for by an anonymous caller:
    /// such a listing is always empty.
    fn filter(&self, viewer: Option<&AuthUser>) -> Result<Option<RecipeFilter>> {
        let author_id = match self.author.as_deref().filter(|a| !a.is_empty()) {
            None => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| Error::field("author", "Enter a valid user id."))?,
            ),
        };

        let favorited = flag(self.is_favorited.as_deref());
        let in_cart = flag(self.is_in_shopping_cart.as_deref());

        let viewer_id = match viewer {
            Some(viewer) => viewer.id,
            None if favorited || in_cart => return Ok(None),
            None => 0,
        };

        Ok(Some(RecipeFilter {
            author_id,
            favorited_by: favorited.then_some(viewer_id),
            in_cart_of: in_cart.then_some(viewer_id),
        }))
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_recipes(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Page<RecipeView>>> {
    let params = PageParams::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        &state.config.pagination,
    )?;

    let (count, recipes) = match query.filter(viewer.as_ref())? {
        Some(filter) => {
            let count = db::count_recipes(&state.db, &filter).await?;
            params.check_in_range(count)?;
            let recipes =
                db::list_recipes(&state.db, &filter, params.limit(), params.offset()).await?;
            (count, recipes)
        }
        None => (0, Vec::new()),
    };

    let mut results = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        results.push(recipe_view(&state, viewer.as_ref(), recipe).await?);
    }

    Ok(Json(Page::new(
        results,
        count,
        params,
        &state.config.server.public_url,
        &uri,
    )))
}

async fn get_recipe(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<RecipeView>> {
    let recipe = db::get_recipe(&state.db, id).await?;
    Ok(Json(recipe_view(&state, viewer.as_ref(), recipe).await?))
}

async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(input): JsonBody<RecipeInput>,
) -> Result<(StatusCode, Json<RecipeView>)> {
    let recipe = state.recipes.create(auth.id, input).await?;
    let view = recipe_view(&state, Some(&auth), recipe).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<RecipeInput>,
) -> Result<Json<RecipeView>> {
    let recipe = state.recipes.update(auth.actor(), id, input).await?;
    Ok(Json(recipe_view(&state, Some(&auth), recipe).await?))
}

async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode> {
    state.recipes.delete(auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_link(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<ShortLinkResponse>> {
    let link = state.short_links.resolve_or_create(id).await?;
    Ok(Json(ShortLinkResponse {
        short_link: state.short_links.short_url(&link),
    }))
}

async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<(StatusCode, Json<RecipeSummary>)> {
    add_mark(&state, RecipeMark::Favorite, &auth, id).await
}

async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode> {
    state.toggles.remove(RecipeMark::Favorite, auth.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<(StatusCode, Json<RecipeSummary>)> {
    add_mark(&state, RecipeMark::ShoppingCart, &auth, id).await
}

async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> Result<StatusCode> {
    state.toggles.remove(RecipeMark::ShoppingCart, auth.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_mark(
    state: &AppState,
    mark: RecipeMark,
    auth: &AuthUser,
    recipe_id: i64,
) -> Result<(StatusCode, Json<RecipeSummary>)> {
    let recipe = state.toggles.add(mark, auth.id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(recipe_summary(state, &recipe))))
}

async fn download_shopping_cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse> {
    let report = state.shopping_list.build(auth.id).await?.render();

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", SHOPPING_LIST_FILENAME),
            ),
        ],
        report,
    ))
}
