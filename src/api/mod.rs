//! API Routes for Foodgram
//!
//! This module combines all API routes into a single router.

mod auth;
mod extract;
mod ingredients;
pub mod pagination;
mod recipes;
mod short_links;
mod users;
pub mod views;

use axum::Router;

use crate::middleware::authenticate;
use crate::AppState;

/// Build the API router (mounted under `/api`).
///
/// Route structure:
/// - /auth/token/* - Token login/logout
/// - /users/* - Registration, profiles, avatar, subscriptions
/// - /ingredients/* - Catalog (public)
/// - /recipes/* - Recipes, favorites, cart, shopping list, short links
///
/// Every route runs behind token resolution; anonymous requests pass
/// through and handlers decide whether a user is required.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(ingredients::routes())
        .merge(recipes::routes())
        .layer(axum::middleware::from_fn_with_state(state, authenticate))
}

/// Short link redirects, mounted at the site root.
pub fn short_link_routes() -> Router<AppState> {
    short_links::routes()
}
