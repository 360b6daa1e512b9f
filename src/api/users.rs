//! User directory API endpoints.
//!
//! Registration and profiles are public; `me`, avatar, password and
//! subscription endpoints require a token.

use axum::{
    extract::{OriginalUri, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    db,
    error::{Error, Result},
    middleware::AuthUser,
    models::RegisterInput,
    services::MediaKind,
    AppState,
};

use super::extract::{JsonBody, PathParam};
use super::pagination::{Page, PageParams};
use super::views::{
    registered_user_view, subscription_view, user_view, AvatarView, RegisteredUserView,
    SubscriptionView, UserView,
};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub recipes_limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvatarRequest {
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetPasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/", get(list_users).post(register))
        .route("/users/me/", get(me))
        .route("/users/me/avatar/", put(update_avatar).delete(delete_avatar))
        .route("/users/set_password/", post(set_password))
        .route("/users/subscriptions/", get(subscriptions))
        .route("/users/:id/", get(get_user))
        .route("/users/:id/subscribe/", post(subscribe).delete(unsubscribe))
}

/// Numeric, non-negative `recipes_limit`; anything else means no cap.
fn recipes_limit(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.parse::<i64>().ok())
        .filter(|limit| *limit >= 0)
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_users(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Page<UserView>>> {
    let params = PageParams::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        &state.config.pagination,
    )?;

    let count = db::count_users(&state.db).await?;
    params.check_in_range(count)?;
    let users = db::list_users(&state.db, params.limit(), params.offset()).await?;

    let mut results = Vec::with_capacity(users.len());
    for user in users {
        results.push(user_view(&state, viewer.as_ref(), user).await?);
    }

    Ok(Json(Page::new(
        results,
        count,
        params,
        &state.config.server.public_url,
        &uri,
    )))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterInput>,
) -> Result<(StatusCode, Json<RegisteredUserView>)> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(registered_user_view(user))))
}

async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserView>> {
    let user = db::get_user(&state.db, auth.id).await?;
    Ok(Json(user_view(&state, Some(&auth), user).await?))
}

async fn get_user(
    State(state): State<AppState>,
    viewer: Option<AuthUser>,
    PathParam(id): PathParam<i64>,
) -> Result<Json<UserView>> {
    let user = db::get_user(&state.db, id).await?;
    Ok(Json(user_view(&state, viewer.as_ref(), user).await?))
}

async fn update_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<AvatarRequest>,
) -> Result<Json<AvatarView>> {
    let data_url = request
        .avatar
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| Error::field("avatar", "This field is required."))?;

    let path = state
        .media
        .save_data_url(MediaKind::Avatar, &data_url)
        .await
        .map_err(|e| match e {
            Error::InvalidInput(msg) => Error::field("avatar", msg),
            other => other,
        })?;

    let previous = db::get_user(&state.db, auth.id).await?.avatar;
    let user = match db::set_user_avatar(&state.db, auth.id, Some(&path)).await {
        Ok(user) => user,
        Err(e) => {
            state.media.remove(&path).await;
            return Err(e);
        }
    };
    if let Some(previous) = previous {
        state.media.remove(&previous).await;
    }

    tracing::info!(user_id = auth.id, "Updated avatar");
    Ok(Json(AvatarView {
        avatar: user.avatar.as_deref().map(|p| state.media.url(p)),
    }))
}

async fn delete_avatar(State(state): State<AppState>, auth: AuthUser) -> Result<StatusCode> {
    let user = db::get_user(&state.db, auth.id).await?;
    let avatar = user
        .avatar
        .ok_or_else(|| Error::InvalidInput("No avatar to delete".to_string()))?;

    db::set_user_avatar(&state.db, auth.id, None).await?;
    state.media.remove(&avatar).await;

    tracing::info!(user_id = auth.id, "Removed avatar");
    Ok(StatusCode::NO_CONTENT)
}

async fn set_password(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<SetPasswordRequest>,
) -> Result<StatusCode> {
    state
        .auth
        .set_password(auth.id, request.current_password, request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn subscriptions(
    State(state): State<AppState>,
    auth: AuthUser,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<Page<SubscriptionView>>> {
    let params = PageParams::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        &state.config.pagination,
    )?;

    let (count, page) = state
        .follows
        .subscriptions(
            auth.id,
            params.limit(),
            params.offset(),
            recipes_limit(query.recipes_limit.as_deref()),
        )
        .await?;
    params.check_in_range(count)?;

    let results = page
        .into_iter()
        .map(|subscription| subscription_view(&state, subscription))
        .collect();

    Ok(Json(Page::new(
        results,
        count,
        params,
        &state.config.server.public_url,
        &uri,
    )))
}

async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(author_id): PathParam<i64>,
    Query(query): Query<SubscribeQuery>,
) -> Result<(StatusCode, Json<SubscriptionView>)> {
    let subscription = state
        .follows
        .follow(auth.id, author_id, recipes_limit(query.recipes_limit.as_deref()))
        .await?;
    Ok((StatusCode::CREATED, Json(subscription_view(&state, subscription))))
}

async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(author_id): PathParam<i64>,
) -> Result<StatusCode> {
    state.follows.unfollow(auth.id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
