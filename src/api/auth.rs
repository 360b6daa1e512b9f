//! Token login and logout.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, FieldErrors, Result},
    middleware::AuthUser,
    AppState,
};

use super::extract::JsonBody;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token/login/", post(login))
        .route("/auth/token/logout/", post(logout))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let mut errors = FieldErrors::new();
    let email = request.email.filter(|e| !e.trim().is_empty());
    let password = request.password.filter(|p| !p.is_empty());
    if email.is_none() {
        errors.add("email", "This field is required.");
    }
    if password.is_none() {
        errors.add("password", "This field is required.");
    }
    let (Some(email), Some(password)) = (email, password) else {
        return Err(Error::Validation(errors));
    };

    let auth_token = state.auth.login(&email, &password).await?;
    Ok(Json(LoginResponse { auth_token }))
}

async fn logout(State(state): State<AppState>, auth: AuthUser) -> Result<StatusCode> {
    state.auth.logout(&auth.token_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
