//! API token authentication middleware.
//!
//! Accepts `Authorization: Token {token}` and `Authorization: Bearer {token}`.
//! A request without a token proceeds anonymously; a request presenting
//! a token that does not resolve is rejected with 401.
//!
//! Token format: `fg_{prefix}_{secret}` (see [`crate::services::AuthService`]).

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::models::UserRole;
use crate::services::{Actor, TokenOwner};
use crate::{error::Error, AppState};

const SCHEMES: [&str; 2] = ["Token ", "Bearer "];

/// Authenticated caller, injected into request extensions by [`authenticate`].
///
/// Extracting `AuthUser` rejects anonymous requests with 401; extract
/// `Option<AuthUser>` where anonymous callers are allowed.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub role: UserRole,
    /// Token used for this request (revoked on logout).
    pub token_id: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            is_admin: self.is_admin(),
        }
    }
}

impl From<TokenOwner> for AuthUser {
    fn from(owner: TokenOwner) -> Self {
        Self {
            id: owner.user.id,
            role: owner.user.role_enum(),
            username: owner.user.username,
            token_id: owner.token.id,
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(Error::Unauthenticated)
    }
}

/// Extract the token from the Authorization header, if one is present.
fn extract_token(req: &Request<Body>) -> Option<String> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    SCHEMES
        .iter()
        .find_map(|scheme| value.strip_prefix(scheme))
        .map(|token| token.trim().to_string())
}

/// Middleware resolving the caller's token, if any.
///
/// # Errors
///
/// Returns 401 Unauthorized if a token is presented but is malformed,
/// unknown, or does not match its stored hash.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Error> {
    if let Some(token) = extract_token(&req) {
        let owner = state.auth.authenticate(&token).await?;
        tracing::debug!(user_id = owner.user.id, "Authenticated request");
        req.extensions_mut().insert(AuthUser::from(owner));
    }

    Ok(next.run(req).await)
}
