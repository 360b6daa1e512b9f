//! Auth service: registration, password checks and API tokens.
//!
//! Token format: `fg_{prefix}_{secret}` where:
//! - `fg_` is a fixed marker
//! - `{prefix}` is 8 alphanumeric chars used for lookup (`token_prefix`)
//! - the SHA-256 hex of the whole token is stored as `token_hash`
//!
//! The plaintext token is returned once at login and never stored.

use nanoid::nanoid;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::db::{self, ApiToken, CreateApiToken, CreateUser, DbPool, User};
use crate::error::{Error, FieldErrors, Result};
use crate::models::{RegisterInput, UserRole};

const TOKEN_MARKER: &str = "fg_";
const PREFIX_LEN: usize = 8;
const SECRET_LEN: usize = 40;

const ALPHANUMERIC: [char; 62] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
    'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
    'V', 'W', 'X', 'Y', 'Z',
];

/// A user resolved from a presented token.
#[derive(Debug, Clone)]
pub struct TokenOwner {
    pub token: ApiToken,
    pub user: User,
}

/// Service for authentication.
#[derive(Clone)]
pub struct AuthService {
    db: DbPool,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: DbPool, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Validate and store a new account.
    pub async fn register(&self, input: RegisterInput) -> Result<User> {
        let registration = input.validate()?;
        let password_hash = self.hash_password(registration.password).await?;

        let user = db::create_user(
            &self.db,
            CreateUser {
                email: registration.email,
                username: registration.username,
                first_name: registration.first_name,
                last_name: registration.last_name,
                password_hash,
                role: UserRole::User,
            },
        )
        .await?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Check credentials and issue a new token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let user = db::get_user_by_email(&self.db, email.trim())
            .await?
            .ok_or(Error::InvalidCredentials)?;

        if !self.verify_password(password, &user.password_hash).await? {
            debug!(user_id = user.id, "Rejected login");
            return Err(Error::InvalidCredentials);
        }

        let token = self.issue_token(user.id).await?;
        info!(user_id = user.id, "Issued API token");
        Ok(token)
    }

    /// Revoke one token.
    pub async fn logout(&self, token_id: &str) -> Result<()> {
        db::delete_api_token(&self.db, token_id).await?;
        info!(token_id = %token_id, "Revoked API token");
        Ok(())
    }

    /// Replace a password after checking the current one.
    pub async fn set_password(
        &self,
        user_id: i64,
        current_password: Option<String>,
        new_password: Option<String>,
    ) -> Result<()> {
        let mut errors = FieldErrors::new();
        let current = current_password.filter(|p| !p.is_empty());
        let new = new_password.filter(|p| !p.is_empty());
        if current.is_none() {
            errors.add("current_password", "This field is required.");
        }
        if new.is_none() {
            errors.add("new_password", "This field is required.");
        }
        let (Some(current), Some(new)) = (current, new) else {
            return Err(Error::Validation(errors));
        };

        let user = db::get_user(&self.db, user_id).await?;
        if !self.verify_password(&current, &user.password_hash).await? {
            return Err(Error::field("current_password", "Invalid password."));
        }

        let password_hash = self.hash_password(new).await?;
        db::set_user_password_hash(&self.db, user_id, &password_hash).await?;

        info!(user_id, "Changed password");
        Ok(())
    }

    /// Resolve a presented token to its owner.
    ///
    /// Malformed, unknown and mismatched tokens all fail with `InvalidToken`.
    pub async fn authenticate(&self, token: &str) -> Result<TokenOwner> {
        let prefix = token_prefix(token).ok_or(Error::InvalidToken)?;

        let stored = db::get_api_token_by_prefix(&self.db, prefix)
            .await?
            .ok_or(Error::InvalidToken)?;

        if !constant_time_eq(&hash_token(token), &stored.token_hash) {
            return Err(Error::InvalidToken);
        }

        let user = db::find_user(&self.db, stored.user_id)
            .await?
            .ok_or(Error::InvalidToken)?;

        db::touch_api_token(&self.db, &stored.id).await?;

        Ok(TokenOwner { token: stored, user })
    }

    async fn issue_token(&self, user_id: i64) -> Result<String> {
        let prefix = nanoid!(PREFIX_LEN, &ALPHANUMERIC);
        let token = format!("{}{}_{}", TOKEN_MARKER, prefix, nanoid!(SECRET_LEN));

        db::create_api_token(
            &self.db,
            CreateApiToken {
                id: nanoid!(),
                user_id,
                token_prefix: prefix,
                token_hash: hash_token(&token),
            },
        )
        .await?;

        Ok(token)
    }

    async fn hash_password(&self, password: String) -> Result<String> {
        let cost = self.config.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| Error::Internal(format!("Password check task failed: {}", e)))
    }
}

/// The lookup prefix of a well-formed token.
fn token_prefix(token: &str) -> Option<&str> {
    let body = token.strip_prefix(TOKEN_MARKER)?;
    let prefix = body.get(..PREFIX_LEN)?;
    let secret = body.get(PREFIX_LEN..)?.strip_prefix('_')?;
    (!secret.is_empty()).then_some(prefix)
}

/// Hash a token using SHA-256.
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time string comparison.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
