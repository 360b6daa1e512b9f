//! User database queries.

use crate::error::FieldErrors;
use crate::models::UserRole;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::{violates_column, DbPool};

// ============================================================================
// User Types
// ============================================================================

/// User record from the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role_enum(&self) -> UserRole {
        UserRole::from_str(&self.role)
    }
}

/// Input for creating a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub role: UserRole,
}

// ============================================================================
// User Queries
// ============================================================================

/// Create a new user.
///
/// A taken email or username is reported as a field validation error.
pub async fn create_user(pool: &DbPool, input: CreateUser) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, username, first_name, last_name, password_hash, role, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.email)
    .bind(&input.username)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.password_hash)
    .bind(input.role.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if violates_column(&e, "users.email") {
            Error::Validation(FieldErrors::single(
                "email",
                "A user with that email already exists.",
            ))
        } else if violates_column(&e, "users.username") {
            Error::Validation(FieldErrors::single(
                "username",
                "A user with that username already exists.",
            ))
        } else {
            Error::Database(e)
        }
    })
}

/// Get a user by ID.
pub async fn get_user(pool: &DbPool, id: i64) -> Result<User> {
    find_user(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User not found: {}", id)))
}

/// Get a user by ID, if present.
pub async fn find_user(pool: &DbPool, id: i64) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Get a user by email (the login identity).
pub async fn get_user_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// List users ordered by ID.
pub async fn list_users(pool: &DbPool, limit: i64, offset: i64) -> Result<Vec<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id LIMIT ? OFFSET ?")
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}

pub async fn count_users(pool: &DbPool) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Set or clear the stored avatar path.
pub async fn set_user_avatar(pool: &DbPool, id: i64, avatar: Option<&str>) -> Result<User> {
    sqlx::query_as::<_, User>("UPDATE users SET avatar = ? WHERE id = ? RETURNING *")
        .bind(avatar)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User not found: {}", id)))
}

pub async fn set_user_password_hash(pool: &DbPool, id: i64, password_hash: &str) -> Result<()> {
    let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("User not found: {}", id)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{setup_test_db, user};

    #[tokio::test]
    async fn test_create_and_get_user() {
        let pool = setup_test_db().await;

        let created = user(&pool, "julia").await;
        assert_eq!(created.email, "julia@example.com");
        assert_eq!(created.role_enum(), UserRole::User);
        assert!(created.avatar.is_none());

        let fetched = get_user(&pool, created.id).await.unwrap();
        assert_eq!(fetched.username, "julia");

        let by_email = get_user_by_email(&pool, "julia@example.com").await.unwrap();
        assert_eq!(by_email.map(|u| u.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_field_error() {
        let pool = setup_test_db().await;
        user(&pool, "julia").await;

        let err = create_user(
            &pool,
            CreateUser {
                email: "julia@example.com".to_string(),
                username: "other".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                password_hash: "x".to_string(),
                role: UserRole::User,
            },
        )
        .await
        .unwrap_err();

        match err {
            Error::Validation(fields) => assert!(fields.contains("email")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_is_field_error() {
        let pool = setup_test_db().await;
        user(&pool, "julia").await;

        let err = create_user(
            &pool,
            CreateUser {
                email: "other@example.com".to_string(),
                username: "julia".to_string(),
                first_name: "A".to_string(),
                last_name: "B".to_string(),
                password_hash: "x".to_string(),
                role: UserRole::User,
            },
        )
        .await
        .unwrap_err();

        match err {
            Error::Validation(fields) => assert!(fields.contains("username")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_avatar_set_and_clear() {
        let pool = setup_test_db().await;
        let created = user(&pool, "julia").await;

        let updated = set_user_avatar(&pool, created.id, Some("users/a.png")).await.unwrap();
        assert_eq!(updated.avatar.as_deref(), Some("users/a.png"));

        let cleared = set_user_avatar(&pool, created.id, None).await.unwrap();
        assert!(cleared.avatar.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let pool = setup_test_db().await;
        assert!(matches!(get_user(&pool, 42).await, Err(Error::NotFound(_))));
    }
}
