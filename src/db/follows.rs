//! Follow links between users: `(follower, author)`, unique per pair, never self.

use crate::{Error, Result};

use super::{violation, DbPool, User, Violation};

/// Record that `user_id` follows `author_id`.
pub async fn add_follow(pool: &DbPool, user_id: i64, author_id: i64) -> Result<()> {
    sqlx::query("INSERT INTO follows (user_id, author_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await
        .map_err(|e| match violation(&e) {
            Some(Violation::Unique) => {
                Error::AlreadyExists(format!("Already subscribed to user {}", author_id))
            }
            Some(Violation::Check) => {
                Error::SelfReference("You cannot subscribe to yourself".to_string())
            }
            Some(Violation::ForeignKey) => Error::NotFound(format!("User not found: {}", author_id)),
            None => Error::Database(e),
        })?;

    Ok(())
}

/// Remove a follow link; `NotFound` when there is none.
pub async fn remove_follow(pool: &DbPool, user_id: i64, author_id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND author_id = ?")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!(
            "Not subscribed to user {}",
            author_id
        )));
    }

    Ok(())
}

pub async fn is_following(pool: &DbPool, user_id: i64, author_id: i64) -> Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM follows WHERE user_id = ? AND author_id = ?)",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Authors `user_id` follows, in the order they were followed.
pub async fn list_followed_authors(
    pool: &DbPool,
    user_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM follows f
        JOIN users u ON u.id = f.author_id
        WHERE f.user_id = ?
        ORDER BY f.id
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(Error::Database)
}

pub async fn count_followed_authors(pool: &DbPool, user_id: i64) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
