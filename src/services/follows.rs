//! Author subscriptions.

use tracing::{debug, info};

use crate::db::{self, DbPool, Recipe, User};
use crate::error::{Error, Result};

/// A followed author with their newest recipes.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub author: User,
    pub recipes: Vec<Recipe>,
    pub recipes_count: i64,
}

#[derive(Clone)]
pub struct FollowService {
    db: DbPool,
}

impl FollowService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Follow `author_id`.
    ///
    /// Checked in order: the author exists, it is not the caller, the pair
    /// is new.
    pub async fn follow(
        &self,
        user_id: i64,
        author_id: i64,
        recipes_limit: Option<i64>,
    ) -> Result<Subscription> {
        let author = db::get_user(&self.db, author_id).await?;

        if user_id == author_id {
            debug!(user_id, "Self-subscription rejected");
            return Err(Error::SelfReference(
                "You cannot subscribe to yourself".to_string(),
            ));
        }

        if let Err(e) = db::add_follow(&self.db, user_id, author_id).await {
            if matches!(e, Error::AlreadyExists(_)) {
                debug!(user_id, author_id, "Duplicate subscription rejected");
            }
            return Err(e);
        }

        info!(user_id, author_id, "Subscribed");
        self.subscription(author, recipes_limit).await
    }

    pub async fn unfollow(&self, user_id: i64, author_id: i64) -> Result<()> {
        db::get_user(&self.db, author_id).await?;
        db::remove_follow(&self.db, user_id, author_id).await?;

        info!(user_id, author_id, "Unsubscribed");
        Ok(())
    }

    pub async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        db::is_following(&self.db, user_id, author_id).await
    }

    /// One page of the authors `user_id` follows, with the total count.
    pub async fn subscriptions(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
        recipes_limit: Option<i64>,
    ) -> Result<(i64, Vec<Subscription>)> {
        let count = db::count_followed_authors(&self.db, user_id).await?;
        let authors = db::list_followed_authors(&self.db, user_id, limit, offset).await?;

        let mut page = Vec::with_capacity(authors.len());
        for author in authors {
            page.push(self.subscription(author, recipes_limit).await?);
        }

        Ok((count, page))
    }

    async fn subscription(&self, author: User, recipes_limit: Option<i64>) -> Result<Subscription> {
        let recipes = db::recipes_by_author(&self.db, author.id, recipes_limit).await?;
        let recipes_count = db::count_recipes_by_author(&self.db, author.id).await?;
        Ok(Subscription {
            author,
            recipes,
            recipes_count,
        })
    }
}
