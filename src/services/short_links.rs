//! Short link resolver: lazily assigned, stable codes per recipe.

use nanoid::nanoid;
use tracing::{debug, info};

use crate::db::{self, violation, DbPool, ShortLink, Violation};
use crate::error::{Error, Result};

const CODE_LEN: usize = 8;
const MAX_ATTEMPTS: usize = 5;

#[derive(Clone)]
pub struct ShortLinkService {
    db: DbPool,
    public_url: String,
}

impl ShortLinkService {
    pub fn new(db: DbPool, public_url: &str) -> Self {
        Self {
            db,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Return the recipe's short link, creating it on first use.
    ///
    /// A unique violation means either a concurrent request created the
    /// link first (returned as is) or the code collided (a fresh code is
    /// tried).
    pub async fn resolve_or_create(&self, recipe_id: i64) -> Result<ShortLink> {
        db::get_recipe(&self.db, recipe_id).await?;

        if let Some(link) = db::get_short_link_for_recipe(&self.db, recipe_id).await? {
            return Ok(link);
        }

        let destination = format!("/recipes/{}", recipe_id);
        for attempt in 1..=MAX_ATTEMPTS {
            let code = nanoid!(CODE_LEN);
            match db::insert_short_link(&self.db, &code, recipe_id, &destination).await {
                Ok(link) => {
                    info!(recipe_id, code = %link.code, "Created short link");
                    return Ok(link);
                }
                Err(e) if violation(&e) == Some(Violation::Unique) => {
                    if let Some(link) = db::get_short_link_for_recipe(&self.db, recipe_id).await? {
                        return Ok(link);
                    }
                    debug!(recipe_id, attempt, "Short code collision, retrying");
                }
                Err(e) if violation(&e) == Some(Violation::ForeignKey) => {
                    return Err(Error::NotFound(format!("Recipe not found: {}", recipe_id)));
                }
                Err(e) => return Err(Error::Database(e)),
            }
        }

        Err(Error::Internal(format!(
            "Could not allocate a short code for recipe {}",
            recipe_id
        )))
    }

    /// Absolute redirect target for `code`; `NotFound` when unknown.
    pub async fn redirect(&self, code: &str) -> Result<String> {
        let link = db::get_short_link(&self.db, code)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Short link not found: {}", code)))?;
        Ok(format!("{}{}", self.public_url, link.destination))
    }

    /// Public URL of a short link.
    pub fn short_url(&self, link: &ShortLink) -> String {
        format!("{}/s/{}", self.public_url, link.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{ingredient, recipe, setup_test_db, user};

    #[tokio::test]
    async fn test_link_is_stable() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let soup = recipe(&pool, julia.id, "Soup", &[(salt.id, 5)]).await;
        let links = ShortLinkService::new(pool, "http://testserver/");

        let first = links.resolve_or_create(soup.id).await.unwrap();
        let second = links.resolve_or_create(soup.id).await.unwrap();
        assert_eq!(first.code, second.code);
        assert_eq!(first.code.len(), CODE_LEN);
        assert_eq!(
            links.short_url(&first),
            format!("http://testserver/s/{}", first.code)
        );

        assert_eq!(
            links.redirect(&first.code).await.unwrap(),
            format!("http://testserver/recipes/{}", soup.id)
        );
    }

    #[tokio::test]
    async fn test_unknown_code_and_recipe() {
        let pool = setup_test_db().await;
        let links = ShortLinkService::new(pool, "http://testserver");

        assert!(matches!(links.redirect("nothing1").await, Err(Error::NotFound(_))));
        assert!(matches!(links.resolve_or_create(7).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_existing_link_wins_over_new_code() {
        let pool = setup_test_db().await;
        let julia = user(&pool, "julia").await;
        let salt = ingredient(&pool, "Salt", "g").await;
        let soup = recipe(&pool, julia.id, "Soup", &[(salt.id, 5)]).await;

        let destination = format!("/recipes/{}", soup.id);
        db::insert_short_link(&pool, "earlybrd", soup.id, &destination)
            .await
            .unwrap();

        let links = ShortLinkService::new(pool, "http://testserver");
        assert_eq!(links.resolve_or_create(soup.id).await.unwrap().code, "earlybrd");
    }
}
