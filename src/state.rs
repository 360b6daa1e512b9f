//! Application state for Foodgram.
//!
//! Contains the shared state that is passed to all handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::services::{
    AuthService, FollowService, MediaStorage, RecipeService, ShoppingListService,
    ShortLinkService, ToggleService,
};
use crate::Result;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    /// Startup configuration.
    pub config: Arc<Config>,
    /// Image storage under the media root.
    pub media: MediaStorage,
    pub auth: AuthService,
    pub recipes: RecipeService,
    /// Favorites and shopping cart.
    pub toggles: ToggleService,
    pub follows: FollowService,
    pub shopping_list: ShoppingListService,
    pub short_links: ShortLinkService,
}

impl AppState {
    /// Open the database, apply the schema and build every service.
    pub async fn new(config: Config) -> Result<Self> {
        let db = crate::db::init_pool(&config.database.path).await?;
        crate::db::initialize_schema(&db).await?;
        Ok(Self::from_parts(db, config))
    }

    /// Build the state around an already initialized pool.
    pub fn from_parts(db: DbPool, config: Config) -> Self {
        let media = MediaStorage::new(&config.storage, &config.server.public_url);

        let auth = AuthService::new(db.clone(), config.auth.clone());
        let recipes = RecipeService::new(db.clone(), media.clone());
        let toggles = ToggleService::new(db.clone());
        let follows = FollowService::new(db.clone());
        let shopping_list = ShoppingListService::new(db.clone(), config.shopping_list.order);
        let short_links = ShortLinkService::new(db.clone(), &config.server.public_url);

        Self {
            db,
            config: Arc::new(config),
            media,
            auth,
            recipes,
            toggles,
            follows,
            shopping_list,
            short_links,
        }
    }
}
