//! Service layer for Foodgram.
//!
//! Business rules on top of [`crate::db`]:
//! - Auth (registration, passwords, API tokens)
//! - Media (data-URL images on disk)
//! - Recipes (validated writes, ownership)
//! - Toggles (favorites and shopping cart)
//! - Follows (author subscriptions)
//! - ShoppingList (cart aggregation)
//! - ShortLinks (lazy per-recipe codes)

mod auth;
mod follows;
mod media;
mod recipes;
mod shopping_list;
mod short_links;
mod toggles;

pub use auth::{AuthService, TokenOwner};
pub use follows::{FollowService, Subscription};
pub use media::{DecodedImage, MediaKind, MediaStorage};
pub use recipes::{Actor, RecipeService};
pub use shopping_list::ShoppingListService;
pub use short_links::ShortLinkService;
pub use toggles::ToggleService;
