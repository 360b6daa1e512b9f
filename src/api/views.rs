//! Response shapes and the functions that build them.

use serde::Serialize;

use crate::db::{self, Recipe, RecipeLine, RecipeMark, User};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::services::Subscription;
use crate::AppState;

/// Public profile as seen by `viewer`.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

/// Registration response; no viewer-dependent fields.
#[derive(Debug, Serialize)]
pub struct RegisteredUserView {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Compact recipe used by toggles and subscriptions.
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub author: UserView,
    pub ingredients: Vec<RecipeLine>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

#[derive(Debug, Serialize)]
pub struct AvatarView {
    pub avatar: Option<String>,
}

pub async fn user_view(state: &AppState, viewer: Option<&AuthUser>, user: User) -> Result<UserView> {
    let is_subscribed = match viewer {
        Some(viewer) => state.follows.is_following(viewer.id, user.id).await?,
        None => false,
    };

    Ok(UserView {
        avatar: user.avatar.as_deref().map(|path| state.media.url(path)),
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
    })
}

pub fn registered_user_view(user: User) -> RegisteredUserView {
    RegisteredUserView {
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
    }
}

pub fn recipe_summary(state: &AppState, recipe: &Recipe) -> RecipeSummary {
    RecipeSummary {
        id: recipe.id,
        name: recipe.name.clone(),
        image: state.media.url(&recipe.image),
        cooking_time: recipe.cooking_time,
    }
}

pub async fn recipe_view(state: &AppState, viewer: Option<&AuthUser>, recipe: Recipe) -> Result<RecipeView> {
    let author = db::get_user(&state.db, recipe.author_id).await?;
    let author = user_view(state, viewer, author).await?;
    let ingredients = db::recipe_lines(&state.db, recipe.id).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => (
            state
                .toggles
                .is_marked(RecipeMark::Favorite, viewer.id, recipe.id)
                .await?,
            state
                .toggles
                .is_marked(RecipeMark::ShoppingCart, viewer.id, recipe.id)
                .await?,
        ),
        None => (false, false),
    };

    Ok(RecipeView {
        id: recipe.id,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        image: state.media.url(&recipe.image),
        name: recipe.name,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// Subscription entries are always subscribed from the viewer's side.
pub fn subscription_view(state: &AppState, subscription: Subscription) -> SubscriptionView {
    let author = subscription.author;
    SubscriptionView {
        user: UserView {
            avatar: author.avatar.as_deref().map(|path| state.media.url(path)),
            email: author.email,
            id: author.id,
            username: author.username,
            first_name: author.first_name,
            last_name: author.last_name,
            is_subscribed: true,
        },
        recipes: subscription
            .recipes
            .iter()
            .map(|recipe| recipe_summary(state, recipe))
            .collect(),
        recipes_count: subscription.recipes_count,
    }
}
