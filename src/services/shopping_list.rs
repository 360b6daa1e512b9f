//! Shopping list aggregation over a user's cart.

use chrono::Utc;
use tracing::info;

use crate::config::ShoppingListOrder;
use crate::db::{self, DbPool, RecipeMark};
use crate::error::{Error, Result};
use crate::models::ShoppingList;

#[derive(Clone)]
pub struct ShoppingListService {
    db: DbPool,
    order: ShoppingListOrder,
}

impl ShoppingListService {
    pub fn new(db: DbPool, order: ShoppingListOrder) -> Self {
        Self { db, order }
    }

    /// Build today's shopping list. `EmptyCart` when nothing is in the cart.
    pub async fn build(&self, user_id: i64) -> Result<ShoppingList> {
        if db::count_recipe_marks(&self.db, RecipeMark::ShoppingCart, user_id).await? == 0 {
            return Err(Error::EmptyCart);
        }

        let items = db::aggregate_shopping_cart(&self.db, user_id, self.order).await?;
        info!(user_id, lines = items.len(), "Built shopping list");

        Ok(ShoppingList {
            date: Utc::now().date_naive(),
            items,
        })
    }
}
