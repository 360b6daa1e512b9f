//! Shopping cart aggregation.

use crate::config::ShoppingListOrder;
use crate::models::ShoppingItem;
use crate::{Error, Result};

use super::DbPool;

/// Sum every ingredient line across the recipes in a user's cart.
///
/// Lines are grouped by `(name, measurement_unit)`; equal amounts from
/// different recipes are all counted.
pub async fn aggregate_shopping_cart(
    pool: &DbPool,
    user_id: i64,
    order: ShoppingListOrder,
) -> Result<Vec<ShoppingItem>> {
    let order_by = match order {
        ShoppingListOrder::Amount => "amount ASC, i.name ASC, i.measurement_unit ASC",
        ShoppingListOrder::Name => "i.name ASC, i.measurement_unit ASC",
    };

    let query = format!(
        r#"
        SELECT i.name AS name, i.measurement_unit AS measurement_unit, SUM(ri.amount) AS amount
        FROM shopping_cart c
        JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE c.user_id = ?
        GROUP BY i.name, i.measurement_unit
        ORDER BY {}
        "#,
        order_by
    );

    sqlx::query_as::<_, ShoppingItem>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Error::Database)
}
