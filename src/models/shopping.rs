//! Shopping list report.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::FromRow;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// One aggregated ingredient: every cart line for `(name, measurement_unit)` summed.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// A user's aggregated shopping list as of `date`.
#[derive(Debug, Clone)]
pub struct ShoppingList {
    pub date: NaiveDate,
    pub items: Vec<ShoppingItem>,
}

impl ShoppingList {
    /// Render the plain-text attachment.
    pub fn render(&self) -> String {
        let mut report = format!("Shopping list for: {}\n\n", self.date.format("%d-%m-%Y"));
        for item in &self.items {
            report.push_str(&format!(
                "{} - {} {}\n",
                item.name, item.amount, item.measurement_unit
            ));
        }
        report.push_str(&format!(
            "\n\nThank you for using Foodgram ({})",
            self.date.year()
        ));
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_report() {
        let list = ShoppingList {
            date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            items: vec![
                ShoppingItem {
                    name: "Salt".to_string(),
                    measurement_unit: "g".to_string(),
                    amount: 15,
                },
                ShoppingItem {
                    name: "Milk".to_string(),
                    measurement_unit: "ml".to_string(),
                    amount: 250,
                },
            ],
        };

        let report = list.render();
        assert_eq!(
            report,
            "Shopping list for: 07-03-2026\n\nSalt - 15 g\nMilk - 250 ml\n\n\nThank you for using Foodgram (2026)"
        );
    }
}
