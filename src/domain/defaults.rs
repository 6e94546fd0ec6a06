//! Built-in categories seeded on first run.

use crate::domain::category::{CategoryKind, NewCategory};

/// Name shown for transactions whose category cannot be resolved.
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
pub const UNCATEGORIZED_ICON: &str = "❓";
pub const UNCATEGORIZED_COLOR: &str = "#9E9E9E";

const EXPENSE_DEFAULTS: &[(&str, &str, &str)] = &[
    ("Groceries", "🛒", "#4CAF50"),
    ("Rent", "🏠", "#FF5722"),
    ("Transport", "🚗", "#2196F3"),
    ("Entertainment", "🎬", "#9C27B0"),
    ("Utilities", "💡", "#FFC107"),
    ("Dining Out", "🍔", "#E91E63"),
    ("Shopping", "🛍️", "#009688"),
    ("Health", "❤️", "#F44336"),
    (UNCATEGORIZED_NAME, UNCATEGORIZED_ICON, UNCATEGORIZED_COLOR),
];

const INCOME_DEFAULTS: &[(&str, &str, &str)] = &[
    ("Salary", "💼", "#4CAF50"),
    ("Freelance", "💻", "#3F51B5"),
    ("Investments", "📈", "#00BCD4"),
    ("Gifts", "🎁", "#E91E63"),
    ("Other Income", "💰", "#8BC34A"),
];

/// Expense defaults followed by income defaults, all flagged as default.
pub fn default_categories() -> Vec<NewCategory> {
    let expense = EXPENSE_DEFAULTS
        .iter()
        .map(|entry| (entry, CategoryKind::Expense));
    let income = INCOME_DEFAULTS
        .iter()
        .map(|entry| (entry, CategoryKind::Income));
    expense
        .chain(income)
        .map(|(&(name, icon, color), kind)| NewCategory {
            is_default: true,
            ..NewCategory::new(name, icon, color, kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn defaults_are_flagged_and_unique() {
        let defaults = default_categories();
        assert_eq!(defaults.len(), EXPENSE_DEFAULTS.len() + INCOME_DEFAULTS.len());
        assert!(defaults.iter().all(|category| category.is_default));
        let names: HashSet<_> = defaults.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), defaults.len());
        assert!(names.contains(UNCATEGORIZED_NAME));
    }
}
