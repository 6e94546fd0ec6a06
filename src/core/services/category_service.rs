use std::collections::HashMap;

use uuid::Uuid;

use crate::domain::{
    defaults::{UNCATEGORIZED_COLOR, UNCATEGORIZED_ICON, UNCATEGORIZED_NAME},
    Category,
};

/// Presentation fields for a transaction's category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel {
    pub name: String,
    pub icon: String,
    pub color: String,
    /// False when the id did not match any category.
    pub known: bool,
}

impl CategoryLabel {
    pub fn uncategorized() -> Self {
        Self {
            name: UNCATEGORIZED_NAME.to_string(),
            icon: UNCATEGORIZED_ICON.to_string(),
            color: UNCATEGORIZED_COLOR.to_string(),
            known: false,
        }
    }

    fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            known: true,
        }
    }
}

/// Id-indexed view over a category list.
#[derive(Debug, Clone, Default)]
pub struct CategoryLookup<'a> {
    by_id: HashMap<Uuid, &'a Category>,
}

impl<'a> CategoryLookup<'a> {
    pub fn new(categories: impl IntoIterator<Item = &'a Category>) -> Self {
        Self {
            by_id: categories
                .into_iter()
                .map(|category| (category.id, category))
                .collect(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<&'a Category> {
        self.by_id.get(&id).copied()
    }

    /// Resolves an id, degrading to the Uncategorized label on a miss.
    pub fn resolve(&self, id: Uuid) -> CategoryLabel {
        self.get(id)
            .map(CategoryLabel::from_category)
            .unwrap_or_else(CategoryLabel::uncategorized)
    }
}

pub struct CategoryService;

impl CategoryService {
    /// Finds the category whose name equals `name` exactly.
    pub fn find_by_name<'a>(
        categories: impl IntoIterator<Item = &'a Category>,
        name: &str,
    ) -> Option<&'a Category> {
        categories.into_iter().find(|category| category.name == name)
    }

    /// Closest category name by edit distance, for "did you mean" hints.
    pub fn closest_name<'a>(
        categories: impl IntoIterator<Item = &'a Category>,
        name: &str,
    ) -> Option<&'a str> {
        let needle = name.to_lowercase();
        categories
            .into_iter()
            .map(|category| {
                let score = strsim::normalized_levenshtein(&needle, &category.name.to_lowercase());
                (category.name.as_str(), score)
            })
            .filter(|(_, score)| *score >= 0.5)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name)
    }
}
