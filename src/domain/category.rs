//! Domain types representing expense and income categories.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Groups transactions for dashboards and filtering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type", default)]
    pub kind: CategoryKind,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Category {
    /// Builds a fresh, non-deleted category from caller-supplied fields.
    pub fn create(id: Uuid, fields: NewCategory, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            icon: fields.icon,
            color: fields.color,
            kind: fields.kind,
            is_default: fields.is_default,
            created_at: now,
            updated_at: now,
            is_deleted: false,
        }
    }

    /// Merges the supplied fields and refreshes `updated_at`.
    pub fn apply(&mut self, patch: CategoryPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        self.updated_at = now;
    }
}

impl Identifiable for Category {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} {} ({})", self.icon, self.name, self.kind)
    }
}

impl SoftDeletable for Category {
    fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.is_deleted = true;
        self.updated_at = now;
    }
}

/// Supported category types. Records written before incomes existed carry no
/// type and are treated as expense categories.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    #[default]
    Expense,
    Income,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryKind::Expense => "expense",
            CategoryKind::Income => "income",
        };
        f.write_str(label)
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "expense" => Ok(CategoryKind::Expense),
            "income" => Ok(CategoryKind::Income),
            other => Err(format!("unknown category type `{other}`")),
        }
    }
}

/// Caller-supplied fields for a new category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub kind: CategoryKind,
    pub is_default: bool,
}

impl NewCategory {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        color: impl Into<String>,
        kind: CategoryKind,
    ) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            kind,
            is_default: false,
        }
    }
}

/// Partial category update; `None` leaves a field unchanged. The default
/// flag is not patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub kind: Option<CategoryKind>,
}
