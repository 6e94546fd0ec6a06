//! Best-effort extraction of expense details from free-form text.

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Category;

pub use gemini::GeminiParser;

/// Fields proposed by the assist for a new expense.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedExpense {
    pub description: String,
    pub amount: f64,
    /// Name of the best matching category, or "Uncategorized".
    pub category_suggestion: String,
}

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("no API key configured for the parsing assist")]
    MissingCredential,
    #[error("request to the parsing service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("parsing service returned {status}: {body}")]
    Service { status: u16, body: String },
    #[error("parsing service returned no content")]
    EmptyResponse,
    #[error("parsing service returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Turns free-form text into a proposed expense.
///
/// Implementations never fail past this boundary: anything that goes wrong
/// is logged and reported as `None`, and the caller falls back to manual entry.
#[async_trait]
pub trait ExpenseParser: Send + Sync {
    async fn parse_expense(&self, text: &str, categories: &[Category]) -> Option<ParsedExpense>;
}

/// Maps a suggested category name back to an id by exact name match.
pub fn match_category(parsed: &ParsedExpense, categories: &[Category]) -> Option<Uuid> {
    categories
        .iter()
        .find(|category| category.name == parsed.category_suggestion)
        .map(|category| category.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryKind, NewCategory};
    use chrono::Utc;

    #[test]
    fn match_category_requires_exact_name() {
        let dining = Category::create(
            Uuid::new_v4(),
            NewCategory::new("Dining Out", "🍔", "#E91E63", CategoryKind::Expense),
            Utc::now(),
        );
        let categories = vec![dining.clone()];
        let mut parsed = ParsedExpense {
            description: "Lunch".into(),
            amount: 9.5,
            category_suggestion: "Dining Out".into(),
        };
        assert_eq!(match_category(&parsed, &categories), Some(dining.id));

        parsed.category_suggestion = "dining out".into();
        assert_eq!(match_category(&parsed, &categories), None);
    }

    #[test]
    fn parsed_expense_uses_camel_case_fields() {
        let parsed: ParsedExpense = serde_json::from_str(
            r#"{"description": "Taxi", "amount": 23.4, "categorySuggestion": "Transport"}"#,
        )
        .unwrap();
        assert_eq!(parsed.category_suggestion, "Transport");
    }
}
