use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::category::{Category, Difficulty};

/// A gradeable financial statement line item in the catalog.
///
/// `id` is the business key ("CASH_01"-style), distinct from the Mongo
/// document identity, so answers keep referencing an item even if it is
/// later edited. `usage_count` and `correct_count` are the true running
/// counters; the published correct-answer rate is derived at read time.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub categories: Vec<Category>,
    pub explanation: String,
    pub level: u8,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_active: bool,
    pub usage_count: u32,
    pub correct_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CatalogItem {
    pub fn new(
        id: &str,
        name: &str,
        categories: Vec<Category>,
        explanation: &str,
        level: u8,
        difficulty: Difficulty,
        tags: Vec<String>,
    ) -> Self {
        CatalogItem {
            id: id.to_string(),
            name: name.to_string(),
            categories,
            explanation: explanation.to_string(),
            level,
            difficulty,
            tags,
            is_active: true,
            usage_count: 0,
            correct_count: 0,
            created_at: Some(Utc::now()),
            updated_at: Some(Utc::now()),
        }
    }

    pub fn is_multi_category(&self) -> bool {
        self.categories.len() > 1
    }

    /// Percentage of graded uses that were answered correctly, [0,100].
    pub fn correct_answer_rate(&self) -> u32 {
        crate::services::grading::correct_rate(self.correct_count, self.usage_count)
    }
}

#[cfg(test)]
impl CatalogItem {
    pub fn test_item(id: &str, category: Category, level: u8) -> Self {
        CatalogItem::new(
            id,
            &format!("Test line item {}", id),
            vec![category],
            "Test explanation long enough to be realistic.",
            level,
            Difficulty::Beginner,
            vec![],
        )
    }
}
