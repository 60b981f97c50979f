use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{CatalogItem, Category},
        dto::{
            request::{CreateItemRequest, UpdateItemRequest},
            response::{
                ItemStatsDto, ItemStatsSummary, QuestionDto, QuestionListResponse,
                QuestionStatsResponse,
            },
        },
    },
    repositories::ItemRepository,
    services::session_service::validate_level,
};

pub struct ItemService {
    repository: Arc<dyn ItemRepository>,
}

impl ItemService {
    pub fn new(repository: Arc<dyn ItemRepository>) -> Self {
        Self { repository }
    }

    /// Random question sample for a level. Fewer results than requested
    /// is fine; an empty catalog for the level is a not-found condition.
    pub async fn questions_by_level(
        &self,
        level: u8,
        count: u32,
    ) -> AppResult<QuestionListResponse> {
        validate_level(level)?;

        let items = self.repository.sample_by_level(level, count).await?;

        if items.is_empty() {
            return Err(AppError::NotFound(
                "No questions found for this level".to_string(),
            ));
        }

        let questions: Vec<QuestionDto> = items.into_iter().map(QuestionDto::from).collect();
        Ok(QuestionListResponse {
            total_questions: questions.len(),
            questions,
            level,
        })
    }

    pub async fn create_item(&self, request: CreateItemRequest) -> AppResult<CatalogItem> {
        validate_category_set(&request.categories, request.level)?;

        let item = CatalogItem::new(
            &request.id,
            &request.name,
            request.categories,
            &request.explanation,
            request.level,
            request.difficulty,
            request.tags,
        );

        let item = self.repository.create(item).await?;
        log::info!("catalog item {} created at level {}", item.id, item.level);
        Ok(item)
    }

    pub async fn update_item(
        &self,
        item_id: &str,
        request: UpdateItemRequest,
    ) -> AppResult<CatalogItem> {
        let mut item = self
            .repository
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Catalog item with id '{}' not found", item_id))
            })?;

        if let Some(name) = request.name {
            item.name = name;
        }
        if let Some(explanation) = request.explanation {
            item.explanation = explanation;
        }
        if let Some(level) = request.level {
            item.level = level;
        }
        if let Some(difficulty) = request.difficulty {
            item.difficulty = difficulty;
        }
        if let Some(tags) = request.tags {
            item.tags = tags;
        }
        if let Some(is_active) = request.is_active {
            item.is_active = is_active;
        }
        if let Some(categories) = request.categories {
            item.categories = categories;
        }

        // Level and category set are validated together since either
        // side of the pair may have changed.
        validate_level(item.level)?;
        validate_category_set(&item.categories, item.level)?;
        item.updated_at = Some(chrono::Utc::now());

        self.repository.update(item).await
    }

    pub async fn deactivate_item(&self, item_id: &str) -> AppResult<()> {
        self.repository.deactivate(item_id).await?;
        log::info!("catalog item {} deactivated", item_id);
        Ok(())
    }

    pub async fn question_stats(&self, level: Option<u8>) -> AppResult<QuestionStatsResponse> {
        if let Some(level) = level {
            validate_level(level)?;
        }

        let items = self.repository.list_active(level).await?;

        let total_usage: u64 = items.iter().map(|i| i.usage_count as u64).sum();
        let average_correct_rate = if items.is_empty() {
            0
        } else {
            let rate_sum: u64 = items.iter().map(|i| i.correct_answer_rate() as u64).sum();
            ((rate_sum as f64) / (items.len() as f64)).round() as u32
        };

        Ok(QuestionStatsResponse {
            summary: ItemStatsSummary {
                total_questions: items.len(),
                total_usage,
                average_correct_rate,
            },
            questions: items.iter().map(ItemStatsDto::from).collect(),
        })
    }
}

/// Category-set invariants: 1 or 2 distinct values, and two values only
/// on level 4 items.
fn validate_category_set(categories: &[Category], level: u8) -> AppResult<()> {
    if categories.is_empty() {
        return Err(AppError::ValidationError(
            "An item must carry at least one category".to_string(),
        ));
    }
    if categories.len() > 2 {
        return Err(AppError::ValidationError(
            "An item carries at most two categories".to_string(),
        ));
    }
    if categories.len() == 2 {
        if categories[0] == categories[1] {
            return Err(AppError::ValidationError(
                "Duplicate categories are not allowed".to_string(),
            ));
        }
        if level != 4 {
            return Err(AppError::ValidationError(
                "Only level 4 items may carry two categories".to_string(),
            ));
        }
    }
    Ok(())
}
