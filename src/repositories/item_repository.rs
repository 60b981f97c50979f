use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::CatalogItem,
};

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, item: CatalogItem) -> AppResult<CatalogItem>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<CatalogItem>>;
    /// Up to `count` distinct active items at the level, uniformly at
    /// random without replacement. Fewer than `count` results is valid.
    async fn sample_by_level(&self, level: u8, count: u32) -> AppResult<Vec<CatalogItem>>;
    /// Atomically bumps the usage counters of an active item and returns
    /// the updated document. Unknown or inactive ids are an error, never
    /// a silent no-op.
    async fn record_usage(&self, item_id: &str, was_correct: bool) -> AppResult<CatalogItem>;
    async fn update(&self, item: CatalogItem) -> AppResult<CatalogItem>;
    async fn deactivate(&self, item_id: &str) -> AppResult<()>;
    async fn list_active(&self, level: Option<u8>) -> AppResult<Vec<CatalogItem>>;
    async fn count_active(&self) -> AppResult<u64>;
}

pub struct MongoItemRepository {
    collection: Collection<CatalogItem>,
}

impl MongoItemRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("catalog_items");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for catalog_items collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let level_active_index = IndexModel::builder()
            .keys(doc! { "level": 1, "is_active": 1 })
            .options(
                IndexOptions::builder()
                    .name("level_active".to_string())
                    .build(),
            )
            .build();

        let usage_index = IndexModel::builder()
            .keys(doc! { "usage_count": -1 })
            .options(IndexOptions::builder().name("usage".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(level_active_index).await?;
        self.collection.create_index(usage_index).await?;

        Ok(())
    }
}

#[async_trait]
impl ItemRepository for MongoItemRepository {
    async fn create(&self, item: CatalogItem) -> AppResult<CatalogItem> {
        let existing = self.collection.find_one(doc! { "id": &item.id }).await?;
        if existing.is_some() {
            return Err(AppError::AlreadyExists(format!(
                "Catalog item with id '{}' already exists",
                item.id
            )));
        }

        self.collection.insert_one(&item).await?;
        Ok(item)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<CatalogItem>> {
        let item = self.collection.find_one(doc! { "id": id }).await?;
        Ok(item)
    }

    async fn sample_by_level(&self, level: u8, count: u32) -> AppResult<Vec<CatalogItem>> {
        let pipeline = vec![
            doc! { "$match": { "level": level as i32, "is_active": true } },
            doc! { "$sample": { "size": count as i32 } },
        ];

        let items = self
            .collection
            .aggregate(pipeline)
            .with_type::<CatalogItem>()
            .await?
            .try_collect()
            .await?;

        Ok(items)
    }

    async fn record_usage(&self, item_id: &str, was_correct: bool) -> AppResult<CatalogItem> {
        let correct_inc: i32 = if was_correct { 1 } else { 0 };

        let item = self
            .collection
            .find_one_and_update(
                doc! { "id": item_id, "is_active": true },
                doc! { "$inc": { "usage_count": 1, "correct_count": correct_inc } },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Catalog item with id '{}' not found", item_id))
            })?;

        Ok(item)
    }

    async fn update(&self, item: CatalogItem) -> AppResult<CatalogItem> {
        let result = self
            .collection
            .replace_one(doc! { "id": &item.id }, &item)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Catalog item with id '{}' not found",
                item.id
            )));
        }

        Ok(item)
    }

    async fn deactivate(&self, item_id: &str) -> AppResult<()> {
        let result = self
            .collection
            .update_one(
                doc! { "id": item_id },
                doc! { "$set": { "is_active": false } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Catalog item with id '{}' not found",
                item_id
            )));
        }

        Ok(())
    }

    async fn list_active(&self, level: Option<u8>) -> AppResult<Vec<CatalogItem>> {
        let mut filter = doc! { "is_active": true };
        if let Some(level) = level {
            filter.insert("level", level as i32);
        }

        let items = self
            .collection
            .find(filter)
            .sort(doc! { "usage_count": -1 })
            .await?
            .try_collect()
            .await?;

        Ok(items)
    }

    async fn count_active(&self) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "is_active": true })
            .await?;
        Ok(count)
    }
}
