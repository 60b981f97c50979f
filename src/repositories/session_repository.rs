use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::AppResult,
    models::{
        domain::GameSession,
        dto::response::{LevelStatsDto, StudentOverallStatsDto},
    },
};

/// Admin-facing listing filter over completed sessions.
#[derive(Debug, Clone, Default)]
pub struct CompletedSessionFilter {
    pub level: Option<u8>,
    pub student_id: Option<String>,
    pub min_score: Option<u32>,
    pub max_score: Option<u32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: GameSession) -> AppResult<GameSession>;
    async fn find_by_id(&self, session_id: &str) -> AppResult<Option<GameSession>>;
    async fn find_in_progress(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>>;
    async fn find_completed(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>>;
    async fn find_for_student(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>>;
    /// Persists the given session over its stored in-progress revision.
    /// Returns false when no in-progress document matched, i.e. the
    /// session completed (or vanished) since it was loaded.
    async fn replace_in_progress(&self, session: &GameSession) -> AppResult<bool>;
    async fn completed_history(
        &self,
        student_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<GameSession>, i64)>;
    async fn list_completed(
        &self,
        filter: CompletedSessionFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<GameSession>, i64)>;
    async fn top_performers(&self, level: u8, limit: i64) -> AppResult<Vec<GameSession>>;
    async fn level_stats(&self, level: u8) -> AppResult<Option<LevelStatsDto>>;
    /// Per-level aggregates over completed sessions, level ascending.
    async fn level_breakdown(&self) -> AppResult<Vec<LevelStatsDto>>;
    /// The same aggregates scoped to one student's completed sessions.
    async fn student_level_breakdown(&self, student_id: &str) -> AppResult<Vec<LevelStatsDto>>;
    async fn student_overall_stats(
        &self,
        student_id: &str,
    ) -> AppResult<Option<StudentOverallStatsDto>>;
    async fn count_completed(&self) -> AppResult<u64>;
    async fn count_completed_since(&self, since: DateTime<Utc>) -> AppResult<u64>;
}

pub struct MongoSessionRepository {
    collection: Collection<GameSession>,
}

impl MongoSessionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("game_sessions");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for game_sessions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let student_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("student_created".to_string())
                    .build(),
            )
            .build();

        let level_index = IndexModel::builder()
            .keys(doc! { "level": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("level_status".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(student_index).await?;
        self.collection.create_index(level_index).await?;

        Ok(())
    }

    async fn level_breakdown_matching(&self, match_doc: Document) -> AppResult<Vec<LevelStatsDto>> {
        let pipeline = vec![
            doc! { "$match": match_doc },
            doc! { "$group": {
                "_id": "$level",
                "total_sessions": { "$sum": 1 },
                "average_score": { "$avg": "$score" },
                "average_percentage": { "$avg": "$percentage" },
                "average_time": { "$avg": "$time_taken_seconds" },
                "total_questions": { "$sum": "$total_questions" },
                "total_correct_answers": { "$sum": "$score" }
            }},
            doc! { "$sort": { "_id": 1 } },
            doc! { "$project": {
                "_id": 0,
                "level": "$_id",
                "total_sessions": 1,
                "average_score": 1,
                "average_percentage": 1,
                "average_time": 1,
                "total_questions": 1,
                "total_correct_answers": 1
            }},
        ];

        let stats = self
            .collection
            .aggregate(pipeline)
            .with_type::<LevelStatsDto>()
            .await?
            .try_collect()
            .await?;

        Ok(stats)
    }

    fn completed_filter_doc(filter: &CompletedSessionFilter) -> AppResult<Document> {
        let mut query = doc! { "status": "completed" };

        if let Some(level) = filter.level {
            query.insert("level", level as i32);
        }
        if let Some(student_id) = &filter.student_id {
            query.insert("student_id", student_id);
        }

        let mut score = Document::new();
        if let Some(min) = filter.min_score {
            score.insert("$gte", min as i64);
        }
        if let Some(max) = filter.max_score {
            score.insert("$lte", max as i64);
        }
        if !score.is_empty() {
            query.insert("score", score);
        }

        let mut created = Document::new();
        if let Some(start) = filter.start_date {
            created.insert("$gte", mongodb::bson::to_bson(&start)?);
        }
        if let Some(end) = filter.end_date {
            created.insert("$lte", mongodb::bson::to_bson(&end)?);
        }
        if !created.is_empty() {
            query.insert("created_at", created);
        }

        Ok(query)
    }
}

#[async_trait]
impl SessionRepository for MongoSessionRepository {
    async fn create(&self, session: GameSession) -> AppResult<GameSession> {
        self.collection.insert_one(&session).await?;
        Ok(session)
    }

    async fn find_by_id(&self, session_id: &str) -> AppResult<Option<GameSession>> {
        let session = self.collection.find_one(doc! { "id": session_id }).await?;
        Ok(session)
    }

    async fn find_in_progress(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>> {
        let session = self
            .collection
            .find_one(doc! {
                "id": session_id,
                "student_id": student_id,
                "status": "in_progress"
            })
            .await?;
        Ok(session)
    }

    async fn find_completed(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>> {
        let session = self
            .collection
            .find_one(doc! {
                "id": session_id,
                "student_id": student_id,
                "status": "completed"
            })
            .await?;
        Ok(session)
    }

    async fn find_for_student(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>> {
        let session = self
            .collection
            .find_one(doc! { "id": session_id, "student_id": student_id })
            .await?;
        Ok(session)
    }

    async fn replace_in_progress(&self, session: &GameSession) -> AppResult<bool> {
        let result = self
            .collection
            .replace_one(
                doc! {
                    "id": &session.id,
                    "student_id": &session.student_id,
                    "status": "in_progress"
                },
                session,
            )
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn completed_history(
        &self,
        student_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<GameSession>, i64)> {
        let filter = doc! { "student_id": student_id, "status": "completed" };

        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let sessions = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(offset as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok((sessions, total))
    }

    async fn list_completed(
        &self,
        filter: CompletedSessionFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<GameSession>, i64)> {
        let query = Self::completed_filter_doc(&filter)?;

        let total = self.collection.count_documents(query.clone()).await? as i64;

        let sessions = self
            .collection
            .find(query)
            .sort(doc! { "created_at": -1 })
            .skip(offset as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok((sessions, total))
    }

    async fn top_performers(&self, level: u8, limit: i64) -> AppResult<Vec<GameSession>> {
        // Percentage descending, faster completion winning ties.
        let sessions = self
            .collection
            .find(doc! { "level": level as i32, "status": "completed" })
            .sort(doc! { "percentage": -1, "time_taken_seconds": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok(sessions)
    }

    async fn level_stats(&self, level: u8) -> AppResult<Option<LevelStatsDto>> {
        let mut breakdown = self.level_breakdown().await?;
        breakdown.retain(|stats| stats.level == level);
        Ok(breakdown.into_iter().next())
    }

    async fn level_breakdown(&self) -> AppResult<Vec<LevelStatsDto>> {
        self.level_breakdown_matching(doc! { "status": "completed" })
            .await
    }

    async fn student_level_breakdown(&self, student_id: &str) -> AppResult<Vec<LevelStatsDto>> {
        self.level_breakdown_matching(doc! { "status": "completed", "student_id": student_id })
            .await
    }

    async fn student_overall_stats(
        &self,
        student_id: &str,
    ) -> AppResult<Option<StudentOverallStatsDto>> {
        let pipeline = vec![
            doc! { "$match": { "student_id": student_id, "status": "completed" } },
            doc! { "$group": {
                "_id": null,
                "total_sessions": { "$sum": 1 },
                "total_questions": { "$sum": "$total_questions" },
                "total_correct_answers": { "$sum": "$score" },
                "average_score": { "$avg": "$score" },
                "average_percentage": { "$avg": "$percentage" },
                "average_time": { "$avg": "$time_taken_seconds" },
                "best_score": { "$max": "$score" },
                "best_percentage": { "$max": "$percentage" }
            }},
            doc! { "$project": { "_id": 0 } },
        ];

        let mut stats: Vec<StudentOverallStatsDto> = self
            .collection
            .aggregate(pipeline)
            .with_type::<StudentOverallStatsDto>()
            .await?
            .try_collect()
            .await?;

        Ok(stats.pop())
    }

    async fn count_completed(&self) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "status": "completed" })
            .await?;
        Ok(count)
    }

    async fn count_completed_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! {
                "status": "completed",
                "created_at": { "$gte": mongodb::bson::to_bson(&since)? }
            })
            .await?;
        Ok(count)
    }
}
