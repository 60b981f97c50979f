// Shared by multiple integration test binaries; not every binary uses
// every helper.
#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use finquiz_server::{
    errors::{AppError, AppResult},
    models::{
        domain::{CatalogItem, GameSession, SessionStatus, User, UserRole},
        dto::response::{LevelStatsDto, StudentOverallStatsDto},
    },
    repositories::{
        CompletedSessionFilter, ItemRepository, SessionRepository, UserRepository,
    },
};

pub struct InMemoryItemRepository {
    items: Arc<RwLock<HashMap<String, CatalogItem>>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn seed(&self, items: Vec<CatalogItem>) {
        let mut map = self.items.write().await;
        for item in items {
            map.insert(item.id.clone(), item);
        }
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, item: CatalogItem) -> AppResult<CatalogItem> {
        let mut items = self.items.write().await;
        if items.contains_key(&item.id) {
            return Err(AppError::AlreadyExists(format!(
                "Catalog item with id '{}' already exists",
                item.id
            )));
        }
        items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<CatalogItem>> {
        let items = self.items.read().await;
        Ok(items.get(id).cloned())
    }

    async fn sample_by_level(&self, level: u8, count: u32) -> AppResult<Vec<CatalogItem>> {
        let items = self.items.read().await;
        let mut candidates: Vec<_> = items
            .values()
            .filter(|i| i.level == level && i.is_active)
            .cloned()
            .collect();

        candidates.shuffle(&mut rand::rng());
        candidates.truncate(count as usize);
        Ok(candidates)
    }

    async fn record_usage(&self, item_id: &str, was_correct: bool) -> AppResult<CatalogItem> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(item_id)
            .filter(|i| i.is_active)
            .ok_or_else(|| {
                AppError::NotFound(format!("Catalog item with id '{}' not found", item_id))
            })?;

        item.usage_count += 1;
        if was_correct {
            item.correct_count += 1;
        }
        Ok(item.clone())
    }

    async fn update(&self, item: CatalogItem) -> AppResult<CatalogItem> {
        let mut items = self.items.write().await;
        if !items.contains_key(&item.id) {
            return Err(AppError::NotFound(format!(
                "Catalog item with id '{}' not found",
                item.id
            )));
        }
        items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn deactivate(&self, item_id: &str) -> AppResult<()> {
        let mut items = self.items.write().await;
        let item = items.get_mut(item_id).ok_or_else(|| {
            AppError::NotFound(format!("Catalog item with id '{}' not found", item_id))
        })?;
        item.is_active = false;
        Ok(())
    }

    async fn list_active(&self, level: Option<u8>) -> AppResult<Vec<CatalogItem>> {
        let items = self.items.read().await;
        let mut active: Vec<_> = items
            .values()
            .filter(|i| i.is_active && level.map(|l| i.level == l).unwrap_or(true))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        Ok(active)
    }

    async fn count_active(&self) -> AppResult<u64> {
        let items = self.items.read().await;
        Ok(items.values().filter(|i| i.is_active).count() as u64)
    }
}

pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<String, GameSession>>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn completed<'a>(
        sessions: &'a HashMap<String, GameSession>,
    ) -> impl Iterator<Item = &'a GameSession> {
        sessions
            .values()
            .filter(|s| s.status == SessionStatus::Completed)
    }

    async fn breakdown_for(&self, student_id: Option<&str>) -> AppResult<Vec<LevelStatsDto>> {
        let sessions = self.sessions.read().await;
        let mut by_level: HashMap<u8, Vec<&GameSession>> = HashMap::new();
        for session in Self::completed(&sessions)
            .filter(|s| student_id.map(|id| s.student_id == id).unwrap_or(true))
        {
            by_level.entry(session.level).or_default().push(session);
        }

        let mut stats: Vec<_> = by_level
            .into_iter()
            .map(|(level, sessions)| Self::aggregate(&sessions, level))
            .collect();
        stats.sort_by_key(|s| s.level);
        Ok(stats)
    }

    fn aggregate(sessions: &[&GameSession], level: u8) -> LevelStatsDto {
        let count = sessions.len() as i64;
        let sum_score: i64 = sessions.iter().map(|s| s.score as i64).sum();
        let sum_pct: i64 = sessions.iter().map(|s| s.percentage as i64).sum();
        let sum_time: i64 = sessions.iter().map(|s| s.time_taken_seconds).sum();
        LevelStatsDto {
            level,
            total_sessions: count,
            average_score: sum_score as f64 / count as f64,
            average_percentage: sum_pct as f64 / count as f64,
            average_time: sum_time as f64 / count as f64,
            total_questions: sessions.iter().map(|s| s.total_questions as i64).sum(),
            total_correct_answers: sum_score,
        }
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: GameSession) -> AppResult<GameSession> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            return Err(AppError::AlreadyExists(format!(
                "Session with id '{}' already exists",
                session.id
            )));
        }
        sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, session_id: &str) -> AppResult<Option<GameSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn find_in_progress(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|s| s.student_id == student_id && s.status == SessionStatus::InProgress)
            .cloned())
    }

    async fn find_completed(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|s| s.student_id == student_id && s.status == SessionStatus::Completed)
            .cloned())
    }

    async fn find_for_student(
        &self,
        session_id: &str,
        student_id: &str,
    ) -> AppResult<Option<GameSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .filter(|s| s.student_id == student_id)
            .cloned())
    }

    async fn replace_in_progress(&self, session: &GameSession) -> AppResult<bool> {
        let mut sessions = self.sessions.write().await;
        let matched = sessions
            .get(&session.id)
            .map(|s| {
                s.student_id == session.student_id && s.status == SessionStatus::InProgress
            })
            .unwrap_or(false);

        if matched {
            sessions.insert(session.id.clone(), session.clone());
        }
        Ok(matched)
    }

    async fn completed_history(
        &self,
        student_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<GameSession>, i64)> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<_> = Self::completed(&sessions)
            .filter(|s| s.student_id == student_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let start = (offset.max(0) as usize).min(matching.len());
        let end = (start + limit.max(0) as usize).min(matching.len());
        Ok((matching[start..end].to_vec(), total))
    }

    async fn list_completed(
        &self,
        filter: CompletedSessionFilter,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<GameSession>, i64)> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<_> = Self::completed(&sessions)
            .filter(|s| filter.level.map(|l| s.level == l).unwrap_or(true))
            .filter(|s| {
                filter
                    .student_id
                    .as_deref()
                    .map(|id| s.student_id == id)
                    .unwrap_or(true)
            })
            .filter(|s| filter.min_score.map(|m| s.score >= m).unwrap_or(true))
            .filter(|s| filter.max_score.map(|m| s.score <= m).unwrap_or(true))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let start = (offset.max(0) as usize).min(matching.len());
        let end = (start + limit.max(0) as usize).min(matching.len());
        Ok((matching[start..end].to_vec(), total))
    }

    async fn top_performers(&self, level: u8, limit: i64) -> AppResult<Vec<GameSession>> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<_> = Self::completed(&sessions)
            .filter(|s| s.level == level)
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.percentage
                .cmp(&a.percentage)
                .then(a.time_taken_seconds.cmp(&b.time_taken_seconds))
        });
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn level_stats(&self, level: u8) -> AppResult<Option<LevelStatsDto>> {
        let breakdown = self.level_breakdown().await?;
        Ok(breakdown.into_iter().find(|s| s.level == level))
    }

    async fn level_breakdown(&self) -> AppResult<Vec<LevelStatsDto>> {
        self.breakdown_for(None).await
    }

    async fn student_level_breakdown(&self, student_id: &str) -> AppResult<Vec<LevelStatsDto>> {
        self.breakdown_for(Some(student_id)).await
    }

    async fn student_overall_stats(
        &self,
        student_id: &str,
    ) -> AppResult<Option<StudentOverallStatsDto>> {
        let sessions = self.sessions.read().await;
        let matching: Vec<_> = Self::completed(&sessions)
            .filter(|s| s.student_id == student_id)
            .collect();

        if matching.is_empty() {
            return Ok(None);
        }

        let count = matching.len() as i64;
        let sum_score: i64 = matching.iter().map(|s| s.score as i64).sum();
        let sum_pct: i64 = matching.iter().map(|s| s.percentage as i64).sum();
        let sum_time: i64 = matching.iter().map(|s| s.time_taken_seconds).sum();

        Ok(Some(StudentOverallStatsDto {
            total_sessions: count,
            total_questions: matching.iter().map(|s| s.total_questions as i64).sum(),
            total_correct_answers: sum_score,
            average_score: sum_score as f64 / count as f64,
            average_percentage: sum_pct as f64 / count as f64,
            average_time: sum_time as f64 / count as f64,
            best_score: matching.iter().map(|s| s.score as i64).max().unwrap_or(0),
            best_percentage: matching
                .iter()
                .map(|s| s.percentage as i64)
                .max()
                .unwrap_or(0),
        }))
    }

    async fn count_completed(&self) -> AppResult<u64> {
        let sessions = self.sessions.read().await;
        Ok(Self::completed(&sessions).count() as u64)
    }

    async fn count_completed_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        let sessions = self.sessions.read().await;
        Ok(Self::completed(&sessions)
            .filter(|s| s.created_at.map(|c| c >= since).unwrap_or(false))
            .count() as u64)
    }
}

pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::AlreadyExists(format!(
                "User with username '{}' already exists",
                user.username
            )));
        }

        let mut user = user;
        if user.id.is_none() {
            user.id = Some(ObjectId::new());
        }
        let key = user.id.as_ref().map(|oid| oid.to_hex()).unwrap();
        users.insert(key, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_student_by_identifier(
        &self,
        mobile_number: Option<&str>,
        student_id: Option<&str>,
    ) -> AppResult<Option<User>> {
        if mobile_number.is_none() && student_id.is_none() {
            return Ok(None);
        }

        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| {
                u.role == UserRole::Student
                    && u.is_active
                    && !u.is_sso_user
                    && (mobile_number.is_some_and(|m| u.mobile_number.as_deref() == Some(m))
                        || student_id.is_some_and(|s| u.student_id.as_deref() == Some(s)))
            })
            .cloned())
    }

    async fn find_admin_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username == username && u.role == UserRole::Admin && u.is_active)
            .cloned())
    }

    async fn find_by_sso_id(&self, sso_id: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.sso_id.as_deref() == Some(sso_id) && u.is_active)
            .cloned())
    }

    async fn find_by_sso_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.sso_email.as_deref() == Some(email.as_str()) && u.is_active)
            .cloned())
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let Some(key) = user.id.as_ref().map(|oid| oid.to_hex()) else {
            return Err(AppError::InternalError(
                "Cannot save a user without a database id".to_string(),
            ));
        };

        let mut users = self.users.write().await;
        if !users.contains_key(&key) {
            return Err(AppError::NotFound(format!(
                "User '{}' not found",
                user.username
            )));
        }
        users.insert(key, user.clone());
        Ok(())
    }

    async fn list_students(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        let users = self.users.read().await;
        let term = search.map(|t| t.to_lowercase());

        let mut students: Vec<_> = users
            .values()
            .filter(|u| u.role == UserRole::Student && u.is_active)
            .filter(|u| {
                term.as_deref()
                    .map(|t| {
                        [&u.student_name, &u.student_id, &u.mobile_number]
                            .iter()
                            .any(|f| {
                                f.as_deref()
                                    .map(|v| v.to_lowercase().contains(t))
                                    .unwrap_or(false)
                            })
                    })
                    .unwrap_or(true)
            })
            .cloned()
            .collect();
        students.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = students.len() as i64;
        let start = (offset.max(0) as usize).min(students.len());
        let end = (start + limit.max(0) as usize).min(students.len());
        Ok((students[start..end].to_vec(), total))
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<u64> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.role == role && u.is_active)
            .count() as u64)
    }

    async fn count_students_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.role == UserRole::Student)
            .filter(|u| u.created_at.map(|c| c >= since).unwrap_or(false))
            .count() as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}
