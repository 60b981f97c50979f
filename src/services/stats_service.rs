use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    errors::{AppError, AppResult},
    models::dto::{
        request::SessionListFilter,
        response::{
            AdminSessionReportResponse, DashboardCounts, DashboardOverviewResponse,
            HistoryResponse, LevelStatsDto, PaginationDto, SessionSummaryDto,
            StudentDetailsResponse, StudentStatsResponse, TopPerformerDto, UserDto,
        },
    },
    models::domain::UserRole,
    repositories::{CompletedSessionFilter, ItemRepository, SessionRepository, UserRepository},
    services::session_service::validate_level,
};

const RECENT_ACTIVITY_DAYS: i64 = 7;

/// Read-side reporting over completed sessions. Every aggregate filters
/// on completed status; in-progress sessions never pollute the numbers.
pub struct StatsService {
    sessions: Arc<dyn SessionRepository>,
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
}

impl StatsService {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        users: Arc<dyn UserRepository>,
        items: Arc<dyn ItemRepository>,
    ) -> Self {
        Self {
            sessions,
            users,
            items,
        }
    }

    pub async fn dashboard_overview(&self) -> AppResult<DashboardOverviewResponse> {
        let seven_days_ago = Utc::now() - Duration::days(RECENT_ACTIVITY_DAYS);

        let total_students = self.users.count_by_role(UserRole::Student).await?;
        let total_admins = self.users.count_by_role(UserRole::Admin).await?;
        let total_sessions = self.sessions.count_completed().await?;
        let total_questions = self.items.count_active().await?;
        let recent_sessions = self.sessions.count_completed_since(seven_days_ago).await?;
        let new_students = self.users.count_students_since(seven_days_ago).await?;

        let level_stats = self.sessions.level_breakdown().await?;

        Ok(DashboardOverviewResponse {
            overview: DashboardCounts {
                total_students,
                total_admins,
                total_sessions,
                total_questions,
                recent_sessions,
                new_students,
            },
            level_stats,
        })
    }

    /// `None` when the level has no completed sessions yet; that is a
    /// valid empty aggregate, not an error.
    pub async fn level_stats(&self, level: u8) -> AppResult<Option<LevelStatsDto>> {
        validate_level(level)?;
        self.sessions.level_stats(level).await
    }

    pub async fn student_stats(&self, student_id: &str) -> AppResult<StudentStatsResponse> {
        let overall = self.sessions.student_overall_stats(student_id).await?;
        let by_level = self.sessions.student_level_breakdown(student_id).await?;

        Ok(StudentStatsResponse { overall, by_level })
    }

    pub async fn top_performers(
        &self,
        level: u8,
        limit: i64,
    ) -> AppResult<Vec<TopPerformerDto>> {
        validate_level(level)?;

        let sessions = self.sessions.top_performers(level, limit).await?;
        Ok(sessions.iter().map(TopPerformerDto::from).collect())
    }

    pub async fn list_sessions(&self, filter: SessionListFilter) -> AppResult<HistoryResponse> {
        if let Some(level) = filter.level {
            validate_level(level)?;
        }

        let pagination = filter.pagination();
        let repo_filter = CompletedSessionFilter {
            level: filter.level,
            student_id: filter.student_id,
            min_score: filter.min_score,
            max_score: filter.max_score,
            start_date: filter.start_date,
            end_date: filter.end_date,
        };

        let (sessions, total) = self
            .sessions
            .list_completed(repo_filter, pagination.offset(), pagination.limit())
            .await?;

        Ok(HistoryResponse {
            sessions: sessions.iter().map(SessionSummaryDto::from).collect(),
            pagination: PaginationDto::new(pagination.page(), pagination.limit(), total),
        })
    }

    /// Admin drill-down on one student: public profile, most recent
    /// completed sessions, and overall performance.
    pub async fn student_details(&self, student_id: &str) -> AppResult<StudentDetailsResponse> {
        let student = self
            .users
            .find_by_id(student_id)
            .await?
            .filter(|u| u.is_active && u.role == UserRole::Student)
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

        let (sessions, _) = self.sessions.completed_history(student_id, 0, 10).await?;
        let performance = self.sessions.student_overall_stats(student_id).await?;

        Ok(StudentDetailsResponse {
            student: UserDto::from(student),
            sessions: sessions.iter().map(SessionSummaryDto::from).collect(),
            performance,
        })
    }

    /// Admin view of a single session: unlike the student report this is
    /// not owner-scoped and carries the student's public profile.
    pub async fn admin_session_report(
        &self,
        session_id: &str,
    ) -> AppResult<AdminSessionReportResponse> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        let student = self
            .users
            .find_by_id(&session.student_id)
            .await?
            .map(UserDto::from);

        Ok(AdminSessionReportResponse {
            session: SessionSummaryDto::from(&session),
            detailed_answers: session.answers.iter().map(Into::into).collect(),
            student,
        })
    }
}
