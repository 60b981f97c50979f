use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{
    Answer, CatalogItem, Category, GameSession, Performance, User, UserRole,
};

/// Catalog item as served to the quiz client. The categories and
/// explanation ride along so the client can run its local game state;
/// the server still regrades every submission.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionDto {
    pub id: String,
    pub name: String,
    pub categories: Vec<Category>,
    pub explanation: String,
    pub level: u8,
}

impl From<CatalogItem> for QuestionDto {
    fn from(item: CatalogItem) -> Self {
        QuestionDto {
            id: item.id,
            name: item.name,
            categories: item.categories,
            explanation: item.explanation,
            level: item.level,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionListResponse {
    pub questions: Vec<QuestionDto>,
    pub total_questions: usize,
    pub level: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub questions: Vec<QuestionDto>,
    pub level: u8,
    pub total_questions: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerVerdictResponse {
    pub is_correct: bool,
    pub correct_categories: Vec<Category>,
    pub explanation: String,
    pub current_score: u32,
    pub total_questions: u32,
}

/// Summary projection of a session: no feedback text, no per-answer
/// detail, no internal student id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummaryDto {
    pub id: String,
    pub student_identifier: String,
    pub level: u8,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub time_taken_seconds: i64,
    pub performance: Performance,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub has_feedback: bool,
}

impl From<&GameSession> for SessionSummaryDto {
    fn from(session: &GameSession) -> Self {
        SessionSummaryDto {
            id: session.id.clone(),
            student_identifier: session.student_identifier.clone(),
            level: session.level,
            score: session.score,
            total_questions: session.total_questions,
            percentage: session.percentage,
            time_taken_seconds: session.time_taken_seconds,
            performance: session.performance,
            start_time: session.start_time,
            end_time: session.end_time,
            has_feedback: session.has_feedback(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedAnswerDto {
    pub question_id: String,
    pub question_text: String,
    pub selected_categories: Vec<Category>,
    pub correct_categories: Vec<Category>,
    pub is_correct: bool,
    pub time_spent: i64,
}

impl From<&Answer> for DetailedAnswerDto {
    fn from(answer: &Answer) -> Self {
        DetailedAnswerDto {
            question_id: answer.question_id.clone(),
            question_text: answer.question_text.clone(),
            selected_categories: answer.selected_categories.clone(),
            correct_categories: answer.correct_categories.clone(),
            is_correct: answer.is_correct,
            time_spent: answer.time_spent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionReportResponse {
    pub session: SessionSummaryDto,
    pub detailed_answers: Vec<DetailedAnswerDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationDto {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PaginationDto {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        PaginationDto {
            page,
            limit,
            total,
            pages,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub sessions: Vec<SessionSummaryDto>,
    pub pagination: PaginationDto,
}

/// Per-level aggregate over completed sessions. Also the deserialization
/// target of the `$group`/`$project` pipeline in the session repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStatsDto {
    pub level: u8,
    pub total_sessions: i64,
    pub average_score: f64,
    pub average_percentage: f64,
    pub average_time: f64,
    pub total_questions: i64,
    pub total_correct_answers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentOverallStatsDto {
    pub total_sessions: i64,
    pub total_questions: i64,
    pub total_correct_answers: i64,
    pub average_score: f64,
    pub average_percentage: f64,
    pub average_time: f64,
    pub best_score: i64,
    pub best_percentage: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentStatsResponse {
    pub overall: Option<StudentOverallStatsDto>,
    pub by_level: Vec<LevelStatsDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopPerformerDto {
    pub student_identifier: String,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub time_taken_seconds: i64,
    pub end_time: Option<DateTime<Utc>>,
}

impl From<&GameSession> for TopPerformerDto {
    fn from(session: &GameSession) -> Self {
        TopPerformerDto {
            student_identifier: session.student_identifier.clone(),
            score: session.score,
            total_questions: session.total_questions,
            percentage: session.percentage,
            time_taken_seconds: session.time_taken_seconds,
            end_time: session.end_time,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardCounts {
    pub total_students: u64,
    pub total_admins: u64,
    pub total_sessions: u64,
    pub total_questions: u64,
    pub recent_sessions: u64,
    pub new_students: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverviewResponse {
    pub overview: DashboardCounts,
    pub level_stats: Vec<LevelStatsDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemStatsDto {
    pub id: String,
    pub name: String,
    pub level: u8,
    pub usage_count: u32,
    pub correct_answer_rate: u32,
}

impl From<&CatalogItem> for ItemStatsDto {
    fn from(item: &CatalogItem) -> Self {
        ItemStatsDto {
            id: item.id.clone(),
            name: item.name.clone(),
            level: item.level,
            usage_count: item.usage_count,
            correct_answer_rate: item.correct_answer_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemStatsSummary {
    pub total_questions: usize,
    pub total_usage: u64,
    pub average_correct_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionStatsResponse {
    pub questions: Vec<ItemStatsDto>,
    pub summary: ItemStatsSummary,
}

/// Public account projection: never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: Option<String>,
    pub username: String,
    pub role: UserRole,
    pub is_active: bool,
    pub is_sso_user: bool,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id_hex(),
            identifier: user.identifier(),
            username: user.username,
            role: user.role,
            is_active: user.is_active,
            is_sso_user: user.is_sso_user,
            student_name: user.student_name,
            mobile_number: user.mobile_number,
            student_id: user.student_id,
            email: user.email,
            admin_name: user.admin_name,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentListResponse {
    pub students: Vec<UserDto>,
    pub pagination: PaginationDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentDetailsResponse {
    pub student: UserDto,
    pub sessions: Vec<SessionSummaryDto>,
    pub performance: Option<StudentOverallStatsDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSessionReportResponse {
    pub session: SessionSummaryDto,
    pub detailed_answers: Vec<DetailedAnswerDto>,
    pub student: Option<UserDto>,
}
