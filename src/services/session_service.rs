use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Answer, GameSession},
        dto::{
            request::{CompleteSessionRequest, PaginationParams, SubmitAnswerRequest},
            response::{
                AnswerVerdictResponse, HistoryResponse, PaginationDto, QuestionDto,
                SessionReportResponse, SessionSummaryDto, StartSessionResponse,
            },
        },
    },
    repositories::{ItemRepository, SessionRepository},
    services::grading,
};

/// One uniform message for every session lookup failure. Whether the
/// session is missing, owned by someone else, or no longer in progress
/// is deliberately indistinguishable to the caller; the reason is only
/// logged server-side.
const SESSION_GONE: &str = "Game session not found or already completed";

pub const QUESTIONS_PER_SESSION: u32 = 10;

pub struct CompletionOutcome {
    pub summary: SessionSummaryDto,
    pub already_completed: bool,
}

pub struct SessionService {
    sessions: Arc<dyn SessionRepository>,
    items: Arc<dyn ItemRepository>,
}

impl SessionService {
    pub fn new(sessions: Arc<dyn SessionRepository>, items: Arc<dyn ItemRepository>) -> Self {
        Self { sessions, items }
    }

    pub async fn start_session(
        &self,
        student_id: &str,
        student_identifier: &str,
        level: u8,
    ) -> AppResult<StartSessionResponse> {
        validate_level(level)?;

        let items = self
            .items
            .sample_by_level(level, QUESTIONS_PER_SESSION)
            .await?;

        if items.is_empty() {
            return Err(AppError::NotFound(
                "No questions available for this level".to_string(),
            ));
        }

        let session = GameSession::start(
            student_id,
            student_identifier,
            level,
            items.len() as u32,
        );
        let session = self.sessions.create(session).await?;

        log::info!(
            "session {} started: student={} level={} questions={}",
            session.id,
            student_identifier,
            level,
            session.total_questions
        );

        Ok(StartSessionResponse {
            session_id: session.id,
            questions: items.into_iter().map(QuestionDto::from).collect(),
            level,
            total_questions: session.total_questions,
        })
    }

    /// Grades one answer inside an in-progress session. Ordering matters:
    /// the verdict is produced before the correct set and explanation are
    /// revealed in the response.
    pub async fn submit_answer(
        &self,
        student_id: &str,
        request: SubmitAnswerRequest,
    ) -> AppResult<AnswerVerdictResponse> {
        let mut session = self
            .sessions
            .find_in_progress(&request.session_id, student_id)
            .await?
            .ok_or_else(|| {
                log::warn!(
                    "submit_answer rejected: session={} student={} has no in-progress match",
                    request.session_id,
                    student_id
                );
                AppError::NotFound(SESSION_GONE.to_string())
            })?;

        let item = self
            .items
            .find_by_id(&request.question_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

        let is_correct = grading::is_correct_answer(&item.categories, &request.selected_categories);

        // Catalog counters are bumped atomically server-side, so
        // concurrent sessions answering the same item cannot lose updates.
        self.items.record_usage(&item.id, is_correct).await?;

        session.push_answer(Answer {
            question_id: item.id.clone(),
            question_text: item.name.clone(),
            selected_categories: request.selected_categories,
            correct_categories: item.categories.clone(),
            is_correct,
            time_spent: request.time_spent.unwrap_or(0).max(0),
        });

        let replaced = self.sessions.replace_in_progress(&session).await?;
        if !replaced {
            log::warn!(
                "submit_answer raced completion: session={} student={}",
                session.id,
                student_id
            );
            return Err(AppError::NotFound(SESSION_GONE.to_string()));
        }

        Ok(AnswerVerdictResponse {
            is_correct,
            correct_categories: item.categories,
            explanation: item.explanation,
            current_score: session.score,
            total_questions: session.total_questions,
        })
    }

    /// Completes an in-progress session. Re-invoking on an already
    /// completed session returns its existing summary unchanged, so a
    /// client retrying after a network blip never fails or
    /// double-finalizes.
    pub async fn complete_session(
        &self,
        student_id: &str,
        request: CompleteSessionRequest,
    ) -> AppResult<CompletionOutcome> {
        if let Some(mut session) = self
            .sessions
            .find_in_progress(&request.session_id, student_id)
            .await?
        {
            session.finalize(request.feedback_text.clone());

            // The replace is filtered on the stored in-progress status;
            // losing that race means another call finished first and the
            // idempotent path below takes over.
            if self.sessions.replace_in_progress(&session).await? {
                log::info!(
                    "session {} completed: score={}/{} ({}%)",
                    session.id,
                    session.score,
                    session.total_questions,
                    session.percentage
                );
                return Ok(CompletionOutcome {
                    summary: SessionSummaryDto::from(&session),
                    already_completed: false,
                });
            }
        }

        if let Some(session) = self
            .sessions
            .find_completed(&request.session_id, student_id)
            .await?
        {
            log::info!("session {} was already completed", session.id);
            return Ok(CompletionOutcome {
                summary: SessionSummaryDto::from(&session),
                already_completed: true,
            });
        }

        log::warn!(
            "complete_session rejected: session={} student={} matches nothing",
            request.session_id,
            student_id
        );
        Err(AppError::NotFound(SESSION_GONE.to_string()))
    }

    pub async fn history(
        &self,
        student_id: &str,
        pagination: PaginationParams,
    ) -> AppResult<HistoryResponse> {
        let (sessions, total) = self
            .sessions
            .completed_history(student_id, pagination.offset(), pagination.limit())
            .await?;

        Ok(HistoryResponse {
            sessions: sessions.iter().map(SessionSummaryDto::from).collect(),
            pagination: PaginationDto::new(pagination.page(), pagination.limit(), total),
        })
    }

    /// Summary plus per-answer detail, for the owning student only.
    pub async fn session_report(
        &self,
        student_id: &str,
        session_id: &str,
    ) -> AppResult<SessionReportResponse> {
        let session = self
            .sessions
            .find_for_student(session_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        Ok(SessionReportResponse {
            session: SessionSummaryDto::from(&session),
            detailed_answers: session.answers.iter().map(Into::into).collect(),
        })
    }
}

pub fn validate_level(level: u8) -> AppResult<()> {
    if !(1..=4).contains(&level) {
        return Err(AppError::ValidationError(
            "Invalid level. Must be between 1 and 4".to_string(),
        ));
    }
    Ok(())
}
