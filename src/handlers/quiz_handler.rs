use actix_web::{get, post, web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_student, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{
        CompleteSessionRequest, PaginationParams, QuestionCountQuery, StartSessionRequest,
        SubmitAnswerRequest,
    },
};

const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Public question browsing; no authentication required.
#[get("/api/quiz/questions/{level}")]
pub async fn get_questions_by_level(
    state: web::Data<AppState>,
    level: web::Path<u8>,
    query: web::Query<QuestionCountQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    query.validate()?;

    let count = query.count.unwrap_or(DEFAULT_QUESTION_COUNT);
    let response = state
        .item_service
        .questions_by_level(level.into_inner(), count)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/quiz/session/start")]
pub async fn start_session(
    state: web::Data<AppState>,
    request: web::Json<StartSessionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let request = request.into_inner();
    request.validate()?;

    let response = state
        .session_service
        .start_session(&auth.0.sub, &auth.0.identifier, request.level)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/quiz/session/answer")]
pub async fn submit_answer(
    state: web::Data<AppState>,
    request: web::Json<SubmitAnswerRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let request = request.into_inner();
    request.validate()?;

    let response = state
        .session_service
        .submit_answer(&auth.0.sub, request)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/quiz/session/complete")]
pub async fn complete_session(
    state: web::Data<AppState>,
    request: web::Json<CompleteSessionRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let request = request.into_inner();
    request.validate()?;

    let outcome = state
        .session_service
        .complete_session(&auth.0.sub, request)
        .await?;

    let message = if outcome.already_completed {
        "Game session already completed"
    } else {
        "Game session completed"
    };

    Ok(HttpResponse::Ok().json(json!({
        "message": message,
        "session": outcome.summary,
    })))
}

#[get("/api/quiz/history")]
pub async fn get_history(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let pagination = query.into_inner();
    pagination.validate()?;

    let response = state.session_service.history(&auth.0.sub, pagination).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/quiz/session/{session_id}/report")]
pub async fn get_session_report(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let response = state
        .session_service
        .session_report(&auth.0.sub, &session_id)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/quiz/stats")]
pub async fn get_student_stats(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_student(&auth.0)?;

    let response = state.stats_service.student_stats(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(response))
}
