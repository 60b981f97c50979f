use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::request::{
        CreateItemRequest, QuestionStatsQuery, SessionListFilter, StudentSearchQuery,
        TopPerformersQuery, UpdateItemRequest,
    },
};

const DEFAULT_TOP_PERFORMERS: i64 = 10;

#[get("/api/admin/dashboard/overview")]
pub async fn get_dashboard_overview(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let response = state.stats_service.dashboard_overview().await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/admin/students")]
pub async fn get_all_students(
    state: web::Data<AppState>,
    query: web::Query<StudentSearchQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let query = query.into_inner();
    query.validate()?;

    let response = state.user_service.list_students(query).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/admin/students/{student_id}")]
pub async fn get_student_details(
    state: web::Data<AppState>,
    student_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let response = state.stats_service.student_details(&student_id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/admin/sessions")]
pub async fn get_all_sessions(
    state: web::Data<AppState>,
    query: web::Query<SessionListFilter>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let filter = query.into_inner();
    filter.validate()?;

    let response = state.stats_service.list_sessions(filter).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/admin/session/{session_id}")]
pub async fn get_admin_session_report(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let response = state
        .stats_service
        .admin_session_report(&session_id)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/admin/levels/{level}/stats")]
pub async fn get_level_stats(
    state: web::Data<AppState>,
    level: web::Path<u8>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let stats = state.stats_service.level_stats(level.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "stats": stats })))
}

#[get("/api/admin/top-performers")]
pub async fn get_top_performers(
    state: web::Data<AppState>,
    query: web::Query<TopPerformersQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let query = query.into_inner();
    query.validate()?;

    let performers = state
        .stats_service
        .top_performers(query.level, query.limit.unwrap_or(DEFAULT_TOP_PERFORMERS))
        .await?;

    Ok(HttpResponse::Ok().json(performers))
}

#[get("/api/admin/questions/stats")]
pub async fn get_question_stats(
    state: web::Data<AppState>,
    query: web::Query<QuestionStatsQuery>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let query = query.into_inner();
    query.validate()?;

    let response = state.item_service.question_stats(query.level).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/admin/questions")]
pub async fn add_question(
    state: web::Data<AppState>,
    request: web::Json<CreateItemRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let request = request.into_inner();
    request.validate()?;

    let item = state.item_service.create_item(request).await?;
    Ok(HttpResponse::Created().json(item))
}

#[put("/api/admin/questions/{item_id}")]
pub async fn update_question(
    state: web::Data<AppState>,
    item_id: web::Path<String>,
    request: web::Json<UpdateItemRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let request = request.into_inner();
    request.validate()?;

    let item = state.item_service.update_item(&item_id, request).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[delete("/api/admin/questions/{item_id}")]
pub async fn delete_question(
    state: web::Data<AppState>,
    item_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    state.item_service.deactivate_item(&item_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Catalog item deactivated successfully"
    })))
}
