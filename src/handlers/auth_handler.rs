use actix_web::{get, post, put, web, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_admin, AuthenticatedUser},
    errors::AppError,
    models::dto::{
        request::{
            AdminLoginRequest, RegisterAdminRequest, SsoLoginRequest, StudentLoginRequest,
            UpdateProfileRequest,
        },
        response::{LoginResponse, UserDto},
    },
};

#[post("/api/auth/student/login")]
pub async fn student_login(
    state: web::Data<AppState>,
    request: web::Json<StudentLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let user = state.user_service.student_login(request).await?;
    let token = state.jwt_service.create_token(&user)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserDto::from(user),
        token,
    }))
}

#[post("/api/auth/admin/login")]
pub async fn admin_login(
    state: web::Data<AppState>,
    request: web::Json<AdminLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let user = state.user_service.admin_login(request).await?;
    let token = state.jwt_service.create_token(&user)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserDto::from(user),
        token,
    }))
}

#[post("/api/auth/sso/login")]
pub async fn sso_login(
    state: web::Data<AppState>,
    request: web::Json<SsoLoginRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let user = state.user_service.sso_login(request).await?;
    let token = state.jwt_service.create_token(&user)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserDto::from(user),
        token,
    }))
}

#[post("/api/auth/admin/register")]
pub async fn register_admin(
    state: web::Data<AppState>,
    request: web::Json<RegisterAdminRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_admin(&auth.0)?;

    let request = request.into_inner();
    request.validate()?;

    let user = state.user_service.register_admin(request).await?;
    Ok(HttpResponse::Created().json(UserDto::from(user)))
}

#[get("/api/auth/profile")]
pub async fn get_profile(
    state: web::Data<AppState>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.get_user(&auth.0.sub).await?;
    Ok(HttpResponse::Ok().json(UserDto::from(user)))
}

#[put("/api/auth/profile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    request: web::Json<UpdateProfileRequest>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    let user = state
        .user_service
        .update_profile(&auth.0.sub, request)
        .await?;
    Ok(HttpResponse::Ok().json(UserDto::from(user)))
}
