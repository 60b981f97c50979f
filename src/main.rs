use std::{sync::Arc, time::Duration};

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};

use finquiz_server::{
    app_state::AppState,
    auth::AuthMiddleware,
    config::Config,
    handlers,
    middleware::{RateLimitMiddleware, RateLimiter},
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        config.validate_for_production();
    }

    let state = AppState::new(config.clone())
        .await
        .expect("failed to initialize application state");

    state
        .user_service
        .ensure_default_admin(&config)
        .await
        .expect("failed to ensure default admin account");

    let rate_limiter = Arc::new(RateLimiter::new(
        Duration::from_secs(config.rate_limit_window_secs),
        config.rate_limit_max_requests,
    ));

    let host = config.web_server_host.clone();
    let port = config.web_server_port;
    log::info!("starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = state
            .config
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
            .supports_credentials();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(state.jwt_service.clone()))
            .wrap(Logger::default())
            .wrap(cors)
            .wrap(RateLimitMiddleware::new(Arc::clone(&rate_limiter)))
            // Public surface
            .service(handlers::health_check)
            .service(handlers::health_check_ready)
            .service(handlers::health_check_live)
            .service(handlers::student_login)
            .service(handlers::admin_login)
            .service(handlers::sso_login)
            .service(handlers::get_questions_by_level)
            // Everything else requires a valid bearer token
            .service(
                web::scope("")
                    .wrap(AuthMiddleware)
                    .service(handlers::register_admin)
                    .service(handlers::get_profile)
                    .service(handlers::update_profile)
                    .service(handlers::start_session)
                    .service(handlers::submit_answer)
                    .service(handlers::complete_session)
                    .service(handlers::get_history)
                    .service(handlers::get_session_report)
                    .service(handlers::get_student_stats)
                    .service(handlers::get_dashboard_overview)
                    .service(handlers::get_all_students)
                    .service(handlers::get_student_details)
                    .service(handlers::get_all_sessions)
                    .service(handlers::get_admin_session_report)
                    .service(handlers::get_level_stats)
                    .service(handlers::get_top_performers)
                    .service(handlers::get_question_stats)
                    .service(handlers::add_question)
                    .service(handlers::update_question)
                    .service(handlers::delete_question),
            )
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
