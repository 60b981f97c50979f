use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoItemRepository, MongoSessionRepository, MongoUserRepository, UserRepository},
    services::{ItemService, SessionService, StatsService, UserService},
};

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub item_service: Arc<ItemService>,
    pub session_service: Arc<SessionService>,
    pub stats_service: Arc<StatsService>,
    pub jwt_service: JwtService,
    pub db: Database,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let user_repository = Arc::new(MongoUserRepository::new(&db));
        user_repository.ensure_indexes().await?;

        let item_repository = Arc::new(MongoItemRepository::new(&db));
        item_repository.ensure_indexes().await?;

        let session_repository = Arc::new(MongoSessionRepository::new(&db));
        session_repository.ensure_indexes().await?;

        let user_service = Arc::new(UserService::new(user_repository.clone()));
        let item_service = Arc::new(ItemService::new(item_repository.clone()));
        let session_service = Arc::new(SessionService::new(
            session_repository.clone(),
            item_repository.clone(),
        ));
        let stats_service = Arc::new(StatsService::new(
            session_repository,
            user_repository,
            item_repository,
        ));

        let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_expiration_hours);

        Ok(Self {
            user_service,
            item_service,
            session_service,
            stats_service,
            jwt_service,
            db,
            config: Arc::new(config),
        })
    }
}
