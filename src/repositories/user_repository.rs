use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{User, UserRole},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// Active, non-SSO student matching either identifier.
    async fn find_student_by_identifier(
        &self,
        mobile_number: Option<&str>,
        student_id: Option<&str>,
    ) -> AppResult<Option<User>>;
    async fn find_admin_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_sso_id(&self, sso_id: &str) -> AppResult<Option<User>>;
    async fn find_by_sso_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn save(&self, user: &User) -> AppResult<()>;
    async fn list_students(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)>;
    async fn count_by_role(&self, role: UserRole) -> AppResult<u64>;
    async fn count_students_since(&self, since: DateTime<Utc>) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut user = user;
        let result = self.collection.insert_one(&user).await?;
        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let Ok(oid) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let user = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    async fn find_student_by_identifier(
        &self,
        mobile_number: Option<&str>,
        student_id: Option<&str>,
    ) -> AppResult<Option<User>> {
        let mut identifiers = Vec::new();
        if let Some(mobile) = mobile_number {
            identifiers.push(doc! { "mobile_number": mobile });
        }
        if let Some(student_id) = student_id {
            identifiers.push(doc! { "student_id": student_id });
        }
        if identifiers.is_empty() {
            return Ok(None);
        }

        let user = self
            .collection
            .find_one(doc! {
                "$or": identifiers,
                "role": "student",
                "is_active": true,
                "is_sso_user": false
            })
            .await?;
        Ok(user)
    }

    async fn find_admin_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! {
                "username": username,
                "role": "admin",
                "is_active": true
            })
            .await?;
        Ok(user)
    }

    async fn find_by_sso_id(&self, sso_id: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "sso_id": sso_id, "is_active": true })
            .await?;
        Ok(user)
    }

    async fn find_by_sso_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "sso_email": email.to_lowercase(), "is_active": true })
            .await?;
        Ok(user)
    }

    async fn save(&self, user: &User) -> AppResult<()> {
        let Some(id) = user.id else {
            return Err(AppError::InternalError(
                "Cannot save a user without a database id".to_string(),
            ));
        };

        let result = self
            .collection
            .replace_one(doc! { "_id": id }, user)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User '{}' not found",
                user.username
            )));
        }

        Ok(())
    }

    async fn list_students(
        &self,
        search: Option<&str>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        let mut filter = doc! { "role": "student", "is_active": true };

        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let escaped = regex::escape(term);
            filter.insert(
                "$or",
                vec![
                    doc! { "student_name": { "$regex": &escaped, "$options": "i" } },
                    doc! { "student_id": { "$regex": &escaped, "$options": "i" } },
                    doc! { "mobile_number": { "$regex": &escaped, "$options": "i" } },
                ],
            );
        }

        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let students = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(offset as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok((students, total))
    }

    async fn count_by_role(&self, role: UserRole) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "role": role.as_str(), "is_active": true })
            .await?;
        Ok(count)
    }

    async fn count_students_since(&self, since: DateTime<Utc>) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! {
                "role": "student",
                "created_at": { "$gte": mongodb::bson::to_bson(&since)? }
            })
            .await?;
        Ok(count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for users collection");

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            )
            .build();

        let mobile_index = IndexModel::builder()
            .keys(doc! { "mobile_number": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .sparse(true)
                    .name("mobile_number_unique".to_string())
                    .build(),
            )
            .build();

        let student_id_index = IndexModel::builder()
            .keys(doc! { "student_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .sparse(true)
                    .name("student_id_unique".to_string())
                    .build(),
            )
            .build();

        let sso_index = IndexModel::builder()
            .keys(doc! { "sso_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .sparse(true)
                    .name("sso_id_unique".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(username_index).await?;
        self.collection.create_index(mobile_index).await?;
        self.collection.create_index(student_id_index).await?;
        self.collection.create_index(sso_index).await?;

        Ok(())
    }
}
