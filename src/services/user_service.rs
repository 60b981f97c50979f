use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use secrecy::ExposeSecret;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{User, UserRole},
        dto::{
            request::{
                AdminLoginRequest, RegisterAdminRequest, SsoLoginRequest, StudentLoginRequest,
                StudentSearchQuery, UpdateProfileRequest,
            },
            response::{PaginationDto, StudentListResponse, UserDto},
        },
    },
    repositories::UserRepository,
};

/// Demo-flow fallback used when a first-time student signs in without
/// choosing a password.
const DEFAULT_STUDENT_PASSWORD: &str = "default123";

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Student sign-in by mobile number or student id. An unknown
    /// identifier creates the account on the spot (demo enrollment flow,
    /// as shipped); a known one must pass the password check.
    pub async fn student_login(&self, request: StudentLoginRequest) -> AppResult<User> {
        if !request.has_identifier() {
            return Err(AppError::ValidationError(
                "A mobile number or student id is required".to_string(),
            ));
        }

        let password = request
            .password
            .as_deref()
            .unwrap_or(DEFAULT_STUDENT_PASSWORD);

        let existing = self
            .repository
            .find_student_by_identifier(
                request.mobile_number.as_deref(),
                request.student_id.as_deref(),
            )
            .await?;

        let mut student = match existing {
            Some(student) => {
                if !verify_password(password, student.password_hash.as_deref()) {
                    return Err(AppError::Unauthorized("Invalid credentials".to_string()));
                }
                student
            }
            None => {
                let student_label = request
                    .student_id
                    .clone()
                    .or_else(|| request.mobile_number.clone())
                    .unwrap_or_default();

                let user = User::new_student(
                    &format!("student_{}", uuid::Uuid::new_v4().simple()),
                    &hash_password(password)?,
                    request.mobile_number.clone(),
                    request.student_id.clone(),
                    Some(format!("Student {}", student_label)),
                );
                let user = self.repository.create(user).await?;
                log::info!("student account created for {}", user.identifier());
                user
            }
        };

        student.last_login_at = Some(Utc::now());
        self.repository.save(&student).await?;

        Ok(student)
    }

    pub async fn admin_login(&self, request: AdminLoginRequest) -> AppResult<User> {
        let admin = self
            .repository
            .find_admin_by_username(&request.username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, admin.password_hash.as_deref()) {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let mut admin = admin;
        admin.last_login_at = Some(Utc::now());
        self.repository.save(&admin).await?;

        Ok(admin)
    }

    /// Create-or-update from a trusted SSO account payload, keyed by the
    /// provider id first and the email second. SSO accounts are always
    /// students.
    pub async fn sso_login(&self, request: SsoLoginRequest) -> AppResult<User> {
        let account = request.account;

        let mut user = match self.repository.find_by_sso_id(&account.account_id).await? {
            Some(mut user) => {
                user.apply_sso_profile(
                    &account.email,
                    &account.display_name,
                    account.tenant_id.clone(),
                );
                user
            }
            None => match self.repository.find_by_sso_email(&account.email).await? {
                Some(mut user) => {
                    user.sso_id = Some(account.account_id.clone());
                    user.apply_sso_profile(
                        &account.email,
                        &account.display_name,
                        account.tenant_id.clone(),
                    );
                    user
                }
                None => {
                    let user = User::from_sso(
                        &account.account_id,
                        &account.email,
                        &account.display_name,
                        account.tenant_id.clone(),
                    );
                    let user = self.repository.create(user).await?;
                    log::info!("sso account created for {}", user.identifier());
                    user
                }
            },
        };

        user.last_login_at = Some(Utc::now());
        self.repository.save(&user).await?;

        Ok(user)
    }

    pub async fn register_admin(&self, request: RegisterAdminRequest) -> AppResult<User> {
        if self
            .repository
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyExists(
                "Admin with this username or email already exists".to_string(),
            ));
        }

        let admin = User::new_admin(
            &request.username,
            &hash_password(&request.password)?,
            &request.email,
            &request.admin_name,
        );

        let admin = self.repository.create(admin).await?;
        log::info!("admin account {} registered", admin.username);
        Ok(admin)
    }

    pub async fn get_user(&self, user_id: &str) -> AppResult<User> {
        self.repository
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;

        match user.role {
            UserRole::Student => {
                if let Some(student_name) = request.student_name {
                    user.student_name = Some(student_name);
                }
            }
            UserRole::Admin => {
                if let Some(admin_name) = request.admin_name {
                    user.admin_name = Some(admin_name);
                }
                if let Some(email) = request.email {
                    user.email = Some(email.to_lowercase());
                }
            }
        }

        self.repository.save(&user).await?;
        Ok(user)
    }

    pub async fn list_students(&self, query: StudentSearchQuery) -> AppResult<StudentListResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * limit;

        let (students, total) = self
            .repository
            .list_students(query.search.as_deref(), offset, limit)
            .await?;

        Ok(StudentListResponse {
            students: students.into_iter().map(UserDto::from).collect(),
            pagination: PaginationDto::new(page, limit, total),
        })
    }

    pub async fn get_student(&self, student_id: &str) -> AppResult<User> {
        let user = self.get_user(student_id).await?;
        if user.role != UserRole::Student {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        Ok(user)
    }

    /// Creates the bootstrap admin account on first startup.
    pub async fn ensure_default_admin(&self, config: &Config) -> AppResult<()> {
        if self
            .repository
            .find_admin_by_username(&config.default_admin_username)
            .await?
            .is_some()
        {
            return Ok(());
        }

        let admin = User::new_admin(
            &config.default_admin_username,
            &hash_password(config.default_admin_password.expose_secret())?,
            "admin@finquiz.local",
            "Default Admin",
        );
        self.repository.create(admin).await?;
        log::info!(
            "default admin '{}' created",
            config.default_admin_username
        );

        Ok(())
    }
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, stored_hash: Option<&str>) -> bool {
    let Some(stored_hash) = stored_hash else {
        // SSO accounts carry no hash and cannot use password login.
        return false;
    };

    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
