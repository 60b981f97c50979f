use once_cell::sync::Lazy;
use serde::Deserialize;
use validator::Validate;

use crate::models::domain::category::{Category, Difficulty};

static ITEM_ID_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[A-Z0-9_]+$").expect("ITEM_ID_REGEX is a valid regex pattern")
});

static MOBILE_NUMBER_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[0-9+][0-9\-\s]{6,19}$")
        .expect("MOBILE_NUMBER_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentLoginRequest {
    #[validate(regex(
        path = *MOBILE_NUMBER_REGEX,
        message = "Mobile number must be 7-20 digits"
    ))]
    pub mobile_number: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub student_id: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub password: Option<String>,
}

impl StudentLoginRequest {
    pub fn has_identifier(&self) -> bool {
        self.mobile_number.is_some() || self.student_id.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(length(min = 1, max = 100))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterAdminRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(length(min = 8, max = 100))]
    pub password: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 100))]
    pub admin_name: String,
}

/// Account payload forwarded by the SSO-authenticated frontend. Token
/// verification against the identity provider is outside this service;
/// the payload is trusted once it reaches us.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SsoLoginRequest {
    #[validate(length(min = 1))]
    pub access_token: String,

    #[validate(nested)]
    pub account: SsoAccountInfo,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SsoAccountInfo {
    #[validate(length(min = 1, max = 100))]
    pub account_id: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, max = 200))]
    pub display_name: String,

    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200))]
    pub student_name: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub admin_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(range(min = 1, max = 4, message = "Level must be between 1 and 4"))]
    pub level: u8,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1))]
    pub session_id: String,

    #[validate(length(min = 1))]
    pub question_id: String,

    #[validate(length(min = 1, max = 2, message = "Select one or two categories"))]
    pub selected_categories: Vec<Category>,

    #[validate(range(min = 0))]
    pub time_spent: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompleteSessionRequest {
    #[validate(length(min = 1))]
    pub session_id: String,

    #[validate(length(max = 1000, message = "Feedback text must be less than 1000 characters"))]
    pub feedback_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(
        length(min = 1, max = 20),
        regex(
            path = *ITEM_ID_REGEX,
            message = "Item ID can only contain uppercase letters, numbers, and underscores"
        )
    )]
    pub id: String,

    #[validate(length(min = 10, max = 500))]
    pub name: String,

    #[validate(length(min = 1, max = 2, message = "Items carry one or two categories"))]
    pub categories: Vec<Category>,

    #[validate(length(min = 20, max = 1000))]
    pub explanation: String,

    #[validate(range(min = 1, max = 4, message = "Level must be between 1 and 4"))]
    pub level: u8,

    pub difficulty: Difficulty,

    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateItemRequest {
    #[validate(length(min = 10, max = 500))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 2, message = "Items carry one or two categories"))]
    pub categories: Option<Vec<Category>>,

    #[validate(length(min = 20, max = 1000))]
    pub explanation: Option<String>,

    #[validate(range(min = 1, max = 4, message = "Level must be between 1 and 4"))]
    pub level: Option<u8>,

    pub difficulty: Option<Difficulty>,

    pub tags: Option<Vec<String>>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 1))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            limit: Some(10),
        }
    }
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct QuestionCountQuery {
    #[validate(range(min = 1, max = 50))]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuestionStatsQuery {
    #[validate(range(min = 1, max = 4))]
    pub level: Option<u8>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TopPerformersQuery {
    #[validate(range(min = 1, max = 4, message = "Level must be between 1 and 4"))]
    pub level: u8,

    #[validate(range(min = 1, max = 50))]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SessionListFilter {
    #[validate(range(min = 1, max = 4))]
    pub level: Option<u8>,

    pub student_id: Option<String>,

    pub min_score: Option<u32>,

    pub max_score: Option<u32>,

    pub start_date: Option<chrono::DateTime<chrono::Utc>>,

    pub end_date: Option<chrono::DateTime<chrono::Utc>>,

    #[validate(range(min = 1))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl SessionListFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit.or(Some(20)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentSearchQuery {
    #[validate(length(max = 100))]
    pub search: Option<String>,

    #[validate(range(min = 1))]
    pub page: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}
