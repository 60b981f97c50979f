use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Admin => "admin",
        }
    }
}

/// Student or admin account. Students sign in either with a mobile
/// number / student id pair or through institutional SSO; admins with
/// username and password. SSO users carry no password hash.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub is_sso_user: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sso_tenant_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn new_student(
        username: &str,
        password_hash: &str,
        mobile_number: Option<String>,
        student_id: Option<String>,
        student_name: Option<String>,
    ) -> Self {
        User {
            id: None,
            username: username.to_string(),
            password_hash: Some(password_hash.to_string()),
            role: UserRole::Student,
            is_active: true,
            is_sso_user: false,
            sso_id: None,
            sso_email: None,
            sso_display_name: None,
            sso_tenant_id: None,
            mobile_number,
            student_id,
            student_name,
            email: None,
            admin_name: None,
            last_login_at: None,
            created_at: Some(Utc::now()),
        }
    }

    pub fn new_admin(username: &str, password_hash: &str, email: &str, admin_name: &str) -> Self {
        User {
            id: None,
            username: username.to_string(),
            password_hash: Some(password_hash.to_string()),
            role: UserRole::Admin,
            is_active: true,
            is_sso_user: false,
            sso_id: None,
            sso_email: None,
            sso_display_name: None,
            sso_tenant_id: None,
            mobile_number: None,
            student_id: None,
            student_name: None,
            email: Some(email.to_lowercase()),
            admin_name: Some(admin_name.to_string()),
            last_login_at: None,
            created_at: Some(Utc::now()),
        }
    }

    /// SSO accounts are always students and have no local password.
    pub fn from_sso(sso_id: &str, email: &str, display_name: &str, tenant_id: Option<String>) -> Self {
        User {
            id: None,
            username: format!("sso_{}", sso_id),
            password_hash: None,
            role: UserRole::Student,
            is_active: true,
            is_sso_user: true,
            sso_id: Some(sso_id.to_string()),
            sso_email: Some(email.to_lowercase()),
            sso_display_name: Some(display_name.to_string()),
            sso_tenant_id: tenant_id,
            mobile_number: None,
            student_id: None,
            student_name: Some(display_name.to_string()),
            email: None,
            admin_name: None,
            last_login_at: None,
            created_at: Some(Utc::now()),
        }
    }

    /// Refreshes SSO profile fields on a returning login.
    pub fn apply_sso_profile(&mut self, email: &str, display_name: &str, tenant_id: Option<String>) {
        self.sso_email = Some(email.to_lowercase());
        self.sso_display_name = Some(display_name.to_string());
        self.sso_tenant_id = tenant_id;
        self.student_name = Some(display_name.to_string());
        self.is_sso_user = true;
        self.role = UserRole::Student;
    }

    /// Human-facing identifier used on session records: mobile number,
    /// else student id, else SSO email, else username.
    pub fn identifier(&self) -> String {
        self.mobile_number
            .clone()
            .or_else(|| self.student_id.clone())
            .or_else(|| self.sso_email.clone())
            .unwrap_or_else(|| self.username.clone())
    }

    pub fn id_hex(&self) -> Option<String> {
        self.id.as_ref().map(|oid| oid.to_hex())
    }
}

#[cfg(test)]
impl User {
    pub fn test_student(mobile_number: &str, student_id: &str) -> Self {
        let mut user = User::new_student(
            &format!("student_{}", student_id),
            "argon2-test-hash",
            Some(mobile_number.to_string()),
            Some(student_id.to_string()),
            Some(format!("Student {}", student_id)),
        );
        user.id = Some(ObjectId::new());
        user
    }

    pub fn test_admin(username: &str) -> Self {
        let mut user = User::new_admin(
            username,
            "argon2-test-hash",
            &format!("{}@example.com", username),
            "Test Admin",
        );
        user.id = Some(ObjectId::new());
        user
    }
}
