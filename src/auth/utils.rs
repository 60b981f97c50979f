use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
};

pub fn require_admin(claims: &Claims) -> AppResult<()> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Insufficient permissions".to_string(),
        ));
    }
    Ok(())
}

pub fn require_student(claims: &Claims) -> AppResult<()> {
    if !claims.is_student() {
        return Err(AppError::Forbidden(
            "Insufficient permissions".to_string(),
        ));
    }
    Ok(())
}

pub fn require_owner_or_admin(claims: &Claims, resource_owner: &str) -> AppResult<()> {
    if !claims.is_admin() && claims.sub != resource_owner {
        return Err(AppError::Forbidden(
            "You can only access your own resources".to_string(),
        ));
    }
    Ok(())
}
