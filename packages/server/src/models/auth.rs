use serde::{Deserialize, Serialize};

use super::shared::{validate_email, validate_name, validate_password};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    pub id: i32,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            role: m.role,
        }
    }
}

pub fn validate_register_request(req: &RegisterRequest) -> Result<(), AppError> {
    validate_email(&req.email)?;
    validate_name(&req.name)?;
    validate_password(&req.password)
}

pub fn validate_login_request(req: &LoginRequest) -> Result<(), AppError> {
    validate_email(&req.email)?;
    if req.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}
