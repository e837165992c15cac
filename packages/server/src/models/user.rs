use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_email, validate_name, validate_password};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: String,
    pub work_type: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<String>,
    pub work_type: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive search over name and email.
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub work_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct UserListItem {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: String,
    pub work_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserListItem>,
    pub pagination: Pagination,
}

/// Outcome of a bulk import. Always returned with HTTP 200; failures are
/// reported per row (or as a single file-level entry with `line` 0).
#[derive(Serialize, utoipa::ToSchema)]
pub struct ImportResponse {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<common::import::RowError>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            email: m.email,
            name: m.name,
            role: m.role,
            work_type: m.work_type,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_user(req: &CreateUserRequest) -> Result<(), AppError> {
    validate_email(&req.email)?;
    validate_name(&req.name)?;
    validate_password(&req.password)?;
    validate_work_type(&req.work_type)
}

pub fn validate_update_user(req: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name)?;
    }
    if let Some(ref work_type) = req.work_type {
        validate_work_type(work_type)?;
    }
    if let Some(ref password) = req.password {
        validate_password(password)?;
    }
    Ok(())
}

pub fn validate_work_type(work_type: &str) -> Result<(), AppError> {
    let normalized = common::import::normalize_enum(work_type);
    if !common::import::KNOWN_WORK_TYPES.contains(&normalized.as_str()) {
        return Err(AppError::Validation(format!(
            "work_type must be one of: {}",
            common::import::KNOWN_WORK_TYPES.join(", ")
        )));
    }
    Ok(())
}
