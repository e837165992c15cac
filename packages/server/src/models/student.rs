use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_name};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateStudentRequest {
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateStudentRequest {
    pub student_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct StudentListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive search over names and student number.
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentResponse {
    pub id: i32,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct StudentListItem {
    pub id: i32,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentListResponse {
    pub data: Vec<StudentListItem>,
    pub pagination: Pagination,
}

impl From<crate::entity::student::Model> for StudentResponse {
    fn from(m: crate::entity::student::Model) -> Self {
        Self {
            id: m.id,
            student_number: m.student_number,
            first_name: m.first_name,
            last_name: m.last_name,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_student(req: &CreateStudentRequest) -> Result<(), AppError> {
    validate_student_number(&req.student_number)?;
    validate_name(&req.first_name)?;
    validate_name(&req.last_name)
}

pub fn validate_update_student(req: &UpdateStudentRequest) -> Result<(), AppError> {
    if let Some(ref number) = req.student_number {
        validate_student_number(number)?;
    }
    if let Some(ref first) = req.first_name {
        validate_name(first)?;
    }
    if let Some(ref last) = req.last_name {
        validate_name(last)?;
    }
    Ok(())
}

fn validate_student_number(number: &str) -> Result<(), AppError> {
    let number = number.trim();
    if number.is_empty() || number.chars().count() > 32 {
        return Err(AppError::Validation(
            "student_number must be 1-32 characters".into(),
        ));
    }
    Ok(())
}
