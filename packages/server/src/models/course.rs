use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_title};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    pub code: String,
    pub title: String,
    pub description: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCourseRequest {
    pub code: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CourseListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive search over code and title.
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateScheduleRequest {
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: i32,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "10:30:00")]
    pub end_time: NaiveTime,
    pub room: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateScheduleRequest {
    pub day_of_week: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub room: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct EnrollStudentRequest {
    pub student_id: i32,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct CourseListItem {
    pub id: i32,
    pub code: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseListResponse {
    pub data: Vec<CourseListItem>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScheduleResponse {
    pub id: i32,
    pub course_id: i32,
    pub day_of_week: i32,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    pub room: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EnrollmentResponse {
    pub course_id: i32,
    pub student_id: i32,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub enrolled_at: DateTime<Utc>,
}

impl From<crate::entity::course::Model> for CourseResponse {
    fn from(m: crate::entity::course::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            title: m.title,
            description: m.description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<crate::entity::schedule::Model> for ScheduleResponse {
    fn from(m: crate::entity::schedule::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            day_of_week: m.day_of_week,
            start_time: m.start_time,
            end_time: m.end_time,
            room: m.room,
        }
    }
}

pub fn validate_create_course(req: &CreateCourseRequest) -> Result<(), AppError> {
    validate_course_code(&req.code)?;
    validate_title(&req.title)?;
    validate_description(&req.description)
}

pub fn validate_update_course(req: &UpdateCourseRequest) -> Result<(), AppError> {
    if let Some(ref code) = req.code {
        validate_course_code(code)?;
    }
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    Ok(())
}

pub fn validate_create_schedule(req: &CreateScheduleRequest) -> Result<(), AppError> {
    validate_day_of_week(req.day_of_week)?;
    if req.end_time <= req.start_time {
        return Err(AppError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_schedule(req: &UpdateScheduleRequest) -> Result<(), AppError> {
    if let Some(day) = req.day_of_week {
        validate_day_of_week(day)?;
    }
    if let (Some(start), Some(end)) = (req.start_time, req.end_time)
        && end <= start
    {
        return Err(AppError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    Ok(())
}

fn validate_course_code(code: &str) -> Result<(), AppError> {
    let code = code.trim();
    if code.is_empty() || code.chars().count() > 32 {
        return Err(AppError::Validation("code must be 1-32 characters".into()));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), AppError> {
    if description.len() > 10_000 {
        return Err(AppError::Validation(
            "Description must be at most 10000 characters".into(),
        ));
    }
    Ok(())
}

fn validate_day_of_week(day: i32) -> Result<(), AppError> {
    if !(0..=6).contains(&day) {
        return Err(AppError::Validation(
            "day_of_week must be between 0 (Monday) and 6 (Sunday)".into(),
        ));
    }
    Ok(())
}
