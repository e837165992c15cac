use chrono::{DateTime, NaiveDate, Utc};
use common::grading::Remarks;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Grade components recorded as individual `grade` rows.
pub const COMPONENT_REPORTING: &str = "reporting";
pub const COMPONENT_RECITATION: &str = "recitation";

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateGradeConfigurationRequest {
    pub reporting_weight: f64,
    pub recitation_weight: f64,
    pub quiz_weight: f64,
    pub passing_threshold: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecordGradeRequest {
    pub student_id: i32,
    /// One of: reporting, recitation.
    pub component: String,
    pub total: f64,
    pub date: NaiveDate,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateQuizRequest {
    pub title: String,
    pub date: NaiveDate,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecordQuizScoreRequest {
    pub student_id: i32,
    pub total_grade: f64,
}

/// Optional date-range filter for composite derivation.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CompositeQuery {
    /// Inclusive range start, YYYY-MM-DD.
    pub from: Option<String>,
    /// Inclusive range end, YYYY-MM-DD.
    pub to: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SaveGradeScoreRequest {
    pub reporting_score: f64,
    pub recitation_score: f64,
    pub quiz_score: f64,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct GradeConfigurationResponse {
    pub id: i32,
    pub course_id: i32,
    pub reporting_weight: f64,
    pub recitation_weight: f64,
    pub quiz_weight: f64,
    pub passing_threshold: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GradeResponse {
    pub id: i32,
    pub course_id: i32,
    pub student_id: i32,
    pub component: String,
    pub total: f64,
    pub date: NaiveDate,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizResponse {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub date: NaiveDate,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QuizScoreResponse {
    pub quiz_id: i32,
    pub student_id: i32,
    pub total_grade: f64,
}

/// Raw record counts behind a computed composite, for traceability.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RecordCounts {
    pub reporting: usize,
    pub recitation: usize,
    pub quiz: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CompositeResponse {
    /// The configuration the composite was computed under.
    pub grade_configuration_id: i32,
    pub reporting_score: f64,
    pub recitation_score: f64,
    pub quiz_score: f64,
    pub total_score: f64,
    pub remarks: Remarks,
    pub counts: RecordCounts,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GradeScoreResponse {
    pub id: i32,
    pub grade_configuration_id: i32,
    pub course_id: i32,
    pub student_id: i32,
    pub reporting_score: f64,
    pub recitation_score: f64,
    pub quiz_score: f64,
    pub total_score: f64,
    pub remarks: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::grade_configuration::Model> for GradeConfigurationResponse {
    fn from(m: crate::entity::grade_configuration::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            reporting_weight: m.reporting_weight,
            recitation_weight: m.recitation_weight,
            quiz_weight: m.quiz_weight,
            passing_threshold: m.passing_threshold,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
        }
    }
}

impl From<crate::entity::grade::Model> for GradeResponse {
    fn from(m: crate::entity::grade::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            student_id: m.student_id,
            component: m.component,
            total: m.total,
            date: m.date,
        }
    }
}

impl From<crate::entity::quiz::Model> for QuizResponse {
    fn from(m: crate::entity::quiz::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            title: m.title,
            date: m.date,
        }
    }
}

impl From<crate::entity::grade_score::Model> for GradeScoreResponse {
    fn from(m: crate::entity::grade_score::Model) -> Self {
        Self {
            id: m.id,
            grade_configuration_id: m.grade_configuration_id,
            course_id: m.course_id,
            student_id: m.student_id,
            reporting_score: m.reporting_score,
            recitation_score: m.recitation_score,
            quiz_score: m.quiz_score,
            total_score: m.total_score,
            remarks: m.remarks,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_grade_configuration(
    req: &CreateGradeConfigurationRequest,
) -> Result<(), AppError> {
    for (name, weight) in [
        ("reporting_weight", req.reporting_weight),
        ("recitation_weight", req.recitation_weight),
        ("quiz_weight", req.quiz_weight),
    ] {
        if !(0.0..=100.0).contains(&weight) {
            return Err(AppError::Validation(format!(
                "{name} must be between 0 and 100"
            )));
        }
    }
    let sum = req.reporting_weight + req.recitation_weight + req.quiz_weight;
    if (sum - 100.0).abs() > 1e-9 {
        return Err(AppError::Validation(format!(
            "Weights must sum to 100, got {sum}"
        )));
    }
    if !(0.0..=100.0).contains(&req.passing_threshold) {
        return Err(AppError::Validation(
            "passing_threshold must be between 0 and 100".into(),
        ));
    }
    if req.end_date < req.start_date {
        return Err(AppError::Validation(
            "end_date must not be before start_date".into(),
        ));
    }
    Ok(())
}

pub fn validate_record_grade(req: &RecordGradeRequest) -> Result<(), AppError> {
    if req.component != COMPONENT_REPORTING && req.component != COMPONENT_RECITATION {
        return Err(AppError::Validation(format!(
            "component must be '{COMPONENT_REPORTING}' or '{COMPONENT_RECITATION}'"
        )));
    }
    validate_score("total", req.total)
}

pub fn validate_record_quiz_score(req: &RecordQuizScoreRequest) -> Result<(), AppError> {
    validate_score("total_grade", req.total_grade)
}

pub fn validate_save_grade_score(req: &SaveGradeScoreRequest) -> Result<(), AppError> {
    validate_score("reporting_score", req.reporting_score)?;
    validate_score("recitation_score", req.recitation_score)?;
    validate_score("quiz_score", req.quiz_score)
}

fn validate_score(name: &str, value: f64) -> Result<(), AppError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(AppError::Validation(format!(
            "{name} must be between 0 and 100"
        )));
    }
    Ok(())
}
