use chrono::NaiveDate;
use common::attendance::AttendanceStatus;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One attendance mark in a batch save.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AttendanceEntry {
    pub student_id: i32,
    pub date: NaiveDate,
    /// One of: present, late, absent, excused.
    pub status: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SaveAttendanceRequest {
    pub records: Vec<AttendanceEntry>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct AttendanceRangeQuery {
    /// Inclusive range start, YYYY-MM-DD.
    pub start_date: String,
    /// Inclusive range end, YYYY-MM-DD.
    pub end_date: String,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct SaveAttendanceResponse {
    pub saved: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentAttendanceStats {
    pub student_id: i32,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub present: u64,
    pub late: u64,
    pub absent: u64,
    pub excused: u64,
    /// `(present + late) / total_classes * 100`, 0 when no classes were held.
    pub attendance_rate: f64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttendanceRangeResponse {
    /// Number of distinct class dates with any attendance record in range.
    pub total_classes: u64,
    pub students: Vec<StudentAttendanceStats>,
}

pub fn validate_save_attendance(req: &SaveAttendanceRequest) -> Result<(), AppError> {
    if req.records.is_empty() {
        return Err(AppError::Validation("records must not be empty".into()));
    }
    if req.records.len() > 500 {
        return Err(AppError::Validation("Too many records: max 500".into()));
    }
    for entry in &req.records {
        if AttendanceStatus::parse(&entry.status).is_none() {
            return Err(AppError::Validation(format!(
                "Invalid attendance status '{}'",
                entry.status
            )));
        }
    }
    Ok(())
}
