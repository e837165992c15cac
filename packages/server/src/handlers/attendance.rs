use std::collections::{BTreeSet, HashMap};

use axum::Json;
use axum::extract::{Path, Query, State};
use common::attendance::{self, AttendanceCounts, AttendanceStatus};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{attendance_record, enrollment, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::course::{find_course, find_course_for_update};
use crate::models::attendance::*;
use crate::models::shared::parse_date_param;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Attendance",
    operation_id = "saveAttendance",
    summary = "Batch-save attendance marks",
    description = "Saves a batch of attendance marks for a course in one transaction. Each mark is an upsert keyed on (course, student, date): re-submitting the same date overwrites the previous status instead of duplicating it. Requires `attendance:manage` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = SaveAttendanceRequest,
    responses(
        (status = 200, description = "Batch saved", body = SaveAttendanceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course or student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, records = payload.records.len()))]
pub async fn save_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<SaveAttendanceRequest>,
) -> Result<Json<SaveAttendanceResponse>, AppError> {
    auth_user.require_permission("attendance:manage")?;
    validate_save_attendance(&payload)?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;

    let student_ids: BTreeSet<i32> = payload.records.iter().map(|r| r.student_id).collect();
    let known: BTreeSet<i32> = student::Entity::find()
        .filter(student::Column::Id.is_in(student_ids.iter().copied()))
        .select_only()
        .column(student::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?
        .into_iter()
        .collect();
    if let Some(missing) = student_ids.iter().find(|id| !known.contains(id)) {
        return Err(AppError::NotFound(format!("Student {missing} not found")));
    }

    let now = chrono::Utc::now();
    let saved = payload.records.len();

    for entry in payload.records {
        // Validated above, parse cannot fail here
        let status = AttendanceStatus::parse(&entry.status)
            .ok_or_else(|| AppError::Validation(format!("Invalid status '{}'", entry.status)))?;

        let record = attendance_record::ActiveModel {
            course_id: Set(course_id),
            student_id: Set(entry.student_id),
            date: Set(entry.date),
            status: Set(status.as_str().to_string()),
            recorded_at: Set(now),
        };

        attendance_record::Entity::insert(record)
            .on_conflict(
                OnConflict::columns([
                    attendance_record::Column::CourseId,
                    attendance_record::Column::StudentId,
                    attendance_record::Column::Date,
                ])
                .update_columns([
                    attendance_record::Column::Status,
                    attendance_record::Column::RecordedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    tracing::info!(course_id, saved, user_id = auth_user.user_id, "Saved attendance batch");

    Ok(Json(SaveAttendanceResponse { saved }))
}

#[utoipa::path(
    get,
    path = "/range",
    tag = "Attendance",
    operation_id = "getAttendanceRange",
    summary = "Aggregate attendance over a date range",
    description = "Aggregates attendance for all enrolled students over an inclusive date range. `total_classes` counts distinct dates with any record; a student's rate is `(present + late) / total_classes * 100`, 0 when no classes were held. Requires `attendance:view` permission.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        AttendanceRangeQuery,
    ),
    responses(
        (status = 200, description = "Aggregated attendance", body = AttendanceRangeResponse),
        (status = 400, description = "Malformed date range (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(course_id))]
pub async fn get_attendance_range(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    Query(query): Query<AttendanceRangeQuery>,
) -> Result<Json<AttendanceRangeResponse>, AppError> {
    auth_user.require_permission("attendance:view")?;

    let start_date = parse_date_param(&query.start_date, "start_date")?;
    let end_date = parse_date_param(&query.end_date, "end_date")?;
    if end_date < start_date {
        return Err(AppError::Validation(
            "end_date must not be before start_date".into(),
        ));
    }

    find_course(&state.db, course_id).await?;

    let records = attendance_record::Entity::find()
        .filter(attendance_record::Column::CourseId.eq(course_id))
        .filter(attendance_record::Column::Date.gte(start_date))
        .filter(attendance_record::Column::Date.lte(end_date))
        .all(&state.db)
        .await?;

    let class_dates: BTreeSet<chrono::NaiveDate> = records.iter().map(|r| r.date).collect();
    let total_classes = class_dates.len() as u64;

    let mut per_student: HashMap<i32, AttendanceCounts> = HashMap::new();
    for record in &records {
        if let Some(status) = AttendanceStatus::parse(&record.status) {
            per_student.entry(record.student_id).or_default().add(status);
        }
    }

    let enrolled = enrollment::Entity::find()
        .filter(enrollment::Column::CourseId.eq(course_id))
        .find_also_related(student::Entity)
        .all(&state.db)
        .await?;

    let mut students: Vec<StudentAttendanceStats> = enrolled
        .into_iter()
        .filter_map(|(en, stu)| stu.map(|s| (en.student_id, s)))
        .map(|(student_id, stu)| {
            let counts = per_student.remove(&student_id).unwrap_or_default();
            StudentAttendanceStats {
                student_id,
                student_number: stu.student_number,
                first_name: stu.first_name,
                last_name: stu.last_name,
                present: counts.present,
                late: counts.late,
                absent: counts.absent,
                excused: counts.excused,
                attendance_rate: attendance::attendance_rate(counts, total_classes),
            }
        })
        .collect();
    students.sort_by(|a, b| {
        (a.last_name.as_str(), a.first_name.as_str())
            .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
    });

    Ok(Json(AttendanceRangeResponse {
        total_classes,
        students,
    }))
}
