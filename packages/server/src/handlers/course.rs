use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    attendance_record, course, enrollment, grade, grade_configuration, grade_score, quiz,
    quiz_score, schedule, student,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::course::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Courses",
    operation_id = "createCourse",
    summary = "Create a course",
    description = "Creates a course with a unique code. Requires `course:manage` permission. Returns 409 if the code is taken.",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Course code already used (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(code = %payload.code))]
pub async fn create_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:manage")?;
    validate_create_course(&payload)?;

    let now = chrono::Utc::now();
    let new_course = course::ActiveModel {
        code: Set(payload.code.trim().to_string()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_course
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Course code is already used".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Courses",
    operation_id = "listCourses",
    summary = "List courses with pagination and search",
    description = "Returns a paginated list of courses with optional case-insensitive search over code and title. Supports sorting by `created_at`, `updated_at`, `code`, or `title`.",
    params(CourseListQuery),
    responses(
        (status = 200, description = "List of courses", body = CourseListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_courses(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> Result<Json<CourseListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = course::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\');
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(course::Column::Code)))
                            .like(pattern.clone()),
                    )
                    .add(Expr::expr(Func::lower(Expr::col(course::Column::Title))).like(pattern)),
            );
        }
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => course::Column::CreatedAt,
        "updated_at" => course::Column::UpdatedAt,
        "code" => course::Column::Code,
        "title" => course::Column::Title,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, updated_at, code, title".into(),
            ));
        }
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    select = select.order_by(sort_column, sort_order);
    let total_pages = total.div_ceil(per_page);

    let data = select
        .select_only()
        .column(course::Column::Id)
        .column(course::Column::Code)
        .column(course::Column::Title)
        .column(course::Column::CreatedAt)
        .column(course::Column::UpdatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<CourseListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(CourseListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Courses",
    operation_id = "getCourse",
    summary = "Get a course by ID",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = CourseResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_course(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CourseResponse>, AppError> {
    let model = find_course(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Courses",
    operation_id = "updateCourse",
    summary = "Update a course",
    description = "Partially updates a course using PATCH semantics. Requires `course:manage` permission. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Course code already used (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    auth_user.require_permission("course:manage")?;
    validate_update_course(&payload)?;

    if payload == UpdateCourseRequest::default() {
        let existing = find_course(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_course_for_update(&txn, id).await?;

    let mut active: course::ActiveModel = existing.into();

    if let Some(ref code) = payload.code {
        active.code = Set(code.trim().to_string());
    }
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Course code is already used".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Courses",
    operation_id = "deleteCourse",
    summary = "Delete a course",
    description = "Permanently deletes a course and cascade-deletes its schedules, enrollments, grade data, quizzes, and attendance records. Requires `course:delete` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:delete")?;

    let txn = state.db.begin().await?;
    let existing = find_course_for_update(&txn, id).await?;

    schedule::Entity::delete_many()
        .filter(schedule::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;
    enrollment::Entity::delete_many()
        .filter(enrollment::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;
    grade::Entity::delete_many()
        .filter(grade::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;
    grade_score::Entity::delete_many()
        .filter(grade_score::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;
    grade_configuration::Entity::delete_many()
        .filter(grade_configuration::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;

    let quiz_ids: Vec<i32> = quiz::Entity::find()
        .filter(quiz::Column::CourseId.eq(id))
        .select_only()
        .column(quiz::Column::Id)
        .into_tuple::<i32>()
        .all(&txn)
        .await?;
    if !quiz_ids.is_empty() {
        quiz_score::Entity::delete_many()
            .filter(quiz_score::Column::QuizId.is_in(quiz_ids))
            .exec(&txn)
            .await?;
    }
    quiz::Entity::delete_many()
        .filter(quiz::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;

    attendance_record::Entity::delete_many()
        .filter(attendance_record::Column::CourseId.eq(id))
        .exec(&txn)
        .await?;

    let active: course::ActiveModel = existing.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Schedules",
    operation_id = "createSchedule",
    summary = "Add a meeting slot to a course",
    description = "Adds a weekly meeting slot to a course. Requires `course:manage` permission. Overlapping slots on the same day are rejected.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Schedule created", body = ScheduleResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Overlapping slot (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id))]
pub async fn create_schedule(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<CreateScheduleRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:manage")?;
    validate_create_schedule(&payload)?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;

    check_slot_overlap(
        &txn,
        course_id,
        payload.day_of_week,
        payload.start_time,
        payload.end_time,
        None,
    )
    .await?;

    let new_schedule = schedule::ActiveModel {
        course_id: Set(course_id),
        day_of_week: Set(payload.day_of_week),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        room: Set(payload.room.trim().to_string()),
        ..Default::default()
    };

    let model = new_schedule.insert(&txn).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(ScheduleResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Schedules",
    operation_id = "listSchedules",
    summary = "List a course's meeting slots",
    description = "Returns all meeting slots for a course, ordered by day then start time.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of schedules", body = Vec<ScheduleResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(course_id))]
pub async fn list_schedules(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    find_course(&state.db, course_id).await?;

    let rows = schedule::Entity::find()
        .filter(schedule::Column::CourseId.eq(course_id))
        .order_by_asc(schedule::Column::DayOfWeek)
        .order_by_asc(schedule::Column::StartTime)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(ScheduleResponse::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/{schedule_id}",
    tag = "Schedules",
    operation_id = "updateSchedule",
    summary = "Update a meeting slot",
    description = "Partially updates a meeting slot. Requires `course:manage` permission. Cross-field time validation ensures end_time stays after start_time even when updating one of the two.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("schedule_id" = i32, Path, description = "Schedule ID"),
    ),
    request_body = UpdateScheduleRequest,
    responses(
        (status = 200, description = "Schedule updated", body = ScheduleResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Schedule not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Overlapping slot (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, schedule_id))]
pub async fn update_schedule(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, schedule_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateScheduleRequest>,
) -> Result<Json<ScheduleResponse>, AppError> {
    auth_user.require_permission("course:manage")?;
    validate_update_schedule(&payload)?;

    if payload == UpdateScheduleRequest::default() {
        let existing = find_schedule(&state.db, course_id, schedule_id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;
    let existing = find_schedule(&txn, course_id, schedule_id).await?;

    // Cross-field time validation against existing values
    let effective_day = payload.day_of_week.unwrap_or(existing.day_of_week);
    let effective_start = payload.start_time.unwrap_or(existing.start_time);
    let effective_end = payload.end_time.unwrap_or(existing.end_time);
    if effective_end <= effective_start {
        return Err(AppError::Validation(
            "end_time must be after start_time".into(),
        ));
    }

    check_slot_overlap(
        &txn,
        course_id,
        effective_day,
        effective_start,
        effective_end,
        Some(schedule_id),
    )
    .await?;

    let mut active: schedule::ActiveModel = existing.into();

    if let Some(day) = payload.day_of_week {
        active.day_of_week = Set(day);
    }
    if let Some(start) = payload.start_time {
        active.start_time = Set(start);
    }
    if let Some(end) = payload.end_time {
        active.end_time = Set(end);
    }
    if let Some(ref room) = payload.room {
        active.room = Set(room.trim().to_string());
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{schedule_id}",
    tag = "Schedules",
    operation_id = "deleteSchedule",
    summary = "Remove a meeting slot",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("schedule_id" = i32, Path, description = "Schedule ID"),
    ),
    responses(
        (status = 204, description = "Schedule deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Schedule not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(course_id, schedule_id))]
pub async fn delete_schedule(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, schedule_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:manage")?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;
    let existing = find_schedule(&txn, course_id, schedule_id).await?;
    let active: schedule::ActiveModel = existing.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Enrollment",
    operation_id = "enrollStudent",
    summary = "Enroll a student in a course",
    description = "Enrolls an existing student in the course. Requires `course:manage` permission. Returns 409 if the student is already enrolled.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = EnrollStudentRequest,
    responses(
        (status = 201, description = "Student enrolled", body = EnrollmentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course or student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Student already enrolled (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id))]
pub async fn enroll_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<EnrollStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:manage")?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;

    let target = student::Entity::find_by_id(payload.student_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;

    let new_enrollment = enrollment::ActiveModel {
        course_id: Set(course_id),
        student_id: Set(payload.student_id),
        enrolled_at: Set(chrono::Utc::now()),
    };

    match new_enrollment.insert(&txn).await {
        Ok(model) => {
            txn.commit().await?;
            Ok((
                StatusCode::CREATED,
                Json(EnrollmentResponse {
                    course_id: model.course_id,
                    student_id: model.student_id,
                    student_number: target.student_number,
                    first_name: target.first_name,
                    last_name: target.last_name,
                    enrolled_at: model.enrolled_at,
                }),
            ))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(AppError::Conflict("Student is already enrolled".into()))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Enrollment",
    operation_id = "listEnrollments",
    summary = "List students enrolled in a course",
    description = "Returns all enrolled students, ordered by enrollment time.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of enrollments", body = Vec<EnrollmentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(course_id))]
pub async fn list_enrollments(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<EnrollmentResponse>>, AppError> {
    find_course(&state.db, course_id).await?;

    let rows = enrollment::Entity::find()
        .filter(enrollment::Column::CourseId.eq(course_id))
        .find_also_related(student::Entity)
        .order_by_asc(enrollment::Column::EnrolledAt)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .map(|(en, stu)| {
            let (student_number, first_name, last_name) = stu
                .map(|s| (s.student_number, s.first_name, s.last_name))
                .unwrap_or_default();
            EnrollmentResponse {
                course_id: en.course_id,
                student_id: en.student_id,
                student_number,
                first_name,
                last_name,
                enrolled_at: en.enrolled_at,
            }
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    delete,
    path = "/{student_id}",
    tag = "Enrollment",
    operation_id = "unenrollStudent",
    summary = "Remove a student from a course",
    description = "Removes the enrollment. Grades and attendance already recorded for the student are kept. Requires `course:manage` permission.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 204, description = "Student unenrolled"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Enrollment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(course_id, student_id))]
pub async fn unenroll_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:manage")?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;
    let en = enrollment::Entity::find_by_id((course_id, student_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".into()))?;

    let active: enrollment::ActiveModel = en.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn check_slot_overlap<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
    day_of_week: i32,
    start_time: chrono::NaiveTime,
    end_time: chrono::NaiveTime,
    exclude_id: Option<i32>,
) -> Result<(), AppError> {
    let mut select = schedule::Entity::find()
        .filter(schedule::Column::CourseId.eq(course_id))
        .filter(schedule::Column::DayOfWeek.eq(day_of_week))
        .filter(schedule::Column::StartTime.lt(end_time))
        .filter(schedule::Column::EndTime.gt(start_time));
    if let Some(id) = exclude_id {
        select = select.filter(schedule::Column::Id.ne(id));
    }
    if select.one(db).await?.is_some() {
        return Err(AppError::Conflict(
            "Slot overlaps an existing schedule on the same day".into(),
        ));
    }
    Ok(())
}

pub(crate) async fn find_course<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<course::Model, AppError> {
    course::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

pub(crate) async fn find_course_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<course::Model, AppError> {
    use sea_orm::sea_query::LockType;
    course::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

async fn find_schedule<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
    schedule_id: i32,
) -> Result<schedule::Model, AppError> {
    schedule::Entity::find_by_id(schedule_id)
        .filter(schedule::Column::CourseId.eq(course_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".into()))
}
