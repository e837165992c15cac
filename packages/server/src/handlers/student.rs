use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{attendance_record, enrollment, grade, grade_score, quiz_score, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, escape_like};
use crate::models::student::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Students",
    operation_id = "createStudent",
    summary = "Create a student record",
    description = "Creates a student with a unique student number. Requires `student:manage` permission. Returns 409 if the student number is taken.",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Student number already used (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(student_number = %payload.student_number))]
pub async fn create_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;
    validate_create_student(&payload)?;

    let new_student = student::ActiveModel {
        student_number: Set(payload.student_number.trim().to_string()),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_student
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Student number is already used".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(StudentResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Students",
    operation_id = "listStudents",
    summary = "List students with pagination and search",
    description = "Returns a paginated list of students with optional case-insensitive search over names and student number. Supports sorting by `created_at`, `last_name`, or `student_number`.",
    params(StudentListQuery),
    responses(
        (status = 200, description = "List of students", body = StudentListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_students(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<Json<StudentListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = student::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\');
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(student::Column::FirstName)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(student::Column::LastName)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(student::Column::StudentNumber)))
                            .like(pattern),
                    ),
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
        "created_at" => student::Column::CreatedAt,
        "last_name" => student::Column::LastName,
        "student_number" => student::Column::StudentNumber,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, last_name, student_number".into(),
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
        .column(student::Column::Id)
        .column(student::Column::StudentNumber)
        .column(student::Column::FirstName)
        .column(student::Column::LastName)
        .column(student::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<StudentListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(StudentListResponse {
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
    tag = "Students",
    operation_id = "getStudent",
    summary = "Get a student by ID",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = StudentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_student(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    let model = find_student(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Students",
    operation_id = "updateStudent",
    summary = "Update a student record",
    description = "Partially updates a student using PATCH semantics. Requires `student:manage` permission. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Student ID")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Student number already used (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, AppError> {
    auth_user.require_permission("student:manage")?;
    validate_update_student(&payload)?;

    if payload == UpdateStudentRequest::default() {
        let existing = find_student(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_student_for_update(&txn, id).await?;

    let mut active: student::ActiveModel = existing.into();

    if let Some(ref number) = payload.student_number {
        active.student_number = Set(number.trim().to_string());
    }
    if let Some(ref first) = payload.first_name {
        active.first_name = Set(first.trim().to_string());
    }
    if let Some(ref last) = payload.last_name {
        active.last_name = Set(last.trim().to_string());
    }

    let model = active.update(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Student number is already used".into())
        }
        _ => AppError::from(e),
    })?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Students",
    operation_id = "deleteStudent",
    summary = "Delete a student record",
    description = "Permanently deletes a student and cascade-deletes their enrollments, grades, quiz scores, grade snapshots, and attendance records. Requires `student:manage` permission.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;

    let txn = state.db.begin().await?;
    let existing = find_student_for_update(&txn, id).await?;

    enrollment::Entity::delete_many()
        .filter(enrollment::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;
    grade::Entity::delete_many()
        .filter(grade::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;
    quiz_score::Entity::delete_many()
        .filter(quiz_score::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;
    grade_score::Entity::delete_many()
        .filter(grade_score::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;
    attendance_record::Entity::delete_many()
        .filter(attendance_record::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;

    let active: student::ActiveModel = existing.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn find_student<C: ConnectionTrait>(db: &C, id: i32) -> Result<student::Model, AppError> {
    student::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}

async fn find_student_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<student::Model, AppError> {
    use sea_orm::sea_query::LockType;
    student::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}
