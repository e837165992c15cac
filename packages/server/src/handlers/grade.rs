use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::NaiveDate;
use common::grading::{self, GradeWeights};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{grade, grade_configuration, grade_score, quiz, quiz_score, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::course::{find_course, find_course_for_update};
use crate::models::grade::*;
use crate::models::shared::parse_date_param;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Grades",
    operation_id = "createGradeConfiguration",
    summary = "Create a grade configuration for a course",
    description = "Creates a new grade configuration (component weights, passing threshold, grading period). Weights must sum to 100. The most recently created configuration becomes authoritative; earlier ones are kept because persisted score snapshots reference them. Requires `grade:manage` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = CreateGradeConfigurationRequest,
    responses(
        (status = 201, description = "Configuration created", body = GradeConfigurationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id))]
pub async fn create_grade_configuration(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<CreateGradeConfigurationRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grade:manage")?;
    validate_create_grade_configuration(&payload)?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;

    let new_config = grade_configuration::ActiveModel {
        course_id: Set(course_id),
        reporting_weight: Set(payload.reporting_weight),
        recitation_weight: Set(payload.recitation_weight),
        quiz_weight: Set(payload.quiz_weight),
        passing_threshold: Set(payload.passing_threshold),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_config.insert(&txn).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(GradeConfigurationResponse::from(model)),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Grades",
    operation_id = "listGradeConfigurations",
    summary = "List a course's grade configurations",
    description = "Returns all grade configurations for the course, newest first. The first entry is the authoritative one.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of configurations", body = Vec<GradeConfigurationResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(course_id))]
pub async fn list_grade_configurations(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<GradeConfigurationResponse>>, AppError> {
    auth_user.require_permission("grade:view")?;
    find_course(&state.db, course_id).await?;

    let rows = grade_configuration::Entity::find()
        .filter(grade_configuration::Column::CourseId.eq(course_id))
        .order_by_desc(grade_configuration::Column::CreatedAt)
        .order_by_desc(grade_configuration::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(
        rows.into_iter()
            .map(GradeConfigurationResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Grades",
    operation_id = "recordGrade",
    summary = "Record a reporting or recitation grade event",
    description = "Records one graded event for an enrolled student. Requires `grade:manage` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = RecordGradeRequest,
    responses(
        (status = 201, description = "Grade recorded", body = GradeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course or student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, student_id = payload.student_id))]
pub async fn record_grade(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<RecordGradeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grade:manage")?;
    validate_record_grade(&payload)?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;
    find_student(&txn, payload.student_id).await?;

    let new_grade = grade::ActiveModel {
        course_id: Set(course_id),
        student_id: Set(payload.student_id),
        component: Set(payload.component),
        total: Set(payload.total),
        date: Set(payload.date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_grade.insert(&txn).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(GradeResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Grades",
    operation_id = "listGrades",
    summary = "List grade events for a course",
    description = "Returns all reporting and recitation grade events for the course, ordered by date.",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of grade events", body = Vec<GradeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(course_id))]
pub async fn list_grades(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<GradeResponse>>, AppError> {
    auth_user.require_permission("grade:view")?;
    find_course(&state.db, course_id).await?;

    let rows = grade::Entity::find()
        .filter(grade::Column::CourseId.eq(course_id))
        .order_by_asc(grade::Column::Date)
        .order_by_asc(grade::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(GradeResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Grades",
    operation_id = "createQuiz",
    summary = "Create a quiz for a course",
    description = "Creates a quiz. Scores are recorded per student against the quiz. Requires `grade:manage` permission.",
    params(("id" = i32, Path, description = "Course ID")),
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, title = %payload.title))]
pub async fn create_quiz(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
    AppJson(payload): AppJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grade:manage")?;
    crate::models::shared::validate_title(&payload.title)?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;

    let new_quiz = quiz::ActiveModel {
        course_id: Set(course_id),
        title: Set(payload.title.trim().to_string()),
        date: Set(payload.date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_quiz.insert(&txn).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(QuizResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Grades",
    operation_id = "listQuizzes",
    summary = "List a course's quizzes",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of quizzes", body = Vec<QuizResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(course_id))]
pub async fn list_quizzes(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<QuizResponse>>, AppError> {
    auth_user.require_permission("grade:view")?;
    find_course(&state.db, course_id).await?;

    let rows = quiz::Entity::find()
        .filter(quiz::Column::CourseId.eq(course_id))
        .order_by_asc(quiz::Column::Date)
        .order_by_asc(quiz::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(rows.into_iter().map(QuizResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/scores",
    tag = "Grades",
    operation_id = "recordQuizScore",
    summary = "Record a student's quiz score",
    description = "Records one student's score for a quiz. Re-submitting for the same student returns 409. Requires `grade:manage` permission.",
    params(("id" = i32, Path, description = "Quiz ID")),
    request_body = RecordQuizScoreRequest,
    responses(
        (status = 201, description = "Score recorded", body = QuizScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Quiz or student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Score already recorded (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(quiz_id, student_id = payload.student_id))]
pub async fn record_quiz_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(quiz_id): Path<i32>,
    AppJson(payload): AppJson<RecordQuizScoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grade:manage")?;
    validate_record_quiz_score(&payload)?;

    let txn = state.db.begin().await?;
    quiz::Entity::find_by_id(quiz_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".into()))?;
    find_student(&txn, payload.student_id).await?;

    let new_score = quiz_score::ActiveModel {
        quiz_id: Set(quiz_id),
        student_id: Set(payload.student_id),
        total_grade: Set(payload.total_grade),
        created_at: Set(chrono::Utc::now()),
    };

    match new_score.insert(&txn).await {
        Ok(model) => {
            txn.commit().await?;
            Ok((
                StatusCode::CREATED,
                Json(QuizScoreResponse {
                    quiz_id: model.quiz_id,
                    student_id: model.student_id,
                    total_grade: model.total_grade,
                }),
            ))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("Score already recorded for this student".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/{student_id}/grades",
    tag = "Grades",
    operation_id = "getCompositeGrade",
    summary = "Derive a student's composite grade",
    description = "Derives the student's composite grade under the course's latest grade configuration: per-component averages of raw records, weighted total, and a PASSED/FAILED remark (NO GRADE when no records exist in the requested range). Optional `from`/`to` restrict the records considered by date.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("student_id" = i32, Path, description = "Student ID"),
        CompositeQuery,
    ),
    responses(
        (status = 200, description = "Derived composite", body = CompositeResponse),
        (status = 400, description = "Malformed date filter (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course, student, or configuration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(course_id, student_id))]
pub async fn get_composite_grade(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(i32, i32)>,
    Query(query): Query<CompositeQuery>,
) -> Result<Json<CompositeResponse>, AppError> {
    auth_user.require_permission("grade:view")?;

    let from = query
        .from
        .as_deref()
        .map(|v| parse_date_param(v, "from"))
        .transpose()?;
    let to = query
        .to
        .as_deref()
        .map(|v| parse_date_param(v, "to"))
        .transpose()?;

    find_course(&state.db, course_id).await?;
    find_student(&state.db, student_id).await?;
    let config = latest_configuration(&state.db, course_id).await?;

    let derived = derive_composite(&state.db, &config, course_id, student_id, from, to).await?;

    Ok(Json(derived))
}

#[utoipa::path(
    post,
    path = "/{student_id}/grades",
    tag = "Grades",
    operation_id = "saveGradeScore",
    summary = "Persist a composite grade snapshot",
    description = "Persists a composite score snapshot for the student. The caller supplies the three sub-scores; the total and remark are re-derived server-side under the course's latest grade configuration, and the stored row references that configuration so later weight changes cannot reinterpret it. Requires `grade:manage` permission.",
    params(
        ("id" = i32, Path, description = "Course ID"),
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    request_body = SaveGradeScoreRequest,
    responses(
        (status = 201, description = "Snapshot saved", body = GradeScoreResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course, student, or configuration not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id, student_id))]
pub async fn save_grade_score(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((course_id, student_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<SaveGradeScoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("grade:manage")?;
    validate_save_grade_score(&payload)?;

    let txn = state.db.begin().await?;
    find_course_for_update(&txn, course_id).await?;
    find_student(&txn, student_id).await?;
    let config = latest_configuration(&txn, course_id).await?;

    let composite = grading::compute_composite(
        weights_of(&config),
        config.passing_threshold,
        payload.reporting_score,
        payload.recitation_score,
        payload.quiz_score,
    );

    let new_score = grade_score::ActiveModel {
        grade_configuration_id: Set(config.id),
        course_id: Set(course_id),
        student_id: Set(student_id),
        reporting_score: Set(composite.reporting),
        recitation_score: Set(composite.recitation),
        quiz_score: Set(composite.quiz),
        total_score: Set(composite.total),
        remarks: Set(composite.remarks.as_str().to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_score.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        course_id,
        student_id,
        grade_configuration_id = model.grade_configuration_id,
        total = model.total_score,
        remarks = %model.remarks,
        "Saved grade snapshot"
    );

    Ok((StatusCode::CREATED, Json(GradeScoreResponse::from(model))))
}

/// Derive the composite for one student under the given configuration.
///
/// The GET derivation and any future recompute path must both go through this
/// function and [`grading::compute_composite_for_records`], so the stored and
/// displayed numbers cannot drift apart.
async fn derive_composite<C: ConnectionTrait>(
    db: &C,
    config: &grade_configuration::Model,
    course_id: i32,
    student_id: i32,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<CompositeResponse, AppError> {
    let mut grade_select = grade::Entity::find()
        .filter(grade::Column::CourseId.eq(course_id))
        .filter(grade::Column::StudentId.eq(student_id));
    if let Some(from) = from {
        grade_select = grade_select.filter(grade::Column::Date.gte(from));
    }
    if let Some(to) = to {
        grade_select = grade_select.filter(grade::Column::Date.lte(to));
    }
    let grade_rows = grade_select.all(db).await?;

    let reporting: Vec<f64> = grade_rows
        .iter()
        .filter(|g| g.component == COMPONENT_REPORTING)
        .map(|g| g.total)
        .collect();
    let recitation: Vec<f64> = grade_rows
        .iter()
        .filter(|g| g.component == COMPONENT_RECITATION)
        .map(|g| g.total)
        .collect();

    let mut quiz_select = quiz::Entity::find()
        .filter(quiz::Column::CourseId.eq(course_id))
        .select_only()
        .column(quiz::Column::Id);
    if let Some(from) = from {
        quiz_select = quiz_select.filter(quiz::Column::Date.gte(from));
    }
    if let Some(to) = to {
        quiz_select = quiz_select.filter(quiz::Column::Date.lte(to));
    }
    let quiz_ids: Vec<i32> = quiz_select.into_tuple::<i32>().all(db).await?;

    let quiz_totals: Vec<f64> = if quiz_ids.is_empty() {
        Vec::new()
    } else {
        quiz_score::Entity::find()
            .filter(quiz_score::Column::QuizId.is_in(quiz_ids))
            .filter(quiz_score::Column::StudentId.eq(student_id))
            .select_only()
            .column(quiz_score::Column::TotalGrade)
            .into_tuple::<f64>()
            .all(db)
            .await?
    };

    let record_count = reporting.len() + recitation.len() + quiz_totals.len();
    let composite = grading::compute_composite_for_records(
        weights_of(config),
        config.passing_threshold,
        grading::mean(&reporting),
        grading::mean(&recitation),
        grading::mean(&quiz_totals),
        record_count,
    );

    Ok(CompositeResponse {
        grade_configuration_id: config.id,
        reporting_score: composite.reporting,
        recitation_score: composite.recitation,
        quiz_score: composite.quiz,
        total_score: composite.total,
        remarks: composite.remarks,
        counts: RecordCounts {
            reporting: reporting.len(),
            recitation: recitation.len(),
            quiz: quiz_totals.len(),
        },
    })
}

fn weights_of(config: &grade_configuration::Model) -> GradeWeights {
    GradeWeights {
        reporting: config.reporting_weight,
        recitation: config.recitation_weight,
        quiz: config.quiz_weight,
    }
}

/// Latest-created configuration wins; creation order breaks `created_at` ties.
async fn latest_configuration<C: ConnectionTrait>(
    db: &C,
    course_id: i32,
) -> Result<grade_configuration::Model, AppError> {
    grade_configuration::Entity::find()
        .filter(grade_configuration::Column::CourseId.eq(course_id))
        .order_by_desc(grade_configuration::Column::CreatedAt)
        .order_by_desc(grade_configuration::Column::Id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No grade configuration for this course".into()))
}

async fn find_student<C: ConnectionTrait>(db: &C, id: i32) -> Result<student::Model, AppError> {
    student::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}
