use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::import::{self, RowError};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, escape_like};
use crate::models::user::*;
use crate::state::AppState;
use crate::utils::{hash, password};

/// Rows are imported in batches of this size, each batch concurrently.
const IMPORT_BATCH_SIZE: usize = 10;

#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a staff account",
    description = "Creates a staff account with an explicit role and work type. Requires `user:manage` permission. Returns 409 if the email is already registered.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Email already registered (EMAIL_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(email = %payload.email))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("user:manage")?;
    validate_create_user(&payload)?;

    let role_name = find_role(&state.db, &payload.role).await?;

    let hashed = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        email: Set(payload.email.trim().to_string()),
        name: Set(payload.name.trim().to_string()),
        password: Set(hashed),
        role: Set(role_name),
        work_type: Set(import::normalize_enum(&payload.work_type)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::EmailTaken,
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List staff accounts with pagination and search",
    description = "Returns a paginated list of staff accounts with optional case-insensitive search over name and email. Requires `user:manage` permission. Supports sorting by `created_at`, `name`, or `email`.",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_permission("user:manage")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = user::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\');
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                            .like(pattern.clone()),
                    )
                    .add(Expr::expr(Func::lower(Expr::col(user::Column::Email))).like(pattern)),
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
        "created_at" => user::Column::CreatedAt,
        "name" => user::Column::Name,
        "email" => user::Column::Email,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, name, email".into(),
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
        .column(user::Column::Id)
        .column(user::Column::Email)
        .column(user::Column::Name)
        .column(user::Column::Role)
        .column(user::Column::WorkType)
        .column(user::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<UserListItem>()
        .all(&state.db)
        .await?;

    Ok(Json(UserListResponse {
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
    tag = "Users",
    operation_id = "getUser",
    summary = "Get a staff account by ID",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_permission("user:manage")?;
    let model = find_user(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Users",
    operation_id = "updateUser",
    summary = "Update a staff account",
    description = "Partially updates a staff account using PATCH semantics. Requires `user:manage` permission. An empty payload returns the current resource unchanged. Email is immutable.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_permission("user:manage")?;
    validate_update_user(&payload)?;

    if payload == UpdateUserRequest::default() {
        let existing = find_user(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let new_role = match payload.role {
        Some(ref role_name) => Some(find_role(&state.db, role_name).await?),
        None => None,
    };

    let txn = state.db.begin().await?;
    let existing = find_user_for_update(&txn, id).await?;

    let mut active: user::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(role_name) = new_role {
        active.role = Set(role_name);
    }
    if let Some(ref work_type) = payload.work_type {
        active.work_type = Set(import::normalize_enum(work_type));
    }
    if let Some(ref new_password) = payload.password {
        let hashed = hash::hash_password(new_password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;
        active.password = Set(hashed);
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    operation_id = "deleteUser",
    summary = "Delete a staff account",
    description = "Permanently deletes a staff account. Requires `user:manage` permission. The caller cannot delete their own account.",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete own account (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("user:manage")?;

    if id == auth_user.user_id {
        return Err(AppError::Validation("Cannot delete your own account".into()));
    }

    let txn = state.db.begin().await?;
    let existing = find_user_for_update(&txn, id).await?;
    let active: user::ActiveModel = existing.into();
    active.delete(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Bulk-import staff accounts from an uploaded roster.
#[utoipa::path(
    post,
    path = "/import",
    tag = "Users",
    operation_id = "importUsers",
    summary = "Bulk-import staff accounts from a CSV roster",
    description = "Imports staff accounts from an uploaded CSV file. The header row is located by scanning for an `Email` column, so banner rows above the header are tolerated. Each imported account gets a generated password. Rows that fail validation or collide with an existing email are skipped and reported; the response is always 200 with per-row results. Requires `user:import` permission.",
    request_body(content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import outcome with per-row errors; file-level failures come back as a zero-imported outcome with one line-0 error", body = ImportResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn import_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    auth_user.require_permission("user:import")?;

    // Anything that goes wrong before the first row is read still answers
    // 200: a zero-imported outcome with a single line-0 error entry.
    let mut file_name = String::new();
    let mut file_bytes = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => file_bytes = Some(bytes),
                    Err(e) => {
                        return Ok(import_aborted(format!("Failed to read file: {e}")));
                    }
                }
                break;
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => {
                return Ok(import_aborted(format!("Invalid multipart body: {e}")));
            }
        }
    }
    let Some(bytes) = file_bytes else {
        return Ok(import_aborted("Missing 'file' field"));
    };

    if file_name.to_ascii_lowercase().ends_with(".xlsx") {
        return Ok(import_aborted(
            "Excel workbooks are not supported; export the sheet as CSV",
        ));
    }

    let known_roles: Vec<String> = role::Entity::find()
        .select_only()
        .column(role::Column::Name)
        .into_tuple::<String>()
        .all(&state.db)
        .await?;
    let known_role_refs: Vec<&str> = known_roles.iter().map(String::as_str).collect();

    let (rows, mut errors) = match import::parse_rows(&bytes, &known_role_refs) {
        Ok(parsed) => parsed,
        Err(e) => return Ok(import_aborted(e.to_string())),
    };

    let mut imported = 0;

    for batch in rows.chunks(IMPORT_BATCH_SIZE) {
        let outcomes = futures::future::join_all(
            batch.iter().map(|row| import_row(&state.db, row.clone())),
        )
        .await;
        for outcome in outcomes {
            match outcome {
                Ok(()) => imported += 1,
                Err(e) => errors.push(e),
            }
        }
    }

    errors.sort_by_key(|e| e.line);
    let skipped = errors.iter().filter(|e| e.line > 0).count();

    tracing::info!(
        imported,
        skipped,
        file = %file_name,
        user_id = auth_user.user_id,
        "Imported user roster"
    );

    Ok(Json(ImportResponse {
        imported,
        skipped,
        errors,
    }))
}

/// Import outcome for an upload that failed before any row was read.
fn import_aborted(message: impl Into<String>) -> Json<ImportResponse> {
    Json(ImportResponse {
        imported: 0,
        skipped: 0,
        errors: vec![RowError::new(0, message)],
    })
}

/// Insert one validated roster row, hashing its generated password off the
/// async runtime. Duplicate emails surface as the database's unique
/// constraint, not a pre-check, so concurrent imports stay correct.
async fn import_row(db: &DatabaseConnection, row: import::ImportedRow) -> Result<(), RowError> {
    let plaintext = password::generate_password(12);
    let hashed = tokio::task::spawn_blocking(move || hash::hash_password(&plaintext))
        .await
        .map_err(|e| RowError::new(row.line, format!("Password hashing task failed: {e}")))?
        .map_err(|e| RowError::new(row.line, format!("Password hash error: {e}")))?;

    let new_user = user::ActiveModel {
        email: Set(row.email.clone()),
        name: Set(row.name),
        password: Set(hashed),
        role: Set(row.role),
        work_type: Set(row.work_type),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match new_user.insert(db).await {
        Ok(_) => Ok(()),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            RowError::new(row.line, format!("Email '{}' already exists", row.email)),
        ),
        Err(e) => Err(RowError::new(row.line, format!("Insert failed: {e}"))),
    }
}

/// Body limit for roster uploads.
pub fn import_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(16 * 1024 * 1024)
}

async fn find_user<C: ConnectionTrait>(db: &C, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn find_user_for_update(txn: &DatabaseTransaction, id: i32) -> Result<user::Model, AppError> {
    use sea_orm::sea_query::LockType;
    user::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

async fn find_role<C: ConnectionTrait>(db: &C, name: &str) -> Result<String, AppError> {
    let normalized = import::normalize_enum(name);
    role::Entity::find_by_id(&normalized)
        .one(db)
        .await?
        .map(|r| r.name)
        .ok_or_else(|| AppError::Validation(format!("Unknown role '{name}'")))
}
