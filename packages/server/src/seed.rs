use sea_orm::*;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::entity::{attendance_record, grade, role, role_permission};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "registrar", "faculty"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    ("admin", "user:manage"),
    ("admin", "user:import"),
    ("admin", "student:manage"),
    ("admin", "course:manage"),
    ("admin", "course:delete"),
    ("admin", "grade:manage"),
    ("admin", "grade:view"),
    ("admin", "attendance:manage"),
    ("admin", "attendance:view"),
    // Registrar: rosters, courses, read-only academics
    ("registrar", "user:import"),
    ("registrar", "student:manage"),
    ("registrar", "course:manage"),
    ("registrar", "grade:view"),
    ("registrar", "attendance:view"),
    // Faculty: grading and attendance for their classes
    ("faculty", "grade:manage"),
    ("faculty", "grade:view"),
    ("faculty", "attendance:manage"),
    ("faculty", "attendance:view"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Seed roles
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    // Seed role-permission mappings
    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Composite index for composite-grade derivation:
    // SELECT ... FROM grade WHERE course_id = ? AND student_id = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_grade_course_student")
        .table(grade::Entity)
        .col(grade::Column::CourseId)
        .col(grade::Column::StudentId)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_grade_course_student exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_grade_course_student: {}", e);
        }
    }

    // Composite index for attendance range queries:
    // distinct dates and per-student counts by course and date window
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_attendance_course_date")
        .table(attendance_record::Entity)
        .col(attendance_record::Column::CourseId)
        .col(attendance_record::Column::Date)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_attendance_course_date exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_attendance_course_date: {}", e);
        }
    }

    Ok(())
}
