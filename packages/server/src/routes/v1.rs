use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/students", student_routes())
        .nest("/courses", course_routes())
        .nest("/quizzes", quiz_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn user_routes() -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(
            handlers::user::list_users,
            handlers::user::create_user
        ))
        .routes(routes!(
            handlers::user::get_user,
            handlers::user::update_user,
            handlers::user::delete_user
        ));

    let import = OpenApiRouter::new()
        .routes(routes!(handlers::user::import_users))
        .layer(handlers::user::import_body_limit());

    crud.merge(import)
}

fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::student::list_students,
            handlers::student::create_student
        ))
        .routes(routes!(
            handlers::student::get_student,
            handlers::student::update_student,
            handlers::student::delete_student
        ))
}

fn course_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::course::list_courses,
            handlers::course::create_course
        ))
        .routes(routes!(
            handlers::course::get_course,
            handlers::course::update_course,
            handlers::course::delete_course
        ))
        .nest("/{id}/schedules", schedule_routes())
        .nest("/{id}/students", enrollment_routes())
        .nest(
            "/{id}/grade-configurations",
            OpenApiRouter::new().routes(routes!(
                handlers::grade::list_grade_configurations,
                handlers::grade::create_grade_configuration
            )),
        )
        .nest(
            "/{id}/grades",
            OpenApiRouter::new().routes(routes!(
                handlers::grade::list_grades,
                handlers::grade::record_grade
            )),
        )
        .nest(
            "/{id}/quizzes",
            OpenApiRouter::new().routes(routes!(
                handlers::grade::list_quizzes,
                handlers::grade::create_quiz
            )),
        )
        .nest("/{id}/attendance", attendance_routes())
}

fn schedule_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::course::list_schedules,
            handlers::course::create_schedule
        ))
        .routes(routes!(
            handlers::course::update_schedule,
            handlers::course::delete_schedule
        ))
}

fn enrollment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::course::list_enrollments,
            handlers::course::enroll_student
        ))
        .routes(routes!(handlers::course::unenroll_student))
        .routes(routes!(
            handlers::grade::get_composite_grade,
            handlers::grade::save_grade_score
        ))
}

fn attendance_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::attendance::save_attendance))
        .routes(routes!(handlers::attendance::get_attendance_range))
}

fn quiz_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::grade::record_quiz_score))
}
