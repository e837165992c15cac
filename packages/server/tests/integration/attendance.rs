use serde_json::json;

use crate::common::{TestApp, routes};

/// Course with two enrolled students, returning
/// (course_id, first_student, second_student, faculty_token).
async fn classroom(app: &TestApp) -> (i32, i32, i32, String) {
    let registrar = app
        .create_user_with_role("registrar@school.edu", "securepass", "registrar")
        .await;
    let faculty = app
        .create_authenticated_user("prof@school.edu", "securepass")
        .await;
    let course_id = app.create_course(&registrar, "CS101").await;
    let ada = app.create_student(&registrar, "2025-0001").await;
    let grace = app.create_student(&registrar, "2025-0002").await;
    app.enroll_student(course_id, ada, &registrar).await;
    app.enroll_student(course_id, grace, &registrar).await;
    (course_id, ada, grace, faculty)
}

fn stats_for(res: &crate::common::TestResponse, student_id: i32) -> serde_json::Value {
    res.body["students"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["student_id"] == student_id)
        .cloned()
        .unwrap_or_else(|| panic!("student {student_id} missing from {}", res.text))
}

#[tokio::test]
async fn batch_save_marks_every_record() {
    let app = TestApp::spawn().await;
    let (course_id, ada, grace, faculty) = classroom(&app).await;

    let res = app
        .post_with_token(
            &routes::attendance(course_id),
            &json!({
                "records": [
                    {"student_id": ada, "date": "2025-02-03", "status": "present"},
                    {"student_id": grace, "date": "2025-02-03", "status": "absent"},
                ],
            }),
            &faculty,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["saved"], 2);
}

#[tokio::test]
async fn resubmitting_a_date_overwrites_instead_of_duplicating() {
    let app = TestApp::spawn().await;
    let (course_id, ada, _, faculty) = classroom(&app).await;

    for status in ["absent", "present"] {
        let res = app
            .post_with_token(
                &routes::attendance(course_id),
                &json!({
                    "records": [
                        {"student_id": ada, "date": "2025-02-03", "status": status},
                    ],
                }),
                &faculty,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
    }

    let res = app
        .get_with_token(
            &routes::attendance_range(course_id, "2025-02-01", "2025-02-28"),
            &faculty,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["total_classes"], 1);
    let ada_stats = stats_for(&res, ada);
    assert_eq!(ada_stats["present"], 1);
    assert_eq!(ada_stats["absent"], 0);
}

#[tokio::test]
async fn range_aggregates_counts_and_rates() {
    let app = TestApp::spawn().await;
    let (course_id, ada, grace, faculty) = classroom(&app).await;

    // Four class dates: Ada is present 3 of them and late once,
    // Grace misses two and has one excused absence.
    let marks = [
        (ada, "2025-02-03", "present"),
        (grace, "2025-02-03", "present"),
        (ada, "2025-02-05", "late"),
        (grace, "2025-02-05", "absent"),
        (ada, "2025-02-10", "present"),
        (grace, "2025-02-10", "excused"),
        (ada, "2025-02-12", "present"),
        (grace, "2025-02-12", "absent"),
    ];
    let records: Vec<_> = marks
        .iter()
        .map(|(id, date, status)| json!({"student_id": id, "date": date, "status": status}))
        .collect();
    let save = app
        .post_with_token(&routes::attendance(course_id), &json!({"records": records}), &faculty)
        .await;
    assert_eq!(save.status, 200, "{}", save.text);

    let res = app
        .get_with_token(
            &routes::attendance_range(course_id, "2025-02-01", "2025-02-28"),
            &faculty,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["total_classes"], 4);

    // Late counts toward the rate
    let ada_stats = stats_for(&res, ada);
    assert_eq!(ada_stats["present"], 3);
    assert_eq!(ada_stats["late"], 1);
    assert_eq!(ada_stats["attendance_rate"], 100.0);

    let grace_stats = stats_for(&res, grace);
    assert_eq!(grace_stats["present"], 1);
    assert_eq!(grace_stats["absent"], 2);
    assert_eq!(grace_stats["excused"], 1);
    assert_eq!(grace_stats["attendance_rate"], 25.0);
}

#[tokio::test]
async fn range_outside_the_window_is_excluded() {
    let app = TestApp::spawn().await;
    let (course_id, ada, _, faculty) = classroom(&app).await;

    let save = app
        .post_with_token(
            &routes::attendance(course_id),
            &json!({
                "records": [
                    {"student_id": ada, "date": "2025-02-03", "status": "present"},
                    {"student_id": ada, "date": "2025-03-03", "status": "absent"},
                ],
            }),
            &faculty,
        )
        .await;
    assert_eq!(save.status, 200, "{}", save.text);

    let res = app
        .get_with_token(
            &routes::attendance_range(course_id, "2025-02-01", "2025-02-28"),
            &faculty,
        )
        .await;

    assert_eq!(res.body["total_classes"], 1);
    let ada_stats = stats_for(&res, ada);
    assert_eq!(ada_stats["present"], 1);
    assert_eq!(ada_stats["absent"], 0);
}

#[tokio::test]
async fn students_with_no_classes_held_have_a_zero_rate() {
    let app = TestApp::spawn().await;
    let (course_id, ada, grace, faculty) = classroom(&app).await;

    let res = app
        .get_with_token(
            &routes::attendance_range(course_id, "2025-02-01", "2025-02-28"),
            &faculty,
        )
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["total_classes"], 0);
    assert_eq!(res.body["students"].as_array().unwrap().len(), 2);
    assert_eq!(stats_for(&res, ada)["attendance_rate"], 0.0);
    assert_eq!(stats_for(&res, grace)["attendance_rate"], 0.0);
}

#[tokio::test]
async fn invalid_status_is_rejected() {
    let app = TestApp::spawn().await;
    let (course_id, ada, _, faculty) = classroom(&app).await;

    let res = app
        .post_with_token(
            &routes::attendance(course_id),
            &json!({
                "records": [
                    {"student_id": ada, "date": "2025-02-03", "status": "vacationing"},
                ],
            }),
            &faculty,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert!(res.text.contains("vacationing"), "{}", res.text);
}

#[tokio::test]
async fn marking_an_unknown_student_is_not_found() {
    let app = TestApp::spawn().await;
    let (course_id, _, _, faculty) = classroom(&app).await;

    let res = app
        .post_with_token(
            &routes::attendance(course_id),
            &json!({
                "records": [
                    {"student_id": 9999, "date": "2025-02-03", "status": "present"},
                ],
            }),
            &faculty,
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn end_before_start_is_rejected() {
    let app = TestApp::spawn().await;
    let (course_id, _, _, faculty) = classroom(&app).await;

    let res = app
        .get_with_token(
            &routes::attendance_range(course_id, "2025-02-28", "2025-02-01"),
            &faculty,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn range_is_readable_without_the_manage_permission() {
    let app = TestApp::spawn().await;
    let registrar = app
        .create_user_with_role("registrar@school.edu", "securepass", "registrar")
        .await;
    let course_id = app.create_course(&registrar, "CS101").await;

    // Registrars hold attendance:view but not attendance:manage
    let range = app
        .get_with_token(
            &routes::attendance_range(course_id, "2025-02-01", "2025-02-28"),
            &registrar,
        )
        .await;
    assert_eq!(range.status, 200, "{}", range.text);

    let save = app
        .post_with_token(
            &routes::attendance(course_id),
            &json!({"records": []}),
            &registrar,
        )
        .await;
    assert_eq!(save.status, 403);
    assert_eq!(save.body["code"], "PERMISSION_DENIED");
}
