use serde_json::json;

use crate::common::{TestApp, routes};

mod configuration {
    use super::*;

    #[tokio::test]
    async fn weights_must_sum_to_one_hundred() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;

        let res = app
            .post_with_token(
                &routes::grade_configurations(course_id),
                &json!({
                    "reporting_weight": 30.0,
                    "recitation_weight": 30.0,
                    "quiz_weight": 30.0,
                    "passing_threshold": 75.0,
                    "start_date": "2025-01-06",
                    "end_date": "2025-05-30",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.text.contains("sum to 100"), "{}", res.text);
    }

    #[tokio::test]
    async fn newest_configuration_is_listed_first() {
        let app = TestApp::spawn().await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;

        let first = app
            .create_grade_configuration(course_id, &faculty, (30.0, 30.0, 40.0), 75.0)
            .await;
        let second = app
            .create_grade_configuration(course_id, &faculty, (20.0, 30.0, 50.0), 60.0)
            .await;

        let res = app
            .get_with_token(&routes::grade_configurations(course_id), &faculty)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let configs = res.body.as_array().unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0]["id"], second);
        assert_eq!(configs[1]["id"], first);
    }

    #[tokio::test]
    async fn end_date_before_start_date_is_rejected() {
        let app = TestApp::spawn().await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;

        let res = app
            .post_with_token(
                &routes::grade_configurations(course_id),
                &json!({
                    "reporting_weight": 30.0,
                    "recitation_weight": 30.0,
                    "quiz_weight": 40.0,
                    "passing_threshold": 75.0,
                    "start_date": "2025-05-30",
                    "end_date": "2025-01-06",
                }),
                &faculty,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod composite {
    use super::*;

    /// Sets up a course with one student and a 30/30/40 configuration at
    /// threshold 75, returning (course_id, student_id, faculty_token).
    async fn gradebook(app: &TestApp) -> (i32, i32, String) {
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;
        let student_id = app.create_student(&registrar, "2025-0001").await;
        app.enroll_student(course_id, student_id, &registrar).await;
        app.create_grade_configuration(course_id, &faculty, (30.0, 30.0, 40.0), 75.0)
            .await;
        (course_id, student_id, faculty)
    }

    #[tokio::test]
    async fn worked_example_passes_at_eighty_one() {
        let app = TestApp::spawn().await;
        let (course_id, student_id, faculty) = gradebook(&app).await;

        app.record_grade(course_id, student_id, "reporting", 80.0, "2025-02-03", &faculty)
            .await;
        app.record_grade(course_id, student_id, "recitation", 70.0, "2025-02-10", &faculty)
            .await;
        let quiz_id = app.create_quiz(course_id, "2025-02-17", &faculty).await;
        app.record_quiz_score(quiz_id, student_id, 90.0, &faculty)
            .await;

        let res = app
            .get_with_token(&routes::student_grades(course_id, student_id), &faculty)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["reporting_score"], 80.0);
        assert_eq!(res.body["recitation_score"], 70.0);
        assert_eq!(res.body["quiz_score"], 90.0);
        assert_eq!(res.body["total_score"], 81.0);
        assert_eq!(res.body["remarks"], "PASSED");
        assert_eq!(res.body["counts"]["reporting"], 1);
        assert_eq!(res.body["counts"]["quiz"], 1);
    }

    #[tokio::test]
    async fn worked_example_fails_at_fifty() {
        let app = TestApp::spawn().await;
        let (course_id, student_id, faculty) = gradebook(&app).await;

        app.record_grade(course_id, student_id, "reporting", 50.0, "2025-02-03", &faculty)
            .await;
        app.record_grade(course_id, student_id, "recitation", 50.0, "2025-02-10", &faculty)
            .await;
        let quiz_id = app.create_quiz(course_id, "2025-02-17", &faculty).await;
        app.record_quiz_score(quiz_id, student_id, 50.0, &faculty)
            .await;

        let res = app
            .get_with_token(&routes::student_grades(course_id, student_id), &faculty)
            .await;

        assert_eq!(res.body["total_score"], 50.0);
        assert_eq!(res.body["remarks"], "FAILED");
    }

    #[tokio::test]
    async fn total_equal_to_threshold_passes() {
        let app = TestApp::spawn().await;
        let (course_id, student_id, faculty) = gradebook(&app).await;

        app.record_grade(course_id, student_id, "reporting", 75.0, "2025-02-03", &faculty)
            .await;
        app.record_grade(course_id, student_id, "recitation", 75.0, "2025-02-10", &faculty)
            .await;
        let quiz_id = app.create_quiz(course_id, "2025-02-17", &faculty).await;
        app.record_quiz_score(quiz_id, student_id, 75.0, &faculty)
            .await;

        let res = app
            .get_with_token(&routes::student_grades(course_id, student_id), &faculty)
            .await;

        assert_eq!(res.body["total_score"], 75.0);
        assert_eq!(res.body["remarks"], "PASSED");
    }

    #[tokio::test]
    async fn student_with_no_records_gets_no_grade() {
        let app = TestApp::spawn().await;
        let (course_id, student_id, faculty) = gradebook(&app).await;

        let res = app
            .get_with_token(&routes::student_grades(course_id, student_id), &faculty)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total_score"], 0.0);
        assert_eq!(res.body["remarks"], "NO GRADE");
    }

    #[tokio::test]
    async fn date_filter_restricts_the_considered_records() {
        let app = TestApp::spawn().await;
        let (course_id, student_id, faculty) = gradebook(&app).await;

        app.record_grade(course_id, student_id, "reporting", 100.0, "2025-02-03", &faculty)
            .await;
        app.record_grade(course_id, student_id, "reporting", 50.0, "2025-04-07", &faculty)
            .await;

        let filtered = app
            .get_with_token(
                &format!(
                    "{}?from=2025-02-01&to=2025-02-28",
                    routes::student_grades(course_id, student_id)
                ),
                &faculty,
            )
            .await;

        assert_eq!(filtered.status, 200, "{}", filtered.text);
        assert_eq!(filtered.body["reporting_score"], 100.0);
        assert_eq!(filtered.body["counts"]["reporting"], 1);

        let unfiltered = app
            .get_with_token(&routes::student_grades(course_id, student_id), &faculty)
            .await;
        assert_eq!(unfiltered.body["reporting_score"], 75.0);
        assert_eq!(unfiltered.body["counts"]["reporting"], 2);
    }

    #[tokio::test]
    async fn malformed_date_filter_is_rejected() {
        let app = TestApp::spawn().await;
        let (course_id, student_id, faculty) = gradebook(&app).await;

        let res = app
            .get_with_token(
                &format!(
                    "{}?from=02/03/2025",
                    routes::student_grades(course_id, student_id)
                ),
                &faculty,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn latest_configuration_wins_the_derivation() {
        let app = TestApp::spawn().await;
        let (course_id, student_id, faculty) = gradebook(&app).await;

        app.record_grade(course_id, student_id, "reporting", 80.0, "2025-02-03", &faculty)
            .await;

        // 30/30/40 at threshold 75: 80 reporting alone is 24.0, FAILED
        let before = app
            .get_with_token(&routes::student_grades(course_id, student_id), &faculty)
            .await;
        assert_eq!(before.body["total_score"], 24.0);
        assert_eq!(before.body["remarks"], "FAILED");

        // All weight on reporting at threshold 60: the same records now pass
        let new_config = app
            .create_grade_configuration(course_id, &faculty, (100.0, 0.0, 0.0), 60.0)
            .await;

        let after = app
            .get_with_token(&routes::student_grades(course_id, student_id), &faculty)
            .await;
        assert_eq!(after.body["grade_configuration_id"], new_config);
        assert_eq!(after.body["total_score"], 80.0);
        assert_eq!(after.body["remarks"], "PASSED");
    }

    #[tokio::test]
    async fn derivation_without_a_configuration_is_not_found() {
        let app = TestApp::spawn().await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;
        let student_id = app.create_student(&registrar, "2025-0001").await;

        let res = app
            .get_with_token(&routes::student_grades(course_id, student_id), &faculty)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod snapshot {
    use super::*;

    #[tokio::test]
    async fn snapshot_rederives_total_and_remarks_server_side() {
        let app = TestApp::spawn().await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;
        let student_id = app.create_student(&registrar, "2025-0001").await;
        let config_id = app
            .create_grade_configuration(course_id, &faculty, (30.0, 30.0, 40.0), 75.0)
            .await;

        let res = app
            .post_with_token(
                &routes::student_grades(course_id, student_id),
                &json!({
                    "reporting_score": 80.0,
                    "recitation_score": 70.0,
                    "quiz_score": 90.0,
                }),
                &faculty,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["grade_configuration_id"], config_id);
        assert_eq!(res.body["total_score"], 81.0);
        assert_eq!(res.body["remarks"], "PASSED");
    }

    #[tokio::test]
    async fn snapshot_pins_the_configuration_it_was_computed_under() {
        let app = TestApp::spawn().await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;
        let student_id = app.create_student(&registrar, "2025-0001").await;
        let old_config = app
            .create_grade_configuration(course_id, &faculty, (30.0, 30.0, 40.0), 75.0)
            .await;

        let body = json!({
            "reporting_score": 80.0,
            "recitation_score": 70.0,
            "quiz_score": 90.0,
        });
        let first = app
            .post_with_token(&routes::student_grades(course_id, student_id), &body, &faculty)
            .await;
        assert_eq!(first.body["grade_configuration_id"], old_config);

        let new_config = app
            .create_grade_configuration(course_id, &faculty, (100.0, 0.0, 0.0), 90.0)
            .await;

        let second = app
            .post_with_token(&routes::student_grades(course_id, student_id), &body, &faculty)
            .await;
        assert_eq!(second.body["grade_configuration_id"], new_config);
        assert_eq!(second.body["total_score"], 80.0);
        assert_eq!(second.body["remarks"], "FAILED");
    }

    #[tokio::test]
    async fn snapshot_scores_outside_the_valid_range_are_rejected() {
        let app = TestApp::spawn().await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;
        let student_id = app.create_student(&registrar, "2025-0001").await;
        app.create_grade_configuration(course_id, &faculty, (30.0, 30.0, 40.0), 75.0)
            .await;

        let res = app
            .post_with_token(
                &routes::student_grades(course_id, student_id),
                &json!({
                    "reporting_score": 120.0,
                    "recitation_score": 70.0,
                    "quiz_score": 90.0,
                }),
                &faculty,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod quizzes {
    use super::*;

    #[tokio::test]
    async fn duplicate_quiz_score_returns_conflict() {
        let app = TestApp::spawn().await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;
        let student_id = app.create_student(&registrar, "2025-0001").await;
        let quiz_id = app.create_quiz(course_id, "2025-02-17", &faculty).await;
        app.record_quiz_score(quiz_id, student_id, 90.0, &faculty)
            .await;

        let res = app
            .post_with_token(
                &routes::quiz_scores(quiz_id),
                &json!({"student_id": student_id, "total_grade": 85.0}),
                &faculty,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn recording_a_grade_with_an_unknown_component_is_rejected() {
        let app = TestApp::spawn().await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;
        let student_id = app.create_student(&registrar, "2025-0001").await;

        let res = app
            .post_with_token(
                &routes::grades(course_id),
                &json!({
                    "student_id": student_id,
                    "component": "homework",
                    "total": 90.0,
                    "date": "2025-02-03",
                }),
                &faculty,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
