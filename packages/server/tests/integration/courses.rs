use serde_json::json;

use crate::common::{TestApp, routes};

mod crud {
    use super::*;

    #[tokio::test]
    async fn course_lifecycle_roundtrip() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;

        let created = app
            .post_with_token(
                routes::COURSES,
                &json!({
                    "code": "CS101",
                    "title": "Intro to Computing",
                    "description": "Fundamentals.",
                }),
                &token,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        let id = created.id();

        let updated = app
            .patch_with_token(&routes::course(id), &json!({"title": "Computing I"}), &token)
            .await;
        assert_eq!(updated.status, 200, "{}", updated.text);
        assert_eq!(updated.body["title"], "Computing I");
        assert_eq!(updated.body["code"], "CS101");

        let fetched = app.get_with_token(&routes::course(id), &token).await;
        assert_eq!(fetched.body["title"], "Computing I");
    }

    #[tokio::test]
    async fn duplicate_course_code_returns_conflict() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        app.create_course(&token, "CS101").await;

        let res = app
            .post_with_token(
                routes::COURSES,
                &json!({
                    "code": "CS101",
                    "title": "Another",
                    "description": "",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn registrar_cannot_delete_courses() {
        let app = TestApp::spawn().await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let id = app.create_course(&registrar, "CS101").await;

        let res = app.delete_with_token(&routes::course(id), &registrar).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn admin_can_delete_a_course_with_its_schedules() {
        let app = TestApp::spawn().await;
        let admin = app
            .create_user_with_role("admin@school.edu", "securepass", "admin")
            .await;
        let id = app.create_course(&admin, "CS101").await;
        let slot = app
            .post_with_token(
                &routes::schedules(id),
                &json!({
                    "day_of_week": 0,
                    "start_time": "09:00:00",
                    "end_time": "10:30:00",
                    "room": "B-204",
                }),
                &admin,
            )
            .await;
        assert_eq!(slot.status, 201, "{}", slot.text);

        let res = app.delete_with_token(&routes::course(id), &admin).await;
        assert_eq!(res.status, 204);

        let fetched = app.get_with_token(&routes::course(id), &admin).await;
        assert_eq!(fetched.status, 404);
    }
}

mod schedules {
    use super::*;

    #[tokio::test]
    async fn slots_are_listed_in_week_order() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&token, "CS101").await;

        for (day, start, end) in [(2, "14:00:00", "15:30:00"), (0, "09:00:00", "10:30:00")] {
            let res = app
                .post_with_token(
                    &routes::schedules(course_id),
                    &json!({
                        "day_of_week": day,
                        "start_time": start,
                        "end_time": end,
                        "room": "B-204",
                    }),
                    &token,
                )
                .await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app
            .get_with_token(&routes::schedules(course_id), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let slots = res.body.as_array().unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0]["day_of_week"], 0);
        assert_eq!(slots[1]["day_of_week"], 2);
    }

    #[tokio::test]
    async fn end_time_before_start_time_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&token, "CS101").await;

        let res = app
            .post_with_token(
                &routes::schedules(course_id),
                &json!({
                    "day_of_week": 0,
                    "start_time": "10:30:00",
                    "end_time": "09:00:00",
                    "room": "B-204",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn overlapping_slot_on_the_same_day_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&token, "CS101").await;

        let first = app
            .post_with_token(
                &routes::schedules(course_id),
                &json!({
                    "day_of_week": 0,
                    "start_time": "09:00:00",
                    "end_time": "10:30:00",
                    "room": "B-204",
                }),
                &token,
            )
            .await;
        assert_eq!(first.status, 201, "{}", first.text);

        let res = app
            .post_with_token(
                &routes::schedules(course_id),
                &json!({
                    "day_of_week": 0,
                    "start_time": "10:00:00",
                    "end_time": "11:00:00",
                    "room": "B-205",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn slot_can_be_moved_to_another_day() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&token, "CS101").await;
        let created = app
            .post_with_token(
                &routes::schedules(course_id),
                &json!({
                    "day_of_week": 0,
                    "start_time": "09:00:00",
                    "end_time": "10:30:00",
                    "room": "B-204",
                }),
                &token,
            )
            .await;
        let schedule_id = created.id();

        let res = app
            .patch_with_token(
                &routes::schedule(course_id, schedule_id),
                &json!({"day_of_week": 4}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["day_of_week"], 4);
        assert_eq!(res.body["room"], "B-204");
    }
}

mod enrollment {
    use super::*;

    #[tokio::test]
    async fn enrolled_students_are_listed_with_their_names() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&token, "CS101").await;
        let student_id = app.create_student(&token, "2025-0001").await;
        app.enroll_student(course_id, student_id, &token).await;

        let res = app
            .get_with_token(&routes::course_students(course_id), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let rows = res.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["student_id"], student_id);
        assert_eq!(rows[0]["student_number"], "2025-0001");
        assert_eq!(rows[0]["last_name"], "Lovelace");
    }

    #[tokio::test]
    async fn enrolling_twice_returns_conflict() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&token, "CS101").await;
        let student_id = app.create_student(&token, "2025-0001").await;
        app.enroll_student(course_id, student_id, &token).await;

        let res = app
            .post_with_token(
                &routes::course_students(course_id),
                &json!({"student_id": student_id}),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn enrolling_an_unknown_student_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let course_id = app.create_course(&token, "CS101").await;

        let res = app
            .post_with_token(
                &routes::course_students(course_id),
                &json!({"student_id": 9999}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unenrolling_keeps_recorded_grades() {
        let app = TestApp::spawn().await;
        let registrar = app
            .create_user_with_role("registrar@school.edu", "securepass", "registrar")
            .await;
        let faculty = app
            .create_authenticated_user("prof@school.edu", "securepass")
            .await;
        let course_id = app.create_course(&registrar, "CS101").await;
        let student_id = app.create_student(&registrar, "2025-0001").await;
        app.enroll_student(course_id, student_id, &registrar).await;
        app.record_grade(course_id, student_id, "reporting", 90.0, "2025-02-03", &faculty)
            .await;

        let res = app
            .delete_with_token(&routes::course_student(course_id, student_id), &registrar)
            .await;
        assert_eq!(res.status, 204);

        let grades = app
            .get_with_token(&routes::grades(course_id), &faculty)
            .await;
        assert_eq!(grades.status, 200, "{}", grades.text);
        assert_eq!(grades.body.as_array().unwrap().len(), 1);
    }
}
