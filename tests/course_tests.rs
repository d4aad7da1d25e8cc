// tests/course_tests.rs

mod common;

use common::spawn_app;
use serde_json::{Value, json};

#[tokio::test]
async fn only_instructors_and_admins_create_courses() {
    let app = spawn_app().await;
    let student = app.register_and_login("stu@example.com", "Student").await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;

    let denied = app
        .post("/courses/", &student, json!({ "title": "Rust", "description": "Ownership" }))
        .await;
    assert_eq!(denied.status().as_u16(), 403);

    let created = app
        .post(
            "/courses/",
            &instructor,
            json!({
                "title": "Rust",
                "description": "<p>Ownership</p><script>alert(1)</script>",
                "image_url": "https://cdn.example.com/rust.png"
            }),
        )
        .await;
    assert_eq!(created.status().as_u16(), 201);
    let course: Value = created.json().await.unwrap();
    assert_eq!(course["description"], "<p>Ownership</p>");

    let listed: Vec<Value> = app.get("/courses/", &student).await.json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["creator_name"], "Test User");
    assert_eq!(listed[0]["is_enrolled"], false);
}

#[tokio::test]
async fn contents_are_ordered_by_position() {
    let app = spawn_app().await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;
    let course_id = app.create_course(&instructor, "Rust").await;

    // Explicit position first, then two appended ones
    let first = app
        .post(
            &format!("/courses/{}/contents/", course_id),
            &instructor,
            json!({
                "title": "Intro video",
                "content_type": "Video",
                "video_url": "https://cdn.example.com/intro.mp4",
                "position": 5
            }),
        )
        .await;
    assert_eq!(first.status().as_u16(), 201);
    app.add_text_content(&instructor, course_id, "Notes").await;
    let pdf = app
        .post(
            &format!("/courses/{}/contents/", course_id),
            &instructor,
            json!({
                "title": "Cheat sheet",
                "content_type": "PDF",
                "pdf_url": "https://cdn.example.com/sheet.pdf",
                "position": 1
            }),
        )
        .await;
    assert_eq!(pdf.status().as_u16(), 201);

    let detail: Value = app
        .get(&format!("/courses/{}/", course_id), &instructor)
        .await
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = detail["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Cheat sheet", "Intro video", "Notes"]);
    assert_eq!(detail["contents"][2]["position"], 6);
    assert_eq!(detail["contents"][0]["content_type"], "PDF");
}

#[tokio::test]
async fn content_payload_must_match_its_type() {
    let app = spawn_app().await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;
    let course_id = app.create_course(&instructor, "Rust").await;

    let missing = app
        .post(
            &format!("/courses/{}/contents/", course_id),
            &instructor,
            json!({ "title": "Link", "content_type": "Link" }),
        )
        .await;
    assert_eq!(missing.status().as_u16(), 400);

    let bad_url = app
        .post(
            &format!("/courses/{}/contents/", course_id),
            &instructor,
            json!({ "title": "Link", "content_type": "Link", "external_link": "nowhere" }),
        )
        .await;
    assert_eq!(bad_url.status().as_u16(), 400);
}

#[tokio::test]
async fn only_the_creator_manages_a_course() {
    let app = spawn_app().await;
    let owner = app.register_and_login("owner@example.com", "Instructor").await;
    let other = app.register_and_login("other@example.com", "Instructor").await;
    let course_id = app.create_course(&owner, "Rust").await;

    let response = app
        .post(
            &format!("/courses/{}/contents/", course_id),
            &other,
            json!({ "title": "Hijack", "content_type": "Text", "text_content": "x" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 403);

    let delete = app.delete(&format!("/courses/{}/", course_id), &other).await;
    assert_eq!(delete.status().as_u16(), 403);
}

#[tokio::test]
async fn second_enrollment_is_rejected() {
    let app = spawn_app().await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;
    let student = app.register_and_login("stu@example.com", "Student").await;
    let course_id = app.create_course(&instructor, "Rust").await;

    let first = app
        .post(&format!("/courses/enroll/{}/", course_id), &student, json!({}))
        .await;
    assert_eq!(first.status().as_u16(), 201);
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["redirect"], "/my-courses/");
    assert_eq!(body["enrollment"]["progress"], 0);

    let second = app
        .post(&format!("/courses/enroll/{}/", course_id), &student, json!({}))
        .await;
    assert_eq!(second.status().as_u16(), 409);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollments WHERE course_id = ?")
        .bind(course_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let listed: Vec<Value> = app.get("/courses/", &student).await.json().await.unwrap();
    assert_eq!(listed[0]["is_enrolled"], true);
}

#[tokio::test]
async fn enrolling_in_a_missing_course_is_404() {
    let app = spawn_app().await;
    let student = app.register_and_login("stu@example.com", "Student").await;

    let response = app.post("/courses/enroll/999/", &student, json!({})).await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn completing_contents_tracks_progress() {
    let app = spawn_app().await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;
    let student = app.register_and_login("stu@example.com", "Student").await;
    let course_id = app.create_course(&instructor, "Rust").await;
    let c1 = app.add_text_content(&instructor, course_id, "One").await;
    let c2 = app.add_text_content(&instructor, course_id, "Two").await;
    let complete = |content_id: i64| format!("/courses/{}/contents/{}/complete/", course_id, content_id);

    // Not enrolled yet
    let early = app.post(&complete(c1), &student, json!({})).await;
    assert_eq!(early.status().as_u16(), 403);

    app.post(&format!("/courses/enroll/{}/", course_id), &student, json!({}))
        .await;

    let half: Value = app.post(&complete(c1), &student, json!({})).await.json().await.unwrap();
    assert_eq!(half["enrollment"]["progress"], 50);
    assert!(half["enrollment"]["completed_at"].is_null());

    // Repeating a completion changes nothing
    let again: Value = app.post(&complete(c1), &student, json!({})).await.json().await.unwrap();
    assert_eq!(again["enrollment"]["progress"], 50);

    let done: Value = app.post(&complete(c2), &student, json!({})).await.json().await.unwrap();
    assert_eq!(done["enrollment"]["progress"], 100);
    assert!(done["enrollment"]["completed_at"].is_string());

    let mine: Vec<Value> = app.get("/my-courses/", &student).await.json().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["title"], "Rust");
    assert_eq!(mine[0]["progress"], 100);

    let progress_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM course_progress")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(progress_rows, 2);
}

#[tokio::test]
async fn content_from_another_course_is_404() {
    let app = spawn_app().await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;
    let student = app.register_and_login("stu@example.com", "Student").await;
    let rust = app.create_course(&instructor, "Rust").await;
    let go = app.create_course(&instructor, "Go").await;
    let go_content = app.add_text_content(&instructor, go, "Goroutines").await;
    app.post(&format!("/courses/enroll/{}/", rust), &student, json!({}))
        .await;

    let response = app
        .post(
            &format!("/courses/{}/contents/{}/complete/", rust, go_content),
            &student,
            json!({}),
        )
        .await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn deleting_a_course_cascades() {
    let app = spawn_app().await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;
    let student = app.register_and_login("stu@example.com", "Student").await;
    let course_id = app.create_course(&instructor, "Rust").await;
    let content = app.add_text_content(&instructor, course_id, "One").await;
    app.post(&format!("/courses/enroll/{}/", course_id), &student, json!({}))
        .await;
    app.post(
        &format!("/courses/{}/contents/{}/complete/", course_id, content),
        &student,
        json!({}),
    )
    .await;

    let response = app.delete(&format!("/courses/{}/", course_id), &instructor).await;
    assert_eq!(response.status().as_u16(), 200);

    for table in ["enrollments", "course_contents", "course_progress"] {
        let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&app.pool)
            .await
            .unwrap();
        assert_eq!(rows, 0, "{} should be empty", table);
    }

    let gone = app.get(&format!("/courses/{}/", course_id), &student).await;
    assert_eq!(gone.status().as_u16(), 404);
}

#[tokio::test]
async fn self_registered_admin_cannot_manage_others_courses() {
    let app = spawn_app().await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;
    let rogue = app.register_and_login("rogue@example.com", "Admin").await;
    let course_id = app.create_course(&instructor, "Rust").await;
    let course_path = format!("/courses/{}/", course_id);

    let delete = app.delete(&course_path, &rogue).await;
    assert_eq!(delete.status().as_u16(), 403);

    let content = app
        .post(
            &format!("/courses/{}/contents/", course_id),
            &rogue,
            json!({ "title": "Spam", "content_type": "Text", "text_content": "x" }),
        )
        .await;
    assert_eq!(content.status().as_u16(), 403);

    let question = app
        .post(
            &format!("/courses/{}/questions/", course_id),
            &rogue,
            json!({
                "question_text": "2 + 2?",
                "option_1": "3", "option_2": "4", "option_3": "5", "option_4": "6",
                "correct_option": 2
            }),
        )
        .await;
    assert_eq!(question.status().as_u16(), 403);

    // The seeded staff admin keeps full control
    let staff = app
        .login_token(common::ADMIN_EMAIL, common::ADMIN_PASSWORD, "Admin")
        .await;
    assert_eq!(app.delete(&course_path, &staff).await.status().as_u16(), 200);
}

#[tokio::test]
async fn adding_content_rescores_enrollments() {
    let app = spawn_app().await;
    let instructor = app.register_and_login("ins@example.com", "Instructor").await;
    let student = app.register_and_login("stu@example.com", "Student").await;
    let course_id = app.create_course(&instructor, "Rust").await;
    let only = app.add_text_content(&instructor, course_id, "One").await;
    app.post(&format!("/courses/enroll/{}/", course_id), &student, json!({}))
        .await;

    let done: Value = app
        .post(
            &format!("/courses/{}/contents/{}/complete/", course_id, only),
            &student,
            json!({}),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(done["enrollment"]["progress"], 100);

    app.add_text_content(&instructor, course_id, "Two").await;

    let mine: Vec<Value> = app.get("/my-courses/", &student).await.json().await.unwrap();
    assert_eq!(mine[0]["progress"], 50);
    assert!(mine[0]["completed_at"].is_null());

    let profile: Value = app.get("/profile/", &student).await.json().await.unwrap();
    assert_eq!(profile["enrolled_courses"], 1);
    assert_eq!(profile["completed_courses"], 0);
}
