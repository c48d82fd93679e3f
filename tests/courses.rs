mod common;
use axum::http::StatusCode;
use serde_json::json;

use crate::common::{
    Action, FAILING_TITLE, Flow, course_path, create_course_action, setup_server, setup_test_db,
};

#[tokio::test]
async fn route_create_course_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            create_course_action("alice", "Intro to Testing")
                .assert_body(|body| {
                    assert_eq!(body["title"], "Intro to Testing");
                    assert_eq!(body["category"], "Other");
                    assert_eq!(body["progress_percentage"], 0);
                    assert_eq!(body["current_module_index"], 0);

                    let modules = body["modules"].as_array().unwrap();
                    assert_eq!(modules.len(), 1);
                    let subtopics = modules[0]["subtopics"].as_array().unwrap();
                    assert_eq!(subtopics.len(), 1);
                    assert_eq!(subtopics[0]["completed"], false);
                    assert_eq!(subtopics[0]["video_url"], "https://example.com/v1");
                })
                .with_save_as("course"),
        )
        .step(
            Action::new("detail", "GET", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", ""))
                .assert_body(|body| {
                    assert_eq!(
                        body["modules"][0]["subtopics"][0]["video_url"],
                        "https://example.com/v1"
                    );
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_create_course_rejects_bad_payload_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            Action::new("blank_title", "POST", "/api/courses/create/")
                .with_body(json!({"title": "  ", "description": "d", "category": "Other"}))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("unknown_category", "POST", "/api/courses/create/")
                .with_body(json!({"title": "t", "description": "d", "category": "Cooking"}))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("missing_description", "POST", "/api/courses/create/")
                .with_body(json!({"title": "t", "category": "Other"}))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert_eq!(body["status_code"], "400");
                    assert!(body["message"].as_str().unwrap().contains("description"));
                }),
        )
        .step(
            Action::new("mistyped_title", "POST", "/api/courses/create/")
                .with_body(json!({"title": 5, "description": "d", "category": "Other"}))
                .with_expect(StatusCode::BAD_REQUEST)
                .assert_body(|body| {
                    assert_eq!(body["status_code"], "400");
                }),
        )
        .step(
            Action::new("nothing_stored", "GET", "/api/courses/").assert_body(|body| {
                assert!(body.as_array().unwrap().is_empty());
            }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_create_course_generation_failure_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(
            create_course_action("alice", FAILING_TITLE)
                .with_expect(StatusCode::INTERNAL_SERVER_ERROR)
                .assert_body(|body| {
                    let message = body["message"].as_str().unwrap();
                    assert!(message.starts_with("Failed to generate course"));
                    assert_eq!(body["status_code"], "500");
                }),
        )
        .step(
            Action::new("nothing_stored", "GET", "/api/courses/")
                .as_visitor("alice")
                .assert_body(|body| {
                    assert!(body.as_array().unwrap().is_empty());
                }),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_courses_are_scoped_by_visitor_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(create_course_action("alice", "First").with_save_as("first"))
        .step(create_course_action("alice", "Second"))
        .step(create_course_action("bob", "Elsewhere"))
        .step(
            Action::new("alice_list", "GET", "/api/courses/")
                .as_visitor("alice")
                .assert_body(|body| {
                    let titles: Vec<&str> = body
                        .as_array()
                        .unwrap()
                        .iter()
                        .map(|c| c["title"].as_str().unwrap())
                        .collect();
                    assert_eq!(titles, vec!["Second", "First"]);
                }),
        )
        .step(
            Action::new("anonymous_list", "GET", "/api/courses/").assert_body(|body| {
                assert!(body.as_array().unwrap().is_empty());
            }),
        )
        .step(
            Action::new("foreign_detail", "GET", "")
                .as_visitor("bob")
                .with_dyn_path(|ctx| course_path(ctx, "first", ""))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("foreign_delete", "DELETE", "")
                .as_visitor("bob")
                .with_dyn_path(|ctx| course_path(ctx, "first", ""))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("malformed_id", "GET", "/api/courses/not-a-uuid/")
                .as_visitor("alice")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_toggle_subtopic_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(create_course_action("alice", "Toggles").with_save_as("course"))
        .step(
            Action::new("toggle_on", "POST", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", "module/0/subtopic/0/toggle/"))
                .assert_body(|body| {
                    assert_eq!(body["completed"], true);
                    assert_eq!(body["title"], "What a unit test is");
                }),
        )
        .step(
            Action::new("progress_full", "GET", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", ""))
                .assert_body(|body| {
                    assert_eq!(body["progress_percentage"], 100);
                }),
        )
        .step(
            Action::new("toggle_off", "POST", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", "module/0/subtopic/0/toggle/"))
                .assert_body(|body| {
                    assert_eq!(body["completed"], false);
                }),
        )
        .step(
            Action::new("toggle_out_of_range", "POST", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", "module/3/subtopic/0/toggle/"))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            Action::new("unchanged", "GET", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", ""))
                .assert_body(|body| {
                    assert_eq!(body["progress_percentage"], 0);
                    assert_eq!(body["modules"][0]["subtopics"][0]["completed"], false);
                }),
        )
        .step(
            Action::new("foreign_toggle", "POST", "")
                .as_visitor("bob")
                .with_dyn_path(|ctx| course_path(ctx, "course", "module/0/subtopic/0/toggle/"))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_progress_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(create_course_action("alice", "Cursor").with_save_as("course"))
        .step(
            Action::new("move_both", "POST", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", "progress/"))
                .with_body(json!({"module_index": 2, "subtopic_index": 1}))
                .assert_body(|body| {
                    assert_eq!(body["current_module_index"], 2);
                    assert_eq!(body["current_subtopic_index"], 1);
                }),
        )
        .step(
            Action::new("move_subtopic_only", "POST", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", "progress/"))
                .with_body(json!({"subtopic_index": 0}))
                .assert_body(|body| {
                    assert_eq!(body["current_module_index"], 2);
                    assert_eq!(body["current_subtopic_index"], 0);
                }),
        )
        .step(
            Action::new("mistyped_progress", "POST", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", "progress/"))
                .with_body(json!({"module_index": "two"}))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .run(&mut server, pool)
        .await;
}

#[tokio::test]
async fn route_delete_course_test() {
    let pool = setup_test_db().await;
    let mut server = setup_server(&pool).await;

    Flow::new()
        .step(create_course_action("alice", "Short lived").with_save_as("course"))
        .step(
            Action::new("delete", "DELETE", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", ""))
                .with_expect(StatusCode::NO_CONTENT),
        )
        .step(
            Action::new("gone", "GET", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", ""))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("delete_again", "DELETE", "")
                .as_visitor("alice")
                .with_dyn_path(|ctx| course_path(ctx, "course", ""))
                .with_expect(StatusCode::NOT_FOUND),
        )
        .run(&mut server, pool)
        .await;
}
