mod common;

use std::net::TcpListener;

use actix_cors::Cors;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{rt, test, App, HttpServer};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{bearer, init_app, mike_and_andrew, send, test_state, TestUser};
use taskhub::models::{Task, TaskInput};
use taskhub::routes;

async fn create_task(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    user: &TestUser,
    payload: Value,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&user.token))
        .set_json(&payload)
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Create failed. Body: {}", body);
    body
}

fn descriptions(body: &Value) -> Vec<&str> {
    body.as_array()
        .expect("task list should be an array")
        .iter()
        .map(|task| task["description"].as_str().unwrap())
        .collect()
}

#[actix_rt::test]
async fn should_create_task_for_user() {
    let app = init_app(test_state()).await;
    let (mike, andrew) = mike_and_andrew(&app).await;

    let task = create_task(
        &app,
        &mike,
        json!({ "description": "  Buy groceries  ", "owner": andrew.id }),
    )
    .await;

    assert_eq!(task["description"], "Buy groceries");
    assert_eq!(task["completed"], false);
    assert_eq!(task["owner"], Value::String(mike.id.clone()));
    assert!(task["_id"].is_string());
    assert!(task["createdAt"].is_string());
    assert!(task["updatedAt"].is_string());
}

#[actix_rt::test]
async fn should_reject_invalid_tasks() {
    let app = init_app(test_state()).await;
    let (mike, _) = mike_and_andrew(&app).await;

    let cases = vec![
        (json!({}), "missing description"),
        (json!({ "description": "   " }), "blank description"),
        (json!({ "description": "Fine", "completed": "yes" }), "completed not a boolean"),
    ];
    for (payload, description) in cases {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .insert_header(bearer(&mike.token))
            .set_json(&payload)
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case: {}", description);
    }

    let req = test::TestRequest::post()
        .uri("/tasks")
        .set_json(json!({ "description": "No token" }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn should_not_expose_tasks_of_other_users() {
    let app = init_app(test_state()).await;
    let (mike, andrew) = mike_and_andrew(&app).await;
    let task = create_task(&app, &mike, json!({ "description": "Mike's secret" })).await;
    let uri = format!("/tasks/{}", task["_id"].as_str().unwrap());

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&andrew.token))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&andrew.token))
        .set_json(json!({ "completed": true }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&andrew.token))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&andrew.token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&mike.token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], false);
}

#[actix_rt::test]
async fn should_update_task_with_allowed_fields_only() {
    let app = init_app(test_state()).await;
    let (mike, _) = mike_and_andrew(&app).await;
    let task = create_task(&app, &mike, json!({ "description": "Write report" })).await;
    let uri = format!("/tasks/{}", task["_id"].as_str().unwrap());

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&mike.token))
        .set_json(json!({ "completed": true }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"], true);
    assert_eq!(body["description"], "Write report");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&mike.token))
        .set_json(json!({ "description": "Rewritten", "owner": Uuid::new_v4() }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid update");

    let req = test::TestRequest::patch()
        .uri(&uri)
        .set_json(json!({ "completed": false }))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&mike.token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["description"], "Write report");
    assert_eq!(body["completed"], true);
}

#[actix_rt::test]
async fn should_delete_task_once() {
    let app = init_app(test_state()).await;
    let (mike, _) = mike_and_andrew(&app).await;
    let task = create_task(&app, &mike, json!({ "description": "Throw away" })).await;
    let uri = format!("/tasks/{}", task["_id"].as_str().unwrap());

    let delete = || {
        test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&mike.token))
            .to_request()
    };
    let (status, body) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], task["_id"]);

    let (status, body) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Task not found");
}

#[actix_rt::test]
async fn should_404_on_malformed_task_id() {
    let app = init_app(test_state()).await;
    let (mike, _) = mike_and_andrew(&app).await;

    let req = test::TestRequest::get()
        .uri("/tasks/not-a-uuid")
        .insert_header(bearer(&mike.token))
        .to_request();
    assert_eq!(send(&app, req).await.0, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn should_filter_sort_and_page_tasks() {
    let state = test_state();
    let app = init_app(state.clone()).await;
    let (mike, andrew) = mike_and_andrew(&app).await;
    let mike_id = Uuid::parse_str(&mike.id).unwrap();
    let andrew_id = Uuid::parse_str(&andrew.id).unwrap();

    let base = Utc::now() - Duration::hours(1);
    let seed = [
        (mike_id, "first", true, 0),
        (mike_id, "second", false, 1),
        (mike_id, "third", true, 2),
        (mike_id, "fourth", true, 3),
        (andrew_id, "andrew's", true, 4),
    ];
    for (owner, description, completed, minutes) in seed {
        let mut task = Task::new(
            TaskInput {
                description: description.to_string(),
                completed,
            },
            owner,
        );
        task.created_at = base + Duration::minutes(minutes);
        task.updated_at = task.created_at;
        state.store.insert_task(&task).await.unwrap();
    }

    let list = |query: &str| {
        test::TestRequest::get()
            .uri(&format!("/tasks{}", query))
            .insert_header(bearer(&mike.token))
            .to_request()
    };

    let (_, body) = send(&app, list("")).await;
    assert_eq!(descriptions(&body), vec!["first", "second", "third", "fourth"]);

    let (_, body) = send(&app, list("?completed=true&sortBy=createdAt:desc")).await;
    assert_eq!(descriptions(&body), vec!["fourth", "third", "first"]);

    let (_, body) = send(&app, list("?completed=false")).await;
    assert_eq!(descriptions(&body), vec!["second"]);

    let (_, body) = send(&app, list("?limit=2&skip=1")).await;
    assert_eq!(descriptions(&body), vec!["second", "third"]);

    let (status, body) = send(&app, list("?limit=abc&skip=-4&sortBy=owner:sideways")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(descriptions(&body).len(), 4);
}

#[actix_rt::test]
async fn test_create_task_unauthorized_over_http() {
    let state = test_state();
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .listen(listener)
    .expect("Failed to listen")
    .run();
    let handle = server.handle();
    rt::spawn(server);

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://127.0.0.1:{}/tasks", port))
        .json(&json!({ "description": "Unauthorized Task" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Please authenticate.");

    let resp = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    handle.stop(false).await;
}
