#![allow(dead_code)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use taskhub::auth::TokenKeys;
use taskhub::routes;
use taskhub::state::AppState;
use taskhub::store::MemoryStore;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Lowest bcrypt cost, to keep the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenKeys::new(TEST_SECRET, 24),
        TEST_BCRYPT_COST,
    ))
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Sends a request and returns the status and the body parsed as JSON
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    req: actix_http::Request,
) -> (StatusCode, Value) {
    // Like the real server, turn a service-level error (e.g. from middleware)
    // into its error response instead of panicking.
    let (status, body) = match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            (status, test::read_body(resp).await)
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let body = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            (status, body)
        }
    };
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| {
            panic!("Response body is not JSON: {:?}", String::from_utf8_lossy(&body))
        })
    };
    (status, json)
}

pub async fn signup(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({ "name": name, "email": email, "password": password }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::CREATED, "Signup failed. Body: {}", body);

    TestUser {
        id: body["user"]["_id"].as_str().unwrap().to_string(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}

/// The two accounts every test starts from.
pub async fn mike_and_andrew(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
) -> (TestUser, TestUser) {
    let mike = signup(app, "Mike", "mike@example.com", "ahsgT12#g").await;
    let andrew = signup(app, "Andrew", "andr@example.com", "mypass67@3f").await;
    (mike, andrew)
}
