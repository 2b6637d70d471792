#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]
use super::*;
use crate::{
    core::part::{Category, Part},
    errors::Result,
    test_utils::{FakeChat, FixedCatalog, RecordingMailer, create_test_user, setup_test_db},
};
use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tower::ServiceExt;

fn catalog() -> FixedCatalog {
    let parts = Category::ALL
        .into_iter()
        .map(|category| {
            let parts = vec![
                Part::new(format!("{category}-budget"), "Budget part", "Acme", 50.0, category),
                Part::new(format!("{category}-premium"), "Premium part", "Acme", 900.0, category),
            ];
            (category, parts)
        })
        .collect::<BTreeMap<_, _>>();
    FixedCatalog::new(parts)
}

struct TestApp {
    router: Router,
    state: SharedState,
    mailer: RecordingMailer,
}

async fn test_app() -> Result<TestApp> {
    let db = setup_test_db().await?;
    let mailer = RecordingMailer::default();
    let state = Arc::new(AppState {
        db,
        config: AppConfig::default(),
        weights: CategoryWeights::default(),
        catalog: Arc::new(catalog()),
        chat: Arc::new(FakeChat),
        mailer: Arc::new(mailer.clone()),
        public_url: "http://localhost:3000".to_string(),
        services: ServiceStatus::default(),
    });
    Ok(TestApp {
        router: router(state.clone()),
        state,
        mailer,
    })
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        post(
            "/api/auth/login",
            &json!({ "email": email, "password": crate::test_utils::TEST_PASSWORD }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_reports_database_and_services() -> Result<()> {
    let app = test_app().await?.router;

    let (status, body) = send(&app, get("/api/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
    assert_eq!(body["services"]["chat"], false);
    Ok(())
}

#[tokio::test]
async fn test_presets_lists_defaults() -> Result<()> {
    let app = test_app().await?.router;

    let (status, body) = send(&app, get("/api/builder/presets")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["presets"][0]["name"], "Starter");
    assert_eq!(body["weights"]["gpu"], 0.35);
    Ok(())
}

#[tokio::test]
async fn test_auto_build_stays_under_budget() -> Result<()> {
    let app = test_app().await?.router;

    let (status, body) = send(&app, post("/api/builder/auto", &json!({ "budget": 1000.0 }), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_price"], 350.0);
    assert_eq!(body["summary"]["over_budget"], false);
    assert_eq!(body["summary"]["missing"], json!([]));
    assert_eq!(body["build"]["parts"]["gpu"]["id"], "gpu-budget");
    Ok(())
}

#[tokio::test]
async fn test_auto_build_rejects_invalid_budget() -> Result<()> {
    let app = test_app().await?.router;

    let (status, body) = send(&app, post("/api/builder/auto", &json!({ "budget": -5.0 }), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_options_flag_affordability() -> Result<()> {
    let app = test_app().await?.router;
    let (_, auto) = send(&app, post("/api/builder/auto", &json!({ "budget": 1000.0 }), None)).await;

    let (status, body) = send(
        &app,
        post(
            "/api/builder/options",
            &json!({ "build": auto["build"], "category": "gpu" }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["remaining_if_replaced"], 700.0);
    assert_eq!(body["options"][0]["affordable"], true);
    assert_eq!(body["options"][1]["affordable"], false);
    Ok(())
}

#[tokio::test]
async fn test_options_unknown_category_is_bad_request() -> Result<()> {
    let app = test_app().await?.router;
    let build = json!({ "budget": 1000.0, "parts": {} });

    let (status, _) = send(
        &app,
        post(
            "/api/builder/options",
            &json!({ "build": build, "category": "monitor" }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_select_replaces_category() -> Result<()> {
    let app = test_app().await?.router;
    let (_, auto) = send(&app, post("/api/builder/auto", &json!({ "budget": 1000.0 }), None)).await;
    let premium = Part::new("gpu-premium", "Premium part", "Acme", 900.0, Category::Gpu);

    let (status, body) = send(
        &app,
        post(
            "/api/builder/select",
            &json!({ "build": auto["build"], "part": premium }),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["build"]["parts"]["gpu"]["id"], "gpu-premium");
    assert_eq!(body["summary"]["total_price"], 1200.0);
    assert_eq!(body["summary"]["over_budget"], true);
    Ok(())
}

#[tokio::test]
async fn test_select_rejects_part_in_wrong_slot() -> Result<()> {
    let app = test_app().await?.router;
    let misplaced = Part::new("gpu-big", "Big GPU", "Acme", 700.0, Category::Gpu);
    let build = json!({ "budget": 1000.0, "parts": { "case": misplaced } });
    let gpu = Part::new("gpu-small", "Small GPU", "Acme", 250.0, Category::Gpu);

    let (status, body) = send(
        &app,
        post("/api/builder/select", &json!({ "build": build, "part": gpu }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        post("/api/builder/options", &json!({ "build": build, "category": "gpu" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_products_unknown_category_is_unsuccessful() -> Result<()> {
    let app = test_app().await?.router;

    let (status, body) = send(&app, get("/api/products?category=monitor")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["count"], 0);
    Ok(())
}

#[tokio::test]
async fn test_products_lists_category() -> Result<()> {
    let app = test_app().await?.router;

    let (status, body) = send(&app, get("/api/products?category=cpu&limit=1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    Ok(())
}

#[tokio::test]
async fn test_availability_requires_brand_and_model() -> Result<()> {
    let app = test_app().await?.router;

    let (status, _) = send(&app, get("/api/check-availability?brand=AMD")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/check-availability?brand=AMD&model=5600")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["component"], "AMD 5600");
    assert!(!body["results"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_chat_replies_and_rejects_blank() -> Result<()> {
    let app = test_app().await?.router;

    let (status, body) = send(&app, post("/api/chat", &json!({ "message": "hi" }), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "echo: hi");

    let (status, _) = send(&app, post("/api/chat", &json!({ "message": " " }), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_writes_require_token() -> Result<()> {
    let app = test_app().await?.router;

    let (status, _) = send(
        &app,
        post("/api/forum/tickets", &json!({ "title": "t", "description": "d" }), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/auth/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_register_verify_login_flow() -> Result<()> {
    let TestApp { router: app, mailer, .. } = test_app().await?;

    let (status, _) = send(
        &app,
        post(
            "/api/auth/register",
            &json!({ "email": "new@example.com", "password": "secret1", "name": "New" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let code = mailer.last_code().unwrap();
    let (status, body) = send(
        &app,
        post(
            "/api/auth/verify",
            &json!({ "email": "new@example.com", "code": code }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email_verified"], true);

    let (status, body) = send(
        &app,
        post(
            "/api/auth/login",
            &json!({ "email": "new@example.com", "password": "secret1" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "New");

    let (status, _) = send(&app, post("/api/auth/logout", &json!({}), Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, post("/api/auth/request-verification", &json!({}), Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_forum_ticket_lifecycle() -> Result<()> {
    let TestApp { router: app, state, .. } = test_app().await?;
    create_test_user(&state.db, "alice@example.com", "Alice").await?;
    create_test_user(&state.db, "bob@example.com", "Bob").await?;
    let alice = login(&app, "alice@example.com").await;
    let bob = login(&app, "bob@example.com").await;

    let (status, ticket) = send(
        &app,
        post(
            "/api/forum/tickets",
            &json!({ "title": "Which GPU?", "description": "Budget is 400" }),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ticket["author"], "Alice");
    let id = ticket["id"].as_i64().unwrap();

    let (status, body) = send(&app, post(&format!("/api/forum/tickets/{id}/clap"), &json!({}), Some(&bob))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claps"], 1);

    let (status, _) = send(&app, post(&format!("/api/forum/tickets/{id}/clap"), &json!({}), Some(&bob))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, message) = send(
        &app,
        post(
            &format!("/api/forum/tickets/{id}/messages"),
            &json!({ "content": "Look at the RX 7600" }),
            Some(&bob),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let message_id = message["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        post(
            &format!("/api/forum/tickets/{id}/messages/{message_id}/reaction"),
            &json!({ "kind": "like" }),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 1);

    let (status, _) = send(
        &app,
        post(
            &format!("/api/forum/tickets/{id}/messages/{message_id}/reaction"),
            &json!({ "kind": "love" }),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let rating_uri = format!("/api/forum/tickets/{id}/messages/{message_id}/rating");
    let (status, body) = send(&app, post(&rating_uri, &json!({ "rating": 8.0 }), Some(&alice))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 8.0);
    let (status, _) = send(&app, post(&rating_uri, &json!({ "rating": 3.0 }), Some(&alice))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, detail) = send(&app, get(&format!("/api/forum/tickets/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["messages"][0]["author"], "Bob");
    assert_eq!(detail["messages"][0]["likes"], 1);

    let delete = |token: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/forum/tickets/{id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&app, delete(&bob)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, delete(&alice)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, get(&format!("/api/forum/tickets/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_showcase_setup_feedback() -> Result<()> {
    let TestApp { router: app, state, .. } = test_app().await?;
    create_test_user(&state.db, "alice@example.com", "Alice").await?;
    let alice = login(&app, "alice@example.com").await;

    let (status, _) = send(
        &app,
        post("/api/setups", &json!({ "title": "Desk", "image": "" }), Some(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, setup) = send(
        &app,
        post(
            "/api/setups",
            &json!({ "title": "Desk", "description": "White build", "image": "https://img.example.com/a.jpg" }),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = setup["id"].as_i64().unwrap();

    let (status, body) = send(&app, post(&format!("/api/setups/{id}/rating"), &json!({ "rating": 6.0 }), Some(&alice))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 6.0);
    let (_, body) = send(&app, post(&format!("/api/setups/{id}/rating"), &json!({ "rating": 9.0 }), Some(&alice))).await;
    assert_eq!(body["rating"], 9.0);
    assert_eq!(body["rating_count"], 1);

    let (status, _) = send(&app, post(&format!("/api/setups/{id}/reaction"), &json!({ "kind": "clap" }), Some(&alice))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, comment) = send(
        &app,
        post(&format!("/api/setups/{id}/comments"), &json!({ "content": "Clean!" }), Some(&alice)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_id = comment["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        post(
            &format!("/api/setups/{id}/comments/{comment_id}/reaction"),
            &json!({ "kind": "dislike" }),
            Some(&alice),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dislikes"], 1);

    let (status, list) = send(&app, get("/api/setups")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["comment_count"], 1);
    assert_eq!(list[0]["author"], "Alice");
    Ok(())
}
