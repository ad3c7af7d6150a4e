mod common;

use aula_server::api::build_app;
use axum::Router;
use axum::body::Body;
use common::{PASSWORD, seed_room, seed_user, setup};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::Role;
use tower::ServiceExt;

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let ctx = setup().await;
    let app = build_app(ctx.state.clone());

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn api_requires_a_valid_token() {
    let ctx = setup().await;
    let app = build_app(ctx.state.clone());

    let (status, body) = send(&app, Method::GET, "/api/rooms", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, _) = send(&app, Method::GET, "/api/rooms", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_wrong_password_like_unknown_email() {
    let ctx = setup().await;
    seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let app = build_app(ctx.state.clone());

    let (wrong_pw, a) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "ana@aulas.test", "password": "nope-nope" })),
    )
    .await;
    let (unknown, b) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nadie@aulas.test", "password": "nope-nope" })),
    )
    .await;
    assert_eq!(wrong_pw, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(a["code"], b["code"]);
    assert_eq!(a["message"], b["message"]);
}

#[tokio::test]
async fn register_then_login_and_read_profile() {
    let ctx = setup().await;
    let app = build_app(ctx.state.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Nuevo", "email": "Nuevo@Aulas.test", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["role"], "USER");
    assert_eq!(body["email"], "nuevo@aulas.test");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "name": "Otro", "email": "nuevo@aulas.test", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7002);

    let token = login(&app, "nuevo@aulas.test").await;
    let (status, me) = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Nuevo");
}

#[tokio::test]
async fn room_management_is_admin_only() {
    let ctx = setup().await;
    seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    seed_user(&ctx.state, "Admin", "admin@aulas.test", Role::Admin).await;
    let app = build_app(ctx.state.clone());
    let user_token = login(&app, "ana@aulas.test").await;
    let admin_token = login(&app, "admin@aulas.test").await;

    let payload = json!({ "name": "Lab 3", "module": "Módulo C" });
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/rooms",
        Some(&user_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, room) = send(&app, Method::POST, "/api/rooms", Some(&admin_token), Some(payload)).await;
    assert_eq!(status, StatusCode::OK, "{room}");
    assert_eq!(room["state"], "FREE");
    assert!(room["qr_code"].as_str().unwrap().starts_with("data:image/png;base64,"));

    // Everyone can read the catalog
    let (status, rooms) = send(&app, Method::GET, "/api/rooms", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rooms.as_array().unwrap().len(), 1);

    let id = room["id"].as_i64().unwrap();
    let (status, detail) = send(
        &app,
        Method::GET,
        &format!("/api/rooms/{id}"),
        Some(&user_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Lab 3");
    assert!(detail["resources"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reservation_flow_over_http() {
    let ctx = setup().await;
    seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    seed_user(&ctx.state, "Luis", "luis@aulas.test", Role::User).await;
    seed_user(&ctx.state, "Admin", "admin@aulas.test", Role::Admin).await;
    let room = seed_room(&ctx.state, "A-101").await;
    let app = build_app(ctx.state.clone());
    let ana = login(&app, "ana@aulas.test").await;
    let luis = login(&app, "luis@aulas.test").await;
    let admin = login(&app, "admin@aulas.test").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/reservations",
        Some(&ana),
        Some(json!({
            "room_id": room.id,
            "date": "2030-03-04",
            "start_time": "09:00:00",
            "end_time": "10:00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{created}");
    assert!(created["whatsapp_link"].as_str().unwrap().starts_with("https://wa.me/"));
    let id = created["reservation"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/reservations",
        Some(&luis),
        Some(json!({
            "room_id": room.id,
            "date": "2030-03-04",
            "start_time": "09:30:00",
            "end_time": "10:30:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);

    let (status, list) = send(
        &app,
        Method::GET,
        &format!("/api/reservations?room_id={}&status=ACTIVE", room.id),
        Some(&luis),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["user_name"], "Ana");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/reservations/{id}/cancel"),
        Some(&luis),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2003);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/reservations/{id}/complete"),
        Some(&ana),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2002);

    let (status, done) = send(
        &app,
        Method::PATCH,
        &format!("/api/reservations/{id}/complete"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(done["status"], "COMPLETED");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/reservations/{id}/cancel"),
        Some(&ana),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);
}

#[tokio::test]
async fn room_with_active_reservations_cannot_be_deleted() {
    let ctx = setup().await;
    let ana = seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    seed_user(&ctx.state, "Admin", "admin@aulas.test", Role::Admin).await;
    let room = seed_room(&ctx.state, "A-101").await;
    ctx.state
        .reservations
        .create(
            &ana,
            shared::models::ReservationCreate {
                room_id: room.id,
                date: common::day(2030, 3, 4),
                start_time: common::at(9, 0),
                end_time: common::at(10, 0),
                whatsapp_group: None,
            },
        )
        .await
        .unwrap();

    let app = build_app(ctx.state.clone());
    let admin = login(&app, "admin@aulas.test").await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/rooms/{}", room.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 3002);
}

#[tokio::test]
async fn admin_cannot_delete_own_account_and_logs_are_admin_only() {
    let ctx = setup().await;
    let admin_user = seed_user(&ctx.state, "Admin", "admin@aulas.test", Role::Admin).await;
    seed_user(&ctx.state, "Ana", "ana@aulas.test", Role::User).await;
    let app = build_app(ctx.state.clone());
    let admin = login(&app, "admin@aulas.test").await;
    let ana = login(&app, "ana@aulas.test").await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", admin_user.id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7003);

    let (status, _) = send(&app, Method::GET, "/api/logs", Some(&ana), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, stats) = send(&app, Method::GET, "/api/logs/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stats["by_action"].is_array());

    let (status, report) = send(
        &app,
        Method::POST,
        "/api/scheduler/release-rooms",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["completed"], 0);
}

#[tokio::test]
async fn uploads_reject_path_traversal() {
    let ctx = setup().await;
    let app = build_app(ctx.state.clone());

    let (status, _) = send(&app, Method::GET, "/uploads/damages/..%2Faula.db", None, None).await;
    assert_ne!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::GET, "/uploads/damages/missing.png", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
