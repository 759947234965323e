//! End-to-end tests of the HTTP surface

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::util::ServiceExt;
use uuid::Uuid;

use ledger_sync_server::config::Config;
use ledger_sync_server::db;
use ledger_sync_server::routes::build_router;
use ledger_sync_server::state::AppState;

const USER: &str = "user-1";

async fn setup() -> (Router, SqlitePool) {
    let pool = db::create_pool("sqlite::memory:").await.unwrap();
    let app = build_router(AppState::new(Config::default(), pool.clone()));
    (app, pool)
}

async fn seed_wallet(pool: &SqlitePool, user_id: &str, updated_at: &str) -> String {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO wallets (id, user_id, client_id, name, currency, updated_at)
        VALUES (?, ?, ?, 'Cash', 'EUR', ?)
        "#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(format!("local-{}", &id[..8]))
    .bind(updated_at)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn seed_transaction(pool: &SqlitePool, occurred_at: &str) {
    sqlx::query(
        r#"
        INSERT INTO transactions (id, user_id, wallet_id, amount, description, occurred_at)
        VALUES (?, ?, 'w1', -1250, 'Groceries', ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(USER)
    .bind(occurred_at)
    .execute(pool)
    .await
    .unwrap();
}

fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("x-user-id", USER)
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

fn ids(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let (app, _) = setup().await;

    let (status, body) = send(
        &app,
        Request::builder().uri("/api/v1/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_full_sync_returns_envelope() {
    let (app, pool) = setup().await;
    let started = Utc::now();
    seed_wallet(&pool, USER, "2024-01-01 08:00:00").await;
    seed_wallet(&pool, USER, "2024-01-02 08:00:00").await;

    let (status, body) = send(&app, get("/api/v1/wallets").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 2);
    assert_eq!(body["per_page"], 20);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["last_page"], 1);

    let last_sync = body["last_sync"].as_str().unwrap();
    assert!(last_sync.ends_with('Z'));
    let last_sync = DateTime::parse_from_rfc3339(last_sync).unwrap();
    assert!(last_sync >= started);
}

#[tokio::test]
async fn test_sync_is_scoped_to_the_principal() {
    let (app, pool) = setup().await;
    let mine = seed_wallet(&pool, USER, "2024-01-01 08:00:00").await;
    seed_wallet(&pool, "someone-else", "2024-01-01 08:00:00").await;

    let (_, body) = send(&app, get("/api/v1/wallets").body(Body::empty()).unwrap()).await;

    assert_eq!(ids(&body), vec![mine]);
}

#[tokio::test]
async fn test_sync_from_boundary_is_inclusive() {
    let (app, pool) = setup().await;
    seed_wallet(&pool, USER, "2024-01-01 08:00:00").await;
    let latest = seed_wallet(&pool, USER, "2024-01-03 08:00:00").await;

    let (status, body) = send(
        &app,
        get("/api/v1/wallets?sync_from=2024-01-03T08:00:00Z")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![latest]);
}

#[tokio::test]
async fn test_future_sync_from_yields_empty_window() {
    let (app, pool) = setup().await;
    seed_wallet(&pool, USER, "2024-01-01 08:00:00").await;
    let future = (Utc::now() + Duration::days(1)).format("%Y-%m-%dT%H:%M:%SZ");

    let (status, body) = send(
        &app,
        get(&format!("/api/v1/wallets?sync_from={}", future))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["total"], 0);
    assert!(body["last_sync"].is_string());
}

#[tokio::test]
async fn test_sync_from_past_year_9999_is_rejected() {
    let (app, pool) = setup().await;
    seed_wallet(&pool, USER, "2024-01-01 08:00:00").await;

    let (status, body) = send(
        &app,
        get("/api/v1/wallets?sync_from=%2B10000-01-01T00:00:00Z")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_health_survives_settings_store_failure() {
    let (app, pool) = setup().await;
    pool.close().await;

    let (status, body) = send(&app, get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_replaying_last_sync_returns_only_newer_rows() {
    let (app, pool) = setup().await;
    seed_wallet(&pool, USER, "2024-01-01 08:00:00").await;

    let (_, first) = send(&app, get("/api/v1/wallets").body(Body::empty()).unwrap()).await;
    let watermark = first["last_sync"].as_str().unwrap().to_string();

    let fresh = seed_wallet(&pool, USER, &db_now(Duration::minutes(1))).await;

    let (_, second) = send(
        &app,
        get(&format!("/api/v1/wallets?sync_from={}", watermark))
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(ids(&second), vec![fresh]);
}

#[tokio::test]
async fn test_repeated_sync_is_idempotent() {
    let (app, pool) = setup().await;
    for day in 1..=5 {
        seed_wallet(&pool, USER, &format!("2024-01-0{} 08:00:00", day)).await;
    }

    let uri = "/api/v1/wallets?sync_from=2024-01-02%2008:00:00&limit=2";
    let (_, a) = send(&app, get(uri).body(Body::empty()).unwrap()).await;
    let (_, b) = send(&app, get(uri).body(Body::empty()).unwrap()).await;

    assert_eq!(a["data"], b["data"]);
    assert_eq!(a["total"], 4);
    assert_eq!(a["last_page"], 2);
}

#[tokio::test]
async fn test_malformed_sync_from_is_a_localized_client_error() {
    let (app, pool) = setup().await;
    seed_wallet(&pool, USER, "2024-01-01 08:00:00").await;

    let (status, body) = send(
        &app,
        get("/api/v1/wallets?sync_from=not-a-date")
            .header(header::ACCEPT_LANGUAGE, "es-ES,en;q=0.5")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "'not-a-date' no es una fecha válida.");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_invalid_limit_is_rejected() {
    let (app, _) = setup().await;

    let (status, body) = send(
        &app,
        get("/api/v1/reminders?limit=0").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid value '0' for parameter 'limit'.");
}

#[tokio::test]
async fn test_no_client_id_strips_the_field() {
    let (app, pool) = setup().await;
    seed_wallet(&pool, USER, "2024-01-01 08:00:00").await;

    let (_, with) = send(&app, get("/api/v1/wallets").body(Body::empty()).unwrap()).await;
    let (_, without) = send(
        &app,
        get("/api/v1/wallets?no_client_id=1").body(Body::empty()).unwrap(),
    )
    .await;

    assert!(with["data"][0]["client_id"].is_string());
    assert!(without["data"][0].get("client_id").is_none());
    assert!(without["data"][0]["name"].is_string());
}

#[tokio::test]
async fn test_missing_principal_is_unauthorized() {
    let (app, _) = setup().await;

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/v1/transactions")
            .header(header::ACCEPT_LANGUAGE, "fr-FR;q=0.9,en;q=0.8")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Une authentification est requise.");
}

#[tokio::test]
async fn test_non_json_body_is_unsupported_media_type() {
    let (app, _) = setup().await;

    let (status, body) = send(
        &app,
        Request::builder()
            .method(Method::PUT)
            .uri("/api/v1/settings")
            .header("x-user-id", USER)
            .header(header::ACCEPT_LANGUAGE, "de")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("timezone=Europe/Paris"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "Unsupported Media Type");
    assert_eq!(
        body["message"],
        "Anfragen mit Inhalt müssen als application/json gesendet werden."
    );
}

#[tokio::test]
async fn test_missing_content_type_is_rejected_but_get_is_exempt() {
    let (app, _) = setup().await;

    let (status, _) = send(
        &app,
        Request::builder()
            .method(Method::PUT)
            .uri("/api/v1/settings")
            .header("x-user-id", USER)
            .body(Body::from("{}"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let (status, _) = send(&app, get("/api/v1/settings").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
}

fn put_settings(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PUT)
        .uri("/api/v1/settings")
        .header("x-user-id", USER)
        .header(header::CONTENT_TYPE, "application/json; charset=utf-8")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_settings_round_trip() {
    let (app, _) = setup().await;

    let (status, body) = send(
        &app,
        put_settings(r#"{"timezone": "Europe/Paris", "language": "it"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timezone"], "Europe/Paris");
    assert_eq!(body["language"], "it");

    // Omitted fields are kept, null clears
    let (_, body) = send(&app, put_settings(r#"{"language": null}"#)).await;
    assert_eq!(body["timezone"], "Europe/Paris");
    assert!(body["language"].is_null());
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, put_settings(r#"{"timezone": "Mars/Olympus"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "'Mars/Olympus' is not a known timezone.");

    let (status, _) = send(&app, put_settings(r#"{"language": "zh"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, get("/api/v1/settings").body(Body::empty()).unwrap()).await;
    assert!(body["timezone"].is_null());
}

#[tokio::test]
async fn test_language_setting_is_the_default_locale() {
    let (app, _) = setup().await;
    send(&app, put_settings(r#"{"language": "pt"}"#)).await;

    // No Accept-Language: the user's language applies
    let (_, body) = send(
        &app,
        get("/api/v1/wallets?limit=abc").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body["message"], "Valor 'abc' inválido para o parâmetro 'limit'.");

    // Accept-Language still wins
    let (_, body) = send(
        &app,
        get("/api/v1/wallets?limit=abc")
            .header(header::ACCEPT_LANGUAGE, "en")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(body["message"], "Invalid value 'abc' for parameter 'limit'.");
}

#[tokio::test]
async fn test_wall_clock_sync_from_uses_user_timezone() {
    let (app, pool) = setup().await;
    send(&app, put_settings(r#"{"timezone": "Europe/Paris"}"#)).await;
    seed_wallet(&pool, USER, "2024-06-01 06:59:59").await;
    let at_boundary = seed_wallet(&pool, USER, "2024-06-01 07:00:00").await;

    // 09:00 in Paris (UTC+2 in June) is 07:00 UTC
    let (status, body) = send(
        &app,
        get("/api/v1/wallets?sync_from=2024-06-01%2009:00:00")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![at_boundary]);
}

#[tokio::test]
async fn test_transaction_date_window_is_best_effort() {
    let (app, pool) = setup().await;
    seed_transaction(&pool, "2024-05-01 10:00:00").await;
    seed_transaction(&pool, "2024-05-20 10:00:00").await;

    let (_, bounded) = send(
        &app,
        get("/api/v1/transactions?date_from=2024-05-10").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(bounded["total"], 1);
    assert_eq!(bounded["data"][0]["amount"], -1250);

    // A malformed bound is dropped rather than failing the request
    let (status, unbounded) = send(
        &app,
        get("/api/v1/transactions?date_from=whenever").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unbounded["total"], 2);
}

/// Current time in the database's timestamp format, shifted by `offset`
fn db_now(offset: Duration) -> String {
    (Utc::now() + offset).format("%Y-%m-%d %H:%M:%S").to_string()
}
