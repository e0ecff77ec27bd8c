#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use coffee_shop_api::auth::{AuthGuard, KeySource, StaticJwks};
use coffee_shop_api::config::{AppConfig, AuthConfig};
use coffee_shop_api::database::{DatabaseManager, DrinkStore, MemoryDrinkStore, PgDrinkStore};
use coffee_shop_api::{app, AppState};

pub const SIGNING_KEY: &str = include_str!("../fixtures/signing_key.pem");
pub const ROGUE_KEY: &str = include_str!("../fixtures/rogue_key.pem");
pub const JWKS: &str = include_str!("../fixtures/jwks.json");
pub const KID: &str = "coffee-test-key";
pub const DOMAIN: &str = "coffee-test.example.com";
pub const AUDIENCE: &str = "coffee";

pub const BARISTA: &[&str] = &["get:drinks-detail"];
pub const MANAGER: &[&str] = &["get:drinks-detail", "post:drinks", "delete:drinks"];

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config.auth = AuthConfig {
        domain: DOMAIN.to_string(),
        audience: AUDIENCE.to_string(),
        ..AuthConfig::default()
    };
    config
}

pub fn issuer() -> String {
    test_config().auth.issuer()
}

/// Router over `store`, verifying tokens with `keys`
pub fn app_over<S: DrinkStore + 'static>(store: Arc<S>, keys: Arc<dyn KeySource>) -> Router {
    let config = test_config();
    let guard = AuthGuard::new(keys, Algorithm::RS256, AUDIENCE, config.auth.issuer());
    app(AppState::new(store, Arc::new(guard)), &config)
}

pub fn app_with_keys(keys: Arc<dyn KeySource>) -> (Router, Arc<MemoryDrinkStore>) {
    let store = Arc::new(MemoryDrinkStore::new());
    (app_over(store.clone(), keys), store)
}

/// App backed by an empty in-memory store and the fixture key set
pub fn test_app() -> (Router, Arc<MemoryDrinkStore>) {
    let keys = StaticJwks::from_json(JWKS).expect("fixture jwks");
    app_with_keys(Arc::new(keys))
}

/// App over a freshly reset Postgres `drinks` table, or `None` when
/// DATABASE_URL is not set
pub async fn pg_app() -> Option<(Router, Arc<PgDrinkStore>)> {
    let url = std::env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty())?;
    let mut config = test_config();
    config.database.url = Some(url);

    let pool = DatabaseManager::connect(&config.database).await.expect("connect to DATABASE_URL");
    DatabaseManager::init_schema(&pool, true, false).await.expect("reset drinks table");

    let store = Arc::new(PgDrinkStore::new(pool));
    let keys = StaticJwks::from_json(JWKS).expect("fixture jwks");
    Some((app_over(store.clone(), Arc::new(keys)), store))
}

pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|test-user",
        "aud": AUDIENCE,
        "iss": issuer(),
        "iat": Utc::now().timestamp(),
        "exp": Utc::now().timestamp() + 3600,
        "permissions": permissions,
    })
}

pub fn sign(claims: &Value, pem: &str, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("fixture key");
    encode(&header, claims, &key).expect("sign token")
}

/// Validly signed token carrying `permissions`
pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions), SIGNING_KEY, Some(KID))
}

/// Send one request through the router and decode the JSON body
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn water() -> Value {
    json!({"title": "Water", "recipe": [{"color": "blue", "name": "water", "parts": 1}]})
}

/// Create a drink as a manager and return its id
pub async fn create_drink(app: &Router, body: Value) -> i64 {
    let (status, created) = call(app, Method::POST, "/drinks", Some(&token(MANAGER)), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", created);
    created["drinks"][0]["id"].as_i64().unwrap()
}
