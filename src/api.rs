use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::auth::AuthGuard;
use crate::config::{AppConfig, SecurityConfig};
use crate::database::{DatabaseManager, DrinkStore, MemoryDrinkStore, PgDrinkStore};
use crate::error::ApiError;
use crate::handlers::{drinks, health};
use crate::middleware::{require_permission, RequiredPermission};

/// Shared, immutable state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DrinkStore>,
    pub guard: Arc<AuthGuard>,
}

impl AppState {
    pub fn new(store: Arc<dyn DrinkStore>, guard: Arc<AuthGuard>) -> Self {
        Self { store, guard }
    }
}

/// One-time process initialization: connect storage, prepare the schema,
/// and build the authorization guard.
pub async fn bootstrap(config: &AppConfig) -> anyhow::Result<AppState> {
    let db = &config.database;
    let store: Arc<dyn DrinkStore> = match &db.url {
        Some(_) => {
            let pool = DatabaseManager::connect(db).await?;
            DatabaseManager::init_schema(&pool, db.reset_on_start, db.seed_on_reset).await?;
            Arc::new(PgDrinkStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; drinks are kept in memory");
            if db.reset_on_start && db.seed_on_reset {
                Arc::new(MemoryDrinkStore::seeded().await?)
            } else {
                Arc::new(MemoryDrinkStore::new())
            }
        }
    };

    if config.auth.domain.is_empty() || config.auth.audience.is_empty() {
        warn!("AUTH0_DOMAIN or API_AUDIENCE is empty; protected routes will reject every token");
    }
    let guard = AuthGuard::from_config(&config.auth)?;
    info!("Verifying tokens against {}", config.auth.jwks_url());

    Ok(AppState::new(store, Arc::new(guard)))
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let required = |permission: &'static str| RequiredPermission::new(state.guard.clone(), permission);

    let mut router = Router::new()
        .route("/health", get(health::health))
        .route(
            "/drinks",
            get(drinks::list).post(drinks::create.layer(middleware::from_fn_with_state(
                required("post:drinks"),
                require_permission,
            ))),
        )
        .route(
            "/drinks-detail",
            get(drinks::detail.layer(middleware::from_fn_with_state(
                required("get:drinks-detail"),
                require_permission,
            ))),
        )
        .route(
            "/drinks/:id",
            patch(drinks::update.layer(middleware::from_fn_with_state(
                required("post:drinks"),
                require_permission,
            )))
            .delete(drinks::delete.layer(middleware::from_fn_with_state(
                required("delete:drinks"),
                require_permission,
            ))),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state.clone());

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
