pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;

use axum::{
    extract::State, http::StatusCode, middleware as axum_middleware, routing::get, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use services::{lifecycle::ReportLifecycle, renderer::ReportRenderer, storage::StorageService};

#[derive(Clone)]
pub struct AppState {
    pub db: db::Database,
    pub config: config::Config,
    pub lifecycle: ReportLifecycle,
}

impl AppState {
    pub fn new(db: db::Database, config: config::Config) -> Self {
        let storage = StorageService::new(&config.reports_dir, &config.backup_dir);
        Self::with_storage(db, config, storage)
    }

    pub fn with_storage(db: db::Database, config: config::Config, storage: StorageService) -> Self {
        let lifecycle = ReportLifecycle::new(db.clone(), ReportRenderer::new(), storage);
        Self {
            db,
            config,
            lifecycle,
        }
    }

    pub fn storage(&self) -> &StorageService {
        self.lifecycle.storage()
    }
}

pub fn app(state: AppState) -> Router {
    // Build protected routes (require authentication)
    let protected_routes = Router::new()
        .route("/auth/me", get(routes::auth::me))
        .nest("/reports", routes::reports::router())
        .nest("/admin", routes::admin::router())
        .nest("/projects", routes::projects::router())
        .nest("/users", routes::users::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    let api_router = Router::new()
        .nest("/auth", routes::auth::router())
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.db.ping().await {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Database unavailable")
    }
}
