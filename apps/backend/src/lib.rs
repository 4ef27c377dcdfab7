pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use nihongo_core::grammar::GrammarChecker;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::SqliteRepository;
use crate::error::ApiError;

/// Shared application state
///
/// Lock order is repository first, then checker.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<Mutex<SqliteRepository>>,
    pub checker: Arc<RwLock<GrammarChecker>>,
}

impl AppState {
    /// Wrap a repository and checker, loading the stored custom rules.
    pub fn new(repository: SqliteRepository, mut checker: GrammarChecker) -> error::Result<Self> {
        let active = checker.reload_custom_rules(&repository)?;
        tracing::info!(active, "custom grammar rules loaded");

        Ok(Self {
            repository: Arc::new(Mutex::new(repository)),
            checker: Arc::new(RwLock::new(checker)),
        })
    }

    pub fn repository(&self) -> error::Result<MutexGuard<'_, SqliteRepository>> {
        self.repository
            .lock()
            .map_err(|_| ApiError::Internal("repository lock poisoned".to_string()))
    }

    pub fn checker(&self) -> error::Result<RwLockReadGuard<'_, GrammarChecker>> {
        self.checker
            .read()
            .map_err(|_| ApiError::Internal("checker lock poisoned".to_string()))
    }

    pub fn checker_mut(&self) -> error::Result<RwLockWriteGuard<'_, GrammarChecker>> {
        self.checker
            .write()
            .map_err(|_| ApiError::Internal("checker lock poisoned".to_string()))
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    let srs_routes = Router::new()
        .route(
            "/items",
            get(routes::srs::list)
                .post(routes::srs::create)
                .delete(routes::srs::clear),
        )
        .route("/items/bulk", post(routes::srs::bulk_add))
        .route("/items/import", post(routes::srs::import))
        .route("/items/import/csv", post(routes::srs::import_csv))
        .route("/items/export", get(routes::srs::export))
        .route(
            "/items/:item_id",
            get(routes::srs::get_item)
                .put(routes::srs::update)
                .delete(routes::srs::delete),
        )
        .route("/items/:item_id/review", post(routes::srs::review))
        .route("/due", get(routes::srs::due))
        .route("/forecast", get(routes::srs::forecast))
        .route("/stats", get(routes::srs::stats));

    Router::new()
        .route("/health", get(health_check))
        // Grammar routes
        .route("/api/grammar/check", post(routes::grammar::check))
        .route("/api/grammar/checks", get(routes::grammar::recent_checks))
        // Rule routes
        .route("/api/rules/rejected", get(routes::rules::rejected))
        .route(
            "/api/rules/custom",
            get(routes::rules::list).post(routes::rules::create),
        )
        .route(
            "/api/rules/custom/:id",
            put(routes::rules::update).delete(routes::rules::delete),
        )
        // Progress routes
        .route("/api/progress/:session_id", get(routes::progress::get))
        // Scheduler routes
        .nest("/api/srs/:session_id", srs_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    tracing::info!("Opening database at {}", config.database_path.display());
    let repository = SqliteRepository::open(&config.database_path)?;

    tracing::info!("Loading grammar rules...");
    let checker = services::grammar::load_checker(config.grammar_rules_path.as_deref())?;

    let state = AppState::new(repository, checker)?;
    let app = build_router(state);

    let addr = config.addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
