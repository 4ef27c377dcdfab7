//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext with an in-memory database and the bundled grammar rules
//! - Helper functions for creating test data

#![allow(dead_code)]

pub mod fixtures;

use axum::Router;
use axum_test::TestServer;

use nihongo_backend::db::SqliteRepository;
use nihongo_backend::services::grammar::load_checker;
use nihongo_backend::{build_router, AppState};

/// Test context containing shared state and the router under test.
pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// Create a new test context backed by an in-memory database.
    pub fn new() -> Self {
        let repository = SqliteRepository::open_in_memory().expect("Failed to open test database");
        let checker = load_checker(None).expect("Failed to load bundled grammar rules");
        let state = AppState::new(repository, checker).expect("Failed to build app state");
        let app = build_router(state.clone());
        Self { state, app }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Build a test server over the router.
    pub fn server(&self) -> TestServer {
        TestServer::new(self.router()).expect("Failed to start test server")
    }
}

/// Generate a unique session id to keep tests apart.
pub fn unique_session(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}
