pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<services::UserService>,
    pub entry_service: Arc<services::EntryService>,
}

impl AppState {
    /// Wires the SQLite-backed repositories and services over one pool.
    pub fn from_pool(pool: sqlx::SqlitePool) -> Self {
        let user_repository = Arc::new(repositories::SqliteUserRepository::new(pool.clone()));
        let entry_repository = Arc::new(repositories::SqliteEntryRepository::new(pool));

        AppState {
            user_service: Arc::new(services::UserService::new(user_repository)),
            entry_service: Arc::new(services::EntryService::new(entry_repository)),
        }
    }
}
