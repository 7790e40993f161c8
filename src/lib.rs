//! Blog Backend Library
//!
//! Exposes the router, stores and auth core for the binaries and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod state;
pub mod store;

pub use api::create_router;
pub use config::AppConfig;
pub use db::Database;
pub use state::AppState;
