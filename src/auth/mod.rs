//! Authentication Module
//! Mission: Cookie-borne JWT sessions, owner-or-admin authorization

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, CurrentUser, RequestContext};
pub use user_store::UserStore;
