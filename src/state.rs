//! Application State
//! Mission: Wire the stores and the auth core into one cloneable handle

use crate::auth::{AuthState, JwtHandler, UserStore};
use crate::config::AppConfig;
use crate::db::Database;
use crate::store::{CommentStore, LikeStore, NotificationStore, PostStore};
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub posts: Arc<PostStore>,
    pub comments: Arc<CommentStore>,
    pub likes: Arc<LikeStore>,
    pub notifications: Arc<NotificationStore>,
}

impl AppState {
    pub fn new(db: &Database, config: &AppConfig) -> Self {
        let user_store = Arc::new(UserStore::new(db.connection(), config.bcrypt_cost));
        let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret()));

        Self {
            auth: AuthState::new(user_store, jwt_handler, config.secure_cookies()),
            posts: Arc::new(PostStore::new(db.connection())),
            comments: Arc::new(CommentStore::new(db.connection())),
            likes: Arc::new(LikeStore::new(db.connection())),
            notifications: Arc::new(NotificationStore::new(db.connection())),
        }
    }

    pub fn users(&self) -> &UserStore {
        &self.auth.user_store
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
