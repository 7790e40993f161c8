use axum::{
    http::Uri,
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};

use crate::api::{comments, likes, notifications, posts};
use crate::auth::{api as auth_api, auth_middleware};
use crate::error::ApiError;
use crate::middleware::request_logging;
use crate::state::AppState;

/// Build the full application router.
///
/// Handlers needing an identity are wrapped in the auth gate one method
/// router at a time. `merge` joins method routers that share a path, so
/// `GET /api/blogs` stays public while `POST /api/blogs` is gated, and an
/// unsupported method still gets a plain 405 instead of the gate.
pub fn create_router(state: AppState) -> Router {
    let auth = state.auth.clone();
    let gated = move |method_router: MethodRouter<AppState>| {
        method_router.route_layer(middleware::from_fn_with_state(
            auth.clone(),
            auth_middleware,
        ))
    };

    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        // Users
        .route("/api/users", post(auth_api::register))
        .route("/api/users/auth", post(auth_api::login))
        .route("/api/users/logout", post(auth_api::logout))
        // Blogs
        .route("/api/blogs", get(posts::list_posts))
        .route("/api/blogs/search", get(posts::search_posts))
        .route("/api/blogs/category/:category", get(posts::posts_by_category))
        .route("/api/blogs/:id", get(posts::get_post))
        // Comments and likes, keyed by blog id
        .route("/api/comments/:id", get(comments::list_comments))
        .route("/api/likes/:id", get(likes::list_likes));

    let protected = Router::new()
        // Users
        .route(
            "/api/users/profile",
            gated(get(auth_api::get_profile).put(auth_api::update_profile)),
        )
        .route("/api/users", gated(get(auth_api::list_users)))
        .route(
            "/api/users/:id",
            gated(
                get(auth_api::get_user)
                    .put(auth_api::update_user)
                    .delete(auth_api::delete_user),
            ),
        )
        // Blogs
        .route("/api/blogs", gated(post(posts::create_post)))
        .route("/api/blogs/my-blogs", gated(get(posts::my_posts)))
        .route("/api/blogs/pending", gated(get(posts::pending_posts)))
        .route(
            "/api/blogs/:id",
            gated(put(posts::update_post).delete(posts::delete_post)),
        )
        .route("/api/blogs/:id/approve", gated(put(posts::approve_post)))
        // Comments
        .route("/api/comments", gated(post(comments::create_comment)))
        .route(
            "/api/comments/:id",
            gated(put(comments::update_comment).delete(comments::delete_comment)),
        )
        // Likes
        .route("/api/likes", gated(post(likes::create_like)))
        .route("/api/likes/:id", gated(delete(likes::delete_like)))
        .route("/api/likes/check/:id", gated(get(likes::check_like)))
        // Notifications
        .route(
            "/api/notifications",
            gated(post(notifications::create_notification)),
        )
        .route(
            "/api/notifications/:id",
            gated(
                get(notifications::list_notifications)
                    .delete(notifications::delete_notification),
            ),
        )
        .route(
            "/api/notifications/:id/unread",
            gated(get(notifications::list_unread_notifications)),
        )
        .route(
            "/api/notifications/:id/read",
            gated(put(notifications::mark_notification_read)),
        );

    Router::new()
        .merge(public)
        .merge(protected)
        .fallback(not_found)
        .layer(middleware::from_fn(request_logging))
        .with_state(state)
}

async fn root() -> &'static str {
    "📰 Blog API is running"
}

async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> ApiError {
    tracing::debug!("No route for {}", uri.path());
    ApiError::NotFound("Route not found")
}
