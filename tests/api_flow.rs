//! End-to-end tests through the full router: cookie sessions, the auth gate
//! and owner-or-admin rules on every resource.

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use blog_backend::{auth::models::User, create_router, AppConfig, AppState, Database};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl TestApp {
    fn new() -> Self {
        let db = Database::in_memory().unwrap();
        let config = AppConfig {
            bcrypt_cost: 4,
            ..AppConfig::default()
        };
        let state = AppState::new(&db, &config);
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    async fn send(&self, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        Reply {
            status,
            headers,
            body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        }
    }

    fn user(&self, name: &str, email: &str, is_admin: bool) -> User {
        self.state
            .users()
            .create_user(name, email, "password123", is_admin)
            .unwrap()
    }

    fn cookie_for(&self, user: &User) -> String {
        let issued = self.state.auth.jwt_handler.generate_token(user.id).unwrap();
        format!("jwt={}", issued.token)
    }

    async fn create_post(&self, cookie: &str, title: &str) -> String {
        let reply = self
            .send(
                Method::POST,
                "/api/blogs",
                Some(cookie),
                Some(json!({
                    "title": title,
                    "content": "Some content",
                    "category": "Technology",
                    "tags": ["rust"]
                })),
            )
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        reply.body["id"].as_str().unwrap().to_string()
    }
}

fn session_from(headers: &HeaderMap) -> String {
    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("no Set-Cookie header")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn gate_rejects_missing_malformed_and_expired_tokens() {
    let app = TestApp::new();
    let jane = app.user("Jane", "jane@example.com", false);

    let missing = app.send(Method::GET, "/api/users/profile", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.body["error"], "missing_token");

    let malformed = app
        .send(Method::GET, "/api/users/profile", Some("jwt=abc.def.ghi"), None)
        .await;
    assert_eq!(malformed.status, StatusCode::UNAUTHORIZED);
    assert_eq!(malformed.body["error"], "invalid_token");

    let expired = app
        .state
        .auth
        .jwt_handler
        .generate_token_at(jane.id, Utc::now() - Duration::days(91))
        .unwrap();
    let reply = app
        .send(
            Method::GET,
            "/api/users/profile",
            Some(&format!("jwt={}", expired.token)),
            None,
        )
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "token_expired");

    let ok = app
        .send(Method::GET, "/api/users/profile", Some(&app.cookie_for(&jane)), None)
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.body["email"], "jane@example.com");
}

#[tokio::test]
async fn token_for_deleted_user_is_rejected() {
    let app = TestApp::new();
    let jane = app.user("Jane", "jane@example.com", false);
    let cookie = app.cookie_for(&jane);

    app.state.users().delete_user(&jane.id).unwrap();

    let reply = app.send(Method::GET, "/api/users/profile", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "unknown_user");
}

#[tokio::test]
async fn register_login_logout_cycle() {
    let app = TestApp::new();

    let registered = app
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({"name": "Jane", "email": "jane@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(registered.status, StatusCode::CREATED);
    assert_eq!(registered.body["isAdmin"], false);
    assert!(registered.body.get("passwordHash").is_none());
    let set_cookie = registered.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));

    let duplicate = app
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({"name": "Jane", "email": "JANE@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let short = app
        .send(
            Method::POST,
            "/api/users",
            None,
            Some(json!({"name": "Bob", "email": "bob@example.com", "password": "123"})),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let incomplete = app
        .send(Method::POST, "/api/users", None, Some(json!({"email": "x@example.com"})))
        .await;
    assert_eq!(incomplete.status, StatusCode::BAD_REQUEST);

    let wrong = app
        .send(
            Method::POST,
            "/api/users/auth",
            None,
            Some(json!({"email": "jane@example.com", "password": "nope"})),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["error"], "invalid_credentials");

    let login = app
        .send(
            Method::POST,
            "/api/users/auth",
            None,
            Some(json!({"email": "jane@example.com", "password": "secret1"})),
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    let cookie = session_from(&login.headers);

    let profile = app.send(Method::GET, "/api/users/profile", Some(&cookie), None).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.body["name"], "Jane");

    let updated = app
        .send(
            Method::PUT,
            "/api/users/profile",
            Some(&cookie),
            Some(json!({"name": "Jane Doe", "email": ""})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Jane Doe");
    assert_eq!(updated.body["email"], "jane@example.com");

    let logout = app.send(Method::POST, "/api/users/logout", Some(&cookie), None).await;
    assert_eq!(logout.status, StatusCode::OK);
    let cleared = logout.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("jwt=;"));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn only_owner_or_admin_deletes_a_post() {
    let app = TestApp::new();
    let alice = app.user("Alice", "alice@example.com", false);
    let bob = app.user("Bob", "bob@example.com", false);
    let admin = app.user("Admin", "admin@example.com", true);

    let post_id = app.create_post(&app.cookie_for(&alice), "Alice's post").await;
    let uri = format!("/api/blogs/{}", post_id);

    let denied = app.send(Method::DELETE, &uri, Some(&app.cookie_for(&bob)), None).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["error"], "forbidden");

    let still_there = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(still_there.status, StatusCode::OK);

    let removed = app
        .send(Method::DELETE, &uri, Some(&app.cookie_for(&admin)), None)
        .await;
    assert_eq!(removed.status, StatusCode::OK);
    assert_eq!(removed.body["message"], "Blog deleted");

    let gone = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    // Missing resources are reported before ownership
    let missing = app.send(Method::DELETE, &uri, Some(&app.cookie_for(&bob)), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_updates_post_and_stranger_cannot() {
    let app = TestApp::new();
    let alice = app.user("Alice", "alice@example.com", false);
    let bob = app.user("Bob", "bob@example.com", false);
    let alice_cookie = app.cookie_for(&alice);

    let post_id = app.create_post(&alice_cookie, "Draft").await;
    let uri = format!("/api/blogs/{}", post_id);

    let updated = app
        .send(
            Method::PUT,
            &uri,
            Some(&alice_cookie),
            Some(json!({"title": "Final", "category": "business"})),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Final");
    assert_eq!(updated.body["category"], "Business");
    assert_eq!(updated.body["content"], "Some content");
    assert_eq!(updated.body["author"]["id"], alice.id.to_string());

    let denied = app
        .send(
            Method::PUT,
            &uri,
            Some(&app.cookie_for(&bob)),
            Some(json!({"title": "Hijacked"})),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let current = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(current.body["title"], "Final");
    assert_eq!(current.body["author"]["name"], "Alice");

    let bad_category = app
        .send(Method::PUT, &uri, Some(&alice_cookie), Some(json!({"category": "Gardening"})))
        .await;
    assert_eq!(bad_category.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn viewing_a_post_counts_views() {
    let app = TestApp::new();
    let alice = app.user("Alice", "alice@example.com", false);
    let post_id = app.create_post(&app.cookie_for(&alice), "Counted").await;
    let uri = format!("/api/blogs/{}", post_id);

    app.send(Method::GET, &uri, None, None).await;
    let second = app.send(Method::GET, &uri, None, None).await;
    assert_eq!(second.body["views"], 2);
}

#[tokio::test]
async fn double_like_conflicts_and_keeps_one_record() {
    let app = TestApp::new();
    let alice = app.user("Alice", "alice@example.com", false);
    let bob = app.user("Bob", "bob@example.com", false);
    let bob_cookie = app.cookie_for(&bob);

    let post_id = app.create_post(&app.cookie_for(&alice), "Likeable").await;

    let first = app
        .send(Method::POST, "/api/likes", Some(&bob_cookie), Some(json!({"blogPost": post_id})))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    let like_id = first.body["id"].as_str().unwrap().to_string();

    let second = app
        .send(Method::POST, "/api/likes", Some(&bob_cookie), Some(json!({"blogPost": post_id})))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let likes = app
        .send(Method::GET, &format!("/api/likes/{}", post_id), None, None)
        .await;
    assert_eq!(likes.body.as_array().unwrap().len(), 1);
    assert_eq!(likes.body[0]["user"]["name"], "Bob");

    let check = app
        .send(
            Method::GET,
            &format!("/api/likes/check/{}", post_id),
            Some(&bob_cookie),
            None,
        )
        .await;
    assert_eq!(check.body, json!({"liked": true, "likeId": like_id}));

    // Alice cannot remove Bob's like
    let denied = app
        .send(
            Method::DELETE,
            &format!("/api/likes/{}", like_id),
            Some(&app.cookie_for(&alice)),
            None,
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let unknown_post = app
        .send(
            Method::POST,
            "/api/likes",
            Some(&bob_cookie),
            Some(json!({"blogPost": uuid::Uuid::new_v4()})),
        )
        .await;
    assert_eq!(unknown_post.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_follow_ownership_and_cascade() {
    let app = TestApp::new();
    let alice = app.user("Alice", "alice@example.com", false);
    let bob = app.user("Bob", "bob@example.com", false);
    let alice_cookie = app.cookie_for(&alice);
    let bob_cookie = app.cookie_for(&bob);

    let post_id = app.create_post(&alice_cookie, "Discuss").await;

    let created = app
        .send(
            Method::POST,
            "/api/comments",
            Some(&bob_cookie),
            Some(json!({"blogPost": post_id, "content": "Great read"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let comment_uri = format!("/api/comments/{}", created.body["id"].as_str().unwrap());

    let denied = app
        .send(Method::PUT, &comment_uri, Some(&alice_cookie), Some(json!({"content": "edited"})))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let edited = app
        .send(Method::PUT, &comment_uri, Some(&bob_cookie), Some(json!({"content": "Great read!"})))
        .await;
    assert_eq!(edited.status, StatusCode::OK);
    assert_eq!(edited.body["content"], "Great read!");

    let listed = app
        .send(Method::GET, &format!("/api/comments/{}", post_id), None, None)
        .await;
    assert_eq!(listed.body[0]["author"]["name"], "Bob");

    app.send(
        Method::DELETE,
        &format!("/api/blogs/{}", post_id),
        Some(&alice_cookie),
        None,
    )
    .await;

    let after = app
        .send(Method::GET, &format!("/api/comments/{}", post_id), None, None)
        .await;
    assert_eq!(after.status, StatusCode::OK);
    assert_eq!(after.body, json!([]));
}

#[tokio::test]
async fn admin_only_endpoints() {
    let app = TestApp::new();
    let alice = app.user("Alice", "alice@example.com", false);
    let admin = app.user("Admin", "admin@example.com", true);
    let alice_cookie = app.cookie_for(&alice);
    let admin_cookie = app.cookie_for(&admin);

    let post_id = app.create_post(&alice_cookie, "Needs review").await;

    let denied = app.send(Method::GET, "/api/blogs/pending", Some(&alice_cookie), None).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let pending = app.send(Method::GET, "/api/blogs/pending", Some(&admin_cookie), None).await;
    assert_eq!(pending.status, StatusCode::OK);
    assert_eq!(pending.body.as_array().unwrap().len(), 1);

    let approve_uri = format!("/api/blogs/{}/approve", post_id);
    let denied = app.send(Method::PUT, &approve_uri, Some(&alice_cookie), None).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let approved = app.send(Method::PUT, &approve_uri, Some(&admin_cookie), None).await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["status"], "approved");

    let again = app.send(Method::PUT, &approve_uri, Some(&admin_cookie), None).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let users = app.send(Method::GET, "/api/users", Some(&alice_cookie), None).await;
    assert_eq!(users.status, StatusCode::FORBIDDEN);

    let users = app.send(Method::GET, "/api/users", Some(&admin_cookie), None).await;
    assert_eq!(users.body.as_array().unwrap().len(), 2);

    let self_delete = app
        .send(
            Method::DELETE,
            &format!("/api/users/{}", admin.id),
            Some(&admin_cookie),
            None,
        )
        .await;
    assert_eq!(self_delete.status, StatusCode::BAD_REQUEST);

    let removed = app
        .send(
            Method::DELETE,
            &format!("/api/users/{}", alice.id),
            Some(&admin_cookie),
            None,
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    // Alice's post went with her account
    let gone = app
        .send(Method::GET, &format!("/api/blogs/{}", post_id), None, None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_are_private_to_owner_and_admin() {
    let app = TestApp::new();
    let alice = app.user("Alice", "alice@example.com", false);
    let bob = app.user("Bob", "bob@example.com", false);
    let admin = app.user("Admin", "admin@example.com", true);
    let alice_cookie = app.cookie_for(&alice);
    let admin_cookie = app.cookie_for(&admin);

    let forbidden = app
        .send(
            Method::POST,
            "/api/notifications",
            Some(&alice_cookie),
            Some(json!({"user": bob.id, "message": "hi"})),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let unknown = app
        .send(
            Method::POST,
            "/api/notifications",
            Some(&admin_cookie),
            Some(json!({"user": uuid::Uuid::new_v4(), "message": "hi"})),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let created = app
        .send(
            Method::POST,
            "/api/notifications",
            Some(&admin_cookie),
            Some(json!({"user": alice.id, "message": "Your post was approved"})),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let notification_id = created.body["id"].as_str().unwrap().to_string();

    let list_uri = format!("/api/notifications/{}", alice.id);
    let own = app.send(Method::GET, &list_uri, Some(&alice_cookie), None).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body.as_array().unwrap().len(), 1);

    let snooping = app
        .send(Method::GET, &list_uri, Some(&app.cookie_for(&bob)), None)
        .await;
    assert_eq!(snooping.status, StatusCode::FORBIDDEN);

    let by_admin = app.send(Method::GET, &list_uri, Some(&admin_cookie), None).await;
    assert_eq!(by_admin.status, StatusCode::OK);

    let read = app
        .send(
            Method::PUT,
            &format!("/api/notifications/{}/read", notification_id),
            Some(&alice_cookie),
            None,
        )
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["read"], true);

    let unread = app
        .send(
            Method::GET,
            &format!("/api/notifications/{}/unread", alice.id),
            Some(&alice_cookie),
            None,
        )
        .await;
    assert_eq!(unread.body, json!([]));
}

#[tokio::test]
async fn search_and_category_listing() {
    let app = TestApp::new();
    let alice = app.user("Alice", "alice@example.com", false);
    let cookie = app.cookie_for(&alice);
    app.create_post(&cookie, "Learning Rust").await;
    app.create_post(&cookie, "Cooking pasta").await;

    let found = app
        .send(Method::GET, "/api/blogs/search?query=rust", None, None)
        .await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body.as_array().unwrap().len(), 1);

    let missing = app.send(Method::GET, "/api/blogs/search", None, None).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let tech = app
        .send(Method::GET, "/api/blogs/category/Technology", None, None)
        .await;
    assert_eq!(tech.body.as_array().unwrap().len(), 2);

    let unknown = app
        .send(Method::GET, "/api/blogs/category/Gardening", None, None)
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let mine = app.send(Method::GET, "/api/blogs/my-blogs", Some(&cookie), None).await;
    assert_eq!(mine.body.as_array().unwrap().len(), 2);
}
