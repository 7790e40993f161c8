//! Authentication API Endpoints
//! Mission: Provide registration, login/logout, profile and user management endpoints

use crate::api::{non_empty, parse_id, required};
use crate::auth::{
    jwt::JwtHandler,
    middleware::{cleared_session_cookie, session_cookie, CurrentUser},
    models::{
        AdminUpdateUserRequest, LoginRequest, RegisterRequest, UpdateProfileRequest, User,
        UserResponse,
    },
    policy::require_admin,
    user_store::{UserChanges, UserStore},
};
use crate::db::StoreError;
use crate::error::{ApiError, JsonBody};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
    /// Set the `Secure` attribute on session cookies (off in development)
    pub secure_cookies: bool,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>, secure_cookies: bool) -> Self {
        Self {
            user_store,
            jwt_handler,
            secure_cookies,
        }
    }

    /// Issue a token for `user` and add it to the jar as the session cookie
    fn start_session(&self, jar: CookieJar, user: &User) -> Result<CookieJar, ApiError> {
        let issued = self.jwt_handler.generate_token(user.id)?;
        Ok(jar.add(session_cookie(
            issued.token,
            self.jwt_handler.lifetime(),
            self.secure_cookies,
        )))
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::InvalidInput(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), ApiError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::InvalidInput("Please provide a valid email".to_string())),
    }
}

fn user_not_found(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::NotFound("User not found"),
        other => other.into(),
    }
}

/// Register endpoint - POST /api/users
pub async fn register(
    State(state): State<AuthState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<UserResponse>), ApiError> {
    let missing = "Please provide name, email and password";
    let name = required(payload.name, missing)?;
    let email = required(payload.email, missing)?;
    let password = required(payload.password, missing)?;
    validate_email(&email)?;
    validate_password(&password)?;

    let user = state.user_store.create_user(&name, &email, &password, false)?;
    let jar = state.start_session(jar, &user)?;

    info!("✅ Registered user: {}", user.email);

    Ok((StatusCode::CREATED, jar, Json(UserResponse::from_user(&user))))
}

/// Login endpoint - POST /api/users/auth
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<UserResponse>), ApiError> {
    let missing = "Please provide email and password";
    let email = required(payload.email, missing)?;
    let password = required(payload.password, missing)?;

    info!("🔐 Login attempt: {}", email);

    let Some(user) = state.user_store.verify_credentials(&email, &password)? else {
        warn!("❌ Failed login attempt: {}", email);
        return Err(ApiError::InvalidCredentials);
    };

    let jar = state.start_session(jar, &user)?;

    info!(
        "✅ Login successful: {} ({})",
        user.email,
        if user.is_admin { "admin" } else { "user" }
    );

    Ok((jar, Json(UserResponse::from_user(&user))))
}

/// Logout endpoint - POST /api/users/logout
/// The token itself stays valid until expiry; only the cookie is dropped.
pub async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Json<Value>) {
    (
        jar.add(cleared_session_cookie(state.secure_cookies)),
        Json(json!({ "message": "Logged out successfully" })),
    )
}

/// Current profile - GET /api/users/profile
pub async fn get_profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse::from_user(&user))
}

/// Update own profile - PUT /api/users/profile
pub async fn update_profile(
    State(state): State<AuthState>,
    CurrentUser(user): CurrentUser,
    JsonBody(payload): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let changes = UserChanges {
        name: non_empty(payload.name),
        email: non_empty(payload.email),
        password: non_empty(payload.password),
        is_admin: None,
    };
    if let Some(email) = changes.email.as_deref() {
        validate_email(email)?;
    }
    if let Some(password) = changes.password.as_deref() {
        validate_password(password)?;
    }

    let updated = state
        .user_store
        .update_user(&user.id, changes)
        .map_err(user_not_found)?;

    Ok(Json(UserResponse::from_user(&updated)))
}

/// List all users - GET /api/users (Admin only)
pub async fn list_users(
    State(state): State<AuthState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_admin(&actor)?;

    let users = state.user_store.list_users()?;
    let response: Vec<UserResponse> = users.iter().map(UserResponse::from_user).collect();

    Ok(Json(response))
}

/// Get one user - GET /api/users/:id (Admin only)
pub async fn get_user(
    State(state): State<AuthState>,
    CurrentUser(actor): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    require_admin(&actor)?;
    let user_id = parse_id(&user_id)?;

    let user = state
        .user_store
        .find_by_id(&user_id)?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Edit user - PUT /api/users/:id (Admin only)
pub async fn update_user(
    State(state): State<AuthState>,
    CurrentUser(actor): CurrentUser,
    Path(user_id): Path<String>,
    JsonBody(payload): JsonBody<AdminUpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    require_admin(&actor)?;
    let user_id = parse_id(&user_id)?;

    let changes = UserChanges {
        name: non_empty(payload.name),
        email: non_empty(payload.email),
        password: None,
        is_admin: payload.is_admin,
    };
    if let Some(email) = changes.email.as_deref() {
        validate_email(email)?;
    }

    let updated = state
        .user_store
        .update_user(&user_id, changes)
        .map_err(user_not_found)?;

    info!("✏️  User updated by {}: {}", actor.email, updated.email);

    Ok(Json(UserResponse::from_user(&updated)))
}

/// Delete user - DELETE /api/users/:id (Admin only)
pub async fn delete_user(
    State(state): State<AuthState>,
    CurrentUser(actor): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    require_admin(&actor)?;
    let user_id = parse_id(&user_id)?;

    // Don't allow deleting yourself
    if user_id == actor.id {
        return Err(ApiError::InvalidInput(
            "Cannot delete your own account".to_string(),
        ));
    }

    let target = state
        .user_store
        .find_by_id(&user_id)?
        .ok_or(ApiError::NotFound("User not found"))?;

    if target.is_admin {
        return Err(ApiError::InvalidInput("Cannot delete admin user".to_string()));
    }

    state
        .user_store
        .delete_user(&user_id)
        .map_err(user_not_found)?;

    info!("🗑️  User deleted by {}: {}", actor.email, target.email);

    Ok(Json(json!({ "message": "User deleted" })))
}
