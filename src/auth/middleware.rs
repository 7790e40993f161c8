//! Authentication Middleware
//! Mission: Resolve the session cookie to a live user before protected handlers run

use crate::auth::{api::AuthState, models::User};
use crate::error::{ApiError, AuthFailure};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, Extensions},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "jwt";

/// Per-request context filled in by the auth middleware.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub identity: Option<User>,
}

/// Auth middleware: token from cookie → verified user id → loaded user
pub async fn auth_middleware(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &jar)?;

    debug!(user = %user.id, path = %req.uri().path(), "Authenticated request");

    req.extensions_mut().insert(RequestContext {
        identity: Some(user),
    });

    Ok(next.run(req).await)
}

/// Run the gate without touching the request. Never writes to the store.
pub fn authenticate(state: &AuthState, jar: &CookieJar) -> Result<User, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::Unauthenticated(AuthFailure::MissingToken))?;

    let user_id = state
        .jwt_handler
        .validate_token(token)
        .map_err(|e| ApiError::Unauthenticated(e.into()))?;

    state
        .user_store
        .find_by_id(&user_id)?
        .ok_or(ApiError::UnknownUser)
}

/// Extract the resolved user from request extensions (use after auth middleware)
pub fn extract_identity(extensions: &Extensions) -> Option<&User> {
    extensions
        .get::<RequestContext>()
        .and_then(|ctx| ctx.identity.as_ref())
}

/// Handler argument for the authenticated user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_identity(&parts.extensions)
            .cloned()
            .map(CurrentUser)
            .ok_or(ApiError::Unauthenticated(AuthFailure::MissingToken))
    }
}

/// Session cookie: http-only, same-site strict, lives as long as the token.
pub fn session_cookie(token: String, max_age: chrono::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age.num_seconds()))
        .build()
}

/// Expired, empty cookie that makes the browser drop the session.
pub fn cleared_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
