//! API Errors
//! Mission: One error type for every handler, with a stable status and code

use crate::{auth::jwt::TokenError, db::StoreError};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::error;

/// Why a request failed to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken,
    Expired,
}

impl From<TokenError> for AuthFailure {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => AuthFailure::InvalidToken,
            TokenError::Expired => AuthFailure::Expired,
        }
    }
}

/// Handler-facing errors. Each one is terminal for the request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not authenticated: {0:?}")]
    Unauthenticated(AuthFailure),
    #[error("user for token no longer exists")]
    UnknownUser,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) | ApiError::UnknownUser | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed in the `error` field of the body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(AuthFailure::MissingToken) => "missing_token",
            ApiError::Unauthenticated(AuthFailure::InvalidToken) => "invalid_token",
            ApiError::Unauthenticated(AuthFailure::Expired) => "token_expired",
            ApiError::UnknownUser => "unknown_user",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::Conflict(_) => "conflict",
            ApiError::Internal => "internal_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthenticated(AuthFailure::MissingToken) => {
                "Not authorized, no token".to_string()
            }
            ApiError::Unauthenticated(AuthFailure::InvalidToken) => {
                "Not authorized, token failed".to_string()
            }
            ApiError::Unauthenticated(AuthFailure::Expired) => {
                "Not authorized, token expired".to_string()
            }
            ApiError::UnknownUser => "User not found".to_string(),
            ApiError::InvalidCredentials => "Invalid email or password".to_string(),
            ApiError::Forbidden(action) => format!("Not authorized to {}", action),
            ApiError::NotFound(what) => (*what).to_string(),
            ApiError::InvalidInput(msg) | ApiError::Conflict(msg) => msg.clone(),
            ApiError::Internal => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.code(),
            "message": self.message(),
        });

        (self.status(), Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("Store failure: {:#}", err);
        ApiError::Internal
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Resource not found"),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Other(e) => e.into(),
        }
    }
}

/// `Json` extractor whose rejections come back as `invalid_input`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::InvalidInput(rejection.body_text()))?;
        Ok(Self(value))
    }
}
