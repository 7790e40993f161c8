//! Like endpoints

use crate::api::{parse_id, required};
use crate::auth::{policy::authorize_resource, CurrentUser};
use crate::db::StoreError;
use crate::error::{ApiError, JsonBody};
use crate::models::{CreateLikeRequest, Like, LikeView};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

const LIKE_NOT_FOUND: ApiError = ApiError::NotFound("Like not found");

/// Body of `GET /api/likes/check/:id`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub liked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_id: Option<Uuid>,
}

/// POST /api/likes
pub async fn create_like(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(payload): JsonBody<CreateLikeRequest>,
) -> Result<(StatusCode, Json<Like>), ApiError> {
    let post_id = parse_id(&required(payload.blog_post, "Please provide blogPost")?)?;

    if state.posts.find_by_id(&post_id)?.is_none() {
        return Err(ApiError::NotFound("Blog not found"));
    }

    let like = state
        .likes
        .create(post_id, actor.id)
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("Blog not found"),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(like)))
}

/// DELETE /api/likes/:id (owner or admin)
pub async fn delete_like(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(like_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let like_id = parse_id(&like_id)?;
    let like = state.likes.find_by_id(&like_id)?.ok_or(LIKE_NOT_FOUND)?;
    authorize_resource(&actor, &like, "remove this like")?;

    if !state.likes.delete(&like_id)? {
        return Err(LIKE_NOT_FOUND);
    }

    Ok(Json(json!({ "message": "Like removed" })))
}

/// GET /api/likes/:id - likes on blog `:id`
pub async fn list_likes(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<LikeView>>, ApiError> {
    let post_id = parse_id(&post_id)?;
    Ok(Json(state.likes.list_for_post(&post_id)?))
}

/// GET /api/likes/check/:id - whether the caller liked blog `:id`
pub async fn check_like(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(post_id): Path<String>,
) -> Result<Json<LikeStatus>, ApiError> {
    let post_id = parse_id(&post_id)?;
    let like = state.likes.find_for_user(&post_id, &actor.id)?;

    Ok(Json(LikeStatus {
        liked: like.is_some(),
        like_id: like.map(|l| l.id),
    }))
}
