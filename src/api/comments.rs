//! Comment endpoints

use crate::api::{parse_id, required};
use crate::auth::{policy::authorize_resource, CurrentUser};
use crate::db::StoreError;
use crate::error::{ApiError, JsonBody};
use crate::models::{Comment, CommentView, CreateCommentRequest, UpdateCommentRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

const COMMENT_NOT_FOUND: ApiError = ApiError::NotFound("Comment not found");

/// POST /api/comments
pub async fn create_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(payload): JsonBody<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let missing = "Please provide blogPost and content";
    let post_id = parse_id(&required(payload.blog_post, missing)?)?;
    let content = required(payload.content, missing)?;

    if state.posts.find_by_id(&post_id)?.is_none() {
        return Err(ApiError::NotFound("Blog not found"));
    }

    // The post can still vanish between the check and the insert.
    let comment = state
        .comments
        .create(post_id, actor.id, &content)
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("Blog not found"),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/comments/:id - comments on blog `:id`
pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Vec<CommentView>>, ApiError> {
    let post_id = parse_id(&post_id)?;
    Ok(Json(state.comments.list_for_post(&post_id)?))
}

/// PUT /api/comments/:id (owner or admin)
pub async fn update_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(comment_id): Path<String>,
    JsonBody(payload): JsonBody<UpdateCommentRequest>,
) -> Result<Json<Comment>, ApiError> {
    let comment_id = parse_id(&comment_id)?;
    let comment = state
        .comments
        .find_by_id(&comment_id)?
        .ok_or(COMMENT_NOT_FOUND)?;
    authorize_resource(&actor, &comment, "update this comment")?;

    let content = required(payload.content, "Please provide content")?;

    state
        .comments
        .update_content(&comment_id, &content)?
        .map(Json)
        .ok_or(COMMENT_NOT_FOUND)
}

/// DELETE /api/comments/:id (owner or admin)
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let comment_id = parse_id(&comment_id)?;
    let comment = state
        .comments
        .find_by_id(&comment_id)?
        .ok_or(COMMENT_NOT_FOUND)?;
    authorize_resource(&actor, &comment, "delete this comment")?;

    if !state.comments.delete(&comment_id)? {
        return Err(COMMENT_NOT_FOUND);
    }

    Ok(Json(json!({ "message": "Comment deleted" })))
}
