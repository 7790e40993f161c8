//! Notification endpoints

use crate::api::{parse_id, required};
use crate::auth::{
    models::User,
    policy::{authorize, authorize_resource, require_admin},
    CurrentUser,
};
use crate::db::StoreError;
use crate::error::{ApiError, JsonBody};
use crate::models::{CreateNotificationRequest, Notification};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

const NOTIFICATION_NOT_FOUND: ApiError = ApiError::NotFound("Notification not found");

/// POST /api/notifications (Admin only)
pub async fn create_notification(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    JsonBody(payload): JsonBody<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    require_admin(&actor)?;

    let missing = "Please provide user and message";
    let user_id = parse_id(&required(payload.user, missing)?)?;
    let message = required(payload.message, missing)?;

    if state.users().find_by_id(&user_id)?.is_none() {
        return Err(ApiError::NotFound("User not found"));
    }

    let notification = state
        .notifications
        .create(user_id, &message)
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("User not found"),
            other => other.into(),
        })?;

    info!("🔔 Notification sent by {} to {}", actor.email, user_id);

    Ok((StatusCode::CREATED, Json(notification)))
}

fn list_for(
    state: &AppState,
    actor: &User,
    user_id: &str,
    unread_only: bool,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let user_id = parse_id(user_id)?;
    authorize(actor, user_id, "view these notifications")?;
    Ok(Json(state.notifications.list_for_user(&user_id, unread_only)?))
}

/// GET /api/notifications/:id - all notifications for user `:id`
pub async fn list_notifications(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    list_for(&state, &actor, &user_id, false)
}

/// GET /api/notifications/:id/unread
pub async fn list_unread_notifications(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    list_for(&state, &actor, &user_id, true)
}

/// PUT /api/notifications/:id/read (owner or admin)
pub async fn mark_notification_read(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(notification_id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    let notification_id = parse_id(&notification_id)?;
    let notification = state
        .notifications
        .find_by_id(&notification_id)?
        .ok_or(NOTIFICATION_NOT_FOUND)?;
    authorize_resource(&actor, &notification, "update this notification")?;

    state
        .notifications
        .mark_read(&notification_id)?
        .map(Json)
        .ok_or(NOTIFICATION_NOT_FOUND)
}

/// DELETE /api/notifications/:id (owner or admin)
pub async fn delete_notification(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(notification_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let notification_id = parse_id(&notification_id)?;
    let notification = state
        .notifications
        .find_by_id(&notification_id)?
        .ok_or(NOTIFICATION_NOT_FOUND)?;
    authorize_resource(&actor, &notification, "delete this notification")?;

    if !state.notifications.delete(&notification_id)? {
        return Err(NOTIFICATION_NOT_FOUND);
    }

    Ok(Json(json!({ "message": "Notification deleted" })))
}
