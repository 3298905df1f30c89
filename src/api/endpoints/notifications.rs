//! Notification inbox. Strictly per-user: every operation is scoped to
//! the authenticated account, and marking someone else's row read is
//! denied.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Serialize;

use super::parse_id;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, AuthedUser};
use crate::db::repository::notification;
use crate::models::Notification;

/// `GET /api/notifications` — the caller's inbox, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(notification::list_for_user(&conn, user.id)?))
}

#[derive(Serialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

/// `GET /api/notifications/unread-count`
pub async fn unread_count(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let conn = ctx.conn()?;
    Ok(Json(UnreadCountResponse {
        unread: notification::unread_count(&conn, user.id)?,
    }))
}

/// `PUT /api/notifications/:id/read`
pub async fn mark_read(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    let notification_id = parse_id(&id, "notification")?;
    let conn = ctx.conn()?;
    let mut note = notification::get_notification(&conn, notification_id)?
        .ok_or_else(|| ApiError::NotFound("notification not found".into()))?;
    if note.user_id != user.id {
        return Err(ApiError::AccessDenied);
    }

    let now = Utc::now();
    notification::mark_read(&conn, note.id, now)?;
    note.is_read = true;
    note.updated_at = now;
    Ok(Json(note))
}

#[derive(Serialize)]
pub struct MarkAllResponse {
    pub updated: usize,
}

/// `PUT /api/notifications/read-all`
pub async fn mark_all_read(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<AuthedUser>,
) -> Result<Json<MarkAllResponse>, ApiError> {
    let conn = ctx.conn()?;
    let updated = notification::mark_all_read(&conn, user.id, Utc::now())?;
    Ok(Json(MarkAllResponse { updated }))
}
