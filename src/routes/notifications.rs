use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    Extension,
};

use crate::{
    dto::{
        common::LimitQuery,
        notification_dto::{MarkAllReadResponse, NotificationListResponse, UnreadCountResponse},
    },
    error::Result,
    middleware::auth::Claims,
    AppState,
};

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 50;

#[utoipa::path(
    get,
    path = "/api/notifications",
    params(LimitQuery),
    responses(
        (status = 200, description = "Most recent notifications, newest first", body = NotificationListResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let items = state
        .notification_service
        .recent(user_id, limit as i64)
        .await?;
    let unread_count = state.notification_service.count_unread(user_id).await?;
    Ok(Json(NotificationListResponse {
        items,
        unread_count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses((status = 200, description = "Unread notifications", body = UnreadCountResponse))
)]
#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let unread_count = state.notification_service.count_unread(user_id).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses((status = 200, description = "Notifications marked as read", body = MarkAllReadResponse))
)]
#[axum::debug_handler]
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user_id = claims.user_id()?;
    let updated = state.notification_service.mark_all_as_read(user_id).await?;
    Ok(Json(MarkAllReadResponse { updated }))
}
