use serde::Serialize;
use utoipa::ToSchema;

use crate::services::notification_service::NotificationView;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub items: Vec<NotificationView>,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
