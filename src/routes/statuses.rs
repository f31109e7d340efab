use axum::{response::IntoResponse, Json};

use crate::dto::application_dto::StatusDescriptor;
use crate::models::application::ApplicationStatus;

#[utoipa::path(
    get,
    path = "/api/statuses",
    responses(
        (status = 200, description = "Application statuses in pipeline order", body = [StatusDescriptor])
    )
)]
#[axum::debug_handler]
pub async fn list_statuses() -> impl IntoResponse {
    let statuses: Vec<StatusDescriptor> = ApplicationStatus::ALL.into_iter().map(Into::into).collect();
    Json(statuses)
}
