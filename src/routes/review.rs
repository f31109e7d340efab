use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::{
        application_dto::{
            ApplicationActionResponse, ReviewDetailResponse, ReviewListQuery, ReviewListResponse,
            UpdateStatusPayload,
        },
        common::FlashMessage,
    },
    error::{Error, Result},
    middleware::auth::Claims,
    models::application::ApplicationStatus,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/review/applications",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Applications on the caller's jobs, newest first", body = ReviewListResponse),
        (status = 400, description = "Unknown status filter"),
        (status = 403, description = "Not an employer or admin")
    )
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ReviewListQuery>,
) -> Result<impl IntoResponse> {
    let reviewer = claims.reviewer()?;
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<ApplicationStatus>()
                .map_err(|_| Error::BadRequest(format!("Invalid status: {}", raw)))?,
        ),
    };
    let details = state
        .application_service
        .applications_for_review(reviewer, query.job_id, status)
        .await?;
    Ok(Json(ReviewListResponse::from(details)))
}

#[utoipa::path(
    get,
    path = "/api/review/applications/{id}",
    params(("id" = i64, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application with job and candidate profile", body = ReviewDetailResponse),
        (status = 403, description = "Application belongs to another employer"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let reviewer = claims.reviewer()?;
    let detail = state.application_service.open_for_review(id, reviewer).await?;
    Ok(Json(ReviewDetailResponse::from(detail)))
}

#[utoipa::path(
    post,
    path = "/api/review/applications/{id}/status",
    params(("id" = i64, Path, description = "Application ID")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = ApplicationActionResponse),
        (status = 400, description = "Unknown status or missing rejection note"),
        (status = 403, description = "Application belongs to another employer"),
        (status = 409, description = "Application was withdrawn")
    )
)]
#[axum::debug_handler]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let reviewer = claims.reviewer()?;
    let application = state
        .application_service
        .set_status(id, reviewer, &payload.status, payload.note.as_deref())
        .await?;
    let flash = FlashMessage::success(format!("Status updated to {}", application.status.label()));
    Ok(Json(ApplicationActionResponse {
        application: application.into(),
        flash,
    }))
}
