use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use validator::Validate;

use crate::{
    dto::{
        application_dto::{
            ApplicationActionResponse, ApplicationListResponse, MyApplicationResponse,
            SubmitApplicationPayload,
        },
        common::FlashMessage,
    },
    error::Result,
    middleware::auth::Claims,
    services::application_service::SubmitApplication,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = SubmitApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = ApplicationActionResponse),
        (status = 400, description = "Invalid payload or job not open"),
        (status = 409, description = "Already applied")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitApplicationPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let candidate_id = claims.require_candidate()?;
    let application = state
        .application_service
        .submit(SubmitApplication {
            candidate_id,
            job_id: payload.job_id,
            cover_letter: payload.cover_letter,
            resume_snapshot: payload.resume_snapshot,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationActionResponse {
            application: application.into(),
            flash: FlashMessage::success("Your application has been submitted"),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/applications",
    responses(
        (status = 200, description = "The caller's applications with per-status counts", body = ApplicationListResponse),
        (status = 403, description = "Not a candidate")
    )
)]
#[axum::debug_handler]
pub async fn list_my_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims.require_candidate()?;
    let listing = state
        .application_service
        .applications_for_candidate(candidate_id)
        .await?;
    Ok(Json(ApplicationListResponse::from(listing)))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(("id" = i64, Path, description = "Application ID")),
    responses(
        (status = 200, description = "One of the caller's applications with its job", body = MyApplicationResponse),
        (status = 403, description = "Not the caller's application"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_my_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims.require_candidate()?;
    let detail = state
        .application_service
        .application_for_candidate(id, candidate_id)
        .await?;
    Ok(Json(MyApplicationResponse::from(detail)))
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/withdraw",
    params(("id" = i64, Path, description = "Application ID")),
    responses(
        (status = 200, description = "Application withdrawn", body = ApplicationActionResponse),
        (status = 403, description = "Not the caller's application"),
        (status = 409, description = "Application already decided or withdrawn")
    )
)]
#[axum::debug_handler]
pub async fn withdraw_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims.require_candidate()?;
    let application = state.application_service.withdraw(id, candidate_id).await?;
    Ok(Json(ApplicationActionResponse {
        application: application.into(),
        flash: FlashMessage::success("Your application has been withdrawn"),
    }))
}
