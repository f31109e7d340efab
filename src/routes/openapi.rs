use axum::{response::IntoResponse, Json};
use utoipa::OpenApi;

use crate::dto::{
    application_dto::{
        ApplicationActionResponse, ApplicationListResponse, ApplicationResponse, CandidateSummary,
        MyApplicationResponse, ReviewDetailResponse, ReviewListResponse, StatusCountResponse,
        StatusDescriptor, SubmitApplicationPayload, UpdateStatusPayload,
    },
    common::{FlashKind, FlashMessage},
    job_dto::{
        JobSummary, RankedJobResponse, RecommendationResponse, SaveToggleResponse,
        SavedJobsResponse, ViewCountResponse,
    },
    notification_dto::{MarkAllReadResponse, NotificationListResponse, UnreadCountResponse},
};
use crate::routes::{applications, health, jobs, notifications, review, statuses};
use crate::services::{
    notification_service::NotificationView, recommendation_service::RecommendationSource,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        statuses::list_statuses,
        jobs::most_viewed,
        jobs::record_view,
        jobs::view_count,
        jobs::toggle_saved_job,
        jobs::list_saved_jobs,
        jobs::recommendations,
        applications::submit_application,
        applications::list_my_applications,
        applications::get_my_application,
        applications::withdraw_application,
        review::list_applications,
        review::get_application,
        review::update_status,
        notifications::list_notifications,
        notifications::unread_count,
        notifications::mark_all_read,
    ),
    components(schemas(
        FlashKind,
        FlashMessage,
        SubmitApplicationPayload,
        UpdateStatusPayload,
        ApplicationResponse,
        ApplicationActionResponse,
        ApplicationListResponse,
        StatusCountResponse,
        StatusDescriptor,
        CandidateSummary,
        ReviewDetailResponse,
        ReviewListResponse,
        MyApplicationResponse,
        JobSummary,
        RankedJobResponse,
        RecommendationSource,
        RecommendationResponse,
        ViewCountResponse,
        SaveToggleResponse,
        SavedJobsResponse,
        NotificationView,
        NotificationListResponse,
        UnreadCountResponse,
        MarkAllReadResponse,
    )),
    tags((name = "jobboard", description = "Job applications, notifications and recommendations"))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
