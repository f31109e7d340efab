use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Json},
    Extension,
};
use std::net::SocketAddr;

use crate::{
    dto::{
        common::{FlashMessage, LimitQuery},
        job_dto::{
            RankedJobResponse, RecommendationResponse, SaveToggleResponse, SavedJobsResponse,
            ViewCountResponse,
        },
    },
    error::{Error, Result},
    middleware::auth::Claims,
    services::recommendation_service::RankedJob,
    store::CatalogRepository,
    utils::client_ip::client_ip,
    AppState,
};

const MAX_LISTING_LIMIT: usize = 50;

async fn ensure_job_exists(state: &AppState, job_id: i64) -> Result<()> {
    match state.store.job(job_id).await? {
        Some(_) => Ok(()),
        None => Err(Error::NotFound(format!("Job {} not found", job_id))),
    }
}

#[utoipa::path(
    get,
    path = "/api/jobs/most-viewed",
    params(LimitQuery),
    responses(
        (status = 200, description = "Open jobs ranked by views", body = [RankedJobResponse])
    )
)]
#[axum::debug_handler]
pub async fn most_viewed(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(state.settings.recommendation_limit)
        .min(MAX_LISTING_LIMIT);
    let items: Vec<RankedJobResponse> = state
        .view_service
        .most_viewed(limit)
        .await?
        .into_iter()
        .map(|viewed| {
            RankedJobResponse::from(RankedJob {
                job: viewed.job,
                view_count: Some(viewed.view_count),
                match_score: None,
                match_label: None,
            })
        })
        .collect();
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/views",
    params(("id" = i64, Path, description = "Job ID")),
    responses(
        (status = 200, description = "View recorded or deduplicated", body = ViewCountResponse),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn record_view(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    ensure_job_exists(&state, job_id).await?;
    let peer = connect_info.map(|ConnectInfo(addr)| addr);
    let recorded = match client_ip(&headers, peer) {
        Some(ip) => state.view_service.record_view(job_id, &ip).await?,
        None => false,
    };
    let view_count = state.view_service.count(job_id).await?;
    Ok(Json(ViewCountResponse {
        job_id,
        recorded: Some(recorded),
        view_count,
    }))
}

#[utoipa::path(
    get,
    path = "/api/jobs/{id}/views",
    params(("id" = i64, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Lifetime view count", body = ViewCountResponse),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn view_count(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
) -> Result<impl IntoResponse> {
    ensure_job_exists(&state, job_id).await?;
    let view_count = state.view_service.count(job_id).await?;
    Ok(Json(ViewCountResponse {
        job_id,
        recorded: None,
        view_count,
    }))
}

#[utoipa::path(
    post,
    path = "/api/jobs/{id}/save",
    params(("id" = i64, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Saved state flipped", body = SaveToggleResponse),
        (status = 403, description = "Not a candidate"),
        (status = 404, description = "Job not found")
    )
)]
#[axum::debug_handler]
pub async fn toggle_saved_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(job_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims.require_candidate()?;
    ensure_job_exists(&state, job_id).await?;
    let saved = state.saved_job_service.toggle(candidate_id, job_id).await?;
    let flash = if saved {
        FlashMessage::success("Job saved")
    } else {
        FlashMessage::info("Job removed from your saved list")
    };
    Ok(Json(SaveToggleResponse {
        job_id,
        saved,
        flash,
    }))
}

#[utoipa::path(
    get,
    path = "/api/saved-jobs",
    responses(
        (status = 200, description = "Saved job ids, newest first", body = SavedJobsResponse),
        (status = 403, description = "Not a candidate")
    )
)]
#[axum::debug_handler]
pub async fn list_saved_jobs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let candidate_id = claims.require_candidate()?;
    let job_ids = state.saved_job_service.saved_job_ids(candidate_id).await?;
    let count = job_ids.len();
    Ok(Json(SavedJobsResponse { job_ids, count }))
}

#[utoipa::path(
    get,
    path = "/api/recommendations",
    params(LimitQuery),
    responses(
        (status = 200, description = "Recommended jobs", body = RecommendationResponse)
    )
)]
#[axum::debug_handler]
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(state.settings.recommendation_limit)
        .min(MAX_LISTING_LIMIT);
    let recommendation = state
        .recommendation_service
        .recommend(claims.candidate_profile(), limit)
        .await;
    Ok(Json(RecommendationResponse::from(recommendation)))
}
