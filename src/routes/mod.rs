pub mod applications;
pub mod health;
pub mod jobs;
pub mod notifications;
pub mod openapi;
pub mod review;
pub mod statuses;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::auth::require_bearer_auth;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/health", get(health::health))
        .route("/api/openapi.json", get(openapi::openapi_json))
        .route("/api/statuses", get(statuses::list_statuses))
        .route("/api/jobs/most-viewed", get(jobs::most_viewed))
        .route(
            "/api/jobs/:id/views",
            get(jobs::view_count).post(jobs::record_view),
        );

    let user_api = Router::new()
        .route(
            "/api/applications",
            get(applications::list_my_applications).post(applications::submit_application),
        )
        .route("/api/applications/:id", get(applications::get_my_application))
        .route(
            "/api/applications/:id/withdraw",
            post(applications::withdraw_application),
        )
        .route("/api/jobs/:id/save", post(jobs::toggle_saved_job))
        .route("/api/saved-jobs", get(jobs::list_saved_jobs))
        .route("/api/recommendations", get(jobs::recommendations))
        .route("/api/notifications", get(notifications::list_notifications))
        .route(
            "/api/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route(
            "/api/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route("/api/review/applications", get(review::list_applications))
        .route(
            "/api/review/applications/:id",
            get(review::get_application),
        )
        .route(
            "/api/review/applications/:id/status",
            post(review::update_status),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_bearer_auth,
        ));

    public_api
        .merge(user_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
