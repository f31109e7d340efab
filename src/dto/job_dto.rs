use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::common::FlashMessage;
use crate::models::job::JobRecord;
use crate::services::recommendation_service::{RankedJob, Recommendation, RecommendationSource};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct JobSummary {
    pub id: i64,
    pub employer_id: i64,
    pub title: String,
    pub location: Option<String>,
    pub status: String,
    #[schema(value_type = Option<String>, format = Date)]
    pub deadline: Option<NaiveDate>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<JobRecord> for JobSummary {
    fn from(job: JobRecord) -> Self {
        Self {
            id: job.id,
            employer_id: job.employer_id,
            title: job.title,
            location: job.location,
            status: job.status.as_str().to_string(),
            deadline: job.deadline,
            created_at: job.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RankedJobResponse {
    pub job: JobSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_label: Option<String>,
}

impl From<RankedJob> for RankedJobResponse {
    fn from(ranked: RankedJob) -> Self {
        Self {
            job: ranked.job.into(),
            view_count: ranked.view_count,
            match_score: ranked.match_score,
            match_label: ranked.match_label.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecommendationResponse {
    pub source: RecommendationSource,
    pub items: Vec<RankedJobResponse>,
}

impl From<Recommendation> for RecommendationResponse {
    fn from(rec: Recommendation) -> Self {
        Self {
            source: rec.source,
            items: rec.items.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ViewCountResponse {
    pub job_id: i64,
    pub recorded: Option<bool>,
    pub view_count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveToggleResponse {
    pub job_id: i64,
    pub saved: bool,
    pub flash: FlashMessage,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SavedJobsResponse {
    pub job_ids: Vec<i64>,
    pub count: usize,
}
