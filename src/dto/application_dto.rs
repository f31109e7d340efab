use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::common::FlashMessage;
use crate::dto::job_dto::JobSummary;
use crate::models::application::{Application, ApplicationDetail, ApplicationStatus};
use crate::services::application_service::{CandidateApplications, StatusCount};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitApplicationPayload {
    #[validate(range(min = 1))]
    pub job_id: i64,
    #[validate(length(max = 5000))]
    pub cover_letter: Option<String>,
    #[validate(length(max = 20000))]
    pub resume_snapshot: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusPayload {
    #[validate(length(min = 1, max = 32))]
    pub status: String,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

/// Filters for the employer's review list. `status` takes the same values as
/// [`UpdateStatusPayload::status`].
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    pub job_id: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationResponse {
    pub id: i64,
    pub job_id: i64,
    pub candidate_id: i64,
    pub status: String,
    pub status_label: String,
    pub status_badge: String,
    pub stage: Option<u8>,
    pub cover_letter: Option<String>,
    pub decision_note: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub applied_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            job_id: a.job_id,
            candidate_id: a.candidate_id,
            status: a.status.as_str().to_string(),
            status_label: a.status.label().to_string(),
            status_badge: a.status.badge().to_string(),
            stage: a.status.stage(),
            cover_letter: a.cover_letter,
            decision_note: a.decision_note,
            applied_at: a.applied_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationActionResponse {
    pub application: ApplicationResponse,
    pub flash: FlashMessage,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusCountResponse {
    pub status: String,
    pub label: String,
    pub count: usize,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(c: StatusCount) -> Self {
        Self {
            status: c.status.as_str().to_string(),
            label: c.label.to_string(),
            count: c.count,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationResponse>,
    pub status_counts: Vec<StatusCountResponse>,
}

impl From<CandidateApplications> for ApplicationListResponse {
    fn from(listing: CandidateApplications) -> Self {
        Self {
            items: listing.items.into_iter().map(Into::into).collect(),
            status_counts: listing.status_counts.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CandidateSummary {
    pub id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub location: Option<String>,
    #[schema(value_type = Object)]
    pub skills: crate::utils::profile_parser::ParsedField<Vec<String>>,
    #[schema(value_type = Object)]
    pub experience:
        crate::utils::profile_parser::ParsedField<Vec<crate::utils::profile_parser::ExperienceEntry>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewDetailResponse {
    pub application: ApplicationResponse,
    pub job: JobSummary,
    pub candidate: CandidateSummary,
    pub company_name: String,
}

impl From<ApplicationDetail> for ReviewDetailResponse {
    fn from(detail: ApplicationDetail) -> Self {
        let candidate = CandidateSummary {
            id: detail.candidate.id,
            skills: detail.candidate.parsed_skills(),
            experience: detail.candidate.parsed_experience(),
            full_name: detail.candidate.full_name,
            email: detail.candidate.email,
            location: detail.candidate.location,
        };
        Self {
            application: detail.application.into(),
            job: detail.job.into(),
            candidate,
            company_name: detail.employer.company_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewListResponse {
    pub items: Vec<ReviewDetailResponse>,
    pub count: usize,
}

impl From<Vec<ApplicationDetail>> for ReviewListResponse {
    fn from(details: Vec<ApplicationDetail>) -> Self {
        let items: Vec<ReviewDetailResponse> = details.into_iter().map(Into::into).collect();
        Self {
            count: items.len(),
            items,
        }
    }
}

/// What a candidate sees when opening one of their own applications.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyApplicationResponse {
    pub application: ApplicationResponse,
    pub job: JobSummary,
    pub company_name: String,
    pub can_withdraw: bool,
}

impl From<ApplicationDetail> for MyApplicationResponse {
    fn from(detail: ApplicationDetail) -> Self {
        Self {
            can_withdraw: detail.application.status.can_withdraw(),
            application: detail.application.into(),
            job: detail.job.into(),
            company_name: detail.employer.company_name,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusDescriptor {
    pub value: String,
    pub label: String,
    pub badge: String,
    pub description: String,
    pub stage: Option<u8>,
    pub reviewer_assignable: bool,
}

impl From<ApplicationStatus> for StatusDescriptor {
    fn from(status: ApplicationStatus) -> Self {
        Self {
            value: status.as_str().to_string(),
            label: status.label().to_string(),
            badge: status.badge().to_string(),
            description: status.description().to_string(),
            stage: status.stage(),
            reviewer_assignable: status.is_reviewer_assignable(),
        }
    }
}
