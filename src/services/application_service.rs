//! Application pipeline: submission, employer review, decisions and
//! candidate withdrawal.
//!
//! Every transition that must not notify twice runs as a conditional update
//! in storage; the notification is appended only when that update hit a row.
//! Mail is best effort and never fails the operation that triggered it.

use serde::Serialize;
use std::sync::Arc;

use crate::models::application::{Application, ApplicationDetail, ApplicationStatus, NewApplication};
use crate::services::mail_service::MailService;
use crate::services::notification_service::NotificationService;
use crate::store::{ApplicationFilter, ApplicationRepository, CatalogRepository, Store, StoreError};
use crate::utils::time::Clock;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("This job is not accepting applications")]
    JobNotEligible,

    #[error("You have already applied to this job")]
    AlreadyApplied,

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("A note is required when rejecting an application")]
    MissingRejectionNote,

    #[error("You do not have access to this application")]
    NotOwner,

    #[error("This application can no longer be withdrawn")]
    CannotWithdraw,

    #[error("Application not found")]
    ApplicationNotFound,

    #[error("The candidate has withdrawn this application")]
    Withdrawn,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Who is acting on an application from the hiring side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reviewer {
    Employer(i64),
    Admin,
}

impl Reviewer {
    fn may_review(self, detail: &ApplicationDetail) -> bool {
        match self {
            Reviewer::Admin => true,
            Reviewer::Employer(employer_id) => detail.job.employer_id == employer_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmitApplication {
    pub candidate_id: i64,
    pub job_id: i64,
    pub cover_letter: Option<String>,
    pub resume_snapshot: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: ApplicationStatus,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateApplications {
    pub items: Vec<Application>,
    pub status_counts: Vec<StatusCount>,
}

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    notifications: NotificationService,
    mail: MailService,
}

impl ApplicationService {
    pub fn new(
        store: Arc<dyn Store>,
        clock: Arc<dyn Clock>,
        notifications: NotificationService,
        mail: MailService,
    ) -> Self {
        Self {
            store,
            clock,
            notifications,
            mail,
        }
    }

    pub async fn submit(&self, request: SubmitApplication) -> PipelineResult<Application> {
        let today = self.clock.today();
        let job = self.store.job(request.job_id).await?;
        if !job.is_some_and(|job| job.is_open(today)) {
            return Err(PipelineError::JobNotEligible);
        }

        let new = NewApplication {
            job_id: request.job_id,
            candidate_id: request.candidate_id,
            cover_letter: non_blank(request.cover_letter),
            resume_snapshot: non_blank(request.resume_snapshot),
            applied_at: self.clock.now(),
        };
        let application = match self.store.insert_application(new).await {
            Ok(application) => application,
            Err(StoreError::UniqueViolation(_)) => return Err(PipelineError::AlreadyApplied),
            Err(err) => return Err(err.into()),
        };
        tracing::info!(
            application_id = application.id,
            job_id = application.job_id,
            candidate_id = application.candidate_id,
            "application submitted"
        );

        match self.store.application_detail(application.id).await {
            Ok(Some(detail)) => {
                if let Err(err) = self.mail.send_new_application_to_employer(&detail).await {
                    tracing::warn!(application_id = application.id, error = %err, "new application mail failed");
                }
            }
            Ok(None) => {
                tracing::warn!(application_id = application.id, "application detail missing, mail skipped");
            }
            Err(err) => {
                tracing::warn!(application_id = application.id, error = %err, "could not load application for mail");
            }
        }

        Ok(application)
    }

    /// Moves `applied` to `viewed` and notifies the candidate once. Returns
    /// whether the transition happened; repeated calls are no-ops.
    pub async fn mark_viewed_if_applied(&self, application_id: i64) -> PipelineResult<bool> {
        let Some(updated) = self
            .store
            .transition_if(
                application_id,
                &[ApplicationStatus::Applied],
                ApplicationStatus::Viewed,
                self.clock.now(),
            )
            .await?
        else {
            return Ok(false);
        };

        match self.store.application_detail(updated.id).await? {
            Some(detail) => {
                self.notifications
                    .notify_status(&detail, ApplicationStatus::Viewed, None)
                    .await?;
            }
            None => tracing::warn!(application_id, "viewed application has no detail, notification skipped"),
        }
        tracing::info!(application_id, "application viewed by employer");
        Ok(true)
    }

    /// Loads the review screen for `reviewer`. An employer opening a fresh
    /// application marks it viewed; an admin leaves it untouched.
    pub async fn open_for_review(
        &self,
        application_id: i64,
        reviewer: Reviewer,
    ) -> PipelineResult<ApplicationDetail> {
        let mut detail = self.load_for_reviewer(application_id, reviewer).await?;
        if matches!(reviewer, Reviewer::Employer(_))
            && detail.application.status == ApplicationStatus::Applied
            && self.mark_viewed_if_applied(application_id).await?
        {
            if let Some(application) = self.store.application(application_id).await? {
                detail.application = application;
            }
        }
        Ok(detail)
    }

    pub async fn set_status(
        &self,
        application_id: i64,
        reviewer: Reviewer,
        new_status: &str,
        note: Option<&str>,
    ) -> PipelineResult<Application> {
        let status: ApplicationStatus = new_status
            .parse()
            .map_err(|_| PipelineError::InvalidStatus(new_status.trim().to_string()))?;
        if !status.is_reviewer_assignable() {
            return Err(PipelineError::InvalidStatus(status.to_string()));
        }
        let note = note.map(str::trim).filter(|n| !n.is_empty());
        if status == ApplicationStatus::Rejected && note.is_none() {
            return Err(PipelineError::MissingRejectionNote);
        }

        let mut detail = self.load_for_reviewer(application_id, reviewer).await?;
        if detail.application.status == ApplicationStatus::Withdrawn {
            return Err(PipelineError::Withdrawn);
        }

        // The row exists, so a miss means the candidate withdrew in between.
        let previous = detail.application.status;
        let updated = self
            .store
            .update_status(
                application_id,
                &ApplicationStatus::REVIEWER_ASSIGNABLE,
                status,
                note,
                self.clock.now(),
            )
            .await?
            .ok_or(PipelineError::Withdrawn)?;
        tracing::info!(
            application_id,
            from = %previous,
            to = %status,
            ?reviewer,
            "application status changed"
        );

        detail.application = updated.clone();
        self.notifications.notify_status(&detail, status, note).await?;
        if let Err(err) = self.mail.send_status_update_to_candidate(&detail, note).await {
            tracing::warn!(application_id, error = %err, "status update mail failed");
        }

        Ok(updated)
    }

    pub async fn withdraw(&self, application_id: i64, candidate_id: i64) -> PipelineResult<Application> {
        let application = self
            .store
            .application(application_id)
            .await?
            .ok_or(PipelineError::ApplicationNotFound)?;
        if application.candidate_id != candidate_id {
            return Err(PipelineError::NotOwner);
        }
        if !application.status.can_withdraw() {
            return Err(PipelineError::CannotWithdraw);
        }

        let updated = self
            .store
            .transition_if(
                application_id,
                &ApplicationStatus::WITHDRAWABLE,
                ApplicationStatus::Withdrawn,
                self.clock.now(),
            )
            .await?
            .ok_or(PipelineError::CannotWithdraw)?;
        tracing::info!(application_id, candidate_id, "application withdrawn");

        if let Some(detail) = self.store.application_detail(application_id).await? {
            self.notifications
                .notify_status(&detail, ApplicationStatus::Withdrawn, None)
                .await?;
        }
        Ok(updated)
    }

    pub async fn applications_for_candidate(
        &self,
        candidate_id: i64,
    ) -> PipelineResult<CandidateApplications> {
        let items = self.store.applications_for_candidate(candidate_id).await?;
        let status_counts = ApplicationStatus::ALL
            .into_iter()
            .map(|status| StatusCount {
                status,
                label: status.label(),
                count: items.iter().filter(|a| a.status == status).count(),
            })
            .collect();
        Ok(CandidateApplications {
            items,
            status_counts,
        })
    }

    /// The candidate's own view of one application.
    pub async fn application_for_candidate(
        &self,
        application_id: i64,
        candidate_id: i64,
    ) -> PipelineResult<ApplicationDetail> {
        let detail = self
            .store
            .application_detail(application_id)
            .await?
            .ok_or(PipelineError::ApplicationNotFound)?;
        if detail.application.candidate_id != candidate_id {
            return Err(PipelineError::NotOwner);
        }
        Ok(detail)
    }

    /// Applications on the reviewer's jobs, newest first. Admins see every
    /// employer's applications. Listing never marks anything viewed.
    pub async fn applications_for_review(
        &self,
        reviewer: Reviewer,
        job_id: Option<i64>,
        status: Option<ApplicationStatus>,
    ) -> PipelineResult<Vec<ApplicationDetail>> {
        let employer_id = match reviewer {
            Reviewer::Employer(employer_id) => Some(employer_id),
            Reviewer::Admin => None,
        };
        let items = self
            .store
            .applications_for_review(ApplicationFilter {
                employer_id,
                job_id,
                status,
            })
            .await?;
        Ok(items)
    }

    async fn load_for_reviewer(
        &self,
        application_id: i64,
        reviewer: Reviewer,
    ) -> PipelineResult<ApplicationDetail> {
        let detail = self
            .store
            .application_detail(application_id)
            .await?
            .ok_or(PipelineError::ApplicationNotFound)?;
        if !reviewer.may_review(&detail) {
            return Err(PipelineError::NotOwner);
        }
        Ok(detail)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
