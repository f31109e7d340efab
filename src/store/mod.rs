//! Repository seams between the services and persistence.
//!
//! Each trait declares up front what a call returns, including joined data
//! (see [`ApplicationRepository::application_detail`]); nothing is loaded
//! lazily behind the caller's back. Uniqueness of `(candidate, job)` pairs is
//! a storage concern: implementations report it as
//! [`StoreError::UniqueViolation`] and the services turn that into a domain
//! outcome.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::models::application::{Application, ApplicationDetail, ApplicationStatus, NewApplication};
use crate::models::candidate::CandidateProfile;
use crate::models::employer::EmployerProfile;
use crate::models::job::JobRecord;
use crate::models::notification::{NewNotification, Notification};
use crate::models::saved_job::SavedJob;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        match err {
            sqlx::Error::ColumnDecode { index, source } => {
                StoreError::Corrupt(format!("column {}: {}", index, source))
            }
            other => StoreError::Database(other),
        }
    }
}

/// Narrows the review listing. Absent fields do not filter; an absent
/// `employer_id` spans every employer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationFilter {
    pub employer_id: Option<i64>,
    pub job_id: Option<i64>,
    pub status: Option<ApplicationStatus>,
}

/// A job together with its lifetime view count.
#[derive(Debug, Clone)]
pub struct ViewedJob {
    pub job: JobRecord,
    pub view_count: i64,
}

/// Read access to entities owned by other parts of the platform.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn job(&self, job_id: i64) -> StoreResult<Option<JobRecord>>;

    async fn candidate(&self, candidate_id: i64) -> StoreResult<Option<CandidateProfile>>;

    async fn employer(&self, employer_id: i64) -> StoreResult<Option<EmployerProfile>>;

    /// Published jobs whose deadline is absent or not before `today`,
    /// newest first.
    async fn open_jobs(&self, today: NaiveDate) -> StoreResult<Vec<JobRecord>>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Fails with [`StoreError::UniqueViolation`] when the candidate already
    /// has an application for the job.
    async fn insert_application(&self, new: NewApplication) -> StoreResult<Application>;

    async fn application(&self, id: i64) -> StoreResult<Option<Application>>;

    async fn application_detail(&self, id: i64) -> StoreResult<Option<ApplicationDetail>>;

    async fn applications_for_candidate(&self, candidate_id: i64) -> StoreResult<Vec<Application>>;

    /// Newest first, with job, candidate and employer joined in.
    async fn applications_for_review(
        &self,
        filter: ApplicationFilter,
    ) -> StoreResult<Vec<ApplicationDetail>>;

    /// Writes `status` and the decision note only if the current status is
    /// one of `from`. The note always replaces the stored one, so `None`
    /// clears it. Returns `None` when nothing matched.
    async fn update_status(
        &self,
        id: i64,
        from: &[ApplicationStatus],
        status: ApplicationStatus,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Application>>;

    /// Moves the application to `to` only if its current status is one of
    /// `from`. Returns the updated row, or `None` when nothing matched.
    async fn transition_if(
        &self,
        id: i64,
        from: &[ApplicationStatus],
        to: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Application>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notification(
        &self,
        new: NewNotification,
        now: DateTime<Utc>,
    ) -> StoreResult<Notification>;

    async fn count_unread(&self, user_id: i64) -> StoreResult<i64>;

    /// Newest first.
    async fn recent_notifications(&self, user_id: i64, limit: i64) -> StoreResult<Vec<Notification>>;

    async fn mark_all_read(&self, user_id: i64) -> StoreResult<u64>;
}

#[async_trait]
pub trait JobViewRepository: Send + Sync {
    /// Inserts a view unless the same IP already viewed the job after
    /// `since`. Returns whether a row was written.
    async fn insert_view_unless_recent(
        &self,
        job_id: i64,
        viewer_ip: &str,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;

    async fn count_views(&self, job_id: i64) -> StoreResult<i64>;

    /// Open jobs ranked by lifetime view count, newest first on ties.
    async fn most_viewed_jobs(&self, today: NaiveDate, limit: i64) -> StoreResult<Vec<ViewedJob>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavedJobRepository: Send + Sync {
    async fn saved_job(&self, candidate_id: i64, job_id: i64) -> StoreResult<Option<SavedJob>>;

    /// Fails with [`StoreError::UniqueViolation`] when the pair already exists.
    async fn insert_saved_job(
        &self,
        candidate_id: i64,
        job_id: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<SavedJob>;

    async fn delete_saved_job(&self, candidate_id: i64, job_id: i64) -> StoreResult<bool>;

    /// Newest save first.
    async fn saved_job_ids(&self, candidate_id: i64) -> StoreResult<Vec<i64>>;
}

/// Everything the application needs from storage.
pub trait Store:
    CatalogRepository + ApplicationRepository + NotificationRepository + JobViewRepository + SavedJobRepository
{
}

impl<T> Store for T where
    T: CatalogRepository
        + ApplicationRepository
        + NotificationRepository
        + JobViewRepository
        + SavedJobRepository
{
}
