use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{
    ApplicationFilter, ApplicationRepository, CatalogRepository, JobViewRepository,
    NotificationRepository, SavedJobRepository, StoreError, StoreResult, ViewedJob,
};
use crate::models::application::{Application, ApplicationDetail, ApplicationStatus, NewApplication};
use crate::models::candidate::CandidateProfile;
use crate::models::employer::EmployerProfile;
use crate::models::job::JobRecord;
use crate::models::job_view::JobView;
use crate::models::notification::{NewNotification, Notification};
use crate::models::saved_job::SavedJob;

#[derive(Default)]
struct Tables {
    employers: HashMap<i64, EmployerProfile>,
    candidates: HashMap<i64, CandidateProfile>,
    jobs: HashMap<i64, JobRecord>,
    applications: Vec<Application>,
    notifications: Vec<Notification>,
    job_views: Vec<JobView>,
    saved_jobs: Vec<SavedJob>,
    last_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn open_jobs(&self, today: NaiveDate) -> Vec<JobRecord> {
        let mut jobs: Vec<JobRecord> = self
            .jobs
            .values()
            .filter(|job| job.is_open(today))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs
    }

    fn detail_of(&self, application: &Application) -> Option<ApplicationDetail> {
        let job = self.jobs.get(&application.job_id)?;
        let candidate = self.candidates.get(&application.candidate_id)?;
        let employer = self.employers.get(&job.employer_id)?;
        Some(ApplicationDetail {
            application: application.clone(),
            job: job.clone(),
            candidate: candidate.clone(),
            employer: employer.clone(),
        })
    }
}

/// Process-local store with the same uniqueness rules as the Postgres schema.
/// All operations run under a single lock.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_employer(&self, employer: EmployerProfile) {
        self.tables.lock().await.employers.insert(employer.id, employer);
    }

    pub async fn insert_candidate(&self, candidate: CandidateProfile) {
        self.tables.lock().await.candidates.insert(candidate.id, candidate);
    }

    pub async fn insert_job(&self, job: JobRecord) {
        self.tables.lock().await.jobs.insert(job.id, job);
    }

    pub async fn notifications_for(&self, user_id: i64) -> Vec<Notification> {
        self.tables
            .lock()
            .await
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn application_count(&self) -> usize {
        self.tables.lock().await.applications.len()
    }
}

#[async_trait]
impl CatalogRepository for MemoryStore {
    async fn job(&self, job_id: i64) -> StoreResult<Option<JobRecord>> {
        Ok(self.tables.lock().await.jobs.get(&job_id).cloned())
    }

    async fn candidate(&self, candidate_id: i64) -> StoreResult<Option<CandidateProfile>> {
        Ok(self.tables.lock().await.candidates.get(&candidate_id).cloned())
    }

    async fn employer(&self, employer_id: i64) -> StoreResult<Option<EmployerProfile>> {
        Ok(self.tables.lock().await.employers.get(&employer_id).cloned())
    }

    async fn open_jobs(&self, today: NaiveDate) -> StoreResult<Vec<JobRecord>> {
        Ok(self.tables.lock().await.open_jobs(today))
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn insert_application(&self, new: NewApplication) -> StoreResult<Application> {
        let mut tables = self.tables.lock().await;
        let duplicate = tables
            .applications
            .iter()
            .any(|a| a.job_id == new.job_id && a.candidate_id == new.candidate_id);
        if duplicate {
            return Err(StoreError::UniqueViolation(
                "applications_job_id_candidate_id_key".to_string(),
            ));
        }

        let application = Application {
            id: tables.next_id(),
            job_id: new.job_id,
            candidate_id: new.candidate_id,
            cover_letter: new.cover_letter,
            resume_snapshot: new.resume_snapshot,
            status: ApplicationStatus::Applied,
            decision_note: None,
            applied_at: new.applied_at,
            updated_at: new.applied_at,
        };
        tables.applications.push(application.clone());
        Ok(application)
    }

    async fn application(&self, id: i64) -> StoreResult<Option<Application>> {
        let tables = self.tables.lock().await;
        Ok(tables.applications.iter().find(|a| a.id == id).cloned())
    }

    async fn application_detail(&self, id: i64) -> StoreResult<Option<ApplicationDetail>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.id == id)
            .and_then(|application| tables.detail_of(application)))
    }

    async fn applications_for_candidate(&self, candidate_id: i64) -> StoreResult<Vec<Application>> {
        let tables = self.tables.lock().await;
        let mut applications: Vec<Application> = tables
            .applications
            .iter()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.cmp(&a.id)));
        Ok(applications)
    }

    async fn applications_for_review(
        &self,
        filter: ApplicationFilter,
    ) -> StoreResult<Vec<ApplicationDetail>> {
        let tables = self.tables.lock().await;
        let mut details: Vec<ApplicationDetail> = tables
            .applications
            .iter()
            .filter(|a| filter.job_id.map_or(true, |job_id| a.job_id == job_id))
            .filter(|a| filter.status.map_or(true, |status| a.status == status))
            .filter_map(|a| tables.detail_of(a))
            .filter(|d| {
                filter
                    .employer_id
                    .map_or(true, |employer_id| d.job.employer_id == employer_id)
            })
            .collect();
        details.sort_by(|a, b| {
            b.application
                .applied_at
                .cmp(&a.application.applied_at)
                .then(b.application.id.cmp(&a.application.id))
        });
        Ok(details)
    }

    async fn update_status(
        &self,
        id: i64,
        from: &[ApplicationStatus],
        status: ApplicationStatus,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Application>> {
        let mut tables = self.tables.lock().await;
        let Some(application) = tables
            .applications
            .iter_mut()
            .find(|a| a.id == id && from.contains(&a.status))
        else {
            return Ok(None);
        };
        application.status = status;
        application.decision_note = note.map(str::to_string);
        application.updated_at = now;
        Ok(Some(application.clone()))
    }

    async fn transition_if(
        &self,
        id: i64,
        from: &[ApplicationStatus],
        to: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Application>> {
        let mut tables = self.tables.lock().await;
        let Some(application) = tables
            .applications
            .iter_mut()
            .find(|a| a.id == id && from.contains(&a.status))
        else {
            return Ok(None);
        };
        application.status = to;
        application.updated_at = now;
        Ok(Some(application.clone()))
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert_notification(
        &self,
        new: NewNotification,
        now: DateTime<Utc>,
    ) -> StoreResult<Notification> {
        let mut tables = self.tables.lock().await;
        let notification = Notification {
            id: tables.next_id(),
            user_id: new.user_id,
            title: new.title,
            message: new.message,
            icon_path: new.icon_path,
            read: false,
            created_at: now,
        };
        tables.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn count_unread(&self, user_id: i64) -> StoreResult<i64> {
        let tables = self.tables.lock().await;
        let count = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count();
        Ok(count as i64)
    }

    async fn recent_notifications(&self, user_id: i64, limit: i64) -> StoreResult<Vec<Notification>> {
        let tables = self.tables.lock().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        notifications.truncate(limit.max(0) as usize);
        Ok(notifications)
    }

    async fn mark_all_read(&self, user_id: i64) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut affected = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            affected += 1;
        }
        Ok(affected)
    }
}

#[async_trait]
impl JobViewRepository for MemoryStore {
    async fn insert_view_unless_recent(
        &self,
        job_id: i64,
        viewer_ip: &str,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let recent = tables
            .job_views
            .iter()
            .any(|v| v.job_id == job_id && v.viewer_ip == viewer_ip && v.viewed_at > since);
        if recent {
            return Ok(false);
        }
        let view = JobView {
            id: tables.next_id(),
            job_id,
            viewer_ip: viewer_ip.to_string(),
            viewed_at: now,
        };
        tables.job_views.push(view);
        Ok(true)
    }

    async fn count_views(&self, job_id: i64) -> StoreResult<i64> {
        let tables = self.tables.lock().await;
        Ok(tables.job_views.iter().filter(|v| v.job_id == job_id).count() as i64)
    }

    async fn most_viewed_jobs(&self, today: NaiveDate, limit: i64) -> StoreResult<Vec<ViewedJob>> {
        let tables = self.tables.lock().await;
        let mut ranked: Vec<ViewedJob> = tables
            .open_jobs(today)
            .into_iter()
            .map(|job| {
                let view_count = tables.job_views.iter().filter(|v| v.job_id == job.id).count() as i64;
                ViewedJob { job, view_count }
            })
            .collect();
        // open_jobs is already newest first; a stable sort keeps that on ties.
        ranked.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }
}

#[async_trait]
impl SavedJobRepository for MemoryStore {
    async fn saved_job(&self, candidate_id: i64, job_id: i64) -> StoreResult<Option<SavedJob>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .saved_jobs
            .iter()
            .find(|s| s.candidate_id == candidate_id && s.job_id == job_id)
            .cloned())
    }

    async fn insert_saved_job(
        &self,
        candidate_id: i64,
        job_id: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<SavedJob> {
        let mut tables = self.tables.lock().await;
        if tables
            .saved_jobs
            .iter()
            .any(|s| s.candidate_id == candidate_id && s.job_id == job_id)
        {
            return Err(StoreError::UniqueViolation(
                "saved_jobs_candidate_id_job_id_key".to_string(),
            ));
        }
        let saved = SavedJob {
            id: tables.next_id(),
            candidate_id,
            job_id,
            saved_at: now,
        };
        tables.saved_jobs.push(saved.clone());
        Ok(saved)
    }

    async fn delete_saved_job(&self, candidate_id: i64, job_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.saved_jobs.len();
        tables
            .saved_jobs
            .retain(|s| !(s.candidate_id == candidate_id && s.job_id == job_id));
        Ok(tables.saved_jobs.len() < before)
    }

    async fn saved_job_ids(&self, candidate_id: i64) -> StoreResult<Vec<i64>> {
        let tables = self.tables.lock().await;
        let mut saved: Vec<&SavedJob> = tables
            .saved_jobs
            .iter()
            .filter(|s| s.candidate_id == candidate_id)
            .collect();
        saved.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then(b.id.cmp(&a.id)));
        Ok(saved.into_iter().map(|s| s.job_id).collect())
    }
}
