use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};

use super::{
    ApplicationFilter, ApplicationRepository, CatalogRepository, JobViewRepository, NotificationRepository,
    SavedJobRepository, StoreResult, ViewedJob,
};
use crate::models::application::{Application, ApplicationDetail, ApplicationStatus, NewApplication};
use crate::models::candidate::CandidateProfile;
use crate::models::employer::EmployerProfile;
use crate::models::job::{JobRecord, JobStatus};
use crate::models::notification::{NewNotification, Notification};
use crate::models::saved_job::SavedJob;

const APPLICATION_COLUMNS: &str =
    "id, job_id, candidate_id, cover_letter, resume_snapshot, status, decision_note, applied_at, updated_at";
const JOB_COLUMNS: &str = "id, employer_id, title, location, status, deadline, created_at";
const NOTIFICATION_COLUMNS: &str = "id, user_id, title, message, icon_path, read, created_at";
const APPLICATION_DETAIL_SELECT: &str = r#"
    SELECT
        a.id, a.job_id, a.candidate_id, a.cover_letter, a.resume_snapshot,
        a.status, a.decision_note, a.applied_at, a.updated_at,
        j.employer_id, j.title AS job_title, j.location AS job_location,
        j.status AS job_status, j.deadline AS job_deadline, j.created_at AS job_created_at,
        c.user_id AS candidate_user_id, c.full_name AS candidate_full_name,
        c.email AS candidate_email, c.location AS candidate_location,
        c.skills AS candidate_skills, c.experience AS candidate_experience,
        e.user_id AS employer_user_id, e.company_name AS employer_company_name,
        e.contact_email AS employer_contact_email
    FROM applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN candidates c ON c.id = a.candidate_id
    JOIN employers e ON e.id = j.employer_id
"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ApplicationDetailRow {
    id: i64,
    job_id: i64,
    candidate_id: i64,
    cover_letter: Option<String>,
    resume_snapshot: Option<String>,
    #[sqlx(try_from = "String")]
    status: ApplicationStatus,
    decision_note: Option<String>,
    applied_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    employer_id: i64,
    job_title: String,
    job_location: Option<String>,
    #[sqlx(try_from = "String")]
    job_status: JobStatus,
    job_deadline: Option<NaiveDate>,
    job_created_at: DateTime<Utc>,
    candidate_user_id: i64,
    candidate_full_name: String,
    candidate_email: Option<String>,
    candidate_location: Option<String>,
    candidate_skills: Option<String>,
    candidate_experience: Option<String>,
    employer_user_id: i64,
    employer_company_name: String,
    employer_contact_email: Option<String>,
}

impl From<ApplicationDetailRow> for ApplicationDetail {
    fn from(row: ApplicationDetailRow) -> Self {
        Self {
            application: Application {
                id: row.id,
                job_id: row.job_id,
                candidate_id: row.candidate_id,
                cover_letter: row.cover_letter,
                resume_snapshot: row.resume_snapshot,
                status: row.status,
                decision_note: row.decision_note,
                applied_at: row.applied_at,
                updated_at: row.updated_at,
            },
            job: JobRecord {
                id: row.job_id,
                employer_id: row.employer_id,
                title: row.job_title,
                location: row.job_location,
                status: row.job_status,
                deadline: row.job_deadline,
                created_at: row.job_created_at,
            },
            candidate: CandidateProfile {
                id: row.candidate_id,
                user_id: row.candidate_user_id,
                full_name: row.candidate_full_name,
                email: row.candidate_email,
                location: row.candidate_location,
                skills: row.candidate_skills,
                experience: row.candidate_experience,
            },
            employer: EmployerProfile {
                id: row.employer_id,
                user_id: row.employer_user_id,
                company_name: row.employer_company_name,
                contact_email: row.employer_contact_email,
            },
        }
    }
}

#[derive(FromRow)]
struct ViewedJobRow {
    #[sqlx(flatten)]
    job: JobRecord,
    view_count: i64,
}

#[async_trait]
impl CatalogRepository for PgStore {
    async fn job(&self, job_id: i64) -> StoreResult<Option<JobRecord>> {
        let job = sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {} FROM jobs WHERE id = $1",
            JOB_COLUMNS
        ))
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(job)
    }

    async fn candidate(&self, candidate_id: i64) -> StoreResult<Option<CandidateProfile>> {
        let candidate = sqlx::query_as::<_, CandidateProfile>(
            r#"
            SELECT id, user_id, full_name, email, location, skills, experience
            FROM candidates
            WHERE id = $1
            "#,
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(candidate)
    }

    async fn employer(&self, employer_id: i64) -> StoreResult<Option<EmployerProfile>> {
        let employer = sqlx::query_as::<_, EmployerProfile>(
            "SELECT id, user_id, company_name, contact_email FROM employers WHERE id = $1",
        )
        .bind(employer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(employer)
    }

    async fn open_jobs(&self, today: NaiveDate) -> StoreResult<Vec<JobRecord>> {
        let jobs = sqlx::query_as::<_, JobRecord>(&format!(
            r#"
            SELECT {}
            FROM jobs
            WHERE status = 'published' AND (deadline IS NULL OR deadline >= $1)
            ORDER BY created_at DESC, id DESC
            "#,
            JOB_COLUMNS
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(jobs)
    }
}

#[async_trait]
impl ApplicationRepository for PgStore {
    async fn insert_application(&self, new: NewApplication) -> StoreResult<Application> {
        let application = sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (job_id, candidate_id, cover_letter, resume_snapshot, status, applied_at, updated_at)
            VALUES ($1, $2, $3, $4, 'applied', $5, $5)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(new.job_id)
        .bind(new.candidate_id)
        .bind(&new.cover_letter)
        .bind(&new.resume_snapshot)
        .bind(new.applied_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(application)
    }

    async fn application(&self, id: i64) -> StoreResult<Option<Application>> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }

    async fn application_detail(&self, id: i64) -> StoreResult<Option<ApplicationDetail>> {
        let row = sqlx::query_as::<_, ApplicationDetailRow>(&format!(
            "{} WHERE a.id = $1",
            APPLICATION_DETAIL_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ApplicationDetail::from))
    }

    async fn applications_for_review(
        &self,
        filter: ApplicationFilter,
    ) -> StoreResult<Vec<ApplicationDetail>> {
        let rows = sqlx::query_as::<_, ApplicationDetailRow>(&format!(
            r#"
            {}
            WHERE ($1::BIGINT IS NULL OR j.employer_id = $1)
              AND ($2::BIGINT IS NULL OR a.job_id = $2)
              AND ($3::TEXT IS NULL OR a.status = $3)
            ORDER BY a.applied_at DESC, a.id DESC
            "#,
            APPLICATION_DETAIL_SELECT
        ))
        .bind(filter.employer_id)
        .bind(filter.job_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ApplicationDetail::from).collect())
    }

    async fn applications_for_candidate(&self, candidate_id: i64) -> StoreResult<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(&format!(
            "SELECT {} FROM applications WHERE candidate_id = $1 ORDER BY applied_at DESC, id DESC",
            APPLICATION_COLUMNS
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    async fn update_status(
        &self,
        id: i64,
        from: &[ApplicationStatus],
        status: ApplicationStatus,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Application>> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let application = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET status = $2, decision_note = $3, updated_at = $4
            WHERE id = $1 AND status = ANY($5)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .bind(status.as_str())
        .bind(note)
        .bind(now)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }

    async fn transition_if(
        &self,
        id: i64,
        from: &[ApplicationStatus],
        to: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<Application>> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();
        let application = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = ANY($4)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(id)
        .bind(to.as_str())
        .bind(now)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;
        Ok(application)
    }
}

#[async_trait]
impl NotificationRepository for PgStore {
    async fn insert_notification(
        &self,
        new: NewNotification,
        now: DateTime<Utc>,
    ) -> StoreResult<Notification> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (user_id, title, message, icon_path, read, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.message)
        .bind(&new.icon_path)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(notification)
    }

    async fn count_unread(&self, user_id: i64) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn recent_notifications(&self, user_id: i64, limit: i64) -> StoreResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    async fn mark_all_read(&self, user_id: i64) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl JobViewRepository for PgStore {
    async fn insert_view_unless_recent(
        &self,
        job_id: i64,
        viewer_ip: &str,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_views (job_id, viewer_ip, viewed_at)
            SELECT $1, $2, $4
            WHERE NOT EXISTS (
                SELECT 1 FROM job_views
                WHERE job_id = $1 AND viewer_ip = $2 AND viewed_at > $3
            )
            "#,
        )
        .bind(job_id)
        .bind(viewer_ip)
        .bind(since)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn count_views(&self, job_id: i64) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_views WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn most_viewed_jobs(&self, today: NaiveDate, limit: i64) -> StoreResult<Vec<ViewedJob>> {
        let rows = sqlx::query_as::<_, ViewedJobRow>(
            r#"
            SELECT j.id, j.employer_id, j.title, j.location, j.status, j.deadline, j.created_at,
                   COUNT(v.id) AS view_count
            FROM jobs j
            LEFT JOIN job_views v ON v.job_id = j.id
            WHERE j.status = 'published' AND (j.deadline IS NULL OR j.deadline >= $1)
            GROUP BY j.id
            ORDER BY view_count DESC, j.created_at DESC, j.id DESC
            LIMIT $2
            "#,
        )
        .bind(today)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| ViewedJob {
                job: row.job,
                view_count: row.view_count,
            })
            .collect())
    }
}

#[async_trait]
impl SavedJobRepository for PgStore {
    async fn saved_job(&self, candidate_id: i64, job_id: i64) -> StoreResult<Option<SavedJob>> {
        let saved = sqlx::query_as::<_, SavedJob>(
            r#"
            SELECT id, candidate_id, job_id, saved_at
            FROM saved_jobs
            WHERE candidate_id = $1 AND job_id = $2
            "#,
        )
        .bind(candidate_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn insert_saved_job(
        &self,
        candidate_id: i64,
        job_id: i64,
        now: DateTime<Utc>,
    ) -> StoreResult<SavedJob> {
        let saved = sqlx::query_as::<_, SavedJob>(
            r#"
            INSERT INTO saved_jobs (candidate_id, job_id, saved_at)
            VALUES ($1, $2, $3)
            RETURNING id, candidate_id, job_id, saved_at
            "#,
        )
        .bind(candidate_id)
        .bind(job_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(saved)
    }

    async fn delete_saved_job(&self, candidate_id: i64, job_id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM saved_jobs WHERE candidate_id = $1 AND job_id = $2")
            .bind(candidate_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn saved_job_ids(&self, candidate_id: i64) -> StoreResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT job_id FROM saved_jobs WHERE candidate_id = $1 ORDER BY saved_at DESC, id DESC",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
