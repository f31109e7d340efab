use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown job status: {0}")]
pub struct UnknownJobStatus(pub String);

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Published => "published",
            JobStatus::Closed => "closed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = UnknownJobStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(JobStatus::Draft),
            "published" => Ok(JobStatus::Published),
            "closed" => Ok(JobStatus::Closed),
            _ => Err(UnknownJobStatus(raw.to_string())),
        }
    }
}

impl TryFrom<String> for JobStatus {
    type Error = UnknownJobStatus;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

/// Read-only projection of a job posting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRecord {
    pub id: i64,
    pub employer_id: i64,
    pub title: String,
    pub location: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    /// Published and not past its deadline. The deadline day itself is still open.
    pub fn is_open(&self, today: NaiveDate) -> bool {
        self.status == JobStatus::Published && self.deadline.map_or(true, |d| d >= today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus, deadline: Option<NaiveDate>) -> JobRecord {
        JobRecord {
            id: 1,
            employer_id: 1,
            title: "Backend engineer".into(),
            location: Some("Hanoi".into()),
            status,
            deadline,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn open_jobs_are_published_and_unexpired() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        assert!(job(JobStatus::Published, None).is_open(today));
        assert!(job(JobStatus::Published, Some(today)).is_open(today));
        assert!(!job(JobStatus::Published, today.pred_opt()).is_open(today));
        assert!(!job(JobStatus::Draft, None).is_open(today));
        assert!(!job(JobStatus::Closed, None).is_open(today));
    }
}
