use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::models::candidate::CandidateProfile;
use crate::models::employer::EmployerProfile;
use crate::models::job::JobRecord;

/// Lifecycle of an application. This is the only place the status order,
/// labels and badges are defined; everything else looks them up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Viewed,
    Shortlisted,
    Rejected,
    Hired,
    Withdrawn,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown application status: {0}")]
pub struct UnknownStatus(pub String);

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Viewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Viewed => "viewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Viewed => "Viewed by employer",
            ApplicationStatus::Shortlisted => "Shortlisted for interview",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn badge(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "secondary",
            ApplicationStatus::Viewed => "info",
            ApplicationStatus::Shortlisted => "warning",
            ApplicationStatus::Rejected => "danger",
            ApplicationStatus::Hired => "success",
            ApplicationStatus::Withdrawn => "dark",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "The candidate submitted the application and awaits review",
            ApplicationStatus::Viewed => "The employer has opened the application",
            ApplicationStatus::Shortlisted => "The candidate is on the interview shortlist",
            ApplicationStatus::Rejected => "The application was declined with a note to the candidate",
            ApplicationStatus::Hired => "The candidate accepted an offer",
            ApplicationStatus::Withdrawn => "The candidate withdrew the application",
        }
    }

    /// Position on the candidate-facing progress bar (applied → viewed →
    /// shortlisted → hired). Off-track statuses have no stage.
    pub fn stage(self) -> Option<u8> {
        match self {
            ApplicationStatus::Applied => Some(0),
            ApplicationStatus::Viewed => Some(1),
            ApplicationStatus::Shortlisted => Some(2),
            ApplicationStatus::Hired => Some(3),
            ApplicationStatus::Rejected | ApplicationStatus::Withdrawn => None,
        }
    }

    /// Statuses a reviewer may set directly. `withdrawn` is candidate-only,
    /// and an application in any of these statuses is still open to review.
    pub const REVIEWER_ASSIGNABLE: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Viewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
    ];

    /// Statuses the candidate may still withdraw from.
    pub const WITHDRAWABLE: [ApplicationStatus; 3] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Viewed,
        ApplicationStatus::Shortlisted,
    ];

    pub fn is_reviewer_assignable(self) -> bool {
        Self::REVIEWER_ASSIGNABLE.contains(&self)
    }

    pub fn can_withdraw(self) -> bool {
        Self::WITHDRAWABLE.contains(&self)
    }

    /// Title and icon key of the notification sent to the candidate when the
    /// application enters this status.
    pub fn notice(self) -> (&'static str, &'static str) {
        match self {
            ApplicationStatus::Viewed => ("Application viewed", "eye"),
            ApplicationStatus::Shortlisted => ("Interview invitation", "calendar-check"),
            ApplicationStatus::Rejected => ("Application not selected", "x-mark"),
            ApplicationStatus::Hired => ("Congratulations, you got the job", "trophy"),
            ApplicationStatus::Withdrawn => ("Application withdrawn", "circle-minus"),
            ApplicationStatus::Applied => ("Application updated", "briefcase"),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = UnknownStatus;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub candidate_id: i64,
    pub cover_letter: Option<String>,
    pub resume_snapshot: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ApplicationStatus,
    pub decision_note: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub job_id: i64,
    pub candidate_id: i64,
    pub cover_letter: Option<String>,
    pub resume_snapshot: Option<String>,
    pub applied_at: DateTime<Utc>,
}

/// An application together with everything the review screen and the
/// notification/mail side effects need, fetched in one go.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    pub application: Application,
    pub job: JobRecord,
    pub candidate: CandidateProfile,
    pub employer: EmployerProfile,
}
