use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedJob {
    pub id: i64,
    pub candidate_id: i64,
    pub job_id: i64,
    pub saved_at: DateTime<Utc>,
}
