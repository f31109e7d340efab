use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobView {
    pub id: i64,
    pub job_id: i64,
    pub viewer_ip: String,
    pub viewed_at: DateTime<Utc>,
}
