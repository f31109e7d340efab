use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployerProfile {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub contact_email: Option<String>,
}
