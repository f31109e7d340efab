use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::profile_parser::{self, ExperienceEntry, ParsedField};

/// Read-only projection of a candidate profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateProfile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub email: Option<String>,
    pub location: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
}

impl CandidateProfile {
    pub fn parsed_skills(&self) -> ParsedField<Vec<String>> {
        profile_parser::parse_skills(self.skills.as_deref().unwrap_or_default())
    }

    pub fn parsed_experience(&self) -> ParsedField<Vec<ExperienceEntry>> {
        profile_parser::parse_experience(self.experience.as_deref().unwrap_or_default())
    }
}
