use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Error, Result};
use crate::services::application_service::Reviewer;
use crate::AppState;

pub const ROLE_CANDIDATE: &str = "candidate";
pub const ROLE_EMPLOYER: &str = "employer";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Option<String>,
    pub candidate_id: Option<i64>,
    pub employer_id: Option<i64>,
}

impl Claims {
    fn has_role(&self, role: &str) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| Error::Unauthorized("token subject is not a user id".to_string()))
    }

    /// Candidate profile of the caller, if the caller is a candidate.
    pub fn candidate_profile(&self) -> Option<i64> {
        if self.has_role(ROLE_CANDIDATE) {
            self.candidate_id
        } else {
            None
        }
    }

    pub fn require_candidate(&self) -> Result<i64> {
        self.candidate_profile()
            .ok_or_else(|| Error::Forbidden("candidate account required".to_string()))
    }

    pub fn reviewer(&self) -> Result<Reviewer> {
        if self.has_role(ROLE_ADMIN) {
            return Ok(Reviewer::Admin);
        }
        match self.employer_id {
            Some(employer_id) if self.has_role(ROLE_EMPLOYER) => Ok(Reviewer::Employer(employer_id)),
            _ => Err(Error::Forbidden("employer or admin account required".to_string())),
        }
    }
}

pub async fn require_bearer_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"missing_authorization"})),
        )
            .into_response();
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"bad_authorization"})),
        )
            .into_response();
    };
    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error":"unsupported_scheme"})),
        )
            .into_response();
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &validation,
    ) {
        Ok(data) => {
            req.extensions_mut().insert(data.claims);
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(error = %err, "rejected bearer token");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error":"invalid_token"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: &str, candidate_id: Option<i64>, employer_id: Option<i64>) -> Claims {
        Claims {
            sub: "42".into(),
            exp: usize::MAX,
            role: Some(role.into()),
            candidate_id,
            employer_id,
        }
    }

    #[test]
    fn reviewer_from_role() {
        assert_eq!(claims("Admin", None, None).reviewer().unwrap(), Reviewer::Admin);
        assert_eq!(
            claims("employer", None, Some(3)).reviewer().unwrap(),
            Reviewer::Employer(3)
        );
        assert!(claims("employer", None, None).reviewer().is_err());
        assert!(claims("candidate", Some(1), Some(3)).reviewer().is_err());
    }

    #[test]
    fn candidate_requires_role_and_profile() {
        assert_eq!(claims("candidate", Some(7), None).require_candidate().unwrap(), 7);
        assert!(claims("employer", Some(7), None).require_candidate().is_err());
        assert_eq!(claims("candidate", Some(7), None).user_id().unwrap(), 42);
    }
}
