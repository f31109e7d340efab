//! Job recommendations for a candidate.
//!
//! Scoring is a pure function over the open catalogue; the engine around it
//! only loads inputs and falls back to the popularity listing when there is
//! nothing personal to rank.

use serde::Serialize;
use std::sync::Arc;

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRecord;
use crate::store::{CatalogRepository, JobViewRepository, Store, StoreResult};
use crate::utils::time::Clock;

pub const LOCATION_MATCH_POINTS: u32 = 5;
const NEUTRAL_SCORE: u8 = 50;
const MIN_SCORE: u8 = 5;
const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Personalized,
    MostViewed,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    pub job: JobRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_label: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub source: RecommendationSource,
    pub items: Vec<RankedJob>,
}

impl Recommendation {
    fn empty(source: RecommendationSource) -> Self {
        Self {
            source,
            items: Vec::new(),
        }
    }
}

/// Case-insensitive substring match in either direction. Blank locations
/// never match.
pub fn location_matches(candidate: Option<&str>, job: Option<&str>) -> bool {
    let (Some(candidate), Some(job)) = (candidate, job) else {
        return false;
    };
    let candidate = candidate.trim().to_lowercase();
    let job = job.trim().to_lowercase();
    if candidate.is_empty() || job.is_empty() {
        return false;
    }
    candidate.contains(&job) || job.contains(&candidate)
}

pub fn raw_score(candidate: &CandidateProfile, job: &JobRecord) -> u32 {
    if location_matches(candidate.location.as_deref(), job.location.as_deref()) {
        LOCATION_MATCH_POINTS
    } else {
        0
    }
}

pub fn normalize(raw: u32, max_raw: u32) -> u8 {
    let score = if max_raw == 0 {
        NEUTRAL_SCORE as f64
    } else {
        (raw as f64 / max_raw as f64 * 100.0).round()
    };
    score.clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8
}

pub fn match_label(score: u8) -> &'static str {
    if score >= 80 {
        "highly relevant"
    } else if score >= 60 {
        "relevant"
    } else {
        "for reference"
    }
}

/// Ranks `jobs` for `candidate`: raw score first, newest posting on ties.
pub fn rank(candidate: &CandidateProfile, jobs: Vec<JobRecord>, limit: usize) -> Vec<RankedJob> {
    let mut scored: Vec<(u32, JobRecord)> = jobs
        .into_iter()
        .map(|job| (raw_score(candidate, &job), job))
        .collect();
    scored.sort_by(|(a_score, a), (b_score, b)| {
        b_score
            .cmp(a_score)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });
    scored.truncate(limit);

    let max_raw = scored.iter().map(|(raw, _)| *raw).max().unwrap_or(0);
    scored
        .into_iter()
        .map(|(raw, job)| {
            let score = normalize(raw, max_raw);
            RankedJob {
                job,
                view_count: None,
                match_score: Some(score),
                match_label: Some(match_label(score)),
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Never fails: storage problems degrade to the popularity listing, and
    /// if that fails too the result is empty.
    pub async fn recommend(&self, candidate_id: Option<i64>, limit: usize) -> Recommendation {
        if limit == 0 {
            return Recommendation::empty(RecommendationSource::Personalized);
        }

        match self.personalized(candidate_id, limit).await {
            Ok(Some(items)) if !items.is_empty() => {
                return Recommendation {
                    source: RecommendationSource::Personalized,
                    items,
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, ?candidate_id, "personalized recommendation failed, using most viewed");
            }
        }

        self.most_viewed(limit).await
    }

    async fn personalized(
        &self,
        candidate_id: Option<i64>,
        limit: usize,
    ) -> StoreResult<Option<Vec<RankedJob>>> {
        let Some(candidate_id) = candidate_id else {
            return Ok(None);
        };
        let Some(candidate) = self.store.candidate(candidate_id).await? else {
            return Ok(None);
        };
        let jobs = self.store.open_jobs(self.clock.today()).await?;
        Ok(Some(rank(&candidate, jobs, limit)))
    }

    pub async fn most_viewed(&self, limit: usize) -> Recommendation {
        if limit == 0 {
            return Recommendation::empty(RecommendationSource::MostViewed);
        }
        match self
            .store
            .most_viewed_jobs(self.clock.today(), limit as i64)
            .await
        {
            Ok(viewed) => Recommendation {
                source: RecommendationSource::MostViewed,
                items: viewed
                    .into_iter()
                    .map(|v| RankedJob {
                        job: v.job,
                        view_count: Some(v.view_count),
                        match_score: None,
                        match_label: None,
                    })
                    .collect(),
            },
            Err(err) => {
                tracing::error!(error = %err, "most viewed listing failed");
                Recommendation::empty(RecommendationSource::MostViewed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobStatus;
    use chrono::{Duration, TimeZone, Utc};

    fn candidate(location: Option<&str>) -> CandidateProfile {
        CandidateProfile {
            id: 1,
            user_id: 10,
            full_name: "Minh".into(),
            email: None,
            location: location.map(Into::into),
            skills: None,
            experience: None,
        }
    }

    fn job(id: i64, location: Option<&str>, age_days: i64) -> JobRecord {
        JobRecord {
            id,
            employer_id: 1,
            title: format!("Job {}", id),
            location: location.map(Into::into),
            status: JobStatus::Published,
            deadline: None,
            created_at: Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap() - Duration::days(age_days),
        }
    }

    #[test]
    fn location_match_is_bidirectional_and_case_insensitive() {
        assert!(location_matches(Some("Ho Chi Minh City"), Some("ho chi minh")));
        assert!(location_matches(Some("hanoi"), Some("Hanoi, Vietnam")));
        assert!(!location_matches(Some("Hanoi"), Some("Hue")));
        assert!(!location_matches(Some(" "), Some("Hue")));
        assert!(!location_matches(None, Some("Hue")));
    }

    #[test]
    fn normalization_bounds() {
        assert_eq!(normalize(5, 5), 100);
        assert_eq!(normalize(0, 5), 5);
        assert_eq!(normalize(0, 0), 50);
        assert_eq!(match_label(100), "highly relevant");
        assert_eq!(match_label(60), "relevant");
        assert_eq!(match_label(50), "for reference");
    }

    #[test]
    fn matching_jobs_rank_first_then_newest() {
        let jobs = vec![
            job(1, Some("Hue"), 0),
            job(2, Some("Hanoi"), 5),
            job(3, Some("Hanoi"), 1),
            job(4, None, 2),
        ];
        let ranked = rank(&candidate(Some("hanoi")), jobs, 3);
        let ids: Vec<i64> = ranked.iter().map(|r| r.job.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(ranked[0].match_score, Some(100));
        assert_eq!(ranked[0].match_label, Some("highly relevant"));
        assert_eq!(ranked[2].match_score, Some(5));
        assert_eq!(ranked[2].match_label, Some("for reference"));
    }

    #[test]
    fn no_matches_gives_neutral_scores_by_recency() {
        let jobs = vec![job(1, Some("Hue"), 3), job(2, None, 0)];
        let ranked = rank(&candidate(None), jobs, 10);
        assert_eq!(ranked.iter().map(|r| r.job.id).collect::<Vec<_>>(), vec![2, 1]);
        assert!(ranked.iter().all(|r| r.match_score == Some(50)));
    }
}
