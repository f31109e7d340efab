use std::sync::Arc;

use crate::store::{SavedJobRepository, StoreError, StoreResult};
use crate::utils::time::Clock;

#[derive(Clone)]
pub struct SavedJobService {
    store: Arc<dyn SavedJobRepository>,
    clock: Arc<dyn Clock>,
}

impl SavedJobService {
    pub fn new(store: Arc<dyn SavedJobRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Flips the saved state of a job for a candidate and returns the new
    /// state: `true` when the job is now saved.
    pub async fn toggle(&self, candidate_id: i64, job_id: i64) -> StoreResult<bool> {
        if self.store.delete_saved_job(candidate_id, job_id).await? {
            tracing::debug!(candidate_id, job_id, "job unsaved");
            return Ok(false);
        }

        match self
            .store
            .insert_saved_job(candidate_id, job_id, self.clock.now())
            .await
        {
            Ok(_) => {
                tracing::debug!(candidate_id, job_id, "job saved");
                Ok(true)
            }
            // A concurrent toggle inserted the same pair first.
            Err(StoreError::UniqueViolation(_)) => Ok(true),
            Err(err) => Err(err),
        }
    }

    pub async fn saved_job_ids(&self, candidate_id: i64) -> StoreResult<Vec<i64>> {
        self.store.saved_job_ids(candidate_id).await
    }

    pub async fn count(&self, candidate_id: i64) -> StoreResult<usize> {
        Ok(self.store.saved_job_ids(candidate_id).await?.len())
    }
}
