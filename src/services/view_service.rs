use chrono::Duration;
use std::sync::Arc;

use crate::store::{JobViewRepository, Store, StoreResult, ViewedJob};
use crate::utils::time::Clock;

/// Deduplicated per-job view counter.
#[derive(Clone)]
pub struct ViewService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    window: Duration,
}

impl ViewService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, window: Duration) -> Self {
        Self {
            store,
            clock,
            window,
        }
    }

    /// Records a view unless the same address viewed the job within the
    /// window. Blank addresses are ignored. Returns whether a view was stored.
    pub async fn record_view(&self, job_id: i64, viewer_ip: &str) -> StoreResult<bool> {
        let viewer_ip = viewer_ip.trim();
        if viewer_ip.is_empty() {
            return Ok(false);
        }
        let now = self.clock.now();
        let recorded = self
            .store
            .insert_view_unless_recent(job_id, viewer_ip, now - self.window, now)
            .await?;
        if recorded {
            tracing::debug!(job_id, viewer_ip, "job view recorded");
        }
        Ok(recorded)
    }

    pub async fn count(&self, job_id: i64) -> StoreResult<i64> {
        self.store.count_views(job_id).await
    }

    pub async fn most_viewed(&self, limit: usize) -> StoreResult<Vec<ViewedJob>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store
            .most_viewed_jobs(self.clock.today(), limit as i64)
            .await
    }
}
