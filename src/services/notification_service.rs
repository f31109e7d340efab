use serde::Serialize;
use std::sync::Arc;

use crate::models::application::{ApplicationDetail, ApplicationStatus};
use crate::models::notification::{NewNotification, Notification};
use crate::store::{NotificationRepository, Store, StoreResult};
use crate::utils::time::{format_exact, relative_time, Clock};

const DEFAULT_TITLE: &str = "Notification";
const DEFAULT_ICON: &str = "bell";
const FALLBACK_EMPLOYER: &str = "The employer";
const FALLBACK_JOB: &str = "an open position";

/// A notification as rendered for its owner at read time.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct NotificationView {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub icon: String,
    pub read: bool,
    pub relative_time: String,
    pub exact_time: String,
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn append(&self, new: NewNotification) -> StoreResult<Notification> {
        let notification = self.store.insert_notification(new, self.clock.now()).await?;
        tracing::debug!(
            notification_id = notification.id,
            user_id = notification.user_id,
            "notification appended"
        );
        Ok(notification)
    }

    /// Appends the candidate-facing notice for `status`, with the note
    /// appended to the message when present.
    pub async fn notify_status(
        &self,
        detail: &ApplicationDetail,
        status: ApplicationStatus,
        note: Option<&str>,
    ) -> StoreResult<Notification> {
        self.append(status_notification(detail, status, note)).await
    }

    pub async fn count_unread(&self, user_id: i64) -> StoreResult<i64> {
        self.store.count_unread(user_id).await
    }

    pub async fn recent(&self, user_id: i64, limit: i64) -> StoreResult<Vec<NotificationView>> {
        let now = self.clock.now();
        let notifications = self.store.recent_notifications(user_id, limit.max(1)).await?;
        Ok(notifications
            .into_iter()
            .map(|n| render(n, now))
            .collect())
    }

    pub async fn mark_all_as_read(&self, user_id: i64) -> StoreResult<u64> {
        let affected = self.store.mark_all_read(user_id).await?;
        tracing::info!(user_id, affected, "notifications marked as read");
        Ok(affected)
    }
}

fn render(notification: Notification, now: chrono::DateTime<chrono::Utc>) -> NotificationView {
    let title = non_blank(notification.title, DEFAULT_TITLE);
    let icon = non_blank(notification.icon_path, DEFAULT_ICON);
    NotificationView {
        id: notification.id,
        title,
        message: notification.message,
        icon,
        read: notification.read,
        relative_time: relative_time(notification.created_at, now),
        exact_time: format_exact(notification.created_at),
    }
}

fn non_blank(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

pub fn status_notification(
    detail: &ApplicationDetail,
    status: ApplicationStatus,
    note: Option<&str>,
) -> NewNotification {
    let employer = Some(detail.employer.company_name.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_EMPLOYER);
    let job = Some(detail.job.title.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_JOB);

    let mut message = match status {
        ApplicationStatus::Viewed => format!("{} viewed your application for {}.", employer, job),
        ApplicationStatus::Shortlisted => {
            format!("{} shortlisted you for an interview for {}.", employer, job)
        }
        ApplicationStatus::Rejected => {
            format!("{} will not move forward with your application for {}.", employer, job)
        }
        ApplicationStatus::Hired => format!("{} would like to welcome you as {}.", employer, job),
        ApplicationStatus::Withdrawn => format!("Your application for {} was withdrawn.", job),
        ApplicationStatus::Applied => {
            format!("{} updated your application for {}.", employer, job)
        }
    };
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        message.push_str(" Note: ");
        message.push_str(note);
    }

    let (title, icon) = status.notice();
    NewNotification {
        user_id: detail.candidate.user_id,
        title: title.to_string(),
        message,
        icon_path: icon.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mail_service::fixtures;
    use crate::store::MemoryStore;
    use crate::utils::time::ManualClock;
    use chrono::{Duration, TimeZone, Utc};

    fn service() -> (NotificationService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap(),
        ));
        let service = NotificationService::new(Arc::new(MemoryStore::new()), clock.clone());
        (service, clock)
    }

    #[test]
    fn rejection_message_carries_note() {
        let detail = fixtures::detail(ApplicationStatus::Rejected);
        let new = status_notification(&detail, ApplicationStatus::Rejected, Some("  Needs 5y Go  "));
        assert_eq!(new.user_id, 50);
        assert_eq!(new.title, "Application not selected");
        assert_eq!(new.icon_path, "x-mark");
        assert!(new.message.starts_with("Acme will not move forward"));
        assert!(new.message.ends_with(" Note: Needs 5y Go"));
    }

    #[test]
    fn blank_names_fall_back() {
        let mut detail = fixtures::detail(ApplicationStatus::Viewed);
        detail.employer.company_name = " ".into();
        detail.job.title = String::new();
        let new = status_notification(&detail, ApplicationStatus::Viewed, None);
        assert_eq!(new.message, "The employer viewed your application for an open position.");
    }

    #[tokio::test]
    async fn recent_renders_relative_time_and_defaults() {
        let (service, clock) = service();
        service
            .append(NewNotification {
                user_id: 1,
                title: "".into(),
                message: "hello".into(),
                icon_path: " ".into(),
            })
            .await
            .unwrap();
        clock.advance(Duration::minutes(3));

        let views = service.recent(1, 10).await.unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].title, "Notification");
        assert_eq!(views[0].icon, "bell");
        assert_eq!(views[0].relative_time, "3 minutes ago");
        assert_eq!(views[0].exact_time, "01/04/2026 09:00");
    }

    #[tokio::test]
    async fn mark_all_as_read_clears_unread_count() {
        let (service, _) = service();
        for i in 0..3 {
            service
                .append(NewNotification {
                    user_id: 4,
                    title: format!("n{}", i),
                    message: String::new(),
                    icon_path: "bell".into(),
                })
                .await
                .unwrap();
        }
        assert_eq!(service.count_unread(4).await.unwrap(), 3);
        assert_eq!(service.mark_all_as_read(4).await.unwrap(), 3);
        assert_eq!(service.count_unread(4).await.unwrap(), 0);
        assert_eq!(service.mark_all_as_read(4).await.unwrap(), 0);
    }
}
