use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;

use crate::models::application::ApplicationDetail;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected the message with status {0}")]
    Rejected(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub event: &'static str,
}

/// Transport for composed mails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailSink: Send + Sync {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Posts mails as JSON to a relay that owns the actual SMTP delivery.
#[derive(Clone)]
pub struct WebhookMailer {
    client: Client,
    url: String,
    secret: Option<String>,
}

impl WebhookMailer {
    pub fn new(client: Client, url: String, secret: Option<String>) -> Self {
        Self {
            client,
            url,
            secret,
        }
    }
}

#[async_trait]
impl MailSink for WebhookMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let mut request = self.client.post(&self.url).json(mail);
        if let Some(secret) = &self.secret {
            request = request.header("X-Webhook-Secret", secret);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }
        tracing::debug!(to = %mail.to, event = mail.event, "mail relayed");
        Ok(())
    }
}

/// Writes mails to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl MailSink for LogMailer {
    async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(to = %mail.to, subject = %mail.subject, event = mail.event, "mail (log only)");
        Ok(())
    }
}

/// Composes the pipeline's mails and hands them to a [`MailSink`]. A missing
/// recipient address skips the mail silently.
#[derive(Clone)]
pub struct MailService {
    sink: Arc<dyn MailSink>,
}

impl MailService {
    pub fn new(sink: Arc<dyn MailSink>) -> Self {
        Self { sink }
    }

    pub async fn send_new_application_to_employer(
        &self,
        detail: &ApplicationDetail,
    ) -> Result<(), MailError> {
        match compose_new_application(detail) {
            Some(mail) => self.sink.deliver(&mail).await,
            None => Ok(()),
        }
    }

    pub async fn send_status_update_to_candidate(
        &self,
        detail: &ApplicationDetail,
        note: Option<&str>,
    ) -> Result<(), MailError> {
        match compose_status_update(detail, note) {
            Some(mail) => self.sink.deliver(&mail).await,
            None => Ok(()),
        }
    }
}

fn recipient(address: Option<&str>) -> Option<String> {
    address
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

pub fn compose_new_application(detail: &ApplicationDetail) -> Option<OutgoingMail> {
    let to = recipient(detail.employer.contact_email.as_deref())?;
    let title = detail.job.title.trim();
    let candidate = &detail.candidate;

    let mut body = String::from("Hello,\n\nYou have received a new application.\n");
    body.push_str(&format!("Position: {}\n", title));
    body.push_str(&format!("Candidate: {}\n", candidate.full_name.trim()));
    body.push_str(&format!(
        "Email: {}\n",
        candidate.email.as_deref().unwrap_or_default().trim()
    ));
    if let Some(letter) = detail
        .application
        .cover_letter
        .as_deref()
        .filter(|l| !l.trim().is_empty())
    {
        body.push_str(&format!("\nCover letter:\n{}\n", letter));
    }
    body.push_str("\nSign in to review the application and respond to the candidate.\n");

    Some(OutgoingMail {
        to,
        subject: format!("New applicant for {}", title),
        body,
        event: "application.submitted",
    })
}

pub fn compose_status_update(detail: &ApplicationDetail, note: Option<&str>) -> Option<OutgoingMail> {
    let to = recipient(detail.candidate.email.as_deref())?;
    let status = detail.application.status;

    let mut body = format!(
        "Hello {},\n\nThe employer has updated your application.\n",
        detail.candidate.full_name.trim()
    );
    body.push_str(&format!("Position: {}\n", detail.job.title.trim()));
    body.push_str(&format!("New status: {}\n", status.label()));
    if let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) {
        body.push_str(&format!("\nNote from the employer:\n{}\n", note));
    }
    body.push_str("\nSign in to see the details.\n");

    Some(OutgoingMail {
        to,
        subject: format!("Your application status: {}", status.label()),
        body,
        event: "application.status_changed",
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::models::application::{Application, ApplicationStatus};
    use crate::models::candidate::CandidateProfile;
    use crate::models::employer::EmployerProfile;
    use crate::models::job::{JobRecord, JobStatus};
    use chrono::Utc;

    pub fn detail(status: ApplicationStatus) -> ApplicationDetail {
        let now = Utc::now();
        ApplicationDetail {
            application: Application {
                id: 7,
                job_id: 3,
                candidate_id: 5,
                cover_letter: Some("I ship things.".into()),
                resume_snapshot: None,
                status,
                decision_note: None,
                applied_at: now,
                updated_at: now,
            },
            job: JobRecord {
                id: 3,
                employer_id: 2,
                title: "Data engineer".into(),
                location: Some("Da Nang".into()),
                status: JobStatus::Published,
                deadline: None,
                created_at: now,
            },
            candidate: CandidateProfile {
                id: 5,
                user_id: 50,
                full_name: "Lan Pham".into(),
                email: Some("lan@example.com".into()),
                location: Some("Da Nang".into()),
                skills: None,
                experience: None,
            },
            employer: EmployerProfile {
                id: 2,
                user_id: 20,
                company_name: "Acme".into(),
                contact_email: Some("hr@acme.test".into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::ApplicationStatus;

    #[test]
    fn new_application_mail_goes_to_employer() {
        let mail = compose_new_application(&fixtures::detail(ApplicationStatus::Applied)).unwrap();
        assert_eq!(mail.to, "hr@acme.test");
        assert_eq!(mail.subject, "New applicant for Data engineer");
        assert!(mail.body.contains("Candidate: Lan Pham"));
        assert!(mail.body.contains("Cover letter:\nI ship things."));
    }

    #[test]
    fn status_mail_includes_trimmed_note() {
        let mail = compose_status_update(
            &fixtures::detail(ApplicationStatus::Rejected),
            Some("  Role filled internally "),
        )
        .unwrap();
        assert_eq!(mail.to, "lan@example.com");
        assert!(mail.body.contains("New status: Rejected"));
        assert!(mail.body.contains("Note from the employer:\nRole filled internally\n"));
    }

    #[test]
    fn missing_address_skips_mail() {
        let mut detail = fixtures::detail(ApplicationStatus::Applied);
        detail.employer.contact_email = Some("  ".into());
        assert!(compose_new_application(&detail).is_none());
    }

    #[tokio::test]
    async fn service_hands_composed_mail_to_sink() {
        let mut sink = MockMailSink::new();
        sink.expect_deliver()
            .withf(|mail| mail.event == "application.status_changed")
            .times(1)
            .returning(|_| Ok(()));
        let service = MailService::new(Arc::new(sink));
        service
            .send_status_update_to_candidate(&fixtures::detail(ApplicationStatus::Hired), None)
            .await
            .unwrap();
    }
}
