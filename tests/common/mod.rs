#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use jobboard_backend::{
    config::Settings,
    models::{
        candidate::CandidateProfile,
        employer::EmployerProfile,
        job::{JobRecord, JobStatus},
    },
    services::mail_service::{LogMailer, MailSink},
    store::MemoryStore,
    utils::time::ManualClock,
    AppState,
};

pub const JWT_SECRET: &str = "test_secret_key";

pub const ACME: i64 = 1;
pub const ACME_USER: i64 = 100;
pub const GLOBEX: i64 = 2;
pub const GLOBEX_USER: i64 = 200;
pub const CANDIDATE: i64 = 10;
pub const CANDIDATE_USER: i64 = 1000;

pub const HANOI_JOB: i64 = 1;
pub const DANANG_JOB: i64 = 2;
pub const CLOSED_JOB: i64 = 3;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

pub struct TestApp {
    pub state: AppState,
    pub store: MemoryStore,
    pub clock: Arc<ManualClock>,
}

pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert_employer(EmployerProfile {
            id: ACME,
            user_id: ACME_USER,
            company_name: "Acme".into(),
            contact_email: Some("jobs@acme.test".into()),
        })
        .await;
    store
        .insert_employer(EmployerProfile {
            id: GLOBEX,
            user_id: GLOBEX_USER,
            company_name: "Globex".into(),
            contact_email: None,
        })
        .await;
    store
        .insert_candidate(CandidateProfile {
            id: CANDIDATE,
            user_id: CANDIDATE_USER,
            full_name: "Nguyen Van An".into(),
            email: Some("an@example.com".into()),
            location: Some("Hanoi".into()),
            skills: Some(r#"["Rust","PostgreSQL"]"#.into()),
            experience: Some("Built a payments ledger".into()),
        })
        .await;

    let base = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
    for (id, employer_id, title, location, status, age_days) in [
        (HANOI_JOB, ACME, "Backend Engineer", "Hanoi, Vietnam", JobStatus::Published, 10),
        (DANANG_JOB, ACME, "Frontend Engineer", "Da Nang", JobStatus::Published, 1),
        (CLOSED_JOB, GLOBEX, "QA Lead", "Hanoi", JobStatus::Closed, 0),
    ] {
        store
            .insert_job(JobRecord {
                id,
                employer_id,
                title: title.into(),
                location: Some(location.into()),
                status,
                deadline: None,
                created_at: base - chrono::Duration::days(age_days),
            })
            .await;
    }
    store
}

pub async fn test_app_with_mailer(mailer: Arc<dyn MailSink>) -> TestApp {
    let store = seeded_store().await;
    let clock = Arc::new(ManualClock::new(start_time()));
    let state = AppState::new(
        Arc::new(store.clone()),
        mailer,
        clock.clone(),
        JWT_SECRET,
        Settings::default(),
    );
    TestApp {
        state,
        store,
        clock,
    }
}

pub async fn test_app() -> TestApp {
    test_app_with_mailer(Arc::new(LogMailer)).await
}
