mod common;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::Duration;
use common::*;
use jobboard_backend::{
    models::application::{ApplicationDetail, ApplicationStatus},
    services::{
        application_service::{PipelineError, Reviewer, SubmitApplication},
        mail_service::{MailError, MailSink, OutgoingMail},
        recommendation_service::RecommendationSource,
    },
    store::{ApplicationRepository, SavedJobRepository},
};

struct FailingMailer {
    attempts: AtomicUsize,
}

#[async_trait]
impl MailSink for FailingMailer {
    async fn deliver(&self, _mail: &OutgoingMail) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(MailError::Rejected(503))
    }
}

fn submit(job_id: i64) -> SubmitApplication {
    SubmitApplication {
        candidate_id: CANDIDATE,
        job_id,
        cover_letter: Some("I would love to join.".into()),
        resume_snapshot: Some("resume-v3.pdf".into()),
    }
}

#[tokio::test]
async fn submit_then_employer_opens_detail() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;

    let application = pipeline.submit(submit(HANOI_JOB)).await.unwrap();
    assert_eq!(application.status, ApplicationStatus::Applied);
    assert_eq!(application.applied_at, start_time());

    let detail = pipeline
        .open_for_review(application.id, Reviewer::Employer(ACME))
        .await
        .unwrap();
    assert_eq!(detail.application.status, ApplicationStatus::Viewed);

    let notes = app.store.notifications_for(CANDIDATE_USER).await;
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].icon_path, "eye");
    assert_eq!(notes[0].title, "Application viewed");
}

#[tokio::test]
async fn admin_opening_a_fresh_application_leaves_it_applied() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;
    let application = pipeline.submit(submit(HANOI_JOB)).await.unwrap();

    let detail = pipeline
        .open_for_review(application.id, Reviewer::Admin)
        .await
        .unwrap();
    assert_eq!(detail.application.status, ApplicationStatus::Applied);
    assert!(app.store.notifications_for(CANDIDATE_USER).await.is_empty());

    let detail = pipeline
        .open_for_review(application.id, Reviewer::Employer(ACME))
        .await
        .unwrap();
    assert_eq!(detail.application.status, ApplicationStatus::Viewed);
    assert_eq!(app.store.notifications_for(CANDIDATE_USER).await.len(), 1);
}

#[tokio::test]
async fn rejection_note_reaches_candidate() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;
    let application = pipeline.submit(submit(HANOI_JOB)).await.unwrap();

    app.clock.advance(Duration::hours(2));
    let rejected = pipeline
        .set_status(
            application.id,
            Reviewer::Employer(ACME),
            "rejected",
            Some("  Not enough experience  "),
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, ApplicationStatus::Rejected);
    assert_eq!(rejected.decision_note.as_deref(), Some("Not enough experience"));
    assert_eq!(rejected.updated_at, start_time() + Duration::hours(2));

    let latest = app
        .state
        .notification_service
        .recent(CANDIDATE_USER, 1)
        .await
        .unwrap();
    assert!(latest[0].message.contains("Not enough experience"));
    assert_eq!(latest[0].icon, "x-mark");
}

#[tokio::test]
async fn blank_rejection_note_is_refused_without_side_effects() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;
    let application = pipeline.submit(submit(HANOI_JOB)).await.unwrap();

    for note in [None, Some(""), Some("   \n")] {
        let err = pipeline
            .set_status(application.id, Reviewer::Admin, "rejected", note)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MissingRejectionNote));
    }
    let stored = app.store.application(application.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Applied);
    assert!(app.store.notifications_for(CANDIDATE_USER).await.is_empty());
}

#[tokio::test]
async fn reconsidering_a_rejection_drops_its_note() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;
    let application = pipeline.submit(submit(HANOI_JOB)).await.unwrap();

    pipeline
        .set_status(application.id, Reviewer::Employer(ACME), "rejected", Some("Salary mismatch"))
        .await
        .unwrap();
    let hired = pipeline
        .set_status(application.id, Reviewer::Employer(ACME), "hired", None)
        .await
        .unwrap();
    assert_eq!(hired.decision_note, None);

    let listed = pipeline.applications_for_candidate(CANDIDATE).await.unwrap();
    assert_eq!(listed.items[0].decision_note, None);
}

#[tokio::test]
async fn withdrawn_applications_stay_withdrawn() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;
    let application = pipeline.submit(submit(DANANG_JOB)).await.unwrap();
    pipeline.withdraw(application.id, CANDIDATE).await.unwrap();

    for status in ["shortlisted", "hired"] {
        let err = pipeline
            .set_status(application.id, Reviewer::Admin, status, None)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Withdrawn));
    }
    let stored = app.store.application(application.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Withdrawn);
}

#[tokio::test]
async fn employer_lists_applications_on_own_jobs() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;
    let hanoi = pipeline.submit(submit(HANOI_JOB)).await.unwrap();
    app.clock.advance(Duration::minutes(5));
    let danang = pipeline.submit(submit(DANANG_JOB)).await.unwrap();
    pipeline
        .set_status(danang.id, Reviewer::Employer(ACME), "shortlisted", None)
        .await
        .unwrap();

    let ids = |items: Vec<ApplicationDetail>| {
        items.into_iter().map(|d| d.application.id).collect::<Vec<_>>()
    };

    let all = pipeline
        .applications_for_review(Reviewer::Employer(ACME), None, None)
        .await
        .unwrap();
    assert_eq!(ids(all), vec![danang.id, hanoi.id]);

    let by_job = pipeline
        .applications_for_review(Reviewer::Employer(ACME), Some(HANOI_JOB), None)
        .await
        .unwrap();
    assert_eq!(ids(by_job), vec![hanoi.id]);

    let shortlisted = pipeline
        .applications_for_review(
            Reviewer::Employer(ACME),
            None,
            Some(ApplicationStatus::Shortlisted),
        )
        .await
        .unwrap();
    assert_eq!(ids(shortlisted), vec![danang.id]);

    let globex = pipeline
        .applications_for_review(Reviewer::Employer(GLOBEX), Some(HANOI_JOB), None)
        .await
        .unwrap();
    assert!(globex.is_empty());

    // Listing is read-only.
    let stored = app.store.application(hanoi.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ApplicationStatus::Applied);
}

#[tokio::test]
async fn candidate_opens_only_own_application() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;
    let application = pipeline.submit(submit(HANOI_JOB)).await.unwrap();

    let detail = pipeline
        .application_for_candidate(application.id, CANDIDATE)
        .await
        .unwrap();
    assert_eq!(detail.job.title, "Backend Engineer");
    assert_eq!(detail.employer.company_name, "Acme");

    let err = pipeline
        .application_for_candidate(application.id, CANDIDATE + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NotOwner));
}

#[tokio::test]
async fn every_pair_can_apply_once() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;
    for job_id in [HANOI_JOB, DANANG_JOB] {
        pipeline.submit(submit(job_id)).await.unwrap();
        let err = pipeline.submit(submit(job_id)).await.unwrap_err();
        assert!(matches!(err, PipelineError::AlreadyApplied));
    }
    let err = pipeline.submit(submit(CLOSED_JOB)).await.unwrap_err();
    assert!(matches!(err, PipelineError::JobNotEligible));
    assert_eq!(app.store.application_count().await, 2);
}

#[tokio::test]
async fn concurrent_duplicate_submissions_store_one_row() {
    let app = test_app().await;
    let pipeline = app.state.application_service.clone();
    let other = pipeline.clone();

    let (a, b) = tokio::join!(
        pipeline.submit(submit(HANOI_JOB)),
        other.submit(submit(HANOI_JOB))
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(app.store.application_count().await, 1);
}

#[tokio::test]
async fn withdraw_allowed_only_before_decision() {
    let app = test_app().await;
    let pipeline = &app.state.application_service;

    for (job_id, status) in [(HANOI_JOB, "hired"), (DANANG_JOB, "shortlisted")] {
        let application = pipeline.submit(submit(job_id)).await.unwrap();
        pipeline
            .set_status(application.id, Reviewer::Employer(ACME), status, None)
            .await
            .unwrap();

        let result = pipeline.withdraw(application.id, CANDIDATE).await;
        if status == "hired" {
            assert!(matches!(result, Err(PipelineError::CannotWithdraw)));
        } else {
            assert_eq!(result.unwrap().status, ApplicationStatus::Withdrawn);
        }
    }

    let notes = app.store.notifications_for(CANDIDATE_USER).await;
    assert_eq!(notes.last().map(|n| n.icon_path.as_str()), Some("circle-minus"));
}

#[tokio::test]
async fn mail_failures_never_fail_the_pipeline() {
    let mailer = Arc::new(FailingMailer {
        attempts: AtomicUsize::new(0),
    });
    let app = test_app_with_mailer(mailer.clone()).await;
    let pipeline = &app.state.application_service;

    let application = pipeline.submit(submit(HANOI_JOB)).await.unwrap();
    pipeline
        .set_status(application.id, Reviewer::Employer(ACME), "shortlisted", None)
        .await
        .unwrap();
    assert_eq!(mailer.attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn saved_job_toggle_is_an_involution() {
    let app = test_app().await;
    let ledger = &app.state.saved_job_service;
    assert!(ledger.toggle(CANDIDATE, HANOI_JOB).await.unwrap());
    assert!(!ledger.toggle(CANDIDATE, HANOI_JOB).await.unwrap());
    assert!(app
        .store
        .saved_job(CANDIDATE, HANOI_JOB)
        .await
        .unwrap()
        .is_none());
    assert!(ledger.toggle(CANDIDATE, HANOI_JOB).await.unwrap());
}

#[tokio::test]
async fn views_are_deduplicated_per_hour() {
    let app = test_app().await;
    let views = &app.state.view_service;

    views.record_view(HANOI_JOB, "203.0.113.5").await.unwrap();
    app.clock.advance(Duration::minutes(59));
    views.record_view(HANOI_JOB, "203.0.113.5").await.unwrap();
    assert_eq!(views.count(HANOI_JOB).await.unwrap(), 1);

    app.clock.advance(Duration::minutes(2));
    views.record_view(HANOI_JOB, "203.0.113.5").await.unwrap();
    assert_eq!(views.count(HANOI_JOB).await.unwrap(), 2);
}

#[tokio::test]
async fn hanoi_candidate_gets_hanoi_job_first() {
    let app = test_app().await;
    let rec = app
        .state
        .recommendation_service
        .recommend(Some(CANDIDATE), 5)
        .await;
    assert_eq!(rec.source, RecommendationSource::Personalized);
    assert_eq!(rec.items.len(), 2);
    assert_eq!(rec.items[0].job.id, HANOI_JOB);
    assert!(rec.items[0].match_score >= rec.items[1].match_score);
    assert_eq!(rec.items[0].match_label, Some("highly relevant"));
}

#[tokio::test]
async fn unknown_candidate_falls_back_to_most_viewed() {
    let app = test_app().await;
    app.state.view_service.record_view(HANOI_JOB, "a").await.unwrap();
    app.state.view_service.record_view(HANOI_JOB, "b").await.unwrap();

    let rec = app.state.recommendation_service.recommend(Some(999), 5).await;
    assert_eq!(rec.source, RecommendationSource::MostViewed);
    assert_eq!(rec.items[0].job.id, HANOI_JOB);
    assert_eq!(rec.items[0].view_count, Some(2));
    assert_eq!(rec.items[1].view_count, Some(0));

    let none = app.state.recommendation_service.recommend(None, 0).await;
    assert!(none.items.is_empty());
}
