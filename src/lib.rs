pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::config::Settings;
use crate::services::{
    application_service::ApplicationService,
    mail_service::{MailService, MailSink},
    notification_service::NotificationService,
    recommendation_service::RecommendationService,
    saved_job_service::SavedJobService,
    view_service::ViewService,
};
use crate::store::{SavedJobRepository, Store};
use crate::utils::time::Clock;

#[derive(Clone)]
pub struct AppState {
    pub jwt_secret: Arc<str>,
    pub settings: Settings,
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    pub application_service: ApplicationService,
    pub notification_service: NotificationService,
    pub view_service: ViewService,
    pub saved_job_service: SavedJobService,
    pub recommendation_service: RecommendationService,
}

impl AppState {
    pub fn new<S: Store + 'static>(
        store: Arc<S>,
        mailer: Arc<dyn MailSink>,
        clock: Arc<dyn Clock>,
        jwt_secret: impl Into<Arc<str>>,
        settings: Settings,
    ) -> Self {
        let saved_jobs: Arc<dyn SavedJobRepository> = store.clone();
        let store: Arc<dyn Store> = store;
        let notification_service = NotificationService::new(store.clone(), clock.clone());
        let application_service = ApplicationService::new(
            store.clone(),
            clock.clone(),
            notification_service.clone(),
            MailService::new(mailer),
        );
        let view_service = ViewService::new(store.clone(), clock.clone(), settings.view_dedup_window);
        let saved_job_service = SavedJobService::new(saved_jobs, clock.clone());
        let recommendation_service = RecommendationService::new(store.clone(), clock.clone());

        Self {
            jwt_secret: jwt_secret.into(),
            settings,
            store,
            clock,
            application_service,
            notification_service,
            view_service,
            saved_job_service,
            recommendation_service,
        }
    }
}
