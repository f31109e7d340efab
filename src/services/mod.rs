pub mod application_service;
pub mod mail_service;
pub mod notification_service;
pub mod recommendation_service;
pub mod saved_job_service;
pub mod view_service;
