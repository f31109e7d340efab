pub mod application;
pub mod candidate;
pub mod employer;
pub mod job;
pub mod job_view;
pub mod notification;
pub mod saved_job;
