pub mod application_dto;
pub mod common;
pub mod job_dto;
pub mod notification_dto;
