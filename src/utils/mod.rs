pub mod client_ip;
pub mod profile_parser;
pub mod time;
