pub mod api;
pub mod config;
pub mod config_validator;
pub mod error;
pub mod log_entry;
