pub mod legacy_import;
pub mod pin;
pub mod query;
pub mod retention;
pub mod scheduler;
