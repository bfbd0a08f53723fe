pub mod backup_exchange;
pub mod core;
pub mod dashboard;
pub mod data;
pub mod import;
pub mod logs;
pub mod reports;
pub mod setup;
pub mod teachers;
