pub mod achievements;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod stats;
pub mod task;
pub mod timer;
