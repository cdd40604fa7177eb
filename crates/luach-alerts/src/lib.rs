pub mod config;
pub mod contacts;
pub mod error;
pub mod schedule;
pub mod telemetry;
pub mod workflows;
