//! Dashboard statistics and activity heartbeats.

pub mod service;

pub use service::StatsService;
