//! Arrival check-in orchestration.

pub mod service;

pub use service::{ArrivalOutcome, ArrivalStatus, CheckInService};
