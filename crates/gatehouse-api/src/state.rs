//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use gatehouse_core::config::AppConfig;
use gatehouse_core::types::facility_time::FacilityClock;
use gatehouse_realtime::{BroadcastDispatcher, ConnectionRegistry};
use gatehouse_service::checkin::CheckInService;
use gatehouse_service::feedback::FeedbackService;
use gatehouse_service::invite::InviteService;
use gatehouse_service::registration::RegistrationService;
use gatehouse_service::stats::StatsService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped (or internally Arc-backed) for cheap cloning across tasks;
/// lifecycle is owned by the process entry point, never by ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,
    /// Facility-local time arithmetic.
    pub clock: FacilityClock,

    /// Live dashboard connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Card broadcast dispatcher.
    pub dispatcher: BroadcastDispatcher,

    /// Arrival check-in orchestrator.
    pub checkin: Arc<CheckInService>,
    /// Invite registration service.
    pub invites: Arc<InviteService>,
    /// Visitor pre-registration service.
    pub registration: Arc<RegistrationService>,
    /// Feedback collection service.
    pub feedback: Arc<FeedbackService>,
    /// Dashboard statistics service.
    pub stats: Arc<StatsService>,
}
