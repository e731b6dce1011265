//! Invite registration.

pub mod service;

pub use service::{BulkRegistrationReport, InviteService, RegisterInviteRequest};
