//! Outbound notification delivery.

pub mod relay;

pub use relay::RelayNotificationGateway;
