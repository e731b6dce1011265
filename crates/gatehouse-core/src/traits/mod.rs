//! Boundary traits implemented by infrastructure crates.
//!
//! These seams keep external collaborators (biometric matcher, notification
//! relay, dashboard transport) swappable and let services be exercised with
//! in-memory fakes.

pub mod matcher;
pub mod notifier;
pub mod transport;

pub use matcher::{FaceMatch, FaceMatcher};
pub use notifier::{EmailMessage, NotificationGateway};
pub use transport::{CardTransport, DeliveryOutcome};
