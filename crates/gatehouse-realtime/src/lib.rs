//! # gatehouse-realtime
//!
//! The real-time broadcast fan-out: a registry of live dashboard
//! connections with liveness deadlines, and the dispatcher that delivers
//! typed card updates to every live connection while garbage-collecting
//! dead ones.

pub mod card;
pub mod dispatcher;
pub mod registry;
pub mod transport;

pub use card::{CardKind, DashboardCard};
pub use dispatcher::{BroadcastDispatcher, PublishReport};
pub use registry::{ConnectionHandle, ConnectionRegistry};
pub use transport::WsCardTransport;
