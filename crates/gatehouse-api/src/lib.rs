//! # gatehouse-api
//!
//! The HTTP and WebSocket surface: request/response DTOs, routing, error
//! mapping, and handlers. All domain logic lives in the service crates;
//! handlers translate between the wire and the services.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
