//! Post-visit feedback collection.

pub mod service;
pub mod tokens;

pub use service::{FeedbackForm, FeedbackService};
pub use tokens::{FeedbackClaims, FeedbackTokenSigner};
