//! Unified application error types for Gatehouse.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator. Ledger-boundary outcomes that are
//! part of the check-in contract (duplicate invites, lost check-in races,
//! malformed dashboard cards) get their own kinds so callers can branch on
//! them without string matching.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A conflict occurred (concurrent modification, duplicate entry).
    Conflict,
    /// An invite already exists for the same (email, visit date).
    DuplicateInvite,
    /// The visitor has no invite for the facility-local date.
    NotInvited,
    /// The invite was already checked in; the conditional transition lost.
    AlreadyCheckedIn,
    /// The dashboard card name is not in the closed card enumeration.
    UnknownCardKind,
    /// The caller is not authorized (missing/expired/reused token).
    Unauthorized,
    /// A database error occurred.
    Database,
    /// An external collaborator (matcher, notification relay) failed.
    ExternalService,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal server error occurred.
    Internal,
    /// The service is temporarily unavailable.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::DuplicateInvite => write!(f, "DUPLICATE_INVITE"),
            Self::NotInvited => write!(f, "NOT_INVITED"),
            Self::AlreadyCheckedIn => write!(f, "ALREADY_CHECKED_IN"),
            Self::UnknownCardKind => write!(f, "UNKNOWN_CARD_KIND"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Database => write!(f, "DATABASE"),
            Self::ExternalService => write!(f, "EXTERNAL_SERVICE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout Gatehouse.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls. This provides a single error type for
/// the entire application boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a duplicate-invite error.
    pub fn duplicate_invite(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateInvite, message)
    }

    /// Create a not-invited error.
    pub fn not_invited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotInvited, message)
    }

    /// Create an already-checked-in error.
    pub fn already_checked_in(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyCheckedIn, message)
    }

    /// Create an unknown-card-kind error.
    pub fn unknown_card_kind(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownCardKind, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create an external-service error.
    pub fn external_service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExternalService, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Whether this error is the ledger's lost-race signal.
    pub fn is_already_checked_in(&self) -> bool {
        self.kind == ErrorKind::AlreadyCheckedIn
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display_codes() {
        assert_eq!(ErrorKind::DuplicateInvite.to_string(), "DUPLICATE_INVITE");
        assert_eq!(ErrorKind::NotInvited.to_string(), "NOT_INVITED");
        assert_eq!(ErrorKind::UnknownCardKind.to_string(), "UNKNOWN_CARD_KIND");
    }

    #[test]
    fn test_already_checked_in_predicate() {
        let err = AppError::already_checked_in("invite already transitioned");
        assert!(err.is_already_checked_in());
        assert!(!AppError::not_invited("no invite today").is_already_checked_in());
    }
}
