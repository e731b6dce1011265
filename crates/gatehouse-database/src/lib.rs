//! # gatehouse-database
//!
//! PostgreSQL connection management, migrations, and repositories.
//! The invite repository doubles as the invite ledger — the single source
//! of truth for "is this person expected today."

pub mod connection;
pub mod ledger;
pub mod migration;
pub mod queue;
pub mod repositories;
