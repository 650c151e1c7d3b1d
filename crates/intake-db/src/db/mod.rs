//! PostgreSQL repositories
//
// Sources and their extracted data
pub mod source;
//
// Append-only audit log
pub mod audit_log;
//
// Transaction utilities
pub mod transaction;
