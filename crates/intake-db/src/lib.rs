//! Intake Database Layer
//!
//! Repository traits for sources, extracted data and the audit log, with PostgreSQL
//! implementations. In-memory implementations for tests live in `testing`.

pub mod db;
pub mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use db::audit_log::PgAuditLogRepository;
pub use db::source::PgSourceRepository;
pub use db::transaction::{with_transaction, TransactionGuard};
pub use traits::{AuditLogRepository, SourceRepository};
