use async_trait::async_trait;
use intake_core::models::NewAuditLogEntry;
use intake_core::AppError;
use sqlx::PgPool;

use crate::traits::AuditLogRepository;

/// PostgreSQL-backed audit log. Only ever inserts.
#[derive(Clone)]
pub struct PgAuditLogRepository {
    pool: PgPool,
}

impl PgAuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogRepository for PgAuditLogRepository {
    #[tracing::instrument(skip(self, entry), fields(db.table = "audit_log", db.operation = "insert", action = %entry.action))]
    async fn append(&self, entry: &NewAuditLogEntry) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO audit_log (principal_id, action, message, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(entry.principal_id)
        .bind(entry.action.as_str())
        .bind(&entry.message)
        .bind(entry.ip_address.as_deref())
        .bind(&entry.user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
