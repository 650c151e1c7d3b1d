use async_trait::async_trait;
use intake_core::models::{ExtractedData, NewExtractedData, NewSource, Source};
use intake_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::transaction::{with_transaction, TransactionGuard};
use crate::traits::SourceRepository;

/// PostgreSQL-backed source repository
#[derive(Clone)]
pub struct PgSourceRepository {
    pool: PgPool,
}

impl PgSourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SourceRepository for PgSourceRepository {
    #[tracing::instrument(
        skip(self, source, extracted),
        fields(
            db.table = "sources",
            db.operation = "insert",
            db.record_id = %source.id
        )
    )]
    async fn create_with_extracted(
        &self,
        source: NewSource,
        extracted: NewExtractedData,
    ) -> Result<(Source, ExtractedData), AppError> {
        with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let source_row = sqlx::query_as::<Postgres, Source>(
                    r#"
                    INSERT INTO sources (id, principal_id, source_type, file_name, storage_key, file_hash)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id, principal_id, source_type, file_name, storage_key, file_hash, created_at, updated_at
                    "#,
                )
                .bind(source.id)
                .bind(source.principal_id)
                .bind(source.source_type)
                .bind(&source.file_name)
                .bind(&source.storage_key)
                .bind(&source.file_hash)
                .fetch_one(&mut **tx)
                .await?;

                let extracted_row = sqlx::query_as::<Postgres, ExtractedData>(
                    r#"
                    INSERT INTO extracted_data (id, source_id, principal_id, data, content_hash)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id, source_id, principal_id, data, content_hash, created_at
                    "#,
                )
                .bind(extracted.id)
                .bind(source_row.id)
                .bind(extracted.principal_id)
                .bind(&extracted.data)
                .bind(&extracted.content_hash)
                .fetch_one(&mut **tx)
                .await?;

                Ok((source_row, extracted_row))
            })
        })
        .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "sources", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Source>, AppError> {
        let row = sqlx::query_as::<Postgres, Source>(
            "SELECT id, principal_id, source_type, file_name, storage_key, file_hash, created_at, updated_at FROM sources WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "extracted_data", db.operation = "select"))]
    async fn get_extracted(&self, source_id: Uuid) -> Result<Vec<ExtractedData>, AppError> {
        let rows = sqlx::query_as::<Postgres, ExtractedData>(
            "SELECT id, source_id, principal_id, data, content_hash, created_at FROM extracted_data WHERE source_id = $1 ORDER BY created_at",
        )
        .bind(source_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    #[tracing::instrument(skip(self), fields(db.table = "sources", db.operation = "delete", db.record_id = %id))]
    async fn delete_cascade(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let result: Result<bool, AppError> = async {
            sqlx::query("DELETE FROM extracted_data WHERE source_id = $1")
                .bind(id)
                .execute(tx.conn()?)
                .await?;

            let deleted = sqlx::query("DELETE FROM sources WHERE id = $1")
                .bind(id)
                .execute(tx.conn()?)
                .await?;

            Ok(deleted.rows_affected() > 0)
        }
        .await;

        match result {
            Ok(deleted) => {
                tx.commit().await?;
                Ok(deleted)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Rollback after failed delete failed");
                }
                Err(e)
            }
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
