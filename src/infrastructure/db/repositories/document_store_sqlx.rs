use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::types::Json;

use crate::application::ports::document_store::{DocumentStore, ListFilter, StoreError};
use crate::domain::documents::document::{DocumentRecord, StampedDocument};
use crate::infrastructure::db::PgPool;

pub struct SqlxDocumentStore {
    pub pool: PgPool,
}

impl SqlxDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => StoreError::Rejected {
                status: None,
                code: db.code().map(|c| c.into_owned()),
                message: db.message().to_string(),
            },
            sqlx::Error::Io(e) => StoreError::Transport(e.to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StoreError::Transport(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_) => StoreError::Decode(err.to_string()),
            other => StoreError::Backend(other.into()),
        }
    }
}

fn record_from_row(r: &PgRow) -> Result<DocumentRecord, StoreError> {
    let content: Option<Json<Value>> = r.try_get("content")?;
    Ok(DocumentRecord {
        id: r.try_get("id")?,
        title: r.try_get("title")?,
        content: content.map(|c| c.0).unwrap_or(Value::Null),
        user_id: r.try_get("user_id")?,
        created_at: r.try_get("created_at")?,
        updated_at: r.try_get("updated_at")?,
    })
}

fn records_from_rows(rows: Vec<PgRow>) -> Result<Vec<DocumentRecord>, StoreError> {
    rows.iter().map(record_from_row).collect()
}

#[async_trait]
impl DocumentStore for SqlxDocumentStore {
    async fn insert(&self, doc: &StampedDocument) -> Result<Vec<DocumentRecord>, StoreError> {
        let rows = sqlx::query(
            r#"INSERT INTO documents (title, content, user_id, created_at, updated_at)
               VALUES (COALESCE($1, ''), $2, $3, COALESCE($4, $5), $5)
               RETURNING id, title, content, user_id, created_at, updated_at"#,
        )
        .bind(&doc.title)
        .bind(doc.content.as_ref().map(Json))
        .bind(&doc.user_id)
        .bind(doc.created_at)
        .bind(doc.updated_at)
        .fetch_all(&self.pool)
        .await?;
        records_from_rows(rows)
    }

    async fn update_by_id(
        &self,
        id: &str,
        doc: &StampedDocument,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        let rows = sqlx::query(
            r#"UPDATE documents SET
                    title = COALESCE($1, title),
                    content = COALESCE($2, content),
                    user_id = COALESCE($3, user_id),
                    updated_at = $4
                WHERE id = $5
                RETURNING id, title, content, user_id, created_at, updated_at"#,
        )
        .bind(&doc.title)
        .bind(doc.content.as_ref().map(Json))
        .bind(&doc.user_id)
        .bind(doc.updated_at)
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        records_from_rows(rows)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        let row = sqlx::query(
            r#"SELECT id, title, content, user_id, created_at, updated_at
               FROM documents WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn select_list(&self, filter: &ListFilter) -> Result<Vec<DocumentRecord>, StoreError> {
        let rows = if let Some(user_id) = filter.user_id.as_deref() {
            sqlx::query(
                r#"SELECT id, title, content, user_id, created_at, updated_at
                   FROM documents
                   WHERE user_id = $1
                   ORDER BY updated_at DESC"#,
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query(
                r#"SELECT id, title, content, user_id, created_at, updated_at
                   FROM documents
                   ORDER BY updated_at DESC"#,
            )
            .fetch_all(&self.pool)
            .await?
        };
        records_from_rows(rows)
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError> {
        let res = sqlx::query(r#"DELETE FROM documents WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
