use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::document_store::{DocumentStore, ListFilter, StoreError};
use crate::domain::documents::document::{DocumentRecord, StampedDocument};

/// Process-local document table. Backs `STORE_BACKEND=memory` and tests.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    rows: RwLock<HashMap<String, DocumentRecord>>,
}

impl InMemoryDocumentStore {
    pub fn with_records(records: impl IntoIterator<Item = DocumentRecord>) -> Self {
        let rows = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            rows: RwLock::new(rows),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, doc: &StampedDocument) -> Result<Vec<DocumentRecord>, StoreError> {
        let mut rows = self.rows.write().await;
        let id = doc
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        if rows.contains_key(&id) {
            return Err(StoreError::Rejected {
                status: Some(409),
                code: Some("23505".into()),
                message: format!("duplicate key value violates unique constraint: id={id}"),
            });
        }
        let record = DocumentRecord {
            id: id.clone(),
            title: doc.title.clone().unwrap_or_default(),
            content: doc.content.clone().unwrap_or(Value::Null),
            user_id: doc.user_id.clone(),
            created_at: doc.created_at.unwrap_or(doc.updated_at),
            updated_at: doc.updated_at,
        };
        rows.insert(id, record.clone());
        Ok(vec![record])
    }

    async fn update_by_id(
        &self,
        id: &str,
        doc: &StampedDocument,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(row) = rows.get_mut(id) else {
            return Ok(Vec::new());
        };
        if let Some(title) = &doc.title {
            row.title = title.clone();
        }
        if let Some(content) = &doc.content {
            row.content = content.clone();
        }
        if doc.user_id.is_some() {
            row.user_id = doc.user_id.clone();
        }
        row.updated_at = doc.updated_at;
        Ok(vec![row.clone()])
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn select_list(&self, filter: &ListFilter) -> Result<Vec<DocumentRecord>, StoreError> {
        let rows = self.rows.read().await;
        let mut out: Vec<DocumentRecord> = rows
            .values()
            .filter(|r| match filter.user_id.as_deref() {
                Some(user_id) => r.user_id.as_deref() == Some(user_id),
                None => true,
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(out)
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError> {
        Ok(u64::from(self.rows.write().await.remove(id).is_some()))
    }
}
