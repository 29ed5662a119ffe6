use async_trait::async_trait;

use crate::domain::documents::document::{DocumentRecord, StampedDocument};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("document store unreachable: {0}")]
    Transport(String),
    #[error("document store rejected the request: {message}")]
    Rejected {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },
    #[error("unexpected document store response: {0}")]
    Decode(String),
    #[error("document store failure")]
    Backend(#[source] anyhow::Error),
}

impl StoreError {
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Rejected { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    // None => every owner
    pub user_id: Option<String>,
}

/// Row-level access to the remote documents table. Listing is always ordered
/// by `updated_at` descending.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, doc: &StampedDocument) -> Result<Vec<DocumentRecord>, StoreError>;

    async fn update_by_id(
        &self,
        id: &str,
        doc: &StampedDocument,
    ) -> Result<Vec<DocumentRecord>, StoreError>;

    async fn select_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError>;

    async fn select_list(&self, filter: &ListFilter) -> Result<Vec<DocumentRecord>, StoreError>;

    // Returns the number of rows removed
    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError>;

    async fn close(&self) {}
}
