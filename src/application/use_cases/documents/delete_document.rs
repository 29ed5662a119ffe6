use crate::application::ports::document_store::DocumentStore;
use crate::application::use_cases::documents::error::{DocumentError, require_id};

pub struct DeleteDocument<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> DeleteDocument<'a, S> {
    /// Number of rows the store removed, passed through unchanged.
    pub async fn execute(&self, id: &str) -> Result<u64, DocumentError> {
        let id = require_id(id)?;
        let removed = self.store.delete_by_id(id).await?;
        tracing::info!(document_id = %id, removed, "document_delete");
        Ok(removed)
    }
}
