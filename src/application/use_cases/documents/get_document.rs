use crate::application::ports::document_store::DocumentStore;
use crate::application::use_cases::documents::error::{DocumentError, require_id};
use crate::domain::documents::document::Document;

pub struct GetDocument<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> GetDocument<'a, S> {
    pub async fn execute(&self, id: &str) -> Result<Document, DocumentError> {
        let id = require_id(id)?;
        tracing::debug!(document_id = %id, "document_fetch");
        let row = self.store.select_by_id(id).await.map_err(|err| {
            tracing::error!(error = ?err, document_id = %id, "document_fetch_failed");
            DocumentError::Backend(err)
        })?;
        let Some(row) = row else {
            tracing::warn!(document_id = %id, "document_not_found");
            return Err(DocumentError::NotFound(id.to_owned()));
        };
        Ok(row.into_document())
    }
}
