use crate::application::ports::document_store::{DocumentStore, ListFilter};
use crate::application::use_cases::documents::error::DocumentError;
use crate::domain::documents::document::DocumentRecord;

pub struct ListDocuments<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> ListDocuments<'a, S> {
    // No user_id lists every document; scoping is the caller's job.
    pub async fn execute(
        &self,
        user_id: Option<String>,
    ) -> Result<Vec<DocumentRecord>, DocumentError> {
        let filter = ListFilter {
            user_id: user_id.filter(|u| !u.trim().is_empty()),
        };
        self.store.select_list(&filter).await.map_err(|err| {
            tracing::error!(error = ?err, user_id = ?filter.user_id, "document_list_failed");
            DocumentError::Backend(err)
        })
    }
}
