use crate::application::ports::document_store::StoreError;

#[derive(thiserror::Error, Debug)]
pub enum DocumentError {
    #[error("document id must not be empty")]
    InvalidId,
    #[error("document not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Backend(#[from] StoreError),
}

pub(crate) fn require_id(id: &str) -> Result<&str, DocumentError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(DocumentError::InvalidId);
    }
    Ok(id)
}
