pub mod document_store;
pub mod upload_store;
