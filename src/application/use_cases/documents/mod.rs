pub mod delete_document;
pub mod error;
pub mod get_document;
pub mod list_documents;
pub mod save_document;
