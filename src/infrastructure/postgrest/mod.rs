mod document_store_postgrest;

pub use document_store_postgrest::*;
