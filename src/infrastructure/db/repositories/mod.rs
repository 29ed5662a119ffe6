pub mod document_store_sqlx;
