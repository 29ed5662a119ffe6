use std::sync::Arc;

use crate::application::ports::document_store::DocumentStore;
use crate::bootstrap::config::{Config, StoreBackend};
use crate::infrastructure::db;
use crate::infrastructure::db::repositories::document_store_sqlx::SqlxDocumentStore;
use crate::infrastructure::memory::InMemoryDocumentStore;
use crate::infrastructure::postgrest::PostgrestDocumentStore;

/// Builds the store client for the configured backend. The caller owns it
/// and must `close()` it on shutdown.
pub async fn connect_document_store(cfg: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match cfg.store_backend {
        StoreBackend::Postgres => {
            let pool = db::connect_pool(&cfg.database_url, cfg.database_max_connections).await?;
            db::migrate(&pool).await?;
            tracing::info!("document_store_postgres_ready");
            Arc::new(SqlxDocumentStore::new(pool))
        }
        StoreBackend::Postgrest => {
            let url = cfg
                .postgrest_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("POSTGREST_URL missing"))?;
            let store = PostgrestDocumentStore::new(
                url,
                &cfg.documents_table,
                cfg.postgrest_api_key.clone(),
            )?;
            tracing::info!(endpoint = %store.endpoint(), "document_store_postgrest_ready");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("document_store_in_memory_data_is_not_persisted");
            Arc::new(InMemoryDocumentStore::default())
        }
    };
    Ok(store)
}
