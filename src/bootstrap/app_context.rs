use std::sync::Arc;

use crate::application::ports::document_store::DocumentStore;
use crate::application::ports::upload_store::UploadStore;
use crate::bootstrap::config::Config;

#[derive(Clone)]
pub struct AppContext {
    pub cfg: Config,
    services: Arc<AppServices>,
}

#[derive(Clone)]
pub struct AppServices {
    document_store: Arc<dyn DocumentStore>,
    upload_store: Arc<dyn UploadStore>,
}

impl AppServices {
    pub fn new(document_store: Arc<dyn DocumentStore>, upload_store: Arc<dyn UploadStore>) -> Self {
        Self {
            document_store,
            upload_store,
        }
    }
}

impl AppContext {
    pub fn new(cfg: Config, services: AppServices) -> Self {
        Self {
            cfg,
            services: Arc::new(services),
        }
    }

    pub fn document_store(&self) -> Arc<dyn DocumentStore> {
        self.services.document_store.clone()
    }

    pub fn upload_store(&self) -> Arc<dyn UploadStore> {
        self.services.upload_store.clone()
    }

    /// Releases the store client. Call once, after the server has stopped.
    pub async fn shutdown(&self) {
        self.services.document_store.close().await;
        tracing::info!("document_store_closed");
    }
}
