use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub id: Uuid,
    pub filename: String,
    pub relative_path: String,
    pub size: i64,
}

#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn store_upload(
        &self,
        original_filename: Option<&str>,
        bytes: &[u8],
    ) -> anyhow::Result<StoredUpload>;
}
