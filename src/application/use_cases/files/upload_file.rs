use uuid::Uuid;

use crate::application::ports::upload_store::UploadStore;

pub struct UploadFile<'a, S>
where
    S: UploadStore + ?Sized,
{
    pub storage: &'a S,
    pub public_base_url: Option<String>,
}

pub struct UploadedFile {
    pub id: Uuid,
    pub url: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
}

impl<'a, S> UploadFile<'a, S>
where
    S: UploadStore + ?Sized,
{
    pub async fn execute(
        &self,
        bytes: Vec<u8>,
        orig_filename: Option<String>,
        content_type: Option<String>,
    ) -> anyhow::Result<UploadedFile> {
        let stored = self
            .storage
            .store_upload(orig_filename.as_deref(), &bytes)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, "store_upload_failed");
                err
            })?;
        let content_type = content_type.or_else(|| {
            mime_guess::from_path(&stored.filename)
                .first_raw()
                .map(str::to_owned)
        });
        let relative = stored.relative_path.trim_start_matches('/');
        let url = if let Some(base) = self.public_base_url.as_deref() {
            let origin = base.trim_end_matches('/');
            format!("{}/api/uploads/{}", origin, relative)
        } else {
            format!("/api/uploads/{}", relative)
        };
        Ok(UploadedFile {
            id: stored.id,
            url,
            filename: stored.filename,
            content_type,
            size: stored.size,
        })
    }
}
