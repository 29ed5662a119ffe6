use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::application::ports::upload_store::{StoredUpload, UploadStore};

/// Durable uploads under `uploads_root/{id}/{filename}`.
pub struct FsUploadStore {
    pub uploads_root: PathBuf,
}

impl FsUploadStore {
    pub fn new(uploads_root: impl AsRef<Path>) -> Self {
        Self {
            uploads_root: uploads_root.as_ref().to_path_buf(),
        }
    }
}

pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let mut s = base.trim().to_string();
    let invalid = [':', '*', '?', '"', '<', '>', '|', '\0'];
    for ch in invalid {
        s = s.replace(ch, "-");
    }
    s = s.replace(' ', "_");
    if s.len() > 100 {
        let mut cut = 100;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    if s.is_empty() || s.chars().all(|c| c == '.') {
        s = "file.bin".into();
    }
    s
}

#[async_trait]
impl UploadStore for FsUploadStore {
    async fn store_upload(
        &self,
        original_filename: Option<&str>,
        bytes: &[u8],
    ) -> anyhow::Result<StoredUpload> {
        use tokio::fs;

        let id = Uuid::new_v4();
        let dir = self.uploads_root.join(id.to_string());
        fs::create_dir_all(&dir).await?;

        let filename = sanitize_filename(original_filename.unwrap_or("file.bin"));
        fs::write(dir.join(&filename), bytes).await?;
        tracing::debug!(upload_id = %id, filename = %filename, size = bytes.len(), "upload_stored");

        Ok(StoredUpload {
            id,
            relative_path: format!("{}/{}", id, filename),
            filename,
            size: bytes.len() as i64,
        })
    }
}
