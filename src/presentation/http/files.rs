use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::use_cases::files::upload_file::UploadFile;
use crate::bootstrap::app_context::AppContext;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadFileResponse {
    pub id: Uuid,
    pub url: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size: i64,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadFileMultipart {
    /// File to upload
    #[schema(value_type = String, format = Binary)]
    file: String,
}

/// POST /api/files (multipart/form-data)
/// Fields:
/// - file: binary file (required)
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "Files",
    request_body(
        content = UploadFileMultipart,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "File uploaded", body = UploadFileResponse),
        (status = 413, description = "File exceeds UPLOAD_MAX_BYTES")
    )
)]
pub async fn upload_file(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadFileResponse>, StatusCode> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut orig_filename: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() != Some("file") {
            continue;
        }
        orig_filename = field.file_name().map(|s| s.to_string());
        content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        if data.len() > ctx.cfg.upload_max_bytes {
            return Err(StatusCode::PAYLOAD_TOO_LARGE);
        }
        file_bytes = Some(data.to_vec());
    }

    let bytes = file_bytes.ok_or(StatusCode::BAD_REQUEST)?;

    let storage = ctx.upload_store();
    let uc = UploadFile {
        storage: storage.as_ref(),
        public_base_url: ctx.cfg.public_base_url.clone(),
    };
    let f = uc
        .execute(bytes, orig_filename, content_type)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(UploadFileResponse {
        id: f.id,
        url: f.url,
        filename: f.filename,
        content_type: f.content_type,
        size: f.size,
    }))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/files", post(upload_file))
        .with_state(ctx)
}
