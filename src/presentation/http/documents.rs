use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::ports::document_store::StoreError;
use crate::application::use_cases::documents::delete_document::DeleteDocument;
use crate::application::use_cases::documents::error::DocumentError;
use crate::application::use_cases::documents::get_document::GetDocument;
use crate::application::use_cases::documents::list_documents::ListDocuments;
use crate::application::use_cases::documents::save_document::SaveDocument;
use crate::bootstrap::app_context::AppContext;
use crate::domain::documents::content::CanonicalContent;
use crate::domain::documents::document::{self as domain, DocumentDraft};

/// Stored row; `content` is returned exactly as persisted.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
    pub user_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Document ready for the editor, `content` canonicalized.
#[derive(Debug, Serialize, ToSchema)]
pub struct Document {
    pub id: String,
    pub title: String,
    #[schema(value_type = Object)]
    pub content: CanonicalContent,
    pub user_id: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentListResponse {
    pub items: Vec<DocumentRow>,
}

/// Fields left out of an update keep their stored value. Ids may be strings or numbers.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveDocumentRequest {
    #[serde(default, deserialize_with = "domain::deserialize_optional_id")]
    #[schema(value_type = Option<String>)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub content: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "domain::deserialize_optional_id")]
    #[schema(value_type = Option<String>)]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreErrorBody {
    pub message: String,
    pub code: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveDocumentResponse {
    pub data: Option<Vec<DocumentRow>>,
    pub error: Option<StoreErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub user_id: Option<String>,
}

impl From<domain::DocumentRecord> for DocumentRow {
    fn from(r: domain::DocumentRecord) -> Self {
        Self {
            id: r.id,
            title: r.title,
            content: r.content,
            user_id: r.user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<SaveDocumentRequest> for DocumentDraft {
    fn from(req: SaveDocumentRequest) -> Self {
        Self {
            id: req.id,
            title: req.title,
            content: req.content,
            user_id: req.user_id,
        }
    }
}

impl From<&StoreError> for StoreErrorBody {
    fn from(err: &StoreError) -> Self {
        Self {
            message: err.to_string(),
            code: err.code().map(str::to_owned),
        }
    }
}

fn status_for(err: &DocumentError) -> StatusCode {
    match err {
        DocumentError::InvalidId => StatusCode::BAD_REQUEST,
        DocumentError::NotFound(_) => StatusCode::NOT_FOUND,
        DocumentError::Backend(_) => StatusCode::BAD_GATEWAY,
    }
}

#[utoipa::path(get, path = "/api/documents", tag = "Documents",
    params(("user_id" = Option<String>, Query, description = "Only documents owned by this user")),
    responses((status = 200, body = DocumentListResponse)))]
pub async fn list_documents(
    State(ctx): State<AppContext>,
    q: Option<Query<ListDocumentsQuery>>,
) -> Result<Json<DocumentListResponse>, StatusCode> {
    let user_id = q.and_then(|Query(v)| v.user_id);
    let store = ctx.document_store();
    let uc = ListDocuments {
        store: store.as_ref(),
    };
    let rows = uc
        .execute(user_id)
        .await
        .map_err(|e| status_for(&e))?;
    Ok(Json(DocumentListResponse {
        items: rows.into_iter().map(DocumentRow::from).collect(),
    }))
}

#[utoipa::path(post, path = "/api/documents", tag = "Documents", request_body = SaveDocumentRequest,
    responses(
        (status = 200, body = SaveDocumentResponse),
        (status = 502, description = "Store rejected the write", body = SaveDocumentResponse)
    ))]
pub async fn save_document(
    State(ctx): State<AppContext>,
    Json(req): Json<SaveDocumentRequest>,
) -> (StatusCode, Json<SaveDocumentResponse>) {
    let draft = DocumentDraft::from(req);
    let store = ctx.document_store();
    let uc = SaveDocument {
        store: store.as_ref(),
    };
    let outcome = uc.execute(draft).await;
    let status = if outcome.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    let body = SaveDocumentResponse {
        error: outcome.error.as_ref().map(StoreErrorBody::from),
        data: outcome
            .data
            .map(|rows| rows.into_iter().map(DocumentRow::from).collect()),
    };
    (status, Json(body))
}

#[utoipa::path(get, path = "/api/documents/{id}", tag = "Documents",
    params(("id" = String, Path, description = "Document ID")),
    responses(
        (status = 200, body = Document),
        (status = 404, description = "No such document")
    ))]
pub async fn get_document(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<Document>, StatusCode> {
    let store = ctx.document_store();
    let uc = GetDocument {
        store: store.as_ref(),
    };
    let doc = uc.execute(&id).await.map_err(|e| status_for(&e))?;
    Ok(Json(Document {
        id: doc.id,
        title: doc.title,
        content: doc.content,
        user_id: doc.user_id,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    }))
}

#[utoipa::path(delete, path = "/api/documents/{id}", tag = "Documents",
    params(("id" = String, Path, description = "Document ID")),
    responses((status = 204), (status = 404)))]
pub async fn delete_document(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let store = ctx.document_store();
    let uc = DeleteDocument {
        store: store.as_ref(),
    };
    let removed = uc.execute(&id).await.map_err(|e| {
        tracing::error!(document_id = %id, error = ?e, "document_delete_failed");
        status_for(&e)
    })?;
    if removed > 0 {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/documents", get(list_documents).post(save_document))
        .route("/documents/:id", get(get_document).delete(delete_document))
        .with_state(ctx)
}
