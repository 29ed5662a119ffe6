use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::application::ports::document_store::{DocumentStore, ListFilter, StoreError};
use crate::domain::documents::document::{DocumentRecord, StampedDocument};

/// Documents table behind a hosted PostgREST endpoint (`{base}/rest/v1/{table}`).
pub struct PostgrestDocumentStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

impl PostgrestDocumentStore {
    pub fn new(base_url: &str, table: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            anyhow::bail!("POSTGREST_URL must be an http(s) origin, got {base:?}");
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("docvault/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/rest/v1/{}", base, table),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, method: Method) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, &self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(key) = self.api_key.as_deref() {
            req = req.header("apikey", key).bearer_auth(key);
        }
        req
    }

    fn returning(&self, method: Method) -> RequestBuilder {
        self.request(method)
            .header("Prefer", "return=representation")
    }

    fn insert_request(&self, doc: &StampedDocument) -> RequestBuilder {
        self.returning(Method::POST).json(doc)
    }

    fn update_request(&self, id: &str, doc: &StampedDocument) -> RequestBuilder {
        self.returning(Method::PATCH)
            .query(&[("id", eq(id))])
            .json(doc)
    }

    fn select_one_request(&self, id: &str) -> RequestBuilder {
        self.request(Method::GET)
            .query(&[("select", "*".to_string()), ("id", eq(id)), ("limit", "1".into())])
    }

    fn list_request(&self, filter: &ListFilter) -> RequestBuilder {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "updated_at.desc".to_string()),
        ];
        if let Some(user_id) = filter.user_id.as_deref() {
            query.push(("user_id", eq(user_id)));
        }
        self.request(Method::GET).query(&query)
    }

    fn delete_request(&self, id: &str) -> RequestBuilder {
        self.returning(Method::DELETE).query(&[("id", eq(id))])
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

async fn send(req: RequestBuilder) -> Result<Response, StoreError> {
    let resp = req
        .send()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(rejection(status, &body))
}

async fn read_rows(req: RequestBuilder) -> Result<Vec<DocumentRecord>, StoreError> {
    let body = send(req)
        .await?
        .bytes()
        .await
        .map_err(|e| StoreError::Transport(e.to_string()))?;
    decode_rows(&body)
}

fn decode_rows(body: &[u8]) -> Result<Vec<DocumentRecord>, StoreError> {
    serde_json::from_slice(body).map_err(|e| StoreError::Decode(e.to_string()))
}

fn rejection(status: StatusCode, body: &str) -> StoreError {
    match serde_json::from_str::<PostgrestErrorBody>(body) {
        Ok(err) => {
            let mut message = err
                .message
                .unwrap_or_else(|| format!("upstream returned status {}", status));
            if let Some(details) = err.details.filter(|d| !d.is_empty()) {
                message = format!("{message} ({details})");
            }
            if let Some(hint) = err.hint.filter(|h| !h.is_empty()) {
                message = format!("{message}; hint: {hint}");
            }
            StoreError::Rejected {
                status: Some(status.as_u16()),
                code: err.code,
                message,
            }
        }
        Err(_) => StoreError::Rejected {
            status: Some(status.as_u16()),
            code: None,
            message: if body.trim().is_empty() {
                format!("upstream returned status {}", status)
            } else {
                body.trim().to_string()
            },
        },
    }
}

#[async_trait]
impl DocumentStore for PostgrestDocumentStore {
    async fn insert(&self, doc: &StampedDocument) -> Result<Vec<DocumentRecord>, StoreError> {
        read_rows(self.insert_request(doc)).await
    }

    async fn update_by_id(
        &self,
        id: &str,
        doc: &StampedDocument,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        read_rows(self.update_request(id, doc)).await
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<DocumentRecord>, StoreError> {
        let rows = read_rows(self.select_one_request(id)).await?;
        Ok(rows.into_iter().next())
    }

    async fn select_list(&self, filter: &ListFilter) -> Result<Vec<DocumentRecord>, StoreError> {
        read_rows(self.list_request(filter)).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<u64, StoreError> {
        let removed = read_rows(self.delete_request(id)).await?;
        Ok(removed.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};

    fn store() -> PostgrestDocumentStore {
        PostgrestDocumentStore::new("https://abc.supabase.co", "documents", Some("anon-key".into()))
            .unwrap()
    }

    fn header<'r>(req: &'r reqwest::Request, name: &str) -> Option<&'r str> {
        req.headers().get(name).and_then(|v| v.to_str().ok())
    }

    fn json_body(req: &reqwest::Request) -> Value {
        let bytes = req.body().and_then(|b| b.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    fn stamped(id: Option<&str>) -> StampedDocument {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        StampedDocument {
            id: id.map(str::to_owned),
            title: None,
            content: Some(json!("<p>x</p>")),
            user_id: None,
            created_at: if id.is_none() { Some(now) } else { None },
            updated_at: now,
        }
    }

    #[test]
    fn every_request_carries_api_key_and_bearer() {
        let req = store().list_request(&ListFilter::default()).build().unwrap();
        assert_eq!(header(&req, "apikey"), Some("anon-key"));
        assert_eq!(header(&req, "authorization"), Some("Bearer anon-key"));
        assert_eq!(header(&req, "prefer"), None);
    }

    #[test]
    fn requests_without_key_send_no_auth() {
        let store = PostgrestDocumentStore::new("https://abc.supabase.co", "documents", None).unwrap();
        let req = store.select_one_request("1").build().unwrap();
        assert_eq!(header(&req, "apikey"), None);
        assert_eq!(header(&req, "authorization"), None);
    }

    #[test]
    fn writes_ask_for_the_affected_rows() {
        let store = store();
        let doc = stamped(Some("42"));
        for req in [
            store.insert_request(&stamped(None)),
            store.update_request("42", &doc),
            store.delete_request("42"),
        ] {
            let req = req.build().unwrap();
            assert_eq!(header(&req, "prefer"), Some("return=representation"));
        }
    }

    #[test]
    fn update_filters_by_id_and_sends_only_given_fields() {
        let req = store().update_request("42", &stamped(Some("42"))).build().unwrap();
        assert_eq!(req.method(), &Method::PATCH);
        assert_eq!(req.url().path(), "/rest/v1/documents");
        assert_eq!(req.url().query(), Some("id=eq.42"));
        let body = json_body(&req);
        assert_eq!(body["content"], json!("<p>x</p>"));
        assert!(body.get("title").is_none());
        assert!(body.get("created_at").is_none());
    }

    #[test]
    fn insert_posts_stamped_payload() {
        let req = store().insert_request(&stamped(None)).build().unwrap();
        assert_eq!(req.method(), &Method::POST);
        assert_eq!(req.url().query(), None);
        let body = json_body(&req);
        assert_eq!(body["created_at"], body["updated_at"]);
        assert!(body.get("id").is_none());
    }

    #[test]
    fn select_and_delete_filter_by_id() {
        let store = store();
        let req = store.select_one_request("7").build().unwrap();
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.url().query(), Some("select=*&id=eq.7&limit=1"));

        let req = store.delete_request("7").build().unwrap();
        assert_eq!(req.method(), &Method::DELETE);
        assert_eq!(req.url().query(), Some("id=eq.7"));
    }

    #[test]
    fn list_orders_newest_first_and_filters_by_owner() {
        let store = store();
        let req = store.list_request(&ListFilter::default()).build().unwrap();
        assert_eq!(req.url().query(), Some("select=*&order=updated_at.desc"));

        let filter = ListFilter {
            user_id: Some("alice".into()),
        };
        let req = store.list_request(&filter).build().unwrap();
        assert_eq!(
            req.url().query(),
            Some("select=*&order=updated_at.desc&user_id=eq.alice")
        );
    }

    #[test]
    fn numeric_ids_in_response_become_strings() {
        let rows = decode_rows(
            br#"[{"id":12,"title":"t","content":"<p>x</p>","user_id":null,
                 "created_at":"2024-03-01T10:00:00+00:00","updated_at":"2024-03-01T10:00:00+00:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].id, "12");
        assert_eq!(rows[0].content, json!("<p>x</p>"));
    }

    #[test]
    fn malformed_response_is_a_decode_error() {
        let err = decode_rows(b"{\"not\":\"a list\"}").unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn endpoint_is_built_from_base_and_table() {
        let store =
            PostgrestDocumentStore::new("https://abc.supabase.co/", "documents", None).unwrap();
        assert_eq!(store.endpoint(), "https://abc.supabase.co/rest/v1/documents");
    }

    #[test]
    fn non_http_base_is_rejected() {
        assert!(PostgrestDocumentStore::new("abc.supabase.co", "documents", None).is_err());
    }

    #[test]
    fn error_body_is_mapped() {
        let err = rejection(
            StatusCode::CONFLICT,
            r#"{"code":"23505","message":"duplicate key value","details":"Key (id)=(1) already exists.","hint":null}"#,
        );
        match err {
            StoreError::Rejected {
                status,
                code,
                message,
            } => {
                assert_eq!(status, Some(409));
                assert_eq!(code.as_deref(), Some("23505"));
                assert_eq!(message, "duplicate key value (Key (id)=(1) already exists.)");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn plain_text_error_is_kept() {
        let err = rejection(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(err.to_string(), "document store rejected the request: upstream down");
        let err = rejection(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(err.code(), None);
    }
}
