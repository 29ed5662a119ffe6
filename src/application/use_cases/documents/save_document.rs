use chrono::{DateTime, Utc};

use crate::application::ports::document_store::{DocumentStore, StoreError};
use crate::domain::documents::document::{DocumentDraft, DocumentRecord};

/// Result of a save. Store failures land in `error` instead of being raised;
/// check it before reading `data`.
#[derive(Debug)]
pub struct SaveOutcome {
    pub data: Option<Vec<DocumentRecord>>,
    pub error: Option<StoreError>,
}

impl SaveOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<DocumentRecord>, StoreError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data.unwrap_or_default()),
        }
    }
}

pub struct SaveDocument<'a, S: DocumentStore + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: DocumentStore + ?Sized> SaveDocument<'a, S> {
    pub async fn execute(&self, draft: DocumentDraft) -> SaveOutcome {
        self.execute_at(draft, Utc::now()).await
    }

    // Content is written verbatim; normalization only happens on read.
    pub async fn execute_at(&self, draft: DocumentDraft, now: DateTime<Utc>) -> SaveOutcome {
        let stamped = draft.stamp(now);
        let result = match stamped.id.as_deref() {
            Some(id) => {
                tracing::info!(document_id = %id, "document_update");
                self.store.update_by_id(id, &stamped).await
            }
            None => {
                tracing::info!("document_create");
                self.store.insert(&stamped).await
            }
        };
        match result {
            Ok(rows) => SaveOutcome {
                data: Some(rows),
                error: None,
            },
            Err(err) => {
                tracing::error!(error = ?err, document_id = ?stamped.id, "save_document_failed");
                SaveOutcome {
                    data: None,
                    error: Some(err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::document_store::ListFilter;
    use crate::domain::documents::document::StampedDocument;
    use crate::infrastructure::memory::InMemoryDocumentStore;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Insert(StampedDocument),
        Update(String, StampedDocument),
    }

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<Call>>,
        fail: bool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn respond(&self, doc: &StampedDocument, id: &str) -> Result<Vec<DocumentRecord>, StoreError> {
            if self.fail {
                return Err(StoreError::Rejected {
                    status: Some(403),
                    code: Some("42501".into()),
                    message: "permission denied for table documents".into(),
                });
            }
            Ok(vec![DocumentRecord {
                id: id.to_owned(),
                title: doc.title.clone().unwrap_or_default(),
                content: doc.content.clone().unwrap_or_default(),
                user_id: doc.user_id.clone(),
                created_at: doc.created_at.unwrap_or(doc.updated_at),
                updated_at: doc.updated_at,
            }])
        }
    }

    #[async_trait]
    impl DocumentStore for RecordingStore {
        async fn insert(&self, doc: &StampedDocument) -> Result<Vec<DocumentRecord>, StoreError> {
            self.calls.lock().unwrap().push(Call::Insert(doc.clone()));
            self.respond(doc, "new-id")
        }

        async fn update_by_id(
            &self,
            id: &str,
            doc: &StampedDocument,
        ) -> Result<Vec<DocumentRecord>, StoreError> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(id.to_owned(), doc.clone()));
            self.respond(doc, id)
        }

        async fn select_by_id(&self, _id: &str) -> Result<Option<DocumentRecord>, StoreError> {
            Ok(None)
        }

        async fn select_list(&self, _filter: &ListFilter) -> Result<Vec<DocumentRecord>, StoreError> {
            Ok(Vec::new())
        }

        async fn delete_by_id(&self, _id: &str) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn draft_without_id_is_inserted_with_matching_timestamps() {
        let store = RecordingStore::default();
        let uc = SaveDocument { store: &store };
        let outcome = uc
            .execute(DocumentDraft {
                title: Some("A".into()),
                content: Some(json!("<p>hi</p>")),
                ..Default::default()
            })
            .await;

        assert!(outcome.is_ok());
        let rows = outcome.data.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "A");
        assert_eq!(rows[0].created_at, rows[0].updated_at);

        let calls = store.calls();
        let [Call::Insert(payload)] = calls.as_slice() else {
            panic!("expected a single insert, got {calls:?}");
        };
        assert_eq!(payload.created_at, Some(payload.updated_at));
        assert_eq!(payload.content, Some(json!("<p>hi</p>")));
    }

    #[tokio::test]
    async fn draft_with_id_is_updated_without_created_at() {
        let store = RecordingStore::default();
        let uc = SaveDocument { store: &store };
        let outcome = uc
            .execute(DocumentDraft {
                id: Some("42".into()),
                title: Some("B".into()),
                content: Some(json!("{}")),
                user_id: None,
            })
            .await;

        assert!(outcome.is_ok());
        let calls = store.calls();
        let [Call::Update(id, payload)] = calls.as_slice() else {
            panic!("expected a single update, got {calls:?}");
        };
        assert_eq!(id, "42");
        assert_eq!(payload.created_at, None);
        // stored verbatim, not normalized
        assert_eq!(payload.content, Some(json!("{}")));
    }

    #[tokio::test]
    async fn store_failure_is_returned_not_raised() {
        let store = RecordingStore::failing();
        let uc = SaveDocument { store: &store };
        let outcome = uc
            .execute(DocumentDraft {
                title: Some("C".into()),
                ..Default::default()
            })
            .await;

        assert!(!outcome.is_ok());
        assert!(outcome.data.is_none());
        assert_eq!(outcome.error.as_ref().and_then(|e| e.code()), Some("42501"));
        assert!(outcome.into_result().is_err());
    }

    #[tokio::test]
    async fn later_save_wins() {
        let store = InMemoryDocumentStore::default();
        let uc = SaveDocument { store: &store };
        let created = uc
            .execute(DocumentDraft {
                title: Some("first".into()),
                content: Some(json!("<p>1</p>")),
                ..Default::default()
            })
            .await
            .into_result()
            .unwrap();
        let id = created[0].id.clone();
        let created_at = created[0].created_at;

        let later = created_at + chrono::Duration::seconds(5);
        let updated = uc
            .execute_at(
                DocumentDraft {
                    id: Some(id.clone()),
                    title: Some("second".into()),
                    content: Some(json!("<p>2</p>")),
                    user_id: None,
                },
                later,
            )
            .await
            .into_result()
            .unwrap();

        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].title, "second");
        assert_eq!(updated[0].created_at, created_at);
        assert_eq!(updated[0].updated_at, later);
    }

    #[tokio::test]
    async fn partial_save_keeps_fields_left_out() {
        let store = InMemoryDocumentStore::default();
        let uc = SaveDocument { store: &store };
        let created = uc
            .execute(DocumentDraft {
                title: Some("Plan".into()),
                content: Some(json!("<p>old</p>")),
                user_id: Some("alice".into()),
                ..Default::default()
            })
            .await
            .into_result()
            .unwrap();
        let id = created[0].id.clone();

        let rows = uc
            .execute(DocumentDraft {
                id: Some(id.clone()),
                content: Some(json!("<p>new</p>")),
                ..Default::default()
            })
            .await
            .into_result()
            .unwrap();
        assert_eq!(rows[0].title, "Plan");
        assert_eq!(rows[0].content, json!("<p>new</p>"));
        assert_eq!(rows[0].user_id.as_deref(), Some("alice"));

        let rows = uc
            .execute(DocumentDraft {
                id: Some(id),
                title: Some("Renamed".into()),
                ..Default::default()
            })
            .await
            .into_result()
            .unwrap();
        assert_eq!(rows[0].title, "Renamed");
        assert_eq!(rows[0].content, json!("<p>new</p>"));
    }
}
