use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::documents::content::{self, CanonicalContent};

/// A document as handed to the editor, with its body canonicalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: CanonicalContent,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One stored row, `content` exactly as the store returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(deserialize_with = "deserialize_opaque_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_nullable_text")]
    pub title: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn into_document(self) -> Document {
        let content = content::normalize(Some(&self.content));
        Document {
            id: self.id,
            title: self.title,
            content,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// What a caller hands to save. Timestamps are not part of it, and fields
/// left as `None` are not touched on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub content: Option<Value>,
    pub user_id: Option<String>,
}

impl DocumentDraft {
    /// Id of the row this draft updates; blank ids mean a new document.
    pub fn existing_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    pub fn stamp(self, now: DateTime<Utc>) -> StampedDocument {
        let id = self.existing_id().map(str::to_owned);
        let created_at = if id.is_none() { Some(now) } else { None };
        StampedDocument {
            id,
            title: self.title,
            content: self.content,
            user_id: self.user_id,
            created_at,
            updated_at: now,
        }
    }
}

/// Write payload sent to the store. `created_at` is only present on insert;
/// absent fields keep their stored value on update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StampedDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

// Hosted stores hand back identity columns as numbers and uuid columns as strings.
fn deserialize_opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

pub(crate) fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn deserialize_nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
