use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Normalized form of a document body handed to the editor.
///
/// `original` keeps the stored value verbatim, `html` is set when the source
/// was markup and `json` when it was a document tree. Fields of a structured
/// input that are not recognized are kept in `extra` so a pass-through value
/// serializes back to the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What a piece of stored text turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentShape {
    Html(String),
    Json(Value),
    Raw(String),
}

impl ContentShape {
    /// JSON if the text parses, markup otherwise.
    pub fn detect(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(tree) => ContentShape::Json(tree),
            Err(_) => ContentShape::Html(text.to_owned()),
        }
    }
}

impl CanonicalContent {
    /// Body of a document that has no stored content.
    pub fn empty() -> Self {
        Self {
            original: Some(Value::String(String::new())),
            html: Some(String::new()),
            ..Self::default()
        }
    }

    pub fn from_shape(original: Value, shape: ContentShape) -> Self {
        let mut out = Self {
            original: Some(original),
            ..Self::default()
        };
        out.apply(shape);
        out
    }

    fn apply(&mut self, shape: ContentShape) {
        match shape {
            ContentShape::Html(html) => self.html = Some(html),
            ContentShape::Json(tree) => self.json = Some(tree),
            ContentShape::Raw(_) => {}
        }
    }

    /// The shape this content resolved to, preferring the tree over markup.
    pub fn shape(&self) -> ContentShape {
        if let Some(tree) = &self.json {
            return ContentShape::Json(tree.clone());
        }
        if let Some(html) = &self.html {
            return ContentShape::Html(html.clone());
        }
        ContentShape::Raw(self.original.as_ref().map(text_of).unwrap_or_default())
    }

    pub fn is_populated(&self) -> bool {
        self.original.is_some() || self.html.is_some() || self.json.is_some()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Canonicalizes a stored `content` value. Never fails: every input shape
/// has a fallback.
pub fn normalize(raw: Option<&Value>) -> CanonicalContent {
    let Some(raw) = raw.filter(|v| !is_falsy(v)) else {
        tracing::debug!("document_has_no_content");
        return CanonicalContent::empty();
    };
    match raw {
        Value::String(text) => {
            CanonicalContent::from_shape(raw.clone(), ContentShape::detect(text))
        }
        Value::Object(fields) => normalize_fields(fields.clone()),
        Value::Array(_) => tree_content(raw.clone()),
        scalar => {
            tracing::warn!(kind = kind_of(scalar), "unexpected_content_type");
            let text = scalar.to_string();
            CanonicalContent::from_shape(Value::String(text.clone()), ContentShape::Raw(text))
        }
    }
}

fn normalize_fields(mut fields: Map<String, Value>) -> CanonicalContent {
    let html = take_field(&mut fields, "html", Value::is_string).and_then(|v| match v {
        Value::String(s) => Some(s),
        _ => None,
    });
    let json = take_field(&mut fields, "json", |v| !v.is_null());
    let original = take_field(&mut fields, "original", |v| !v.is_null());

    if html.is_some() || json.is_some() {
        return CanonicalContent {
            original,
            html,
            json,
            extra: fields,
        };
    }

    match original {
        Some(original) => {
            // unusable html/json values are replaced by the re-parsed ones
            fields.remove("html");
            fields.remove("json");
            let shape = ContentShape::detect(&text_of(&original));
            let mut out = CanonicalContent {
                original: Some(original),
                extra: fields,
                ..CanonicalContent::default()
            };
            out.apply(shape);
            out
        }
        None => {
            tracing::warn!(
                keys = ?fields.keys().collect::<Vec<_>>(),
                "content_object_has_no_recognized_fields"
            );
            tree_content(Value::Object(fields))
        }
    }
}

fn tree_content(tree: Value) -> CanonicalContent {
    CanonicalContent {
        original: Some(Value::String(tree.to_string())),
        json: Some(tree),
        ..CanonicalContent::default()
    }
}

fn take_field(fields: &mut Map<String, Value>, key: &str, accept: fn(&Value) -> bool) -> Option<Value> {
    if fields.get(key).is_some_and(accept) {
        fields.remove(key)
    } else {
        None
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
