/// Request payload extraction for the mutating endpoints
///
/// Create/update requests arrive either as a JSON object or as multipart
/// form data (text fields plus at most one attached file). Both shapes are
/// normalized into a `FormPayload` so the handlers stay agnostic of the
/// transport encoding. Multipart text fields are kept as strings; the
/// typed getters coerce them where a number, bool, or list is expected.
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Json,
};
use bytes::Bytes;
use serde_json::{Map, Value};

/// An uploaded file carried in a multipart request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Bytes,
}

/// Normalized request body: named fields plus an optional file
#[derive(Debug, Clone, Default)]
pub struct FormPayload {
    pub fields: Map<String, Value>,
    pub file: Option<UploadedFile>,
}

#[axum::async_trait]
impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?;

            let mut fields = Map::new();
            let mut file = None;

            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
            {
                let name = field.name().unwrap_or_default().to_string();
                if let Some(filename) = field.file_name().map(String::from) {
                    let data = field.bytes().await.map_err(|e| {
                        ApiError::Validation(format!("Invalid multipart body: {}", e))
                    })?;
                    file = Some(UploadedFile { filename, data });
                } else {
                    let text = field.text().await.map_err(|e| {
                        ApiError::Validation(format!("Invalid multipart body: {}", e))
                    })?;
                    fields.insert(name, Value::String(text));
                }
            }

            Ok(Self { fields, file })
        } else {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))?;

            match value {
                Value::Object(fields) => Ok(Self { fields, file: None }),
                _ => Err(ApiError::Validation(
                    "Request body must be a JSON object".to_string(),
                )),
            }
        }
    }
}

impl FormPayload {
    /// Whether the request provided a value for this field at all
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get a string field
    pub fn str_field(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Get a required, non-empty string field
    pub fn require_str(&self, name: &str, label: &str) -> ApiResult<String> {
        self.str_field(name)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::Validation(format!("{} is required", label)))
    }

    /// Get a numeric field; numeric strings from multipart are coerced
    pub fn f64_field(&self, name: &str) -> Option<f64> {
        match self.fields.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a boolean field; "true"/"false" strings from multipart are coerced
    pub fn bool_field(&self, name: &str) -> Option<bool> {
        match self.fields.get(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get a string-list field
    ///
    /// Accepts a JSON array of strings, or (from multipart text) either a
    /// JSON-encoded array or a comma-separated list.
    pub fn list_field(&self, name: &str) -> Option<Vec<String>> {
        match self.fields.get(name)? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            Value::String(s) => {
                if let Ok(parsed) = serde_json::from_str::<Vec<String>>(s) {
                    return Some(parsed);
                }
                Some(
                    s.split(',')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty())
                        .collect(),
                )
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> FormPayload {
        match value {
            Value::Object(fields) => FormPayload {
                fields,
                file: None,
            },
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_require_str() {
        let p = payload(json!({"title": "Demo", "empty": "   "}));
        assert_eq!(p.require_str("title", "Title").unwrap(), "Demo");
        assert!(p.require_str("empty", "Empty").is_err());
        assert!(p.require_str("missing", "Missing").is_err());
    }

    #[test]
    fn test_numeric_coercion() {
        let p = payload(json!({"rating": 8.5, "rating_text": "9.0", "bad": "nope"}));
        assert_eq!(p.f64_field("rating"), Some(8.5));
        assert_eq!(p.f64_field("rating_text"), Some(9.0));
        assert_eq!(p.f64_field("bad"), None);
    }

    #[test]
    fn test_bool_coercion() {
        let p = payload(json!({"published": true, "flag": "false"}));
        assert_eq!(p.bool_field("published"), Some(true));
        assert_eq!(p.bool_field("flag"), Some(false));
    }

    #[test]
    fn test_list_field_shapes() {
        let p = payload(json!({
            "tags": ["rust", "axum"],
            "json_text": "[\"a\",\"b\"]",
            "csv_text": "one, two , three",
        }));
        assert_eq!(p.list_field("tags").unwrap(), vec!["rust", "axum"]);
        assert_eq!(p.list_field("json_text").unwrap(), vec!["a", "b"]);
        assert_eq!(p.list_field("csv_text").unwrap(), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_has_distinguishes_absent_fields() {
        let p = payload(json!({"title": "x"}));
        assert!(p.has("title"));
        assert!(!p.has("description"));
    }
}
