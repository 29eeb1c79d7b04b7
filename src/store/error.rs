//! Content store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between issuing a query and holding a typed
/// document. "Nothing matched" is not an error; it is a `null` result.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("content store rejected the credentials (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("malformed query: {0}")]
    Query(String),

    #[error("content store answered HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request to the content store failed")]
    Network(#[from] reqwest::Error),

    #[error("content store response is not valid JSON")]
    Decode(#[source] serde_json::Error),

    #[error("`{type_tag}` document does not match its declared shape")]
    ShapeMismatch {
        type_tag: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read dataset export `{}`", .0.display())]
    ExportIo(PathBuf, #[source] std::io::Error),

    #[error("dataset export `{}` line {line} is not a JSON document", .path.display())]
    ExportLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Map a non-success HTTP answer onto the matching variant.
    ///
    /// The store reports query problems as `{"error": {"description": ..}}`;
    /// anything else falls back to the raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.pointer("/error/description")
                    .or_else(|| v.pointer("/message"))
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| body.trim().to_owned());

        match status {
            401 | 403 => Self::Unauthorized { status },
            400 => Self::Query(message),
            _ => Self::Status { status, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_unauthorized() {
        let err = StoreError::from_status(401, r#"{"message":"Unauthorized"}"#);
        assert!(matches!(err, StoreError::Unauthorized { status: 401 }));
        let err = StoreError::from_status(403, "");
        assert!(matches!(err, StoreError::Unauthorized { status: 403 }));
    }

    #[test]
    fn test_from_status_query_description() {
        let body = r#"{"error":{"description":"expected ']' following expression","type":"queryParseError"}}"#;
        match StoreError::from_status(400, body) {
            StoreError::Query(message) => {
                assert_eq!(message, "expected ']' following expression");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_plain_body() {
        match StoreError::from_status(502, "  Bad Gateway\n") {
            StoreError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_shape_mismatch_display() {
        let source = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err = StoreError::ShapeMismatch {
            type_tag: "post".into(),
            source,
        };
        assert_eq!(err.to_string(), "`post` document does not match its declared shape");
    }
}
