//! Content store access.
//!
//! One operation, [`ContentStore::fetch`]: run a GROQ query with parameters
//! and return the raw JSON result. `null` means nothing matched and is not an
//! error. Two backends:
//!
//! - [`HttpStore`]: the hosted query API (always uncached unless `use_cdn`)
//! - [`MemoryStore`]: an NDJSON dataset export, for offline builds and tests
//!
//! [`Store`] picks one from configuration at startup; it is then passed by
//! reference to everything that reads content.

mod error;
mod groq;
mod http;
mod memory;

pub use error::StoreError;
pub use http::HttpStore;
pub use memory::MemoryStore;

use crate::config::StoreConfig;
use serde_json::Value;
use std::{collections::BTreeMap, future::Future};

/// Query parameters, by name without the leading `$`.
pub type Params = BTreeMap<String, Value>;

/// Build [`Params`] from name/value pairs.
pub fn params<const N: usize>(pairs: [(&str, Value); N]) -> Params {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
}

/// A queryable document store.
pub trait ContentStore: Send + Sync {
    fn fetch(
        &self,
        query: &str,
        params: &Params,
    ) -> impl Future<Output = Result<Value, StoreError>> + Send;
}

/// The store selected by configuration.
#[derive(Debug, Clone)]
pub enum Store {
    Http(HttpStore),
    Memory(MemoryStore),
}

impl Store {
    /// An `export` file wins over the remote settings.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        match &config.export {
            Some(path) => Ok(Self::Memory(MemoryStore::open(path, config.perspective)?)),
            None => Ok(Self::Http(HttpStore::from_env(config))),
        }
    }

    /// Short human-readable origin, for log lines.
    pub fn describe(&self) -> String {
        match self {
            Self::Http(store) if store.has_token() => format!("{} (token)", store.url()),
            Self::Http(store) => store.url().to_owned(),
            Self::Memory(store) if store.is_empty() => "dataset export (empty)".to_owned(),
            Self::Memory(store) => format!("dataset export ({} documents)", store.len()),
        }
    }
}

impl ContentStore for Store {
    async fn fetch(&self, query: &str, params: &Params) -> Result<Value, StoreError> {
        match self {
            Self::Http(store) => store.fetch(query, params).await,
            Self::Memory(store) => store.fetch(query, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_params_helper() {
        let p = params([("type", json!("post")), ("id", json!("post-1"))]);
        assert_eq!(p.len(), 2);
        assert_eq!(p["type"], "post");
    }

    #[test]
    fn test_from_config_prefers_export() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"_id":"post-1","_type":"post","title":"Hello"}}"#).unwrap();

        let config = StoreConfig {
            project_id: "abc123".into(),
            export: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let store = Store::from_config(&config).unwrap();
        assert!(matches!(store, Store::Memory(_)));
        assert_eq!(store.describe(), "dataset export (1 documents)");
    }

    #[test]
    fn test_describe_empty_export() {
        let store = Store::Memory(MemoryStore::new(vec![], crate::config::Perspective::Published));
        assert_eq!(store.describe(), "dataset export (empty)");
    }

    #[test]
    fn test_from_config_remote() {
        let config = StoreConfig {
            project_id: "abc123".into(),
            token_env: "VITRINE_TEST_TOKEN_THAT_IS_NEVER_SET".into(),
            ..Default::default()
        };
        let store = Store::from_config(&config).unwrap();
        assert!(matches!(store, Store::Http(_)));
        assert!(store.describe().starts_with("https://abc123.api.sanity.io/"));
    }

    #[tokio::test]
    async fn test_store_delegates_to_backend() {
        let store = Store::Memory(MemoryStore::new(
            vec![json!({"_id": "post-1", "_type": "post", "title": "Hello"})],
            crate::config::Perspective::Published,
        ));
        let result = store
            .fetch("*[_id == $id][0]{title}", &params([("id", json!("post-1"))]))
            .await
            .unwrap();
        assert_eq!(result, json!({"title": "Hello"}));
    }
}
