//! Remote content store client.

use super::{ContentStore, Params, StoreError};
use crate::config::{Perspective, StoreConfig};
use serde::Deserialize;
use serde_json::Value;

/// Response envelope of the query endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Value,
}

/// Client for the hosted query API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
    perspective: Perspective,
}

impl HttpStore {
    pub fn new(config: &StoreConfig, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.query_url(),
            token,
            perspective: config.perspective,
        }
    }

    /// Build a client, reading the token from `config.token_env` once.
    pub fn from_env(config: &StoreConfig) -> Self {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|token| !token.trim().is_empty());
        Self::new(config, token)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Query string pairs: the query, every `$param` as JSON, the perspective.
    fn query_pairs(&self, query: &str, params: &Params) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(params.len() + 2);
        pairs.push(("query".to_owned(), query.to_owned()));
        pairs.extend(
            params
                .iter()
                .map(|(name, value)| (format!("${name}"), value.to_string())),
        );
        pairs.push(("perspective".to_owned(), self.perspective.as_str().to_owned()));
        pairs
    }
}

impl ContentStore for HttpStore {
    async fn fetch(&self, query: &str, params: &Params) -> Result<Value, StoreError> {
        let mut request = self
            .client
            .get(&self.url)
            .query(&self.query_pairs(query, params));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::from_status(status.as_u16(), &body));
        }

        let envelope: Envelope = serde_json::from_str(&body).map_err(StoreError::Decode)?;
        Ok(envelope.result)
    }
}
