//! `[store]` section configuration.
//!
//! Connection settings for the content store: project, dataset, API version,
//! credential source and cache behaviour.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which document revisions a query sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    /// Published documents only; `drafts.*` ids are hidden (default).
    #[default]
    Published,
    /// Everything, drafts included.
    Raw,
}

impl Perspective {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Raw => "raw",
        }
    }
}

/// `[store]` section in vitrine.toml.
///
/// # Example
/// ```toml
/// [store]
/// project_id = "abc123xy"
/// dataset = "production"
/// api_version = "2023-05-03"
/// token_env = "SANITY_API_TOKEN"
/// use_cdn = false
/// ```
///
/// Setting `export` points the pipeline at a local NDJSON dataset export
/// instead of the remote API.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Project identifier, the subdomain of the API host.
    #[serde(default)]
    pub project_id: String,

    /// Dataset name inside the project.
    #[serde(default = "defaults::store::dataset")]
    #[educe(Default = defaults::store::dataset())]
    pub dataset: String,

    /// API version date, without the leading `v`.
    #[serde(default = "defaults::store::api_version")]
    #[educe(Default = defaults::store::api_version())]
    pub api_version: String,

    /// Environment variable holding the read token.
    #[serde(default = "defaults::store::token_env")]
    #[educe(Default = defaults::store::token_env())]
    pub token_env: String,

    /// Query the edge cache instead of the live API.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub use_cdn: bool,

    #[serde(default = "defaults::store::perspective")]
    #[educe(Default = defaults::store::perspective())]
    pub perspective: Perspective,

    /// Replaces `https://<project>.api.sanity.io`, e.g. for a proxy.
    #[serde(default)]
    pub api_host: Option<String>,

    /// NDJSON dataset export to read instead of the remote API.
    #[serde(default)]
    pub export: Option<PathBuf>,
}

impl StoreConfig {
    /// Base URL of the query endpoint, without query string.
    pub fn query_url(&self) -> String {
        let host = match &self.api_host {
            Some(host) => host.trim_end_matches('/').to_owned(),
            None if self.use_cdn => format!("https://{}.apicdn.sanity.io", self.project_id),
            None => format!("https://{}.api.sanity.io", self.project_id),
        };
        format!(
            "{host}/v{}/data/query/{}",
            self.api_version.trim_start_matches('v'),
            self.dataset
        )
    }
}
