//! Read-only dataset inspection: image blocks embedded in post bodies.
//!
//! Lists every image block with its decoded asset and CDN URL, and flags
//! blocks whose asset reference is missing or malformed. Nothing is written
//! back to the store.

use crate::{
    config::SiteConfig,
    document::{Block, ImageBlock, fetch_query},
    log,
    render::{ImageAsset, ImageUrls},
    store::{ContentStore, Params, StoreError},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const POSTS_WITH_BODY: &str = r#"*[_type == "post" && defined(body)] | order(_id asc){_id, title, body}"#;

/// Bodies stay raw so one malformed post is reported, not fatal.
#[derive(Debug, Deserialize)]
struct PostBody {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: Value,
    #[serde(default)]
    body: Value,
}

impl PostBody {
    fn title(&self) -> String {
        self.title.as_str().unwrap_or_default().to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    pub post_id: String,
    pub post_title: String,
    pub block_key: String,
    pub asset_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<ImageAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImageReport {
    pub posts: usize,
    pub entries: Vec<ImageEntry>,
}

impl ImageReport {
    pub fn problems(&self) -> usize {
        self.entries.iter().filter(|e| e.problem.is_some()).count()
    }
}

/// Query every post with a body and collect its image blocks in body order.
pub async fn collect_images<S: ContentStore>(
    store: &S,
    images: &ImageUrls,
) -> Result<ImageReport, StoreError> {
    let posts: Vec<PostBody> = fetch_query(store, POSTS_WITH_BODY, &Params::new(), "post")
        .await?
        .found()
        .unwrap_or_default();

    let mut report = ImageReport {
        posts: posts.len(),
        entries: Vec::new(),
    };
    for post in &posts {
        match Vec::<Block>::deserialize(&post.body) {
            Ok(blocks) => report.entries.extend(blocks.iter().filter_map(|block| match block {
                Block::Image(image) => Some(entry(post, image, images)),
                _ => None,
            })),
            Err(err) => {
                log!("warn"; "{}: body does not decode: {err}", post.id);
                report.entries.push(ImageEntry {
                    post_id: post.id.clone(),
                    post_title: post.title(),
                    block_key: String::new(),
                    asset_ref: None,
                    asset: None,
                    url: None,
                    problem: Some(format!("body does not decode: {err}")),
                });
            }
        }
    }
    Ok(report)
}

fn entry(post: &PostBody, image: &ImageBlock, images: &ImageUrls) -> ImageEntry {
    let asset_ref = image.asset.as_ref().map(|r| r.id.clone());
    let (asset, problem) = match asset_ref.as_deref().map(str::parse::<ImageAsset>) {
        Some(Ok(asset)) => (Some(asset), None),
        Some(Err(err)) => (None, Some(err.to_string())),
        None => (None, Some("image block has no asset".to_owned())),
    };

    ImageEntry {
        post_id: post.id.clone(),
        post_title: post.title(),
        block_key: image.key.clone(),
        url: asset.as_ref().map(|a| images.url(a)),
        asset_ref,
        asset,
        problem,
    }
}

/// `vitrine images`: print the report, or log the store error and fail.
pub async fn run<S: ContentStore>(store: &S, config: &SiteConfig, json: bool) -> Result<()> {
    let images = ImageUrls::from_config(&config.store);
    let report = match collect_images(store, &images).await {
        Ok(report) => report,
        Err(err) => {
            log!("error"; "image inspection failed: {err}");
            return Err(err).context("failed to query posts");
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for entry in &report.entries {
        match (&entry.asset, &entry.url, &entry.problem) {
            (Some(asset), Some(url), _) => log!(
                "images";
                "{} [{}] {}x{} {} {url}",
                entry.post_id, entry.block_key, asset.width, asset.height, asset.format
            ),
            (_, _, problem) => log!(
                "warn";
                "{} [{}] {}",
                entry.post_id, entry.block_key, problem.as_deref().unwrap_or("unresolved")
            ),
        }
    }
    log!(
        "images";
        "{} image(s) across {} post(s), {} problem(s)",
        report.entries.len(), report.posts, report.problems()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Perspective;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn image(key: &str, asset: Option<&str>) -> serde_json::Value {
        match asset {
            Some(asset) => json!({"_type": "image", "_key": key, "asset": {"_ref": asset}}),
            None => json!({"_type": "image", "_key": key}),
        }
    }

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![
                json!({
                    "_id": "post-a",
                    "_type": "post",
                    "title": "A",
                    "body": [
                        {"_type": "block", "_key": "t", "children": [{"text": "x"}]},
                        image("i1", Some("image-abc123-800x600-png")),
                        image("i2", Some("not-an-asset")),
                        image("i3", None)
                    ]
                }),
                json!({"_id": "post-b", "_type": "post", "title": "B", "body": []}),
                json!({"_id": "post-c", "_type": "post", "title": "No body"}),
                json!({"_id": "expert-1", "_type": "expert", "name": "E",
                       "bio": [image("x", Some("image-def456-10x10-jpg"))]}),
            ],
            Perspective::Published,
        )
    }

    #[tokio::test]
    async fn test_collect_images() {
        let report = collect_images(&store(), &ImageUrls::new("proj", "production"))
            .await
            .unwrap();

        // post-c has no body, experts are out of scope
        assert_eq!(report.posts, 2);
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.problems(), 2);

        let ok = &report.entries[0];
        assert_eq!(ok.block_key, "i1");
        assert_eq!(ok.asset.as_ref().unwrap().width, 800);
        assert_eq!(
            ok.url.as_deref(),
            Some("https://cdn.sanity.io/images/proj/production/abc123-800x600.png")
        );

        assert!(report.entries[1].problem.as_deref().unwrap().contains("not-an-asset"));
        assert_eq!(report.entries[2].asset_ref, None);
    }

    #[tokio::test]
    async fn test_report_json_omits_missing_parts() {
        let report = collect_images(&store(), &ImageUrls::default()).await.unwrap();
        let value = serde_json::to_value(&report.entries[1]).unwrap();
        assert_eq!(value["postId"], "post-a");
        assert!(value.get("url").is_none());
        assert!(value.get("problem").is_some());
    }

    #[tokio::test]
    async fn test_malformed_body_is_reported() {
        let store = MemoryStore::new(
            vec![
                json!({"_id": "post-a", "_type": "post", "title": 7, "body": "not blocks"}),
                json!({"_id": "post-b", "_type": "post", "title": "B",
                       "body": [image("ok", Some("image-abc123-800x600-png"))]}),
            ],
            Perspective::Published,
        );
        let report = collect_images(&store, &ImageUrls::default()).await.unwrap();

        assert_eq!(report.posts, 2);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.problems(), 1);

        let broken = &report.entries[0];
        assert_eq!(broken.post_id, "post-a");
        assert_eq!(broken.post_title, "");
        assert!(broken.problem.as_deref().unwrap().starts_with("body does not decode"));
        assert_eq!(report.entries[1].block_key, "ok");
    }

    #[tokio::test]
    async fn test_empty_dataset() {
        let store = MemoryStore::new(vec![], Perspective::Published);
        let report = collect_images(&store, &ImageUrls::default()).await.unwrap();
        assert_eq!(report, ImageReport::default());
    }
}
