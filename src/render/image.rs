//! Image asset references and CDN URLs.
//!
//! Asset ids encode everything needed to build a URL:
//! `image-<hash>-<width>x<height>-<format>`.

use crate::config::StoreConfig;
use crate::document::ImageBlock;
use regex::Regex;
use serde::Serialize;
use std::{str::FromStr, sync::LazyLock};
use thiserror::Error;

static ASSET_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^image-([A-Za-z0-9]+)-([0-9]+)x([0-9]+)-([a-z0-9]+)$").expect("valid asset ref pattern")
});

const CDN_HOST: &str = "https://cdn.sanity.io";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetRefError {
    #[error("`{0}` is not an image asset reference")]
    Malformed(String),
}

/// Decoded image asset id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub hash: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl FromStr for ImageAsset {
    type Err = AssetRefError;

    fn from_str(reference: &str) -> Result<Self, Self::Err> {
        let malformed = || AssetRefError::Malformed(reference.to_owned());
        let caps = ASSET_REF.captures(reference).ok_or_else(malformed)?;

        Ok(Self {
            hash: caps[1].to_owned(),
            width: caps[2].parse().map_err(|_| malformed())?,
            height: caps[3].parse().map_err(|_| malformed())?,
            format: caps[4].to_owned(),
        })
    }
}

impl ImageAsset {
    pub fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.hash, self.width, self.height, self.format)
    }
}

/// Resolves image blocks to CDN URLs for one project and dataset.
#[derive(Debug, Clone, Default)]
pub struct ImageUrls {
    project_id: String,
    dataset: String,
}

impl ImageUrls {
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(&config.project_id, &config.dataset)
    }

    pub fn url(&self, asset: &ImageAsset) -> String {
        format!(
            "{CDN_HOST}/images/{}/{}/{}",
            self.project_id,
            self.dataset,
            asset.file_name()
        )
    }

    /// Decoded asset and URL, or `None` if the block has no usable asset.
    pub fn resolve(&self, image: &ImageBlock) -> Option<(ImageAsset, String)> {
        let asset: ImageAsset = image.asset.as_ref()?.id.parse().ok()?;
        let url = self.url(&asset);
        Some((asset, url))
    }
}
