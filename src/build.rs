//! Static export.
//!
//! ```text
//! build_site()
//!     │
//!     ├── enumerate_routes()  ──► listings + one route per stored id
//!     │
//!     ├── compose pages       ──► sequential, one fetch each
//!     │                           (documents gone since enumeration are skipped)
//!     │
//!     ├── write_pages()       ──► parallel, optionally minified
//!     │
//!     └── copy_assets()       ──► <assets>/** → <output>/assets/**
//! ```

use crate::{
    config::SiteConfig,
    document::{Expert, Post, Shape, fetch_ids},
    log,
    logger::Progress,
    pages::{Composer, PageError, Route, RouteParams},
    render::ImageUrls,
    store::{ContentStore, StoreError},
    utils::minify::minify_html,
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Rendered file waiting to be written.
struct Rendered {
    path: PathBuf,
    html: String,
}

/// Export every routable page into `config.build.output`.
pub async fn build_site<S: ContentStore>(config: &SiteConfig, store: &S) -> Result<()> {
    let output = &config.build.output;
    prepare_output(output, config.build.clean)?;

    let routes = enumerate_routes(store)
        .await
        .context("Failed to enumerate documents")?;
    log!("store"; "found {} pages", routes.len());

    let composer = Composer::new(store, &config.site, ImageUrls::from_config(&config.store));
    let mut rendered = Vec::with_capacity(routes.len() + 1);

    let progress = Progress::new("pages", routes.len());
    for (route, params) in &routes {
        let path = match route.output_file(params, output) {
            Ok(path) => path,
            Err(err @ PageError::InvalidParam { .. }) => {
                log!("warn"; "{err}, skipped");
                progress.inc();
                continue;
            }
            Err(err) => {
                progress.finish();
                return Err(err.into());
            }
        };
        match composer.render(*route, params).await {
            Ok(html) => rendered.push(Rendered { path, html }),
            // deleted between enumeration and rendering
            Err(err @ PageError::NotFound { .. }) => log!("warn"; "{err}, skipped"),
            Err(err) => {
                progress.finish();
                return Err(err).with_context(|| format!("Failed to render {}", path.display()));
            }
        }
        progress.inc();
    }
    progress.finish();

    rendered.push(Rendered {
        path: output.join("404.html"),
        html: composer.not_found().context("Failed to render 404 page")?,
    });

    write_pages(&rendered, config.build.minify)?;
    copy_assets(&config.build.assets, &output.join("assets"))?;

    log_build_result(output, rendered.len())
}

/// Home, both listings, then one detail route per stored document.
async fn enumerate_routes<S: ContentStore>(
    store: &S,
) -> Result<Vec<(Route, RouteParams)>, StoreError> {
    let mut routes = vec![
        (Route::Home, RouteParams::default()),
        (Route::PostIndex, RouteParams::default()),
        (Route::ExpertIndex, RouteParams::default()),
    ];
    for (type_tag, route) in [(Post::TYPE_TAG, Route::Post), (Expert::TYPE_TAG, Route::Expert)] {
        routes.extend(
            fetch_ids(store, type_tag)
                .await?
                .into_iter()
                .map(|id| (route, RouteParams::default().with("id", id))),
        );
    }
    Ok(routes)
}

fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output).with_context(|| {
            format!("Failed to clear output directory: {}", output.display())
        })?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

fn write_pages(pages: &[Rendered], minify: bool) -> Result<()> {
    pages.par_iter().try_for_each(|page| {
        if let Some(parent) = page.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = minify_html(page.html.as_bytes(), minify);
        fs::write(&page.path, content)
            .with_context(|| format!("Failed to write {}", page.path.display()))
    })
}

/// Mirror the asset tree; a missing asset directory is not an error.
fn copy_assets(assets: &Path, dest: &Path) -> Result<()> {
    if !assets.is_dir() {
        return Ok(());
    }

    let files: Vec<_> = WalkDir::new(assets)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    files.par_iter().try_for_each(|src| -> Result<()> {
        let rel = src.strip_prefix(assets)?;
        let target = dest.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, &target)
            .with_context(|| format!("Failed to copy asset {}", src.display()))?;
        Ok(())
    })?;

    log!("assets"; "copied {} files", files.len());
    Ok(())
}

fn log_build_result(output: &Path, pages: usize) -> Result<()> {
    let entries = fs::read_dir(output)?.filter_map(Result::ok).count();

    if entries == 0 {
        log!("warn"; "output is empty, check the store settings");
    } else {
        log!("build"; "wrote {} pages to {}", pages, output.display());
    }

    Ok(())
}
