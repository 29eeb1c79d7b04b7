//! Development server.
//!
//! Every request renders its page from the store, so edits show up on the
//! next reload without a rebuild. Built on `tiny_http`:
//!
//! - `/assets/**` served from `config.build.assets`
//! - page routes rendered by the [`Composer`]
//! - missing documents and unknown paths answered with the 404 page
//! - graceful shutdown on Ctrl+C
//!
//! ```text
//! ┌─────────────────┐  spawn per request  ┌──────────────────┐
//! │   Main Thread   │ ──────────────────► │  Tokio task      │
//! │ (accept loop)   │                     │ respond() → send │
//! └─────────────────┘                     └──────────────────┘
//! ```

use crate::{
    config::SiteConfig,
    log,
    pages::{Composer, PageError, Route},
    render::ImageUrls,
    store::ContentStore,
};
use anyhow::{Context, Result, anyhow};
use std::{
    net::{IpAddr, SocketAddr},
    path::{Component, Path},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server};
use tokio::runtime::Handle;

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const ASSET_PREFIX: &str = "/assets/";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Serve until Ctrl+C. Requests run as tasks on `runtime`.
pub fn serve_site<S>(config: &'static SiteConfig, store: S, runtime: &Handle) -> Result<()>
where
    S: ContentStore + 'static,
{
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    let store = Arc::new(store);
    for request in server.incoming_requests() {
        let store = Arc::clone(&store);
        runtime.spawn(async move {
            let reply = respond(request.url(), config, store.as_ref()).await;
            // writing to a slow client blocks, keep it off the async workers
            match tokio::task::spawn_blocking(move || send(request, reply)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log!("serve"; "request error: {e}"),
                Err(e) => log!("serve"; "response task failed: {e}"),
            }
        });
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Response produced for one request.
#[derive(Debug)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    fn html(status: u16, html: String) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body: html.into_bytes(),
        }
    }

    fn internal_error() -> Self {
        Self {
            status: 500,
            content_type: "text/plain; charset=utf-8",
            body: b"500 Internal Server Error".to_vec(),
        }
    }
}

/// Resolve a request URL.
///
/// 1. `/assets/...` → file from the asset directory
/// 2. known route → freshly rendered page
/// 3. anything else, or a missing document → 404 page
async fn respond<S: ContentStore>(url: &str, config: &SiteConfig, store: &S) -> Reply {
    // Strip query string (e.g., ?t=123456) before resolving path
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let composer = Composer::new(store, &config.site, ImageUrls::from_config(&config.store));

    if let Some(rel) = path.strip_prefix(ASSET_PREFIX) {
        return match read_asset(&config.build.assets, rel).await {
            Some((content_type, body)) => Reply { status: 200, content_type, body },
            None => not_found(&composer, path),
        };
    }

    let Some((route, params)) = Route::parse(path) else {
        return not_found(&composer, path);
    };

    match composer.render(route, &params).await {
        Ok(html) => Reply::html(200, html),
        Err(PageError::NotFound { .. }) => not_found(&composer, path),
        Err(e) => {
            log!("error"; "{path}: {:#}", anyhow::Error::from(e));
            Reply::internal_error()
        }
    }
}

fn not_found<S: ContentStore>(composer: &Composer<'_, S>, path: &str) -> Reply {
    match composer.not_found() {
        Ok(html) => Reply::html(404, html),
        Err(e) => {
            log!("error"; "{path}: {:#}", anyhow::Error::from(e));
            Reply::internal_error()
        }
    }
}

/// Read `<assets>/<rel>`; `None` if missing or if `rel` escapes the directory.
async fn read_asset(assets: &Path, rel: &str) -> Option<(&'static str, Vec<u8>)> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let rel = urlencoding::decode(rel).ok()?;
    let rel = Path::new(rel.as_ref());
    if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }

    let local = assets.join(rel);
    let body = tokio::fs::read(&local).await.ok()?;
    Some((guess_content_type(&local), body))
}

fn send(request: Request, reply: Reply) -> Result<()> {
    let header = Header::from_bytes("Content-Type", reply.content_type)
        .map_err(|()| anyhow!("invalid content type `{}`", reply.content_type))?;
    let response = Response::from_data(reply.body)
        .with_status_code(reply.status)
        .with_header(header);
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
