//! Page composition: route → typed fetch → primitives → HTML.
//!
//! A [`Composer`] holds only borrowed, immutable state, so rendering the same
//! route twice against an unchanged store produces identical output. Each
//! render issues at most one store fetch.

mod route;

pub use route::{Route, RouteParams};

use crate::{
    config::SiteMeta,
    document::{Block, Expert, Fetched, ImageBlock, Post, Shape, fetch_all, fetch_by_id},
    render::{
        Element, ImageUrls, Node,
        components::{card, grid, grid_row, page_header, page_shell, section},
        document, render_blocks,
    },
    store::{ContentStore, StoreError},
    utils::date::{display_date, iso_date},
};
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("no {type_tag} document with id `{id}`")]
    NotFound { type_tag: &'static str, id: String },

    #[error("route parameter `{0}` is missing")]
    MissingParam(&'static str),

    #[error("route parameter `{name}` = `{value}` is not a single path segment")]
    InvalidParam { name: &'static str, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to serialize page")]
    Render(#[from] io::Error),
}

/// A composed page before it is wrapped in the site layout.
#[derive(Debug)]
struct View {
    title: String,
    description: Option<String>,
    body: Node,
}

pub struct Composer<'a, S> {
    store: &'a S,
    site: &'a SiteMeta,
    images: ImageUrls,
}

impl<'a, S: ContentStore> Composer<'a, S> {
    pub fn new(store: &'a S, site: &'a SiteMeta, images: ImageUrls) -> Self {
        Self { store, site, images }
    }

    /// Full HTML document for `route`.
    pub async fn render(&self, route: Route, params: &RouteParams) -> Result<String, PageError> {
        let path = route.url(params)?;
        let view = self.view(route, params).await?;
        self.wrap(view, Some(&path))
    }

    /// Shown for unknown routes and missing documents.
    pub fn not_found(&self) -> Result<String, PageError> {
        self.wrap(not_found_view(), None)
    }

    async fn view(&self, route: Route, params: &RouteParams) -> Result<View, PageError> {
        match route {
            Route::Home => Ok(self.home()),
            Route::PostIndex => self.post_index().await,
            Route::Post => self.post(params.get("id")?).await,
            Route::ExpertIndex => self.expert_index().await,
            Route::Expert => self.expert(params.get("id")?).await,
        }
    }

    fn home(&self) -> View {
        let tiles = vec![
            card("Posts", "/posts/", Some("Articles and announcements")),
            card("Experts", "/experts/", Some("The people behind the work")),
        ];
        let body = page_shell(
            vec![
                page_header(&self.site.title, Some(self.site.description.as_str()), ""),
                grid(vec![grid_row(tiles, "")], "pb-16"),
            ],
            "",
        );
        View {
            title: self.site.title.clone(),
            description: None,
            body,
        }
    }

    async fn post_index(&self) -> Result<View, PageError> {
        let posts = fetch_all::<Post, _>(self.store).await?;
        let cards = posts
            .iter()
            .map(|post| {
                let date = post.published_at.as_deref().and_then(display_date);
                let summary = post.excerpt.as_deref().or(date.as_deref());
                card(&post.title, &detail_href(Route::Post, &post.id), summary)
            })
            .collect();
        let body = page_shell(
            vec![
                page_header("Posts", None, ""),
                grid(vec![listing(cards, "No posts yet.")], "pb-16"),
            ],
            "",
        );
        Ok(View {
            title: "Posts".into(),
            description: None,
            body,
        })
    }

    async fn post(&self, id: &str) -> Result<View, PageError> {
        let post = found(fetch_by_id::<Post, _>(self.store, id).await?, id)?;

        let mut article = Element::new("article").class("prose mx-auto max-w-3xl");
        if let Some(raw) = post.published_at.as_deref()
            && let (Some(shown), Some(iso)) = (display_date(raw), iso_date(raw))
        {
            article = article.child(
                Element::new("time")
                    .attr("datetime", iso)
                    .class("block text-sm text-slate-500")
                    .text(shown),
            );
        }
        article = article
            .children(self.image(post.main_image.as_ref()))
            .children(render_blocks(&post.body, &self.images));

        let body = page_shell(
            vec![
                page_header(&post.title, post.excerpt.as_deref(), ""),
                grid(vec![article.into()], "pb-16"),
            ],
            "",
        );
        Ok(View {
            title: post.title,
            description: post.excerpt,
            body,
        })
    }

    async fn expert_index(&self) -> Result<View, PageError> {
        let experts = fetch_all::<Expert, _>(self.store).await?;
        let cards = experts
            .iter()
            .map(|expert| {
                card(
                    &expert.name,
                    &detail_href(Route::Expert, &expert.id),
                    expert.role.as_deref(),
                )
            })
            .collect();
        let body = page_shell(
            vec![
                page_header("Experts", None, ""),
                grid(vec![listing(cards, "No experts yet.")], "pb-16"),
            ],
            "",
        );
        Ok(View {
            title: "Experts".into(),
            description: None,
            body,
        })
    }

    async fn expert(&self, id: &str) -> Result<View, PageError> {
        let expert = found(fetch_by_id::<Expert, _>(self.store, id).await?, id)?;

        let mut content = self.image(expert.portrait.as_ref());
        if !expert.expertise.is_empty() {
            let tags = expert.expertise.iter().map(|tag| {
                Node::from(Element::new("li").class("rounded bg-slate-200 px-3 py-1").text(tag))
            });
            content.push(section(
                "Expertise",
                vec![Element::new("ul").class("flex flex-wrap gap-2").children(tags).into()],
                "",
            ));
        }
        if !expert.bio.is_empty() {
            content.push(section("About", render_blocks(&expert.bio, &self.images), "prose"));
        }

        let body = page_shell(
            vec![
                page_header(&expert.name, expert.role.as_deref(), ""),
                grid(content, "pb-16"),
            ],
            "",
        );
        Ok(View {
            title: expert.name,
            description: expert.role,
            body,
        })
    }

    fn image(&self, image: Option<&ImageBlock>) -> Vec<Node> {
        match image {
            Some(image) => render_blocks(&[Block::Image(image.clone())], &self.images),
            None => Vec::new(),
        }
    }

    fn wrap(&self, view: View, path: Option<&str>) -> Result<String, PageError> {
        let html = document(
            self.site,
            &view.title,
            view.description.as_deref(),
            path,
            view.body,
        )?;
        Ok(html)
    }
}

fn not_found_view() -> View {
    let body = page_shell(
        vec![
            page_header("Page not found", Some("Nothing lives at this address."), ""),
            grid(vec![link_home()], "pb-16 text-center"),
        ],
        "",
    );
    View {
        title: "Page not found".into(),
        description: None,
        body,
    }
}

fn found<T: Shape>(fetched: Fetched<T>, id: &str) -> Result<T, PageError> {
    match fetched {
        Fetched::Found(doc) => Ok(doc),
        Fetched::NotFound => Err(PageError::NotFound {
            type_tag: T::TYPE_TAG,
            id: id.to_owned(),
        }),
    }
}

fn detail_href(route: Route, id: &str) -> String {
    route
        .url(&RouteParams::default().with("id", id))
        .unwrap_or_else(|_| String::from("/"))
}

fn listing(cards: Vec<Node>, empty: &str) -> Node {
    if cards.is_empty() {
        Element::new("p").class("text-center text-slate-500").text(empty).into()
    } else {
        grid_row(cards, "")
    }
}

fn link_home() -> Node {
    Element::new("a")
        .attr("href", "/")
        .class("text-blue-600 hover:underline")
        .text("Back to the home page")
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Perspective;
    use crate::document::{fetch_document, fetch_ids};
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::path::Path;

    fn site() -> SiteMeta {
        SiteMeta {
            title: "Northwind".into(),
            description: "Independent experts".into(),
            ..Default::default()
        }
    }

    fn image(key: &str, asset: &str) -> serde_json::Value {
        json!({"_type": "image", "_key": key, "asset": {"_ref": asset}, "alt": key})
    }

    fn store() -> MemoryStore {
        MemoryStore::new(
            vec![
                json!({
                    "_id": "post-1",
                    "_type": "post",
                    "title": "Launch <day>",
                    "excerpt": "We are live",
                    "publishedAt": "2024-01-05T09:30:00Z",
                    "mainImage": image("cover", "image-c0ffee-1200x630-jpg"),
                    "body": [
                        {"_type": "block", "_key": "a", "style": "normal",
                         "children": [{"_key": "s", "text": "Hello"}]},
                        image("inline", "image-abc-10x10-png"),
                        {"_type": "horizontalRule", "_key": "b", "style": "lineBreak"},
                        {"_type": "callout", "_key": "c"}
                    ]
                }),
                json!({"_id": "post-2", "_type": "post", "title": "Bare"}),
                json!({
                    "_id": "post-3",
                    "_type": "post",
                    "title": "Broken image",
                    "body": [image("bad", "image-nope"), {"_type": "image", "_key": "none"}]
                }),
                json!({
                    "_id": "expert-1",
                    "_type": "expert",
                    "name": "Ada Lovelace",
                    "role": "Analyst",
                    "expertise": ["engines", "notes"],
                    "portrait": image("portrait", "image-ada-400x400-webp")
                }),
                json!({"_id": "expert-2", "_type": "expert", "name": "Charles Babbage"}),
            ],
            Perspective::Published,
        )
    }

    fn composer<'a>(store: &'a MemoryStore, site: &'a SiteMeta) -> Composer<'a, MemoryStore> {
        Composer::new(store, site, ImageUrls::new("proj", "production"))
    }

    fn h1(view: &View) -> String {
        let headings = view.body.find_all("h1");
        assert_eq!(headings.len(), 1);
        Node::from(headings[0].clone()).text_content()
    }

    fn img_srcs(view: &View) -> Vec<String> {
        view.body
            .find_all("img")
            .into_iter()
            .filter_map(|img| img.get_attr("src"))
            .map(str::to_owned)
            .collect()
    }

    fn id_params(id: &str) -> RouteParams {
        RouteParams::default().with("id", id)
    }

    #[tokio::test]
    async fn test_every_document_renders_with_its_heading() {
        let store = store();
        let site = site();
        let composer = composer(&store, &site);

        for (type_tag, route) in [("post", Route::Post), ("expert", Route::Expert)] {
            for id in fetch_ids(&store, type_tag).await.unwrap() {
                let params = id_params(&id);
                let view = composer.view(route, &params).await.unwrap();
                let stored = fetch_document(&store, &id).await.unwrap().found().unwrap();
                assert_eq!(h1(&view), stored.heading());
                composer.render(route, &params).await.unwrap();
            }
        }
    }

    #[tokio::test]
    async fn test_post_page_contents() {
        let store = store();
        let site = site();
        let html = composer(&store, &site)
            .render(Route::Post, &id_params("post-1"))
            .await
            .unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Launch &lt;day&gt; | Northwind</title>"));
        assert!(html.contains("January 5, 2024"));
        assert!(html.contains(r#"datetime="2024-01-05""#));
        assert!(html.contains(r#"<hr class="line-break">"#));
        assert!(html.contains("Hello"));
        assert!(!html.contains("callout"));
    }

    #[tokio::test]
    async fn test_post_images_render() {
        let store = store();
        let site = site();
        let view = composer(&store, &site)
            .view(Route::Post, &id_params("post-1"))
            .await
            .unwrap();

        assert_eq!(
            img_srcs(&view),
            vec![
                "https://cdn.sanity.io/images/proj/production/c0ffee-1200x630.jpg",
                "https://cdn.sanity.io/images/proj/production/abc-10x10.png",
            ]
        );
        let cover = view.body.find_all("img")[0];
        assert_eq!(cover.get_attr("width"), Some("1200"));
        assert_eq!(cover.get_attr("alt"), Some("cover"));
    }

    #[tokio::test]
    async fn test_unresolvable_images_are_skipped() {
        let store = store();
        let site = site();
        let composer = composer(&store, &site);
        let view = composer.view(Route::Post, &id_params("post-3")).await.unwrap();
        assert!(img_srcs(&view).is_empty());
        assert_eq!(h1(&view), "Broken image");
    }

    #[tokio::test]
    async fn test_expert_page_contents() {
        let store = store();
        let site = site();
        let composer = composer(&store, &site);
        let view = composer.view(Route::Expert, &id_params("expert-1")).await.unwrap();

        assert_eq!(view.title, "Ada Lovelace");
        assert_eq!(
            img_srcs(&view),
            vec!["https://cdn.sanity.io/images/proj/production/ada-400x400.webp"]
        );

        let html = composer.render(Route::Expert, &id_params("expert-1")).await.unwrap();
        assert!(html.contains("Analyst"));
        assert!(html.contains("engines"));
        assert!(html.contains("Expertise"));
        assert!(!html.contains("About"));
    }

    #[tokio::test]
    async fn test_canonical_link_uses_route_url() {
        let store = store();
        let mut site = site();
        site.url = Some("https://northwind.example".into());
        let html = composer(&store, &site)
            .render(Route::Post, &id_params("post-2"))
            .await
            .unwrap();
        assert!(html.contains(r#"<link rel="canonical" href="https://northwind.example/posts/post-2/">"#));
    }

    #[tokio::test]
    async fn test_missing_document_is_not_found() {
        let store = store();
        let site = site();
        let composer = composer(&store, &site);

        let err = composer.render(Route::Post, &id_params("nope")).await.unwrap_err();
        assert!(matches!(err, PageError::NotFound { type_tag: "post", id } if id == "nope"));

        // an expert id under the post route is also absent
        let err = composer.render(Route::Post, &id_params("expert-1")).await.unwrap_err();
        assert!(matches!(err, PageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_missing_param() {
        let store = store();
        let site = site();
        let err = composer(&store, &site)
            .render(Route::Expert, &RouteParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::MissingParam("id")));
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let store = MemoryStore::new(
            vec![json!({"_id": "post-x", "_type": "post", "title": 7})],
            Perspective::Published,
        );
        let site = site();
        let err = composer(&store, &site)
            .render(Route::Post, &id_params("post-x"))
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Store(StoreError::ShapeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_listings() {
        let store = store();
        let site = site();
        let composer = composer(&store, &site);

        let posts = composer.view(Route::PostIndex, &RouteParams::default()).await.unwrap();
        let hrefs: Vec<_> = posts
            .body
            .find_all("a")
            .into_iter()
            .filter_map(|a| a.get_attr("href"))
            .collect();
        // undated sorts last ascending, so first under `publishedAt desc`
        assert_eq!(hrefs, vec!["/posts/post-2/", "/posts/post-3/", "/posts/post-1/"]);

        let experts = composer.view(Route::ExpertIndex, &RouteParams::default()).await.unwrap();
        assert_eq!(experts.body.find_all("h3").len(), 2);
    }

    #[tokio::test]
    async fn test_unsafe_id_is_encoded_in_links() {
        let store = MemoryStore::new(
            vec![json!({"_id": "../../escaped", "_type": "post", "title": "Escaped"})],
            Perspective::Published,
        );
        let site = site();
        let composer = composer(&store, &site);

        let posts = composer.view(Route::PostIndex, &RouteParams::default()).await.unwrap();
        let links = posts.body.find_all("a");
        assert_eq!(links[0].get_attr("href"), Some("/posts/..%2F..%2Fescaped/"));

        let params = id_params("../../escaped");
        let view = composer.view(Route::Post, &params).await.unwrap();
        assert_eq!(h1(&view), "Escaped");
        assert!(matches!(
            Route::Post.output_file(&params, Path::new("public")),
            Err(PageError::InvalidParam { name: "id", .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let store = MemoryStore::new(vec![], Perspective::Published);
        let site = site();
        let html = composer(&store, &site)
            .render(Route::ExpertIndex, &RouteParams::default())
            .await
            .unwrap();
        assert!(html.contains("No experts yet."));
    }

    #[tokio::test]
    async fn test_home_needs_no_content() {
        let store = MemoryStore::new(vec![], Perspective::Published);
        let site = site();
        let composer = composer(&store, &site);
        let view = composer.view(Route::Home, &RouteParams::default()).await.unwrap();
        assert_eq!(h1(&view), "Northwind");

        let html = composer.render(Route::Home, &RouteParams::default()).await.unwrap();
        assert!(html.contains("<title>Northwind</title>"));
    }

    #[tokio::test]
    async fn test_render_is_idempotent() {
        let store = store();
        let site = site();
        let composer = composer(&store, &site);
        let first = composer.render(Route::Post, &id_params("post-1")).await.unwrap();
        let second = composer.render(Route::Post, &id_params("post-1")).await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_not_found_page() {
        let view = not_found_view();
        assert_eq!(h1(&view), "Page not found");

        let store = MemoryStore::new(vec![], Perspective::Published);
        let site = site();
        let html = composer(&store, &site).not_found().unwrap();
        assert!(html.contains(r#"href="/""#));
        assert!(!html.contains("canonical"));
    }
}
