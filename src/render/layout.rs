//! Full HTML document around a page body.

use super::html::{Element, Node};
use crate::config::SiteMeta;
use std::io;

/// Site-wide navigation entries: (label, href).
pub const NAV_LINKS: &[(&str, &str)] = &[("Home", "/"), ("Posts", "/posts/"), ("Experts", "/experts/")];

/// Wrap `body` in a complete HTML document.
///
/// The `<title>` is `"{page} | {site}"`, or just the site title when the
/// page has the same name. `path` becomes the canonical link when the site
/// has a base URL.
pub fn document(
    site: &SiteMeta,
    page_title: &str,
    description: Option<&str>,
    path: Option<&str>,
    body: Node,
) -> io::Result<String> {
    let title = if page_title.is_empty() || page_title == site.title {
        site.title.clone()
    } else {
        format!("{page_title} | {}", site.title)
    };
    let description = description
        .filter(|d| !d.is_empty())
        .unwrap_or(&site.description);

    let mut head = Element::new("head")
        .child(Element::new("meta").attr("charset", "utf-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1"),
        )
        .child(Element::new("title").text(title))
        .child(
            Element::new("meta")
                .attr("name", "description")
                .attr("content", description),
        );
    if let (Some(base), Some(path)) = (site.url.as_deref(), path) {
        head = head.child(
            Element::new("link")
                .attr("rel", "canonical")
                .attr("href", format!("{}{path}", base.trim_end_matches('/'))),
        );
    }
    for href in &site.stylesheets {
        head = head.child(
            Element::new("link")
                .attr("rel", "stylesheet")
                .attr("href", href.as_str()),
        );
    }

    let html = Element::new("html")
        .attr("lang", site.language.as_str())
        .child(head)
        .child(
            Element::new("body")
                .child(nav(&site.title))
                .child(body)
                .child(footer(&site.copyright)),
        );

    Ok(format!("<!DOCTYPE html>{}", Node::from(html).render()?))
}

fn nav(site_title: &str) -> Element {
    let links = NAV_LINKS.iter().map(|(label, href)| {
        Node::from(
            Element::new("a")
                .attr("href", *href)
                .class("hover:underline")
                .text(*label),
        )
    });
    Element::new("nav")
        .class("container mx-auto flex items-center gap-6 px-4 py-4")
        .child(
            Element::new("a")
                .attr("href", "/")
                .class("mr-auto font-bold")
                .text(site_title),
        )
        .children(links)
}

fn footer(copyright: &str) -> Element {
    let footer = Element::new("footer").class("py-8 text-center text-sm text-slate-500");
    if copyright.is_empty() {
        footer
    } else {
        footer.text(format!("© {copyright}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteMeta {
        SiteMeta {
            title: "Northwind".into(),
            description: "Advisory".into(),
            language: "en".into(),
            copyright: "2026 Northwind".into(),
            stylesheets: vec!["/assets/site.css".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_document_structure() {
        let html = document(&site(), "Hello", Some("A post"), None, Node::text("body")).unwrap();

        assert!(html.starts_with("<!DOCTYPE html><html lang=\"en\"><head>"));
        assert!(html.contains("<title>Hello | Northwind</title>"));
        assert!(html.contains(r#"<meta name="description" content="A post">"#));
        assert!(html.contains(r#"<link rel="stylesheet" href="/assets/site.css">"#));
        assert!(html.contains("© 2026 Northwind"));
        assert!(html.ends_with("</html>"));
    }

    #[test]
    fn test_document_title_not_duplicated() {
        let html = document(&site(), "Northwind", None, None, Node::Fragment(vec![])).unwrap();
        assert!(html.contains("<title>Northwind</title>"));
        assert!(html.contains(r#"content="Advisory""#));
    }

    #[test]
    fn test_document_escapes_title() {
        let html = document(&site(), "R&D <2026>", None, None, Node::Fragment(vec![])).unwrap();
        assert!(html.contains("<title>R&amp;D &lt;2026&gt; | Northwind</title>"));
    }

    #[test]
    fn test_nav_links() {
        let html = document(&site(), "x", None, None, Node::Fragment(vec![])).unwrap();
        for (_, href) in NAV_LINKS {
            assert!(html.contains(&format!("href=\"{href}\"")));
        }
    }

    #[test]
    fn test_canonical_link() {
        let mut site = site();
        let html = document(&site, "x", None, Some("/posts/a/"), Node::Fragment(vec![])).unwrap();
        assert!(!html.contains("canonical"));

        site.url = Some("https://northwind.example/".into());
        let html = document(&site, "x", None, Some("/posts/a/"), Node::Fragment(vec![])).unwrap();
        assert!(html.contains(r#"<link rel="canonical" href="https://northwind.example/posts/a/">"#));

        let html = document(&site, "x", None, None, Node::Fragment(vec![])).unwrap();
        assert!(!html.contains("canonical"));
    }
}
