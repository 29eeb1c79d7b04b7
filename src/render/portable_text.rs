//! Rich-text body rendering.

use super::html::{Element, Node};
use super::image::ImageUrls;
use crate::document::{Block, HorizontalRule, ImageBlock, ListKind, MarkDef, Span, TextBlock, TextStyle};

pub const LINE_BREAK_CLASS: &str = "line-break";

/// Render a body in order. Consecutive list items of the same kind share one
/// list element; unsupported blocks and images without a usable asset are
/// skipped.
pub fn render_blocks(blocks: &[Block], images: &ImageUrls) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut list: Option<(ListKind, Element)> = None;

    for block in blocks {
        if let Block::Block(text) = block
            && let Some(kind) = text.list_item
        {
            let item = Element::new("li").children(render_spans(text));
            list = Some(match list.take() {
                Some((open, element)) if open == kind => (open, element.child(item)),
                previous => {
                    nodes.extend(previous.map(|(_, element)| element.into()));
                    (kind, list_element(kind).child(item))
                }
            });
            continue;
        }

        nodes.extend(list.take().map(|(_, element)| element.into()));
        match block {
            Block::Block(text) if text.children.is_empty() => {}
            Block::Block(text) => nodes.push(render_text(text)),
            Block::Image(image) => nodes.extend(render_image(image, images)),
            Block::HorizontalRule(rule) => nodes.push(render_rule(rule)),
            Block::Unsupported => {}
        }
    }

    nodes.extend(list.map(|(_, element)| element.into()));
    nodes
}

fn list_element(kind: ListKind) -> Element {
    match kind {
        ListKind::Bullet => Element::new("ul").class("list-disc pl-6"),
        ListKind::Number => Element::new("ol").class("list-decimal pl-6"),
    }
}

fn render_text(text: &TextBlock) -> Node {
    let tag = match text.style {
        TextStyle::H1 => "h1",
        TextStyle::H2 => "h2",
        TextStyle::H3 => "h3",
        TextStyle::H4 => "h4",
        TextStyle::Blockquote => "blockquote",
        TextStyle::Normal | TextStyle::Other => "p",
    };
    Element::new(tag).children(render_spans(text)).into()
}

fn render_spans(text: &TextBlock) -> Vec<Node> {
    text.children
        .iter()
        .map(|span| render_span(span, &text.mark_defs))
        .collect()
}

/// Wrap the span text in one element per mark, first mark outermost.
fn render_span(span: &Span, mark_defs: &[MarkDef]) -> Node {
    span.marks
        .iter()
        .rev()
        .fold(Node::text(span.text.as_str()), |inner, mark| {
            match mark_element(mark, mark_defs) {
                Some(element) => element.child(inner).into(),
                None => inner,
            }
        })
}

fn mark_element(mark: &str, mark_defs: &[MarkDef]) -> Option<Element> {
    let element = match mark {
        "strong" => Element::new("strong"),
        "em" => Element::new("em"),
        "code" => Element::new("code"),
        "underline" => Element::new("u"),
        "strike-through" => Element::new("s"),
        key => {
            let def = mark_defs.iter().find(|def| def.key == key)?;
            match (def.kind.as_str(), def.href.as_deref().filter(|h| is_safe_href(h))) {
                ("link", Some(href)) => {
                    let link = Element::new("a").attr("href", href);
                    if href.starts_with("http") {
                        link.attr("rel", "noopener noreferrer")
                    } else {
                        link
                    }
                }
                _ => return None,
            }
        }
    };
    Some(element)
}

/// `http(s):`, `mailto:` or relative. Other schemes (`javascript:`, `data:`)
/// leave the text unlinked.
fn is_safe_href(href: &str) -> bool {
    let href = href.trim();
    let scheme_end = href.find(|c| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(i) if href[i..].starts_with(':') => {
            let scheme = href[..i].to_ascii_lowercase();
            matches!(scheme.as_str(), "http" | "https" | "mailto")
        }
        _ => true,
    }
}

fn render_image(image: &ImageBlock, images: &ImageUrls) -> Option<Node> {
    let (asset, url) = images.resolve(image)?;
    let img = Element::new("img")
        .attr("src", url)
        .attr("alt", image.alt.clone().unwrap_or_default())
        .attr("width", asset.width.to_string())
        .attr("height", asset.height.to_string())
        .attr("loading", "lazy");

    let mut figure = Element::new("figure").child(img);
    if let Some(caption) = image.caption.as_deref().filter(|c| !c.is_empty()) {
        figure = figure.child(Element::new("figcaption").text(caption));
    }
    Some(figure.into())
}

fn render_rule(_rule: &HorizontalRule) -> Node {
    Element::new("hr").class(LINE_BREAK_CLASS).into()
}
