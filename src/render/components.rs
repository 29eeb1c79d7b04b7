//! Layout primitives.
//!
//! Stateless functions from already-fetched data to [`Node`]s. Every
//! primitive takes a `class_name` override that is appended after its base
//! classes, so later utility classes win.

use super::html::{Element, Node};

pub const SHELL_CLASSES: &str = "min-h-screen bg-gradient-to-b from-white to-slate-100";
pub const HEADER_CLASSES: &str = "py-16 text-center";
pub const HEADER_TITLE_CLASSES: &str = "text-4xl md:text-5xl font-bold tracking-tight text-slate-900";
pub const HEADER_SUBTITLE_CLASSES: &str = "mt-4 text-xl text-slate-600";
pub const SECTION_CLASSES: &str = "py-12";
pub const SECTION_TITLE_CLASSES: &str = "mb-6 text-2xl font-semibold text-slate-800";
pub const GRID_CLASSES: &str = "container mx-auto px-4";
pub const GRID_ROW_CLASSES: &str = "grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-8";
pub const CARD_CLASSES: &str = "block rounded-lg bg-white p-6 shadow hover:shadow-lg";

/// `base + " " + class_name`, verbatim.
pub fn class_list(base: &str, class_name: &str) -> String {
    format!("{base} {class_name}")
}

/// Full-height page container.
pub fn page_shell(children: Vec<Node>, class_name: &str) -> Node {
    Element::new("main")
        .class(class_list(SHELL_CLASSES, class_name))
        .children(children)
        .into()
}

/// Page title with an optional subtitle line.
pub fn page_header(title: &str, subtitle: Option<&str>, class_name: &str) -> Node {
    let mut header = Element::new("header")
        .class(class_list(HEADER_CLASSES, class_name))
        .child(Element::new("h1").class(HEADER_TITLE_CLASSES).text(title));
    if let Some(subtitle) = subtitle.filter(|s| !s.is_empty()) {
        header = header.child(Element::new("p").class(HEADER_SUBTITLE_CLASSES).text(subtitle));
    }
    header.into()
}

/// Titled block of content.
pub fn section(title: &str, children: Vec<Node>, class_name: &str) -> Node {
    Element::new("section")
        .class(class_list(SECTION_CLASSES, class_name))
        .child(Element::new("h2").class(SECTION_TITLE_CLASSES).text(title))
        .children(children)
        .into()
}

/// Centered, padded content column.
pub fn grid(children: Vec<Node>, class_name: &str) -> Node {
    Element::new("div")
        .class(class_list(GRID_CLASSES, class_name))
        .children(children)
        .into()
}

/// One column below `md`, two from `md`, three from `lg`. Children become
/// direct grid items.
pub fn grid_row(children: Vec<Node>, class_name: &str) -> Node {
    Element::new("div")
        .class(class_list(GRID_ROW_CLASSES, class_name))
        .children(children)
        .into()
}

/// Linked summary tile used by listings.
pub fn card(title: &str, href: &str, summary: Option<&str>) -> Node {
    let mut card = Element::new("a")
        .attr("href", href)
        .class(CARD_CLASSES)
        .child(Element::new("h3").class("text-lg font-semibold").text(title));
    if let Some(summary) = summary.filter(|s| !s.is_empty()) {
        card = card.child(Element::new("p").class("mt-2 text-slate-600").text(summary));
    }
    card.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(node: &Node) -> &Element {
        match node {
            Node::Element(element) => element,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_class_list_is_order_preserving() {
        assert_eq!(class_list("a b", "c"), "a b c");
        assert_eq!(class_list("p-4", "p-8"), "p-4 p-8");
        assert_eq!(class_list("a", ""), "a ");
    }

    #[test]
    fn test_every_primitive_appends_override() {
        let cases = [
            (page_shell(vec![], "bg-black"), SHELL_CLASSES),
            (page_header("T", None, "bg-black"), HEADER_CLASSES),
            (section("T", vec![], "bg-black"), SECTION_CLASSES),
            (grid(vec![], "bg-black"), GRID_CLASSES),
            (grid_row(vec![], "bg-black"), GRID_ROW_CLASSES),
        ];
        for (node, base) in cases {
            assert_eq!(
                root(&node).get_attr("class"),
                Some(format!("{base} bg-black").as_str())
            );
        }
    }

    #[test]
    fn test_page_header_subtitle_optional() {
        let with = page_header("Title", Some("Sub"), "");
        assert_eq!(with.find_all("h1")[0].children, vec![Node::text("Title")]);
        assert_eq!(with.find_all("p").len(), 1);

        let without = page_header("Title", None, "");
        assert!(without.find_all("p").is_empty());
        let empty = page_header("Title", Some(""), "");
        assert!(empty.find_all("p").is_empty());
    }

    #[test]
    fn test_section_title_then_children() {
        let node = section("Bio", vec![Node::text("body")], "");
        let element = root(&node);
        assert_eq!(element.tag, "section");
        assert_eq!(element.children.len(), 2);
        assert_eq!(element.children[0].text_content(), "Bio");
        assert_eq!(element.children[1], Node::text("body"));
    }

    #[test]
    fn test_grid_row_children_are_direct() {
        for n in [0usize, 1, 7] {
            let children: Vec<Node> = (0..n)
                .map(|i| card(&format!("item {i}"), "/", None))
                .collect();
            let node = grid_row(children.clone(), "");
            let element = root(&node);

            assert_eq!(element.tag, "div");
            assert!(element.get_attr("class").unwrap().contains("grid-cols-1"));
            assert!(element.get_attr("class").unwrap().contains("md:grid-cols-2"));
            assert_eq!(element.children, children);
        }
    }

    #[test]
    fn test_card() {
        let node = card("Ada", "/experts/ada/", Some("Analyst"));
        let element = root(&node);
        assert_eq!(element.get_attr("href"), Some("/experts/ada/"));
        assert_eq!(node.text_content(), "AdaAnalyst");
    }
}
