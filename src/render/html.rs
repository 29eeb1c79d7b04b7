//! Minimal HTML tree.
//!
//! Pages are built as [`Node`] trees and serialized once at the end. Text
//! and attribute values are escaped on output; tag and attribute names are
//! `'static` and never come from content.

use quick_xml::{
    Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use std::io;

type HtmlWriter = Writer<Vec<u8>>;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["area", "br", "hr", "img", "input", "link", "meta", "source"];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Children without a wrapping element.
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(&'static str, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    fn write_to(&self, writer: &mut HtmlWriter) -> io::Result<()> {
        let mut start = BytesStart::new(self.tag);
        for (name, value) in &self.attrs {
            start.push_attribute((*name, value.as_str()));
        }
        // void elements: start tag only, no `/>` and no end tag
        writer.write_event(Event::Start(start))?;
        if VOID_ELEMENTS.contains(&self.tag) {
            return Ok(());
        }

        for child in &self.children {
            child.write_to(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.tag)))
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Serialize to an HTML string.
    pub fn render(&self) -> io::Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(io::Error::other)
    }

    fn write_to(&self, writer: &mut HtmlWriter) -> io::Result<()> {
        match self {
            Self::Element(element) => element.write_to(writer),
            Self::Text(text) => writer.write_event(Event::Text(BytesText::new(text))),
            Self::Fragment(nodes) => nodes.iter().try_for_each(|node| node.write_to(writer)),
        }
    }

    /// Concatenated text of this node and its descendants.
    pub fn text_content(&self) -> String {
        match self {
            Self::Element(element) => element.children.iter().map(Self::text_content).collect(),
            Self::Text(text) => text.clone(),
            Self::Fragment(nodes) => nodes.iter().map(Self::text_content).collect(),
        }
    }

    /// All elements with the given tag, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(tag, &mut found);
        found
    }

    fn collect<'a>(&'a self, tag: &str, found: &mut Vec<&'a Element>) {
        match self {
            Self::Element(element) => {
                if element.tag == tag {
                    found.push(element);
                }
                element.children.iter().for_each(|c| c.collect(tag, found));
            }
            Self::Fragment(nodes) => nodes.iter().for_each(|c| c.collect(tag, found)),
            Self::Text(_) => {}
        }
    }
}
