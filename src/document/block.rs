//! Rich-text body blocks.
//!
//! A body is an ordered list of blocks tagged by `_type`. Unknown block
//! types deserialize to [`Block::Unsupported`] so that new authoring
//! features never break rendering of existing pages.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::IgnoredAny};

/// One unit of a document body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "camelCase")]
pub enum Block {
    /// Paragraph, heading, quote or list item.
    Block(TextBlock),
    Image(ImageBlock),
    HorizontalRule(HorizontalRule),
    #[serde(other)]
    Unsupported,
}

/// Paragraph-level style of a text block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    #[default]
    Normal,
    H1,
    H2,
    H3,
    H4,
    Blockquote,
    /// Anything else renders as a paragraph.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Bullet,
    Number,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBlock {
    #[serde(rename = "_key", default)]
    pub key: String,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<ListKind>,
    #[serde(default)]
    pub children: Vec<Span>,
    #[serde(default)]
    pub mark_defs: Vec<MarkDef>,
}

impl TextBlock {
    /// Concatenated span text.
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|span| span.text.as_str()).collect()
    }
}

/// Inline run of text. `marks` holds decorator names (`strong`, `em`, ...)
/// or keys into the block's `mark_defs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "_key", default)]
    pub key: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub marks: Vec<String>,
}

/// Annotation referenced from span marks; links are the only kind rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default)]
    pub href: Option<String>,
}

/// Pointer to another document, e.g. an image asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(rename = "_ref")]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    #[serde(rename = "_key", default)]
    pub key: String,
    /// Missing when the author added the block but never uploaded a file.
    #[serde(default)]
    pub asset: Option<Reference>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// Presentation-only divider. Its style is fixed and not authorable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HorizontalRule {
    #[serde(rename = "_key", default)]
    pub key: String,
    #[serde(default)]
    pub style: LineBreak,
}

/// The only rule style. Serializes as `"lineBreak"` and accepts whatever
/// (or nothing) was stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineBreak;

impl LineBreak {
    pub const VALUE: &'static str = "lineBreak";
}

impl Serialize for LineBreak {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::VALUE)
    }
}

impl<'de> Deserialize<'de> for LineBreak {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Self)
    }
}
