//! Authoring schema for the content studio.
//!
//! Describes the document types and custom blocks the renderer understands,
//! in the JSON shape the studio consumes. Printed by `vitrine schema`.

use crate::document::{Expert, LineBreak, Post, Shape};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSchema {
    pub name: &'static str,
    pub title: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub of: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl Field {
    fn new(name: &'static str, kind: &'static str) -> Self {
        Self {
            name,
            kind,
            title: None,
            of: None,
            initial_value: None,
            required: false,
            hidden: false,
            read_only: false,
        }
    }

    fn title(mut self, title: &'static str) -> Self {
        self.title = Some(title);
        self
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn of(mut self, types: &[&'static str]) -> Self {
        self.of = Some(types.to_vec());
        self
    }

    /// Whether an author can change the field in the studio.
    pub const fn is_editable(&self) -> bool {
        !self.hidden && !self.read_only
    }
}

/// Fixed preview shown for blocks with no editable content.
#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub prepare: PreviewLabel,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewLabel {
    pub title: &'static str,
}

impl TypeSchema {
    pub fn editable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.is_editable())
    }
}

/// Every type, documents first.
pub fn all() -> Vec<TypeSchema> {
    vec![post(), expert(), block_content(), horizontal_rule()]
}

fn post() -> TypeSchema {
    TypeSchema {
        name: Post::TYPE_TAG,
        title: "Post",
        kind: "document",
        fields: vec![
            Field::new("title", "string").title("Title").required(),
            Field::new("slug", "slug").title("Slug"),
            Field::new("excerpt", "text").title("Excerpt"),
            Field::new("publishedAt", "datetime").title("Published at"),
            Field::new("mainImage", "image").title("Main image"),
            Field::new("body", "blockContent").title("Body"),
        ],
        preview: None,
    }
}

fn expert() -> TypeSchema {
    TypeSchema {
        name: Expert::TYPE_TAG,
        title: "Expert",
        kind: "document",
        fields: vec![
            Field::new("name", "string").title("Name").required(),
            Field::new("role", "string").title("Role"),
            Field::new("expertise", "array").title("Expertise").of(&["string"]),
            Field::new("portrait", "image").title("Portrait"),
            Field::new("bio", "blockContent").title("Bio"),
        ],
        preview: None,
    }
}

fn block_content() -> TypeSchema {
    TypeSchema {
        name: "blockContent",
        title: "Block content",
        kind: "array",
        fields: vec![Field::new("blocks", "array").of(&["block", "image", "horizontalRule"])],
        preview: None,
    }
}

/// A visual divider. The only field is a fixed, hidden style marker.
fn horizontal_rule() -> TypeSchema {
    let mut style = Field::new("style", "string");
    style.initial_value = Some(Value::from(LineBreak::VALUE));
    style.hidden = true;
    style.read_only = true;

    TypeSchema {
        name: "horizontalRule",
        title: "Horizontal rule",
        kind: "object",
        fields: vec![style],
        preview: Some(Preview {
            prepare: PreviewLabel { title: "Line break" },
        }),
    }
}
