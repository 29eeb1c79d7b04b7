//! Typed documents and the fetch layer around the content store.
//!
//! Every supported document type is a struct implementing [`Shape`]; the
//! [`Document`] sum type covers all of them keyed by `_type`. Payloads are
//! validated by deserialization at the fetch boundary, so a document that
//! does not fit its declared shape is a [`StoreError::ShapeMismatch`], never
//! a page with silently empty fields.
//!
//! [`StoreError::ShapeMismatch`]: crate::store::StoreError::ShapeMismatch

mod block;
mod fetch;

pub use block::{
    Block, HorizontalRule, ImageBlock, LineBreak, ListKind, MarkDef, Reference, Span, TextBlock,
    TextStyle,
};
pub use fetch::{fetch_all, fetch_by_id, fetch_document, fetch_ids, fetch_query};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Declared shape of one document type.
pub trait Shape: DeserializeOwned + Serialize + Send {
    /// `_type` discriminator in the store.
    const TYPE_TAG: &'static str;
    /// `order(...)` clause for listings.
    const ORDERING: &'static str;

    fn id(&self) -> &str;
    /// Title or name, whichever the type carries.
    fn heading(&self) -> &str;
}

/// Outcome of a lookup that may legitimately match nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Found(T),
    NotFound,
}

impl<T> Fetched<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(doc) => Some(doc),
            Self::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slug {
    pub current: String,
}

/// A blog post or article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: Option<Slug>,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// RFC 3339 timestamp as stored.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub main_image: Option<ImageBlock>,
    #[serde(default)]
    pub body: Vec<Block>,
}

impl Shape for Post {
    const TYPE_TAG: &'static str = "post";
    const ORDERING: &'static str = "publishedAt desc, _id asc";

    fn id(&self) -> &str {
        &self.id
    }

    fn heading(&self) -> &str {
        &self.title
    }
}

/// A person featured on the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub portrait: Option<ImageBlock>,
    #[serde(default)]
    pub bio: Vec<Block>,
}

impl Shape for Expert {
    const TYPE_TAG: &'static str = "expert";
    const ORDERING: &'static str = "name asc";

    fn id(&self) -> &str {
        &self.id
    }

    fn heading(&self) -> &str {
        &self.name
    }
}

/// Any supported document, keyed by `_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_type", rename_all = "camelCase")]
pub enum Document {
    Post(Post),
    Expert(Expert),
}

impl Document {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Self::Post(_) => Post::TYPE_TAG,
            Self::Expert(_) => Expert::TYPE_TAG,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Post(post) => post.id(),
            Self::Expert(expert) => expert.id(),
        }
    }

    pub fn heading(&self) -> &str {
        match self {
            Self::Post(post) => post.heading(),
            Self::Expert(expert) => expert.heading(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_minimal() {
        let post: Post = serde_json::from_value(json!({
            "_id": "post-1",
            "_type": "post",
            "title": "Hello"
        }))
        .unwrap();

        assert_eq!(post.heading(), "Hello");
        assert!(post.slug.is_none());
        assert!(post.excerpt.is_none());
        assert!(post.body.is_empty());
    }

    #[test]
    fn test_post_requires_title() {
        let result = serde_json::from_value::<Post>(json!({"_id": "post-1", "_type": "post"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_expert_fields() {
        let expert: Expert = serde_json::from_value(json!({
            "_id": "expert-1",
            "_type": "expert",
            "name": "Ada Lovelace",
            "role": "Analyst",
            "expertise": ["engines", "notes"]
        }))
        .unwrap();

        assert_eq!(expert.heading(), "Ada Lovelace");
        assert_eq!(expert.role.as_deref(), Some("Analyst"));
        assert_eq!(expert.expertise.len(), 2);
        assert!(expert.bio.is_empty());
    }

    #[test]
    fn test_document_dispatches_on_type() {
        let doc: Document = serde_json::from_value(json!({
            "_id": "expert-1",
            "_type": "expert",
            "name": "Grace"
        }))
        .unwrap();

        assert_eq!(doc.type_tag(), "expert");
        assert_eq!(doc.id(), "expert-1");
        assert_eq!(doc.heading(), "Grace");
    }

    #[test]
    fn test_document_unknown_type_rejected() {
        let result = serde_json::from_value::<Document>(json!({
            "_id": "page-1",
            "_type": "landingPage",
            "title": "Hi"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_document_serializes_type_tag() {
        let doc = Document::Post(Post {
            id: "post-1".into(),
            title: "Hello".into(),
            slug: None,
            excerpt: None,
            published_at: None,
            main_image: None,
            body: vec![],
        });
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_type"], "post");
        assert_eq!(value["_id"], "post-1");
    }

    #[test]
    fn test_fetched_helpers() {
        assert_eq!(Fetched::Found(3).found(), Some(3));
        assert_eq!(Fetched::<u8>::NotFound.found(), None);
    }
}
