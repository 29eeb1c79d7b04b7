//! Presentation layer: HTML tree, layout primitives, rich text, documents.
//!
//! Nothing in here touches the content store; everything takes data that
//! was already fetched.

pub mod components;
mod html;
mod image;
mod layout;
mod portable_text;

pub use html::{Element, Node};
pub use image::{AssetRefError, ImageAsset, ImageUrls};
pub use layout::document;
pub use portable_text::render_blocks;
