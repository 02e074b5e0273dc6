//! Markdown normalization
//!
//! Converts a rendered page to clean Markdown: standard block/inline
//! mapping, configurable stripping of images and links, excluded-tag
//! dropping, and whitespace normalization. The conversion is idempotent on
//! already-plain text: entities are decoded by the parser and Markdown
//! punctuation is never escaped.

mod convert;

pub use convert::{to_markdown, MarkdownOptions};
