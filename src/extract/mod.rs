//! Content region selection
//!
//! This module decides which part of a rendered page constitutes "the
//! article", including:
//! - Selector-priority matching with a word-count gate
//! - Scoped re-extraction with a deterministic fallback chain
//! - Residual junk filtering of the selected region

mod junk;
mod matcher;
mod refine;

pub use junk::strip_junk;
pub use matcher::{match_region, MatchResult, SelectorRule};
pub use refine::refine;
