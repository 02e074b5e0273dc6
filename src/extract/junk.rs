//! Residual junk filtering
//!
//! Region selection still lets UI residue through: tooltips, icon glyph
//! runs, duplicated labels, single-token widget text. This filter walks the
//! selected markup and drops such elements before Markdown conversion.
//! Content-bearing structures (code, quotes, headings, tables) are never
//! touched.

use crate::config::JunkFilterConfig;
use crate::extract::matcher::visible_text;
use scraper::{ElementRef, Html};
use std::collections::HashSet;

/// Tags that are never removed, nor any element whose subtree contains one
const PROTECTED_TAGS: [&str; 16] = [
    "code", "pre", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "br", "hr", "img", "table",
    "tr", "th", "td",
];

/// Tags whose descendants are also off-limits
const PROTECTED_CONTAINER_TAGS: [&str; 3] = ["code", "pre", "blockquote"];

/// Removes residual UI junk from a selected region
///
/// Returns the filtered markup, or `None` when filtering leaves no visible
/// text (the caller should keep its unfiltered input in that case). With the
/// filter disabled the input passes through unchanged.
pub fn strip_junk(html: &str, options: &JunkFilterConfig) -> Option<String> {
    if !options.enabled {
        return Some(html.to_string());
    }

    let mut document = Html::parse_fragment(html);
    let root_id = document.root_element().id();

    let mut seen_texts: HashSet<String> = HashSet::new();
    let mut doomed = Vec::new();

    for node in document.tree.root().descendants() {
        if node.id() == root_id {
            continue;
        }

        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };

        let name = element.value().name();
        if PROTECTED_TAGS.contains(&name) {
            continue;
        }

        if inside_protected_container(element) || contains_protected(element) {
            continue;
        }

        if should_remove(element, &mut seen_texts, options.letter_ratio_threshold) {
            doomed.push(node.id());
        }
    }

    if doomed.is_empty() {
        tracing::trace!("Junk filter removed nothing");
    } else {
        tracing::debug!("Junk filter removed {} elements", doomed.len());
    }

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    let remaining = document.root_element().inner_html();
    if visible_text(document.root_element()).trim().is_empty() {
        None
    } else {
        Some(remaining)
    }
}

/// Checks whether an element sits inside code/pre/blockquote
fn inside_protected_container(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|ancestor| {
        ancestor
            .value()
            .as_element()
            .map_or(false, |el| PROTECTED_CONTAINER_TAGS.contains(&el.name()))
    })
}

/// Checks whether an element's subtree holds protected content
fn contains_protected(element: ElementRef<'_>) -> bool {
    element.descendants().skip(1).any(|node| {
        node.value()
            .as_element()
            .map_or(false, |el| PROTECTED_TAGS.contains(&el.name()))
    })
}

/// Decides whether a single element is junk
fn should_remove(
    element: ElementRef<'_>,
    seen_texts: &mut HashSet<String>,
    letter_ratio_threshold: f64,
) -> bool {
    // Tooltips are pure UI residue
    if element.value().attr("role") == Some("tooltip") {
        return true;
    }

    let text = visible_text(element)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    // Single tokens (and empty wrappers) are widget text, not prose
    if text.split_whitespace().count() <= 1 {
        return true;
    }

    if has_low_letter_ratio(&text, letter_ratio_threshold) {
        return true;
    }

    // Duplicate text is removed from leaf elements only, so a parent is
    // never doomed because a child already emitted the same text
    let is_leaf = !element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| !visible_text(child).trim().is_empty());

    if is_leaf {
        if seen_texts.contains(&text) {
            return true;
        }
        seen_texts.insert(text);
    }

    false
}

/// Checks if text is mostly non-letter characters (glyph runs, separators)
fn has_low_letter_ratio(text: &str, threshold: f64) -> bool {
    let clean: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if clean.is_empty() {
        return false;
    }

    let letters = clean.iter().filter(|c| c.is_alphabetic()).count();
    (letters as f64) / (clean.len() as f64) < threshold
}
