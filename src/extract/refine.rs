//! Region re-extraction
//!
//! Once a selector has matched, a second render scoped to that selector
//! usually produces markup without the promotional and overlay content that
//! renders outside the target region. The re-render is strictly an
//! improvement attempt: every failure is recovered locally, so refinement
//! always hands the caller *some* usable page.

use crate::extract::matcher::{has_visible_text, MatchResult};
use crate::render::{RenderedPage, Renderer};

/// Re-renders a page scoped to its matched region, with local fallback
///
/// Fallback chain when the scoped render fails or comes back unusable:
/// the matched fragment wrapped as a minimal page, then the original
/// render. Never returns an error.
///
/// # Arguments
///
/// * `renderer` - The render collaborator
/// * `original` - The first, full-page render
/// * `matched` - The selector match for this page
pub async fn refine(
    renderer: &dyn Renderer,
    original: RenderedPage,
    matched: &MatchResult,
) -> RenderedPage {
    let Some(rule) = &matched.rule else {
        tracing::debug!(
            "No selector matched for {}, operating on the whole page",
            original.url
        );
        return original;
    };

    match renderer.render(&original.url, Some(&rule.selector)).await {
        Ok(page) if has_visible_text(&page.html) => {
            tracing::debug!(
                "Scoped re-render of {} via '{}' succeeded",
                original.url,
                rule.selector
            );
            page
        }
        Ok(_) => {
            tracing::debug!(
                "Scoped re-render of {} came back without text, falling back",
                original.url
            );
            fallback(original, matched)
        }
        Err(e) => {
            tracing::warn!("Scoped re-render of {} failed: {}, falling back", original.url, e);
            fallback(original, matched)
        }
    }
}

/// Picks the best already-available markup for a page
fn fallback(original: RenderedPage, matched: &MatchResult) -> RenderedPage {
    if let Some(fragment) = matched.matched_html.as_deref() {
        if has_visible_text(fragment) {
            return RenderedPage::new(original.url, wrap_fragment(fragment));
        }
    }
    original
}

/// Wraps a matched fragment as a minimal standalone page
fn wrap_fragment(fragment: &str) -> String {
    format!("<html><body>{}</body></html>", fragment)
}
