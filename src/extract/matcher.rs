//! Selector-priority content matching
//!
//! Given a rendered document and an ordered selector list, find the first
//! selector whose matched element carries enough visible words to plausibly
//! be the article body. Matching is a pure function over its inputs; the
//! tolerant html5ever parse means malformed markup degrades to "no match"
//! rather than failing.

use scraper::{ElementRef, Html, Selector};

/// A CSS selector with its position in the priority order
///
/// Lower priority values are tried first. Priorities are assigned from list
/// position, so the order is total and ties cannot occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRule {
    pub selector: String,
    pub priority: u32,
}

impl SelectorRule {
    /// Builds a rule list from an ordered selector list, assigning
    /// priorities from list position
    pub fn ordered(selectors: &[String]) -> Vec<SelectorRule> {
        selectors
            .iter()
            .enumerate()
            .map(|(index, selector)| SelectorRule {
                selector: selector.clone(),
                priority: index as u32,
            })
            .collect()
    }
}

/// Outcome of matching one document against the selector list
///
/// Transient; scoped to a single pipeline run.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// The winning rule, if any selector qualified
    pub rule: Option<SelectorRule>,

    /// Inner HTML of the matched element
    pub matched_html: Option<String>,

    /// Visible word count of the matched element (0 when nothing matched)
    pub word_count: usize,
}

impl MatchResult {
    /// The no-match result
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if a selector qualified
    pub fn is_match(&self) -> bool {
        self.rule.is_some()
    }
}

/// Finds the highest-priority selector whose element meets the word threshold
///
/// Rules are evaluated in ascending priority order. A rule with no matching
/// element is skipped without a word count check. A rule whose element falls
/// below `min_words` is also skipped: a short "article" region is likely a
/// stub or teaser, and a lower-priority selector may still find the real
/// body. Returns [`MatchResult::none`] when no rule qualifies.
///
/// # Arguments
///
/// * `html` - The rendered document to search
/// * `rules` - Selector rules; evaluated in ascending priority order
/// * `min_words` - Minimum visible word count for a region to qualify
pub fn match_region(html: &str, rules: &[SelectorRule], min_words: usize) -> MatchResult {
    if html.trim().is_empty() || rules.is_empty() {
        return MatchResult::none();
    }

    let document = Html::parse_document(html);

    let mut ordered: Vec<&SelectorRule> = rules.iter().collect();
    ordered.sort_by_key(|rule| rule.priority);

    for rule in ordered {
        let selector = match Selector::parse(&rule.selector) {
            Ok(s) => s,
            Err(_) => {
                tracing::debug!("Skipping unparsable selector '{}'", rule.selector);
                continue;
            }
        };

        let Some(element) = document.select(&selector).next() else {
            continue;
        };

        let word_count = visible_word_count(element);
        if word_count >= min_words {
            tracing::debug!(
                "Selector '{}' matched with {} words",
                rule.selector,
                word_count
            );
            return MatchResult {
                rule: Some(rule.clone()),
                matched_html: Some(element.inner_html()),
                word_count,
            };
        }

        tracing::debug!(
            "Selector '{}' matched but only {} words (< {}), trying next",
            rule.selector,
            word_count,
            min_words
        );
    }

    MatchResult::none()
}

/// Tags whose text content is never visible to a reader
const HIDDEN_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Collects the visible text of an element subtree
///
/// Text inside script/style/noscript/template elements is excluded; markup
/// never counts.
pub(crate) fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();

    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |el| HIDDEN_TAGS.contains(&el.name()))
        });

        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }

    out
}

/// Counts whitespace-delimited tokens of visible text in an element subtree
pub(crate) fn visible_word_count(element: ElementRef<'_>) -> usize {
    visible_text(element).split_whitespace().count()
}

/// Returns true if a document has any visible text at all
pub(crate) fn has_visible_text(html: &str) -> bool {
    let document = Html::parse_document(html);
    !visible_text(document.root_element()).trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(selectors: &[&str]) -> Vec<SelectorRule> {
        SelectorRule::ordered(&selectors.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_ordered_assigns_priorities_from_position() {
        let rules = rules(&["article", "main", "#content"]);
        assert_eq!(rules[0].priority, 0);
        assert_eq!(rules[1].priority, 1);
        assert_eq!(rules[2].priority, 2);
    }

    #[test]
    fn test_no_selector_matches() {
        let html = format!("<html><body><div class=\"other\">{}</div></body></html>", words(80));
        let result = match_region(&html, &rules(&["article", "main"]), 50);
        assert!(!result.is_match());
        assert_eq!(result.word_count, 0);
    }

    #[test]
    fn test_empty_rules_never_match() {
        let html = format!("<html><body><article>{}</article></body></html>", words(80));
        let result = match_region(&html, &[], 50);
        assert!(!result.is_match());
    }

    #[test]
    fn test_empty_html_never_matches() {
        let result = match_region("", &rules(&["article"]), 50);
        assert!(!result.is_match());
    }

    #[test]
    fn test_priority_order_wins_over_word_count() {
        // A (priority 0) has 80 words, B (priority 1) has 200; A wins anyway
        let html = format!(
            "<html><body><article>{}</article><main>{}</main></body></html>",
            words(80),
            words(200)
        );
        let result = match_region(&html, &rules(&["article", "main"]), 50);

        let rule = result.rule.unwrap();
        assert_eq!(rule.selector, "article");
        assert_eq!(result.word_count, 80);
    }

    #[test]
    fn test_threshold_gating_skips_even_last_rule() {
        let html = "<html><body><article>too short</article></body></html>";
        let result = match_region(html, &rules(&["article"]), 50);
        assert!(!result.is_match());
    }

    #[test]
    fn test_short_high_priority_falls_through_to_next_rule() {
        // article is a teaser; main carries the body
        let html = format!(
            "<html><body><article>teaser only</article><main>{}</main></body></html>",
            words(120)
        );
        let result = match_region(&html, &rules(&["article", "main"]), 50);

        assert_eq!(result.rule.unwrap().selector, "main");
        assert_eq!(result.word_count, 120);
    }

    #[test]
    fn test_role_attribute_selector() {
        let html = format!(
            "<html><body><div role=\"main\">{}</div></body></html>",
            words(60)
        );
        let result = match_region(&html, &rules(&["[role=\"main\"]"]), 50);
        assert!(result.is_match());
    }

    #[test]
    fn test_class_and_id_selectors() {
        let html = format!(
            "<html><body><div id=\"content\" class=\"page\">{}</div></body></html>",
            words(60)
        );

        assert!(match_region(&html, &rules(&["#content"]), 50).is_match());
        assert!(match_region(&html, &rules(&[".page"]), 50).is_match());
    }

    #[test]
    fn test_matched_html_is_inner_html() {
        let html = format!(
            "<html><body><article><p>{}</p></article></body></html>",
            words(60)
        );
        let result = match_region(&html, &rules(&["article"]), 50);

        let matched = result.matched_html.unwrap();
        assert!(matched.starts_with("<p>"));
        assert!(!matched.contains("<article"));
    }

    #[test]
    fn test_script_text_does_not_count() {
        // 60 words of script must not push a 3-word article over the threshold
        let html = format!(
            "<html><body><article>three words here<script>{}</script></article></body></html>",
            words(60)
        );
        let result = match_region(&html, &rules(&["article"]), 50);
        assert!(!result.is_match());
    }

    #[test]
    fn test_malformed_html_degrades_to_no_match() {
        let html = "<html><body><article><p>unclosed<div></article>";
        // Must not panic; tolerant parse, below threshold means no match
        let result = match_region(html, &rules(&["article"]), 50);
        assert!(!result.is_match());
    }

    #[test]
    fn test_unparsable_selector_is_skipped() {
        let html = format!("<html><body><main>{}</main></body></html>", words(60));
        let bad_then_good = vec![
            SelectorRule {
                selector: "div[".to_string(),
                priority: 0,
            },
            SelectorRule {
                selector: "main".to_string(),
                priority: 1,
            },
        ];
        let result = match_region(&html, &bad_then_good, 50);
        assert_eq!(result.rule.unwrap().selector, "main");
    }

    #[test]
    fn test_rules_evaluated_by_priority_not_slice_order() {
        let html = format!(
            "<html><body><article>{}</article><main>{}</main></body></html>",
            words(60),
            words(60)
        );
        // Slice lists main first, but article has the lower priority value
        let shuffled = vec![
            SelectorRule {
                selector: "main".to_string(),
                priority: 1,
            },
            SelectorRule {
                selector: "article".to_string(),
                priority: 0,
            },
        ];
        let result = match_region(&html, &shuffled, 50);
        assert_eq!(result.rule.unwrap().selector, "article");
    }

    #[test]
    fn test_has_visible_text() {
        assert!(has_visible_text("<html><body><p>hello</p></body></html>"));
        assert!(!has_visible_text("<html><body><script>x()</script></body></html>"));
        assert!(!has_visible_text(""));
    }
}
