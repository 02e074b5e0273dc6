//! Per-URL unit of work
//!
//! A unit is the self-contained render → match → refine → normalize sequence
//! for a single URL. This module defines the unit's state machine, the error
//! taxonomy surfaced to callers, and the per-unit outcome type.

use crate::config::JunkFilterConfig;
use crate::extract::{match_region, refine, strip_junk, SelectorRule};
use crate::markdown::{to_markdown, MarkdownOptions};
use crate::render::{RenderError, RenderedPage, Renderer};
use std::fmt;

/// State of one unit of work
///
/// Happy path: `Pending → Rendering → Matching → Refining → Normalizing →
/// Done`. `Failed` is reachable from every non-terminal state and is
/// absorbing: there are no retries at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    /// Queued, waiting for a render slot
    Pending,

    /// First, full-page render in flight
    Rendering,

    /// Selector-priority matching against the rendered document
    Matching,

    /// Scoped re-render / fallback selection in progress
    Refining,

    /// Junk filtering and Markdown conversion
    Normalizing,

    // ===== Terminal States =====
    /// Markdown produced
    Done,

    /// Unit gave up; the outcome carries an [`ErrorKind`]
    Failed,
}

impl UnitState {
    /// Returns true if no further processing happens in this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the state machine may move from `self` to `next`
    pub fn can_transition(&self, next: UnitState) -> bool {
        if next == Self::Failed {
            return !self.is_terminal();
        }

        matches!(
            (self, next),
            (Self::Pending, Self::Rendering)
                | (Self::Rendering, Self::Matching)
                | (Self::Matching, Self::Refining)
                | (Self::Refining, Self::Normalizing)
                | (Self::Normalizing, Self::Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Rendering => "rendering",
            Self::Matching => "matching",
            Self::Refining => "refining",
            Self::Normalizing => "normalizing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Machine-readable failure classification for one URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The first render did not finish within its timeout
    RenderTimeout,

    /// The first render failed (network, DNS, HTTP error)
    RenderFailed,

    /// The unit did not complete (markup beyond tolerant recovery, or a
    /// defect in a processing stage)
    ParseFailed,

    /// Rendering succeeded but no usable text survived conversion
    EmptyContent,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RenderTimeout => "render_timeout",
            Self::RenderFailed => "render_failed",
            Self::ParseFailed => "parse_failed",
            Self::EmptyContent => "empty_content",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&RenderError> for ErrorKind {
    fn from(error: &RenderError) -> Self {
        match error {
            RenderError::Timeout { .. } => Self::RenderTimeout,
            RenderError::Http { .. } | RenderError::Status { .. } => Self::RenderFailed,
            RenderError::Empty { .. } => Self::EmptyContent,
        }
    }
}

/// The per-URL result handed back to callers
///
/// Exactly one outcome exists per requested URL, with a lifecycle
/// independent from its siblings.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub url: String,

    /// The extracted Markdown; `None` when the unit failed
    pub markdown: Option<String>,

    /// The failure classification; `None` when the unit succeeded
    pub error: Option<ErrorKind>,
}

impl ExtractionOutcome {
    pub fn success(url: impl Into<String>, markdown: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            markdown: Some(markdown.into()),
            error: None,
        }
    }

    pub fn failure(url: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            url: url.into(),
            markdown: None,
            error: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// One unit of work driving a single URL through the pipeline
pub(crate) struct Unit {
    url: String,
    state: UnitState,
}

impl Unit {
    pub(crate) fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: UnitState::Pending,
        }
    }

    fn advance(&mut self, next: UnitState) {
        debug_assert!(
            self.state.can_transition(next),
            "invalid transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
    }

    fn fail(mut self, kind: ErrorKind) -> ExtractionOutcome {
        self.advance(UnitState::Failed);
        ExtractionOutcome::failure(self.url, kind)
    }

    /// Runs the unit to completion; never returns an error
    ///
    /// Render-stage failures after the first render are recovered locally by
    /// the refine fallback chain; only the first render's failure (or a
    /// text-free conversion) surfaces in the outcome.
    pub(crate) async fn run(
        mut self,
        renderer: &dyn Renderer,
        rules: &[SelectorRule],
        min_words: usize,
        junk_filter: &JunkFilterConfig,
        markdown: &MarkdownOptions,
    ) -> ExtractionOutcome {
        self.advance(UnitState::Rendering);
        let page = match renderer.render(&self.url, None).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Initial render failed for {}: {}", self.url, e);
                let kind = ErrorKind::from(&e);
                return self.fail(kind);
            }
        };

        self.advance(UnitState::Matching);
        let matched = match_region(&page.html, rules, min_words);

        self.advance(UnitState::Refining);
        let refined = refine(renderer, page, &matched).await;

        self.advance(UnitState::Normalizing);
        let html = strip_junk(&refined.html, junk_filter).unwrap_or_else(|| refined.html.clone());
        let cleaned = RenderedPage { html, ..refined };

        let text = to_markdown(&cleaned, markdown);
        if text.trim().is_empty() {
            tracing::warn!("No usable text survived conversion for {}", self.url);
            return self.fail(ErrorKind::EmptyContent);
        }

        self.advance(UnitState::Done);
        ExtractionOutcome::success(self.url, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            UnitState::Pending,
            UnitState::Rendering,
            UnitState::Matching,
            UnitState::Refining,
            UnitState::Normalizing,
            UnitState::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_failed_reachable_from_every_non_terminal_state() {
        for state in [
            UnitState::Pending,
            UnitState::Rendering,
            UnitState::Matching,
            UnitState::Refining,
            UnitState::Normalizing,
        ] {
            assert!(state.can_transition(UnitState::Failed));
        }
    }

    #[test]
    fn test_failed_is_absorbing() {
        assert!(!UnitState::Failed.can_transition(UnitState::Rendering));
        assert!(!UnitState::Failed.can_transition(UnitState::Failed));
        assert!(!UnitState::Done.can_transition(UnitState::Failed));
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!UnitState::Pending.can_transition(UnitState::Matching));
        assert!(!UnitState::Rendering.can_transition(UnitState::Normalizing));
        assert!(!UnitState::Normalizing.can_transition(UnitState::Rendering));
    }

    #[test]
    fn test_terminal_states() {
        assert!(UnitState::Done.is_terminal());
        assert!(UnitState::Failed.is_terminal());
        assert!(!UnitState::Pending.is_terminal());
        assert!(!UnitState::Refining.is_terminal());
    }

    #[test]
    fn test_error_kind_strings() {
        assert_eq!(ErrorKind::RenderTimeout.as_str(), "render_timeout");
        assert_eq!(ErrorKind::RenderFailed.as_str(), "render_failed");
        assert_eq!(ErrorKind::ParseFailed.as_str(), "parse_failed");
        assert_eq!(ErrorKind::EmptyContent.as_str(), "empty_content");
    }

    #[test]
    fn test_error_kind_from_render_error() {
        let timeout = RenderError::Timeout {
            url: "u".to_string(),
        };
        assert_eq!(ErrorKind::from(&timeout), ErrorKind::RenderTimeout);

        let status = RenderError::Status {
            url: "u".to_string(),
            status: 500,
        };
        assert_eq!(ErrorKind::from(&status), ErrorKind::RenderFailed);

        let empty = RenderError::Empty {
            url: "u".to_string(),
        };
        assert_eq!(ErrorKind::from(&empty), ErrorKind::EmptyContent);
    }

    #[test]
    fn test_outcome_constructors() {
        let ok = ExtractionOutcome::success("https://a", "# md");
        assert!(ok.is_success());
        assert_eq!(ok.markdown.as_deref(), Some("# md"));
        assert!(ok.error.is_none());

        let bad = ExtractionOutcome::failure("https://b", ErrorKind::RenderTimeout);
        assert!(!bad.is_success());
        assert!(bad.markdown.is_none());
        assert_eq!(bad.error, Some(ErrorKind::RenderTimeout));
    }
}
