//! Fetch orchestration
//!
//! Fans one unit of work out per URL, runs them concurrently with bounded
//! render fan-out, and fans results back in preserving input order. One
//! result slot per input index is allocated up front and each task writes
//! its outcome into its own slot, so no shared mutable collection exists and
//! completion order never leaks into the output.

use crate::config::{Config, JunkFilterConfig};
use crate::extract::SelectorRule;
use crate::markdown::MarkdownOptions;
use crate::pipeline::unit::Unit;
use crate::pipeline::{ErrorKind, ExtractionOutcome};
use crate::render::Renderer;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Drives the render → match → refine → normalize pipeline across URLs
///
/// Selector rules and conversion options are read-only configuration shared
/// by all concurrent units; each unit owns its pages exclusively. Dropping a
/// call to [`Orchestrator::extract_all`] aborts the still-running units.
pub struct Orchestrator {
    renderer: Arc<dyn Renderer>,
    rules: Arc<Vec<SelectorRule>>,
    min_words: usize,
    junk_filter: Arc<JunkFilterConfig>,
    markdown: Arc<MarkdownOptions>,
    render_slots: Arc<Semaphore>,
}

impl Orchestrator {
    /// Creates an orchestrator from a renderer and loaded configuration
    pub fn new(renderer: Arc<dyn Renderer>, config: &Config) -> Self {
        Self {
            renderer,
            rules: Arc::new(SelectorRule::ordered(&config.selectors.priority)),
            min_words: config.selectors.min_words,
            junk_filter: Arc::new(config.junk_filter.clone()),
            markdown: Arc::new(MarkdownOptions::from(&config.markdown)),
            render_slots: Arc::new(Semaphore::new(config.render.max_concurrent_renders)),
        }
    }

    /// Extracts Markdown for every URL, preserving input order
    ///
    /// Returns exactly one [`ExtractionOutcome`] per input URL, in input
    /// order, regardless of completion order or partial failure. A failure
    /// in any unit (including a panic) is confined to that unit's slot.
    pub async fn extract_all(&self, urls: &[String]) -> Vec<ExtractionOutcome> {
        let mut slots: Vec<Option<ExtractionOutcome>> = urls.iter().map(|_| None).collect();

        let mut tasks = JoinSet::new();
        let mut index_of_task = HashMap::new();

        for (index, url) in urls.iter().enumerate() {
            let renderer = Arc::clone(&self.renderer);
            let rules = Arc::clone(&self.rules);
            let junk_filter = Arc::clone(&self.junk_filter);
            let markdown = Arc::clone(&self.markdown);
            let render_slots = Arc::clone(&self.render_slots);
            let min_words = self.min_words;
            let url = url.clone();

            let handle = tasks.spawn(async move {
                // Admission control: the permit spans both renders of the
                // unit, so in-flight renders never exceed the configured cap
                let _permit = render_slots.acquire_owned().await.ok();

                Unit::new(url)
                    .run(
                        renderer.as_ref(),
                        &rules,
                        min_words,
                        &junk_filter,
                        &markdown,
                    )
                    .await
            });
            index_of_task.insert(handle.id(), index);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    if let Some(&index) = index_of_task.get(&id) {
                        slots[index] = Some(outcome);
                    }
                }
                Err(e) => {
                    // A panicked unit must not taint its siblings
                    if let Some(&index) = index_of_task.get(&e.id()) {
                        tracing::error!("Unit for {} did not complete: {}", urls[index], e);
                        slots[index] = Some(ExtractionOutcome::failure(
                            urls[index].clone(),
                            ErrorKind::ParseFailed,
                        ));
                    }
                }
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    ExtractionOutcome::failure(urls[index].clone(), ErrorKind::ParseFailed)
                })
            })
            .collect()
    }

    /// Extracts Markdown for a single URL
    ///
    /// Same contract as [`Orchestrator::extract_all`] with a list of
    /// length 1.
    pub async fn extract_one(&self, url: &str) -> ExtractionOutcome {
        let urls = [url.to_string()];
        match self.extract_all(&urls).await.pop() {
            Some(outcome) => outcome,
            None => ExtractionOutcome::failure(url.to_string(), ErrorKind::ParseFailed),
        }
    }
}
