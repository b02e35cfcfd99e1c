//! Render adapters and the registry that maps tool names to them.
//!
//! An adapter is a pure function of a tool call's current state. Built-in
//! adapters implement [`ToolView`], which only has to describe the
//! "executing" and "complete" looks; [`LifecycleAdapter`] turns that into a
//! total function over every [`LifecycleState`].

pub mod charts;
pub mod payload;
pub mod text;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::events::{LifecycleState, ToolCallEvent};
use crate::visual::VisualNode;

/// Renderer tool names shared with the agent runtime.
pub mod names {
    pub const BAR_CHART: &str = "bar_chat_data";
    pub const SCATTER_PLOT: &str = "scatter_plot_data";
    pub const SENTIMENT: &str = "sentiment_analysis";
    pub const KEYWORDS: &str = "extract_keywords";
    pub const EMOTIONS: &str = "detect_emotions";
    pub const ENTITIES: &str = "extract_entities";
    pub const READABILITY: &str = "analyze_readability";
    pub const WORD_FREQUENCY: &str = "word_frequency";
}

/// Error raised by an adapter. The dispatcher contains it; it never reaches
/// the page.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{0}")]
    Other(String),
}

/// Maps a tool call to its visual, or to nothing.
pub trait RenderAdapter: Send + Sync {
    fn render(&self, call: &ToolCallEvent) -> Result<Option<VisualNode>, RenderError>;
}

/// Closures work as adapters, which keeps one-off and test adapters short.
impl<F> RenderAdapter for F
where
    F: Fn(&ToolCallEvent) -> Result<Option<VisualNode>, RenderError> + Send + Sync,
{
    fn render(&self, call: &ToolCallEvent) -> Result<Option<VisualNode>, RenderError> {
        self(call)
    }
}

/// The per-tool part of a standard adapter.
pub trait ToolView: Send + Sync {
    /// Human title, used in failure notices.
    fn title(&self) -> &str;

    /// "In progress" indicator, built from the call arguments only.
    fn executing(&self, args: &Value) -> VisualNode;

    /// Full visual, built from the completed result.
    fn complete(&self, result: &Value) -> VisualNode;
}

/// Drives a [`ToolView`] through the lifecycle:
/// pending and unknown render nothing, executing shows progress, complete
/// shows the result, errored shows a failure notice.
pub struct LifecycleAdapter<V>(pub V);

impl<V: ToolView> RenderAdapter for LifecycleAdapter<V> {
    fn render(&self, call: &ToolCallEvent) -> Result<Option<VisualNode>, RenderError> {
        let view = &self.0;
        let visual = match call.state {
            LifecycleState::Pending | LifecycleState::Unknown => None,
            LifecycleState::Executing => Some(view.executing(&call.args)),
            LifecycleState::Complete => call.completed_result().map(|r| view.complete(r)),
            LifecycleState::Errored => Some(failure_notice(view.title(), call.error.clone())),
        };
        Ok(visual)
    }
}

/// Generic "this tool failed" visual.
pub fn failure_notice(title: &str, message: Option<String>) -> VisualNode {
    VisualNode::notice(format!("{} failed", title), message)
}

/// Registry of render adapters keyed by tool name.
pub struct RendererRegistry {
    adapters: HashMap<String, Arc<dyn RenderAdapter>>,
}

impl RendererRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Create a registry with every built-in adapter.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        // Data visualization
        registry.register(names::BAR_CHART, charts::bar_chart());
        registry.register(names::SCATTER_PLOT, charts::scatter_plot());

        // Text analysis
        registry.register(names::SENTIMENT, text::sentiment());
        registry.register(names::KEYWORDS, text::keywords());
        registry.register(names::EMOTIONS, text::emotions());
        registry.register(names::ENTITIES, text::entities());
        registry.register(names::READABILITY, text::readability());
        registry.register(names::WORD_FREQUENCY, text::word_frequency());

        tracing::debug!("Renderer registry ready with {} adapters", registry.len());
        registry
    }

    /// Insert or replace the adapter for `name`. Returns the adapter it
    /// replaced, if any.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        adapter: Arc<dyn RenderAdapter>,
    ) -> Option<Arc<dyn RenderAdapter>> {
        let name = name.into();
        let previous = self.adapters.insert(name.clone(), adapter);
        if previous.is_some() {
            tracing::info!("Replaced render adapter for {}", name);
        } else {
            tracing::debug!("Registered render adapter for {}", name);
        }
        previous
    }

    /// Remove the adapter for `name`.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn RenderAdapter>> {
        self.adapters.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RenderAdapter>> {
        self.adapters.get(name).cloned()
    }

    pub fn has_adapter(&self, name: &str) -> bool {
        self.adapters.contains_key(name)
    }

    /// Sorted tool names, i.e. the renderer half of the tool manifest.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for RendererRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
