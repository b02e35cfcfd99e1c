//! Tool-call dispatcher.
//!
//! Tracks every tool call the agent reports, keyed by `(call_id, name)`, and
//! turns the tracked calls into visuals through the renderer registry.
//!
//! ## Lifecycle
//!
//! ```text
//! Pending ──args──▶ Executing ──result──▶ Complete
//!                       │
//!                       └──failure──▶ Errored
//! ```
//!
//! State changes come only from agent events. Several calls may be in flight
//! at once, including several calls to the same tool; each is tracked on its
//! own. A call cancelled before it finishes is dropped so no stale progress
//! indicator remains; a finished call keeps its visual.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::events::{LifecycleState, ToolCallEvent};
use crate::render::{RenderAdapter, RendererRegistry};
use crate::visual::VisualNode;

/// A tool call's visual as it appears in a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedCall {
    pub call_id: String,
    pub name: String,
    pub state: LifecycleState,
    pub visual: VisualNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CallKey {
    call_id: String,
    name: String,
}

#[derive(Debug)]
struct TrackedCall {
    event: ToolCallEvent,
    /// First-seen order, used to keep frames stable.
    seq: u64,
}

/// Generic visual substituted when an adapter fails.
pub fn rendering_error() -> VisualNode {
    VisualNode::notice(
        "Rendering error",
        Some("This result could not be displayed.".to_string()),
    )
}

pub struct Dispatcher {
    renderers: RendererRegistry,
    calls: HashMap<CallKey, TrackedCall>,
    next_seq: u64,
}

impl Dispatcher {
    pub fn new(renderers: RendererRegistry) -> Self {
        Self {
            renderers,
            calls: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Insert or replace the adapter for `name`. Tracked calls pick up the
    /// new adapter on the next frame.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        adapter: Arc<dyn RenderAdapter>,
    ) -> Option<Arc<dyn RenderAdapter>> {
        self.renderers.register(name, adapter)
    }

    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    /// Render a single event.
    ///
    /// Unknown tool names render nothing. A failing adapter (error or panic)
    /// is logged and replaced by [`rendering_error`]; it never propagates.
    pub fn dispatch(&self, event: &ToolCallEvent) -> Option<VisualNode> {
        let adapter = match self.renderers.get(&event.name) {
            Some(adapter) => adapter,
            None => {
                debug!(tool = %event.name, "No render adapter, nothing to draw");
                return None;
            }
        };

        match panic::catch_unwind(AssertUnwindSafe(|| adapter.render(event))) {
            Ok(Ok(visual)) => visual,
            Ok(Err(e)) => {
                error!(
                    tool = %event.name,
                    call_id = %event.call_id,
                    state = %event.state,
                    "Render adapter failed: {}",
                    e
                );
                Some(rendering_error())
            }
            Err(payload) => {
                error!(
                    tool = %event.name,
                    call_id = %event.call_id,
                    state = %event.state,
                    "Render adapter panicked: {}",
                    panic_message(payload.as_ref())
                );
                Some(rendering_error())
            }
        }
    }

    /// Record an agent event for a call.
    ///
    /// Calls are tracked even when no adapter is registered for their tool
    /// name, so an adapter mounted later still draws them. They are dropped
    /// on cancel or at session end.
    ///
    /// The first event creates the call. Later events move its state and
    /// attach the result or error. Arguments are fixed by the first event
    /// that carries any. Events for a call that already finished are
    /// ignored. Returns whether the event was applied.
    pub fn observe(&mut self, event: ToolCallEvent) -> bool {
        let key = CallKey {
            call_id: event.call_id.clone(),
            name: event.name.clone(),
        };

        let Some(tracked) = self.calls.get_mut(&key) else {
            debug!(
                tool = %event.name,
                call_id = %event.call_id,
                state = %event.state,
                "Tracking new tool call"
            );
            let seq = self.next_seq;
            self.next_seq += 1;
            self.calls.insert(key, TrackedCall { event, seq });
            return true;
        };

        let current = &mut tracked.event;
        if current.state.is_terminal() {
            warn!(
                tool = %current.name,
                call_id = %current.call_id,
                "Ignoring {} event for call already {}",
                event.state,
                current.state
            );
            return false;
        }

        if has_args(&event.args) {
            if !has_args(&current.args) {
                current.args = event.args;
            } else if current.args != event.args {
                debug!(call_id = %current.call_id, "Ignoring changed args on existing call");
            }
        }
        debug!(
            tool = %current.name,
            call_id = %current.call_id,
            "Tool call {} -> {}",
            current.state,
            event.state
        );
        current.state = event.state;
        if event.result.is_some() {
            current.result = event.result;
        }
        if event.error.is_some() {
            current.error = event.error;
        }
        true
    }

    /// Drop every unfinished call with `call_id`. Calls that already reached
    /// `Complete` or `Errored` keep their visual. Returns whether anything
    /// was removed.
    pub fn cancel(&mut self, call_id: &str) -> bool {
        let before = self.calls.len();
        let mut finished = 0;
        self.calls.retain(|key, tracked| {
            if key.call_id != call_id {
                return true;
            }
            let keep = tracked.event.state.is_terminal();
            if keep {
                finished += 1;
            }
            keep
        });
        let removed = before != self.calls.len();
        if finished > 0 {
            warn!(
                call_id = %call_id,
                "Ignoring cancel for {} finished call(s)",
                finished
            );
        }
        if removed {
            debug!(call_id = %call_id, "Tool call cancelled");
        } else if finished == 0 {
            debug!(call_id = %call_id, "Cancel for unknown call");
        }
        removed
    }

    /// Forget every call, e.g. when the session ends.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.next_seq = 0;
    }

    /// Current state of a tracked call.
    pub fn call(&self, call_id: &str, name: &str) -> Option<&ToolCallEvent> {
        self.calls
            .get(&CallKey {
                call_id: call_id.to_string(),
                name: name.to_string(),
            })
            .map(|tracked| &tracked.event)
    }

    pub fn tracked_calls(&self) -> usize {
        self.calls.len()
    }

    /// Render every tracked call in first-seen order, skipping calls that
    /// have nothing to show.
    pub fn render_all(&self) -> Vec<RenderedCall> {
        let mut tracked: Vec<&TrackedCall> = self.calls.values().collect();
        tracked.sort_by_key(|t| t.seq);
        tracked
            .into_iter()
            .filter_map(|t| {
                self.dispatch(&t.event).map(|visual| RenderedCall {
                    call_id: t.event.call_id.clone(),
                    name: t.event.name.clone(),
                    state: t.event.state,
                    visual,
                })
            })
            .collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(RendererRegistry::with_defaults())
    }
}

fn has_args(args: &serde_json::Value) -> bool {
    match args {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{names, RenderError};
    use serde_json::json;

    fn event(call_id: &str, name: &str, state: LifecycleState) -> ToolCallEvent {
        ToolCallEvent::new(call_id, name, state)
    }

    #[test]
    fn unknown_tool_renders_nothing() {
        let dispatcher = Dispatcher::default();
        for state in [
            LifecycleState::Pending,
            LifecycleState::Executing,
            LifecycleState::Complete,
            LifecycleState::Errored,
            LifecycleState::Unknown,
        ] {
            let e = event("c1", "launch_rockets", state).with_result(json!({"a": 1}));
            assert_eq!(dispatcher.dispatch(&e), None);
        }
    }

    #[test]
    fn adapter_error_becomes_rendering_error() {
        let mut dispatcher = Dispatcher::new(RendererRegistry::empty());
        dispatcher.register(
            "flaky",
            Arc::new(|_: &ToolCallEvent| -> Result<Option<VisualNode>, RenderError> {
                Err(RenderError::Other("bad shape".to_string()))
            }),
        );
        let e = event("c1", "flaky", LifecycleState::Complete).with_result(json!(null));
        assert_eq!(dispatcher.dispatch(&e), Some(rendering_error()));
    }

    #[test]
    fn adapter_panic_is_contained() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(
            "explodes",
            Arc::new(|_: &ToolCallEvent| -> Result<Option<VisualNode>, RenderError> {
                panic!("adapter bug")
            }),
        );
        dispatcher.observe(event("c1", "explodes", LifecycleState::Executing));
        dispatcher.observe(
            event("c2", names::WORD_FREQUENCY, LifecycleState::Complete)
                .with_result(json!({"hello": 5})),
        );

        let frame = dispatcher.render_all();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0].visual, rendering_error());
        assert!(matches!(frame[1].visual, VisualNode::Card { .. }));
    }

    #[test]
    fn lifecycle_progresses_and_args_stay_fixed() {
        let mut dispatcher = Dispatcher::default();
        assert!(dispatcher.observe(event("c1", names::BAR_CHART, LifecycleState::Pending)));
        assert!(dispatcher.render_all().is_empty());

        dispatcher.observe(
            event("c1", names::BAR_CHART, LifecycleState::Executing)
                .with_args(json!({"title": "Tips"})),
        );
        let frame = dispatcher.render_all();
        assert_eq!(
            frame[0].visual,
            VisualNode::progress("Creating bar chart: Tips...", "bg-blue-50")
        );

        dispatcher.observe(
            event("c1", names::BAR_CHART, LifecycleState::Complete)
                .with_args(json!({"title": "Other"}))
                .with_result(json!({"title": "Tips", "data": {"Mon": 1}})),
        );
        let call = dispatcher.call("c1", names::BAR_CHART).unwrap();
        assert_eq!(call.args, json!({"title": "Tips"}));
        assert_eq!(call.state, LifecycleState::Complete);
        assert!(matches!(
            dispatcher.render_all()[0].visual,
            VisualNode::Card { .. }
        ));
    }

    #[test]
    fn events_after_terminal_state_are_ignored() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.observe(
            event("c1", names::SENTIMENT, LifecycleState::Complete).with_result(json!("positive")),
        );
        assert!(!dispatcher.observe(event("c1", names::SENTIMENT, LifecycleState::Executing)));
        assert_eq!(
            dispatcher.call("c1", names::SENTIMENT).unwrap().state,
            LifecycleState::Complete
        );
    }

    #[test]
    fn errored_call_shows_failure_notice() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.observe(event("c1", names::KEYWORDS, LifecycleState::Executing));
        dispatcher.observe(
            event("c1", names::KEYWORDS, LifecycleState::Errored).with_error("model timeout"),
        );
        assert_eq!(
            dispatcher.render_all()[0].visual,
            VisualNode::notice(
                "Keyword extraction failed",
                Some("model timeout".to_string())
            )
        );
    }

    #[test]
    fn cancellation_removes_visual() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.observe(event("c1", names::EMOTIONS, LifecycleState::Executing));
        assert_eq!(dispatcher.render_all().len(), 1);

        assert!(dispatcher.cancel("c1"));
        assert!(dispatcher.render_all().is_empty());
        assert!(!dispatcher.cancel("c1"));
    }

    #[test]
    fn late_cancel_keeps_finished_visual() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.observe(
            event("c1", names::WORD_FREQUENCY, LifecycleState::Complete)
                .with_result(json!({"hello": 5})),
        );
        assert!(!dispatcher.observe(event("c1", names::WORD_FREQUENCY, LifecycleState::Executing)));

        assert!(!dispatcher.cancel("c1"));
        let frame = dispatcher.render_all();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].state, LifecycleState::Complete);
        assert!(matches!(frame[0].visual, VisualNode::Card { .. }));
    }

    #[test]
    fn calls_without_adapter_render_once_one_is_mounted() {
        let mut dispatcher = Dispatcher::new(RendererRegistry::empty());
        dispatcher.observe(event("c1", "late_tool", LifecycleState::Executing));
        assert_eq!(dispatcher.tracked_calls(), 1);
        assert!(dispatcher.render_all().is_empty());

        dispatcher.register(
            "late_tool",
            Arc::new(|_: &ToolCallEvent| -> Result<Option<VisualNode>, RenderError> {
                Ok(Some(VisualNode::text("now visible")))
            }),
        );
        assert_eq!(dispatcher.render_all()[0].visual, VisualNode::text("now visible"));
    }

    #[test]
    fn concurrent_calls_to_same_tool_are_independent() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.observe(event("a", names::WORD_FREQUENCY, LifecycleState::Executing));
        dispatcher.observe(event("b", names::WORD_FREQUENCY, LifecycleState::Executing));
        dispatcher.observe(
            event("b", names::WORD_FREQUENCY, LifecycleState::Complete)
                .with_result(json!({"hello": 5})),
        );

        let frame = dispatcher.render_all();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame[0].call_id, "a");
        assert_eq!(frame[0].state, LifecycleState::Executing);
        assert!(matches!(frame[0].visual, VisualNode::Progress { .. }));
        assert_eq!(frame[1].call_id, "b");
        assert!(matches!(frame[1].visual, VisualNode::Card { .. }));
    }

    #[test]
    fn hot_reload_applies_to_tracked_calls() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.observe(event("c1", names::READABILITY, LifecycleState::Executing));
        dispatcher.register(
            names::READABILITY,
            Arc::new(|_: &ToolCallEvent| -> Result<Option<VisualNode>, RenderError> {
                Ok(Some(VisualNode::text("v2")))
            }),
        );
        assert_eq!(dispatcher.render_all()[0].visual, VisualNode::text("v2"));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.observe(event("c1", names::ENTITIES, LifecycleState::Executing));
        dispatcher.clear();
        assert_eq!(dispatcher.tracked_calls(), 0);
    }
}
