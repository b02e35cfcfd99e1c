//! Host page: owns the session's reactive state and wires the agent's event
//! stream into the dispatcher and the frontend tools.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::dispatcher::{Dispatcher, RenderedCall};
use crate::events::{FrontendToolReply, ReplyStatus, SessionEvent};
use crate::render::{RenderAdapter, RendererRegistry};
use crate::tools::{FrontendTool, FrontendToolRegistry, FrontendToolSpec, ToolDefinition};

/// The page's single reactive value: its background.
///
/// Cloned handles share the same value. Frontend tools write it, the render
/// root reads it, and anyone can subscribe to changes.
#[derive(Clone)]
pub struct PageState {
    default_background: Arc<str>,
    background: Arc<watch::Sender<String>>,
}

impl PageState {
    pub fn new(default_background: impl Into<String>) -> Self {
        let default_background: String = default_background.into();
        let (tx, _) = watch::channel(default_background.clone());
        Self {
            default_background: default_background.into(),
            background: Arc::new(tx),
        }
    }

    pub fn background(&self) -> String {
        self.background.borrow().clone()
    }

    /// Last write wins.
    pub fn set_background(&self, background: impl Into<String>) {
        self.background.send_replace(background.into());
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.background.subscribe()
    }

    pub fn default_background(&self) -> &str {
        &self.default_background
    }

    /// Back to the configured default, as at session start.
    pub fn reset(&self) {
        self.set_background(self.default_background.to_string());
    }
}

/// Everything the agent needs to know up front: which tool calls will be
/// drawn, and which tools the page itself offers.
#[derive(Debug, Clone, Serialize)]
pub struct ToolManifest {
    pub renderers: Vec<String>,
    pub frontend_tools: Vec<FrontendToolSpec>,
    /// The same frontend tools in function-calling form.
    pub definitions: Vec<ToolDefinition>,
}

/// One render of the page.
#[derive(Debug, Clone, Serialize)]
pub struct PageFrame {
    pub session_id: Uuid,
    pub background: String,
    pub calls: Vec<RenderedCall>,
    pub rendered_at: DateTime<Utc>,
}

impl PageFrame {
    fn empty(session_id: Uuid, background: String) -> Self {
        Self {
            session_id,
            background,
            calls: Vec::new(),
            rendered_at: Utc::now(),
        }
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "── {} ── background: {}\n",
            self.rendered_at.format("%H:%M:%S"),
            self.background
        );
        if self.calls.is_empty() {
            out.push_str("(no tool activity)\n");
        }
        for call in &self.calls {
            out.push_str(&format!("[{} {} {}]\n", call.name, call.call_id, call.state));
            out.push_str(&call.visual.to_text());
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

pub struct HostPage {
    session_id: Uuid,
    state: PageState,
    dispatcher: Dispatcher,
    tools: FrontendToolRegistry,
}

impl HostPage {
    /// Mount the page with every built-in renderer and frontend tool.
    pub fn new(config: &Config) -> Self {
        Self::with_registries(
            config,
            RendererRegistry::with_defaults(),
            FrontendToolRegistry::with_defaults(),
        )
    }

    pub fn with_registries(
        config: &Config,
        renderers: RendererRegistry,
        tools: FrontendToolRegistry,
    ) -> Self {
        let session_id = Uuid::new_v4();
        info!(
            session_id = %session_id,
            "Page mounted with {} renderers and {} frontend tools",
            renderers.len(),
            tools.len()
        );
        Self {
            session_id,
            state: PageState::new(config.default_background.clone()),
            dispatcher: Dispatcher::new(renderers),
            tools,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Register or hot-swap a renderer.
    pub fn mount_renderer(&mut self, name: impl Into<String>, adapter: Arc<dyn RenderAdapter>) {
        self.dispatcher.register(name, adapter);
    }

    /// Register or replace a frontend tool.
    pub fn mount_tool(&mut self, tool: Arc<dyn FrontendTool>) {
        self.tools.register(tool);
    }

    pub fn manifest(&self) -> ToolManifest {
        ToolManifest {
            renderers: self.dispatcher.renderers().tool_names(),
            frontend_tools: self.tools.specs(),
            definitions: self.tools.tool_definitions(),
        }
    }

    /// Apply one session event. Frontend tool calls produce a reply for the
    /// agent; everything else only changes what the next frame shows.
    pub async fn handle(&mut self, event: SessionEvent) -> Option<FrontendToolReply> {
        match event {
            SessionEvent::ToolCall(call) => {
                self.dispatcher.observe(call);
                None
            }
            SessionEvent::ToolCancelled { call_id } => {
                self.dispatcher.cancel(&call_id);
                None
            }
            SessionEvent::FrontendToolCall {
                call_id,
                name,
                args,
            } => Some(self.run_tool(call_id, name, args).await),
            SessionEvent::SessionEnded => {
                self.end_session();
                None
            }
        }
    }

    async fn run_tool(&self, call_id: String, name: String, args: Value) -> FrontendToolReply {
        debug!(tool = %name, call_id = %call_id, "Running frontend tool");
        match self.tools.execute(&name, args, &self.state).await {
            Ok(content) => FrontendToolReply {
                call_id,
                name,
                status: ReplyStatus::Ok,
                content,
            },
            Err(e) => {
                warn!(tool = %name, call_id = %call_id, "Frontend tool failed: {}", e);
                FrontendToolReply {
                    call_id,
                    name,
                    status: ReplyStatus::Error,
                    content: e.to_string(),
                }
            }
        }
    }

    fn end_session(&mut self) {
        info!(
            session_id = %self.session_id,
            "Session ended, dropping {} tracked calls",
            self.dispatcher.tracked_calls()
        );
        self.dispatcher.clear();
        self.state.reset();
        self.session_id = Uuid::new_v4();
    }

    pub fn frame(&self) -> PageFrame {
        PageFrame {
            session_id: self.session_id,
            background: self.state.background(),
            calls: self.dispatcher.render_all(),
            rendered_at: Utc::now(),
        }
    }

    /// A frame publisher seeded with the current (empty) page.
    pub fn frame_channel(&self) -> (watch::Sender<PageFrame>, watch::Receiver<PageFrame>) {
        watch::channel(PageFrame::empty(self.session_id, self.state.background()))
    }

    /// Drive the page until the inbound stream closes.
    ///
    /// Every event republishes the frame. Replies go out on `replies`; a
    /// closed reply channel is logged and does not stop the page.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<SessionEvent>,
        replies: mpsc::Sender<FrontendToolReply>,
        frames: watch::Sender<PageFrame>,
    ) -> anyhow::Result<()> {
        frames.send_replace(self.frame());

        while let Some(event) = events.recv().await {
            if let Some(reply) = self.handle(event).await {
                if replies.send(reply).await.is_err() {
                    warn!("Reply channel closed, dropping frontend tool reply");
                }
            }
            frames.send_replace(self.frame());
        }

        info!(session_id = %self.session_id, "Event stream closed, page unmounting");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LifecycleState, ToolCallEvent};
    use crate::render::names;
    use crate::visual::VisualNode;
    use serde_json::json;
    use tokio_test::assert_ok;

    fn page() -> HostPage {
        HostPage::new(&Config::default())
    }

    fn tool_call(call_id: &str, name: &str, state: LifecycleState) -> SessionEvent {
        SessionEvent::ToolCall(ToolCallEvent::new(call_id, name, state))
    }

    #[test]
    fn page_state_is_shared_between_clones() {
        let state = PageState::new("#6366f1");
        let other = state.clone();
        other.set_background("red");
        assert_eq!(state.background(), "red");
        state.reset();
        assert_eq!(other.background(), "#6366f1");
        assert_eq!(state.default_background(), "#6366f1");
    }

    #[test]
    fn manifest_lists_renderers_and_tools() {
        let manifest = page().manifest();
        assert_eq!(manifest.renderers.len(), 8);
        assert!(manifest.renderers.contains(&names::BAR_CHART.to_string()));
        assert_eq!(manifest.frontend_tools.len(), 1);
        assert_eq!(manifest.frontend_tools[0].name, "change_background");
    }

    #[test]
    fn manifest_carries_function_definitions() {
        let manifest = serde_json::to_value(page().manifest()).unwrap();
        let definition = &manifest["definitions"][0];
        assert_eq!(definition["type"], "function");
        assert_eq!(definition["function"]["name"], "change_background");
        assert_eq!(
            definition["function"]["parameters"]["required"],
            json!(["background"])
        );
        assert_eq!(
            definition["function"]["parameters"]["properties"]["background"]["type"],
            "string"
        );
    }

    #[tokio::test]
    async fn frontend_tool_call_changes_background() {
        let mut page = page();
        let reply = page
            .handle(SessionEvent::FrontendToolCall {
                call_id: "f1".to_string(),
                name: "change_background".to_string(),
                args: json!({"background": "linear-gradient(red, blue)"}),
            })
            .await
            .unwrap();
        assert_eq!(reply.status, ReplyStatus::Ok);
        assert_eq!(page.frame().background, "linear-gradient(red, blue)");
    }

    #[tokio::test]
    async fn missing_background_is_rejected_back_to_agent() {
        let mut page = page();
        let reply = page
            .handle(SessionEvent::FrontendToolCall {
                call_id: "f1".to_string(),
                name: "change_background".to_string(),
                args: json!({}),
            })
            .await
            .unwrap();
        assert_eq!(reply.status, ReplyStatus::Error);
        assert!(reply.content.contains("background"));
        assert_eq!(page.frame().background, "#6366f1");
    }

    #[tokio::test]
    async fn unknown_frontend_tool_is_an_error_reply() {
        let mut page = page();
        let reply = page
            .handle(SessionEvent::FrontendToolCall {
                call_id: "f1".to_string(),
                name: "open_pod_bay_doors".to_string(),
                args: json!({}),
            })
            .await
            .unwrap();
        assert_eq!(reply.status, ReplyStatus::Error);
    }

    #[tokio::test]
    async fn session_end_resets_everything() {
        let mut page = page();
        let first_session = page.session_id();
        page.state().set_background("black");
        page.handle(tool_call("c1", names::EMOTIONS, LifecycleState::Executing))
            .await;
        assert_eq!(page.frame().calls.len(), 1);

        page.handle(SessionEvent::SessionEnded).await;
        let frame = page.frame();
        assert!(frame.calls.is_empty());
        assert_eq!(frame.background, "#6366f1");
        assert_ne!(frame.session_id, first_session);
    }

    #[tokio::test]
    async fn cancelled_call_leaves_no_indicator() {
        let mut page = page();
        page.handle(tool_call("c1", names::KEYWORDS, LifecycleState::Executing))
            .await;
        page.handle(SessionEvent::ToolCancelled {
            call_id: "c1".to_string(),
        })
        .await;
        assert!(page.frame().calls.is_empty());
    }

    #[tokio::test]
    async fn run_publishes_frames_and_replies() {
        let page = page();
        let (frames_tx, mut frames_rx) = page.frame_channel();
        let (events_tx, events_rx) = mpsc::channel(8);
        let (replies_tx, mut replies_rx) = mpsc::channel(8);
        let handle = tokio::spawn(page.run(events_rx, replies_tx, frames_tx));

        events_tx
            .send(SessionEvent::ToolCall(
                ToolCallEvent::new("c1", names::WORD_FREQUENCY, LifecycleState::Complete)
                    .with_result(json!({"hello": 5})),
            ))
            .await
            .unwrap();
        events_tx
            .send(SessionEvent::FrontendToolCall {
                call_id: "f1".to_string(),
                name: "change_background".to_string(),
                args: json!({"background": "teal"}),
            })
            .await
            .unwrap();

        let reply = replies_rx.recv().await.unwrap();
        assert_eq!(reply.call_id, "f1");
        assert_eq!(reply.status, ReplyStatus::Ok);

        drop(events_tx);
        assert_ok!(handle.await.unwrap());

        let frame = frames_rx.borrow_and_update().clone();
        assert_eq!(frame.background, "teal");
        assert_eq!(frame.calls.len(), 1);
        assert!(matches!(frame.calls[0].visual, VisualNode::Card { .. }));
    }

    #[test]
    fn empty_frame_text_says_no_activity() {
        let frame = PageFrame::empty(Uuid::new_v4(), "#fff".to_string());
        assert!(frame.to_text().contains("(no tool activity)"));
    }
}
