//! Events exchanged with the agent runtime.
//!
//! Inbound events arrive as JSON objects tagged by `"type"`. Tool names and
//! payload shapes are a convention shared with the agent out of band, so
//! nothing here is typed per tool: `args` and `result` stay as raw JSON until
//! an adapter validates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a single tool call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[serde(alias = "inProgress", alias = "in_progress")]
    Pending,
    Executing,
    Complete,
    #[serde(alias = "error", alias = "failed")]
    Errored,
    /// Any state name this build does not know. Renders nothing.
    #[serde(other)]
    Unknown,
}

impl LifecycleState {
    /// `Complete` and `Errored` end a call; later events for it are stale.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Errored)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Executing => write!(f, "executing"),
            Self::Complete => write!(f, "complete"),
            Self::Errored => write!(f, "errored"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// One observation of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallEvent {
    pub call_id: String,
    pub name: String,
    pub state: LifecycleState,
    #[serde(default = "empty_args")]
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure reason reported by the agent for `Errored` calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn empty_args() -> Value {
    Value::Object(Default::default())
}

impl ToolCallEvent {
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, state: LifecycleState) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            state,
            args: empty_args(),
            result: None,
            error: None,
        }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The result, but only once the call is `Complete`.
    pub fn completed_result(&self) -> Option<&Value> {
        match self.state {
            LifecycleState::Complete => self.result.as_ref(),
            _ => None,
        }
    }
}

/// Everything the agent session can tell the host page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A tool call was observed or moved to a new state.
    ToolCall(ToolCallEvent),
    /// The agent abandoned a call before it completed.
    ToolCancelled { call_id: String },
    /// The agent asks the page to run one of its frontend tools.
    FrontendToolCall {
        call_id: String,
        name: String,
        #[serde(default = "empty_args")]
        args: Value,
    },
    /// The chat session is over.
    SessionEnded,
}

/// Outcome of a frontend tool, as reported back to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyStatus {
    Ok,
    Error,
}

/// Answer to a [`SessionEvent::FrontendToolCall`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontendToolReply {
    pub call_id: String,
    pub name: String,
    pub status: ReplyStatus,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_tool_call_with_defaults() {
        let event: SessionEvent = serde_json::from_value(json!({
            "type": "tool_call",
            "call_id": "c1",
            "name": "bar_chat_data",
            "state": "executing"
        }))
        .unwrap();
        let SessionEvent::ToolCall(call) = event else {
            panic!("expected tool call");
        };
        assert_eq!(call.state, LifecycleState::Executing);
        assert_eq!(call.args, json!({}));
        assert!(call.result.is_none());
    }

    #[test]
    fn state_aliases_and_unknown() {
        let parse = |s: &str| serde_json::from_value::<LifecycleState>(json!(s)).unwrap();
        assert_eq!(parse("inProgress"), LifecycleState::Pending);
        assert_eq!(parse("failed"), LifecycleState::Errored);
        assert_eq!(parse("complete"), LifecycleState::Complete);
        assert_eq!(parse("paused"), LifecycleState::Unknown);
    }

    #[test]
    fn parses_cancel_and_session_end() {
        let cancel: SessionEvent =
            serde_json::from_str(r#"{"type":"tool_cancelled","call_id":"c9"}"#).unwrap();
        assert_eq!(
            cancel,
            SessionEvent::ToolCancelled {
                call_id: "c9".to_string()
            }
        );
        let end: SessionEvent = serde_json::from_str(r#"{"type":"session_ended"}"#).unwrap();
        assert_eq!(end, SessionEvent::SessionEnded);
    }

    #[test]
    fn completed_result_hidden_until_complete() {
        let executing = ToolCallEvent::new("c1", "word_frequency", LifecycleState::Executing)
            .with_result(json!({"hello": 5}));
        assert!(executing.completed_result().is_none());

        let complete = ToolCallEvent {
            state: LifecycleState::Complete,
            ..executing
        };
        assert_eq!(complete.completed_result(), Some(&json!({"hello": 5})));
    }

    #[test]
    fn terminal_states() {
        assert!(LifecycleState::Complete.is_terminal());
        assert!(LifecycleState::Errored.is_terminal());
        assert!(!LifecycleState::Executing.is_terminal());
        assert!(!LifecycleState::Unknown.is_terminal());
    }
}
