//! # mini-mind
//!
//! Host page for an AI agent chat that draws the agent's tool calls as
//! visual widgets instead of raw data.
//!
//! This library provides:
//! - A renderer registry mapping tool names to state-aware render adapters
//! - A dispatcher tracking concurrent tool calls through their lifecycle
//! - A frontend tool registry exposing page capabilities to the agent
//! - The host page that owns the reactive background and publishes frames
//!
//! ## Architecture
//!
//! ```text
//!   agent session ──SessionEvent──▶ ┌───────────────────┐
//!                                   │     HostPage      │──PageFrame──▶ surface
//!   agent session ◀──ToolReply───── │ ┌───────────────┐ │
//!                                   │ │  Dispatcher   │ │
//!                                   │ │  (renderers)  │ │
//!                                   │ └───────────────┘ │
//!                                   │ ┌───────────────┐ │
//!                                   │ │ FrontendTools │ │
//!                                   │ └───────────────┘ │
//!                                   └───────────────────┘
//! ```
//!
//! ## Modules
//! - `format`: presentation-safe number helpers
//! - `visual`: the visual description tree
//! - `render`: adapters per tool and the registry
//! - `dispatcher`: lifecycle tracking and adapter invocation
//! - `tools`: frontend tools, including `change_background`
//! - `page`: page state, session loop, frames

pub mod config;
pub mod dispatcher;
pub mod events;
pub mod format;
pub mod page;
pub mod render;
pub mod tools;
pub mod util;
pub mod visual;

pub use config::Config;
pub use dispatcher::Dispatcher;
pub use events::{FrontendToolReply, LifecycleState, SessionEvent, ToolCallEvent};
pub use page::{HostPage, PageFrame, PageState};
pub use render::RendererRegistry;
pub use tools::FrontendToolRegistry;
pub use visual::VisualNode;
