//! Frontend tools: capabilities the host page exposes to the agent.
//!
//! The agent sees each tool as a name, a description and an ordered list of
//! typed parameters. When it calls one, the page runs the handler locally
//! and hands the returned string back to the agent. That string is what the
//! agent reads in its own context; it never reaches the visual layer.

mod background;

pub use background::ChangeBackground;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::page::PageState;

// ============================================================================
// Descriptors
// ============================================================================

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParameterType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        };
        f.write_str(name)
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub description: String,
    pub required: bool,
}

impl ToolParameter {
    pub fn required(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        param_type: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }
}

/// What the agent is told about a frontend tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl FrontendToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(mut self, parameter: ToolParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// JSON schema for the parameter list, in declaration order.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.parameters {
            properties.insert(
                p.name.clone(),
                json!({ "type": p.param_type, "description": p.description }),
            );
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Tool definition in the function-calling format LLM APIs expect.
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: self.parameters_schema(),
            },
        }
    }

    /// Check `args` against the declared parameters.
    ///
    /// Required parameters must be present, non-null and, for strings,
    /// non-blank. Present parameters must have the declared JSON type.
    /// Undeclared keys are allowed.
    pub fn validate(&self, args: &Value) -> Result<(), ToolError> {
        let object = match args {
            Value::Object(object) => object,
            Value::Null if !self.parameters.iter().any(|p| p.required) => return Ok(()),
            _ => return Err(ToolError::NotAnObject(self.name.clone())),
        };
        for p in &self.parameters {
            let value = object.get(&p.name).filter(|v| !v.is_null());
            let Some(value) = value else {
                if p.required {
                    return Err(ToolError::MissingArgument {
                        tool: self.name.clone(),
                        param: p.name.clone(),
                    });
                }
                continue;
            };
            if !p.param_type.accepts(value) {
                return Err(ToolError::InvalidArgument {
                    tool: self.name.clone(),
                    param: p.name.clone(),
                    expected: p.param_type,
                });
            }
            if p.required && value.as_str().is_some_and(|s| s.trim().is_empty()) {
                return Err(ToolError::MissingArgument {
                    tool: self.name.clone(),
                    param: p.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Tool definition for LLM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

/// Function definition with schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required argument '{param}' for {tool}")]
    MissingArgument { tool: String, param: String },

    #[error("Invalid argument '{param}' for {tool}: expected {expected}")]
    InvalidArgument {
        tool: String,
        param: String,
        expected: ParameterType,
    },

    #[error("Arguments for {0} must be a JSON object")]
    NotAnObject(String),

    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl ToolError {
    /// Argument problems are the agent's to fix; handler failures are ours.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. } | Self::InvalidArgument { .. } | Self::NotAnObject(_)
        )
    }
}

// ============================================================================
// Tool trait and registry
// ============================================================================

/// Trait for implementing frontend tools.
#[async_trait]
pub trait FrontendTool: Send + Sync {
    /// The unique name of this tool.
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// Declared parameters, in the order the agent should see them.
    fn parameters(&self) -> Vec<ToolParameter>;

    /// Run the tool. `args` has already been validated against
    /// [`FrontendTool::parameters`].
    async fn execute(&self, args: Value, page: &PageState) -> Result<String, ToolError>;

    fn spec(&self) -> FrontendToolSpec {
        FrontendToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Boxed future returned by closure handlers.
pub type HandlerFuture = Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send>>;

type Handler = dyn Fn(Value, PageState) -> HandlerFuture + Send + Sync;

/// A frontend tool assembled from a spec and an async closure.
pub struct FnTool {
    spec: FrontendToolSpec,
    handler: Arc<Handler>,
}

impl FnTool {
    pub fn new<F, Fut>(spec: FrontendToolSpec, handler: F) -> Self
    where
        F: Fn(Value, PageState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        Self {
            spec,
            handler: Arc::new(move |args: Value, page: PageState| -> HandlerFuture {
                Box::pin(handler(args, page))
            }),
        }
    }
}

#[async_trait]
impl FrontendTool for FnTool {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn description(&self) -> &str {
        &self.spec.description
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        self.spec.parameters.clone()
    }

    async fn execute(&self, args: Value, page: &PageState) -> Result<String, ToolError> {
        Ok((self.handler)(args, page.clone()).await?)
    }
}

/// Registry of frontend tools keyed by name.
pub struct FrontendToolRegistry {
    tools: HashMap<String, Arc<dyn FrontendTool>>,
}

impl FrontendToolRegistry {
    /// Create an empty registry (no built-in tools).
    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry with the built-in page tools.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(ChangeBackground));
        tracing::debug!("Frontend tool registry ready with {} tools", registry.tools.len());
        registry
    }

    /// Insert or replace a tool under its own name. Returns the tool it
    /// replaced, if any.
    pub fn register(&mut self, tool: Arc<dyn FrontendTool>) -> Option<Arc<dyn FrontendTool>> {
        let name = tool.name().to_string();
        let previous = self.tools.insert(name.clone(), tool);
        if previous.is_some() {
            tracing::info!("Replaced frontend tool {}", name);
        } else {
            tracing::debug!("Registered frontend tool {}", name);
        }
        previous
    }

    /// Register a closure-backed tool described by `spec`.
    pub fn register_fn<F, Fut>(
        &mut self,
        spec: FrontendToolSpec,
        handler: F,
    ) -> Option<Arc<dyn FrontendTool>>
    where
        F: Fn(Value, PageState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        self.register(Arc::new(FnTool::new(spec, handler)))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FrontendTool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists by name.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Descriptors to advertise to the agent, sorted by name.
    pub fn specs(&self) -> Vec<FrontendToolSpec> {
        let mut specs: Vec<FrontendToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool schemas in LLM-compatible format.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.specs().iter().map(FrontendToolSpec::to_definition).collect()
    }

    /// Validate the arguments and run a tool by name.
    pub async fn execute(
        &self,
        name: &str,
        args: Value,
        page: &PageState,
    ) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tool.spec().validate(&args)?;
        tool.execute(args, page).await
    }
}

impl Default for FrontendToolRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
