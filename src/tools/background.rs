//! `change_background` - lets the agent restyle the page.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{FrontendTool, ParameterType, ToolError, ToolParameter};
use crate::page::PageState;

pub const NAME: &str = "change_background";

/// Sets the page background to any CSS color or gradient.
pub struct ChangeBackground;

#[derive(Debug, Deserialize)]
struct ChangeBackgroundArgs {
    background: String,
}

#[async_trait]
impl FrontendTool for ChangeBackground {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Change the background color of the chat. Can be anything that CSS accepts."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required(
            "background",
            ParameterType::String,
            "The background color or gradient. Prefer gradients.",
        )]
    }

    async fn execute(&self, args: Value, page: &PageState) -> Result<String, ToolError> {
        let args: ChangeBackgroundArgs = serde_json::from_value(args)
            .map_err(|e| anyhow::anyhow!("Invalid arguments: {}", e))?;

        let background = args.background.trim();
        if background.is_empty() {
            return Err(ToolError::MissingArgument {
                tool: NAME.to_string(),
                param: "background".to_string(),
            });
        }

        page.set_background(background);
        tracing::info!("Background changed to {}", background);
        Ok(format!("Background changed to {}", background))
    }
}
