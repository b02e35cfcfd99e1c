//! Data visualization adapters: bar chart and scatter plot.

use std::sync::Arc;

use serde_json::Value;

use super::payload::{self, BarChart, Parsed, ScatterPlot};
use super::{failure_notice, LifecycleAdapter, RenderAdapter, ToolView};
use crate::format;
use crate::visual::VisualNode;

const BAR_COLOR: &str = "bg-blue-500";

pub fn bar_chart() -> Arc<dyn RenderAdapter> {
    Arc::new(LifecycleAdapter(BarChartView))
}

pub fn scatter_plot() -> Arc<dyn RenderAdapter> {
    Arc::new(LifecycleAdapter(ScatterPlotView))
}

fn arg_title(args: &Value) -> String {
    args.get("title").map(payload::as_text).unwrap_or_default()
}

/// One proportional bar per data key, labelled in dollars.
pub struct BarChartView;

impl ToolView for BarChartView {
    fn title(&self) -> &str {
        "Bar chart"
    }

    fn executing(&self, args: &Value) -> VisualNode {
        VisualNode::progress(
            format!("Creating bar chart: {}...", arg_title(args)),
            "bg-blue-50",
        )
    }

    fn complete(&self, result: &Value) -> VisualNode {
        let chart = match payload::parse::<BarChart>(result) {
            Parsed::Data(chart) => chart,
            Parsed::Failed(message) => return failure_notice(self.title(), Some(message)),
        };

        let values: Vec<f64> = chart.data.iter().map(|(_, v)| *v).collect();
        let mut children = vec![VisualNode::muted(chart.summary)];
        children.extend(chart.data.iter().map(|(label, value)| VisualNode::Bar {
            label: label.clone(),
            width: format::relative_width(*value, values.iter().copied()),
            caption: format::money(*value),
            color: BAR_COLOR.to_string(),
        }));
        children.push(VisualNode::muted(format!(
            "{} vs {}",
            chart.x_label, chart.y_label
        )));

        VisualNode::card("📊", chart.title, children)
    }
}

/// Point count, axes and tip range.
pub struct ScatterPlotView;

impl ToolView for ScatterPlotView {
    fn title(&self) -> &str {
        "Scatter plot"
    }

    fn executing(&self, args: &Value) -> VisualNode {
        VisualNode::progress(
            format!("Creating scatter plot: {}...", arg_title(args)),
            "bg-purple-50",
        )
    }

    fn complete(&self, result: &Value) -> VisualNode {
        let plot = match payload::parse::<ScatterPlot>(result) {
            Parsed::Data(plot) => plot,
            Parsed::Failed(message) => return failure_notice(self.title(), Some(message)),
        };

        let mut children = vec![
            VisualNode::muted(plot.summary),
            VisualNode::field("Data Points", format!("{} records", plot.point_count)),
            VisualNode::field(
                "Axes",
                format!("{} (X) vs {} (Y)", plot.x_label, plot.y_label),
            ),
        ];
        let min = format::min_value(plot.tips.iter().copied());
        if let Some(min) = min {
            let max = format::max_value(plot.tips.iter().copied());
            children.push(VisualNode::field(
                "Tip Range",
                format!("{} - {}", format::money(min), format::money(max)),
            ));
        }

        VisualNode::card("📈", plot.title, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LifecycleState, ToolCallEvent};
    use serde_json::json;

    fn bars(node: &VisualNode) -> Vec<(String, f64, String)> {
        node.descendants()
            .into_iter()
            .filter_map(|n| match n {
                VisualNode::Bar {
                    label,
                    width,
                    caption,
                    ..
                } => Some((label.clone(), *width, caption.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn bar_chart_scenario() {
        let node = BarChartView.complete(&json!({
            "title": "Tips",
            "summary": "s",
            "data": {"Mon": 10, "Tue": 20},
            "x_label": "Day",
            "y_label": "Tip"
        }));
        assert_eq!(
            bars(&node),
            vec![
                ("Mon".to_string(), 50.0, "$10.00".to_string()),
                ("Tue".to_string(), 100.0, "$20.00".to_string()),
            ]
        );
        let VisualNode::Card { title, children, .. } = &node else {
            panic!("expected card");
        };
        assert_eq!(title, "Tips");
        assert_eq!(children.last(), Some(&VisualNode::muted("Day vs Tip")));
    }

    #[test]
    fn bar_chart_all_zero_renders_minimum_width() {
        let node = BarChartView.complete(&json!({"data": {"Mon": 0, "Tue": 0}}));
        let widths: Vec<f64> = bars(&node).into_iter().map(|(_, w, _)| w).collect();
        assert_eq!(widths, vec![0.0, 0.0]);
    }

    #[test]
    fn bar_chart_executing_copy() {
        let call = ToolCallEvent::new("c1", "bar_chat_data", LifecycleState::Executing)
            .with_args(json!({"title": "Tips by day"}));
        let visual = bar_chart().render(&call).unwrap();
        assert_eq!(
            visual,
            Some(VisualNode::progress(
                "Creating bar chart: Tips by day...",
                "bg-blue-50"
            ))
        );
    }

    #[test]
    fn bar_chart_missing_data_is_empty_card() {
        let node = BarChartView.complete(&json!({"title": "Nothing"}));
        assert!(bars(&node).is_empty());
    }

    #[test]
    fn scatter_plot_range_and_count() {
        let node = ScatterPlotView.complete(&json!({
            "title": "Scatter",
            "summary": "Scatter plot showing tips by day from 3 records",
            "data": {"days": ["Sun", "Sun", "Sat"], "tips": [1.01, 5.0, 3.5]},
            "x_label": "Day",
            "y_label": "Tip"
        }));
        let nodes = node.descendants();
        assert!(nodes.contains(&&VisualNode::field("Data Points", "3 records")));
        assert!(nodes.contains(&&VisualNode::field("Axes", "Day (X) vs Tip (Y)")));
        assert!(nodes.contains(&&VisualNode::field("Tip Range", "$1.01 - $5.00")));
    }

    #[test]
    fn scatter_plot_without_tips_omits_range() {
        let node = ScatterPlotView.complete(&json!({"data": {"days": []}}));
        let has_range = node
            .descendants()
            .iter()
            .any(|n| matches!(n, VisualNode::Field { label, .. } if label == "Tip Range"));
        assert!(!has_range);
    }

    #[test]
    fn tool_failure_payload_becomes_notice() {
        let node = ScatterPlotView.complete(&json!({"error": "csv missing"}));
        assert_eq!(
            node,
            VisualNode::notice("Scatter plot failed", Some("csv missing".to_string()))
        );
    }
}
