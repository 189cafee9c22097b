#![forbid(unsafe_code)]

//! Headless layout + SVG rendering for recovered flowcharts.
//!
//! The input is the strictly parsed model from `selkie-core`; the output is a
//! standalone SVG string with an explicit `viewBox` (the render adapter reads
//! it back for the aspect-ratio orientation fallback).

pub mod layout;
pub mod svg;
pub mod text;

use std::sync::Arc;

pub use layout::{Layout, LayoutConfig, layout_flowchart};
pub use svg::{SvgRenderOptions, Theme, render_svg};
pub use text::{DeterministicTextMeasurer, TextMeasurer};

use selkie_core::parse::Flowchart;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("diagram has no nodes to lay out")]
    EmptyDiagram,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    pub config: LayoutConfig,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer),
            config: LayoutConfig::default(),
        }
    }
}

/// Lays out and renders a parsed flowchart in one step.
pub fn render_flowchart_svg(
    chart: &Flowchart,
    layout_options: &LayoutOptions,
    svg_options: &SvgRenderOptions,
) -> Result<String> {
    let layout = layout_flowchart(
        chart,
        layout_options.text_measurer.as_ref(),
        &layout_options.config,
    )?;
    tracing::debug!(
        width = layout.width,
        height = layout.height,
        nodes = layout.nodes.len(),
        "laid out flowchart"
    );
    Ok(render_svg(&layout, svg_options))
}
