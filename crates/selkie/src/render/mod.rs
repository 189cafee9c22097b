//! Render adapter, display slots, document preview, and (behind features)
//! rasterization and paginated export.

mod adapter;
pub mod preview;
pub mod view;

#[cfg(feature = "export")]
pub mod export;
#[cfg(feature = "raster")]
pub mod raster;

pub use adapter::{BlockOutcome, DiagramRenderer, RenderError, RenderedDiagram, Result};
pub use preview::{DocumentPreview, PreviewOptions, PrintPaletteGuard};
pub use selkie_render::{
    DeterministicTextMeasurer, LayoutConfig, LayoutOptions, SvgRenderOptions, TextMeasurer, Theme,
};
pub use view::{DiagramSlot, Generation};

/// Returns a process-wide-unique element id for one render call.
///
/// The rendered SVG uses its root id as a prefix for internal ids (arrow
/// markers), so inlining several diagrams in the same tree is only safe when
/// every render gets a fresh id.
pub fn unique_diagram_id() -> String {
    format!("sk-{}", uuid::Uuid::new_v4().simple())
}

/// Cheap, non-validating extraction of the root `viewBox` width/height.
/// Sufficient for the SVG this workspace emits.
pub(crate) fn viewbox_size(svg: &str) -> Option<(f64, f64)> {
    let i = svg.find("viewBox=\"")?;
    let rest = &svg[i + "viewBox=\"".len()..];
    let end = rest.find('"')?;
    let mut it = rest[..end].split_whitespace();
    let _min_x = it.next()?.parse::<f64>().ok()?;
    let _min_y = it.next()?.parse::<f64>().ok()?;
    let width = it.next()?.parse::<f64>().ok()?;
    let height = it.next()?.parse::<f64>().ok()?;
    (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
        .then_some((width, height))
}
