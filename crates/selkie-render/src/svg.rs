//! SVG emission for a laid-out flowchart.

use crate::layout::Layout;
use selkie_core::parse::NodeShape;
use std::fmt::Write as _;

/// Color palette applied to emitted SVG.
///
/// `print_safe` is the palette the exporter temporarily forces while
/// rasterizing document pages; see the exporter's theme guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background: Option<String>,
    pub node_fill: String,
    pub node_stroke: String,
    pub decision_fill: String,
    pub edge_stroke: String,
    pub text_color: String,
    pub cluster_fill: String,
    pub cluster_stroke: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: None,
            node_fill: "#ECECFF".to_string(),
            node_stroke: "#9370DB".to_string(),
            decision_fill: "#FFF5AD".to_string(),
            edge_stroke: "#555555".to_string(),
            text_color: "#333333".to_string(),
            cluster_fill: "#80808014".to_string(),
            cluster_stroke: "#808080".to_string(),
        }
    }
}

impl Theme {
    /// High-contrast palette for paper: white background, black ink.
    pub fn print_safe() -> Self {
        Self {
            background: Some("#FFFFFF".to_string()),
            node_fill: "#FFFFFF".to_string(),
            node_stroke: "#000000".to_string(),
            decision_fill: "#FFFFFF".to_string(),
            edge_stroke: "#000000".to_string(),
            text_color: "#000000".to_string(),
            cluster_fill: "#FFFFFF".to_string(),
            cluster_stroke: "#000000".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Root element id; also prefixes internal ids (arrow marker) so multiple
    /// diagrams can be inlined in the same tree without collisions.
    pub diagram_id: Option<String>,
    pub theme: Theme,
    pub font_family: String,
    pub font_size: f64,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            diagram_id: None,
            theme: Theme::default(),
            font_family: "Arial, sans-serif".to_string(),
            font_size: 14.0,
        }
    }
}

pub fn render_svg(layout: &Layout, options: &SvgRenderOptions) -> String {
    let theme = &options.theme;
    let width = layout.width.ceil();
    let height = layout.height.ceil();
    let id = options.diagram_id.as_deref().unwrap_or("selkie");
    let marker_id = format!("{id}-arrow");

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" width="{width}" height="{height}" viewBox="0 0 {width} {height}" font-family="{}" font-size="{}">"#,
        escape_xml(id),
        escape_xml(&options.font_family),
        options.font_size,
    );

    if let Some(bg) = &theme.background {
        let _ = writeln!(
            out,
            r#"<rect width="{width}" height="{height}" fill="{bg}"/>"#
        );
    }

    let _ = writeln!(out, "<defs>");
    let _ = writeln!(
        out,
        r#"  <marker id="{marker_id}" markerWidth="10" markerHeight="7" refX="9" refY="3.5" orient="auto"><polygon points="0 0, 10 3.5, 0 7" fill="{}"/></marker>"#,
        theme.edge_stroke
    );
    let _ = writeln!(out, "</defs>");

    for cluster in &layout.clusters {
        let _ = writeln!(
            out,
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="4" fill="{}" stroke="{}" stroke-width="1.5"/>"#,
            cluster.x, cluster.y, cluster.width, cluster.height, theme.cluster_fill, theme.cluster_stroke
        );
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" fill="{}" font-weight="bold">{}</text>"#,
            cluster.x + 8.0,
            cluster.y + options.font_size + 4.0,
            theme.text_color,
            escape_xml(&cluster.title)
        );
    }

    let _ = writeln!(
        out,
        r#"<g stroke="{}" stroke-width="2" fill="none" marker-end="url(#{marker_id})">"#,
        theme.edge_stroke
    );
    for edge in &layout.edges {
        let _ = writeln!(
            out,
            r#"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}"/>"#,
            edge.from.0, edge.from.1, edge.to.0, edge.to.1
        );
    }
    let _ = writeln!(out, "</g>");

    for edge in &layout.edges {
        let Some(label) = &edge.label else {
            continue;
        };
        let mx = (edge.from.0 + edge.to.0) / 2.0;
        let my = (edge.from.1 + edge.to.1) / 2.0;
        let _ = writeln!(
            out,
            r#"<text x="{mx:.1}" y="{:.1}" fill="{}" text-anchor="middle">{}</text>"#,
            my - 4.0,
            theme.text_color,
            escape_xml(label)
        );
    }

    for node in &layout.nodes {
        let x = node.x - node.width / 2.0;
        let y = node.y - node.height / 2.0;
        match node.shape {
            NodeShape::Rect => {
                let _ = writeln!(
                    out,
                    r#"<rect x="{x:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" fill="{}" stroke="{}" stroke-width="1.5"/>"#,
                    node.width, node.height, theme.node_fill, theme.node_stroke
                );
            }
            NodeShape::Rounded => {
                let _ = writeln!(
                    out,
                    r#"<rect x="{x:.1}" y="{y:.1}" width="{:.1}" height="{:.1}" rx="12" ry="12" fill="{}" stroke="{}" stroke-width="1.5"/>"#,
                    node.width, node.height, theme.node_fill, theme.node_stroke
                );
            }
            NodeShape::Diamond => {
                let _ = writeln!(
                    out,
                    r#"<polygon points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="{}" stroke="{}" stroke-width="1.5"/>"#,
                    node.x,
                    y,
                    x + node.width,
                    node.y,
                    node.x,
                    y + node.height,
                    x,
                    node.y,
                    theme.decision_fill,
                    theme.node_stroke
                );
            }
        }
        let _ = writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" fill="{}" text-anchor="middle" dominant-baseline="central">{}</text>"#,
            node.x,
            node.y,
            theme.text_color,
            escape_xml(&node.text)
        );
    }

    out.push_str("</svg>\n");
    out
}

pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
