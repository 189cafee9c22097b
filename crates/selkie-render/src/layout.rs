//! Layered layout for parsed flowcharts.
//!
//! Nodes are assigned ranks by longest path from the sources, stacked within
//! each rank in declaration order, and spaced along the flow axis. This is a
//! deliberately small layout: readable for the diagram sizes a chat assistant
//! produces, deterministic, and cheap.

use crate::text::TextMeasurer;
use crate::{Error, Result};
use rustc_hash::FxHashMap;
use selkie_core::orient::Direction;
use selkie_core::parse::{Flowchart, NodeShape};

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub node_spacing: f64,
    pub rank_spacing: f64,
    pub node_padding: f64,
    pub diagram_padding: f64,
    pub cluster_padding: f64,
    pub font_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_spacing: 60.0,
            rank_spacing: 80.0,
            node_padding: 24.0,
            diagram_padding: 16.0,
            cluster_padding: 16.0,
            font_size: 14.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlacedNode {
    pub id: String,
    pub text: String,
    pub shape: NodeShape,
    /// Center position.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct PlacedEdge {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Cluster {
    pub title: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct Layout {
    pub direction: Direction,
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<PlacedEdge>,
    pub clusters: Vec<Cluster>,
    pub width: f64,
    pub height: f64,
}

pub fn layout_flowchart(
    chart: &Flowchart,
    measurer: &dyn TextMeasurer,
    config: &LayoutConfig,
) -> Result<Layout> {
    if chart.nodes.is_empty() {
        return Err(Error::EmptyDiagram);
    }

    let ranks = assign_ranks(chart);
    let max_rank = ranks.values().copied().max().unwrap_or(0);

    // Node extents from label text.
    let mut sized: Vec<PlacedNode> = chart
        .nodes
        .values()
        .map(|node| {
            let text = node.label.clone().unwrap_or_else(|| node.id.clone());
            let text_width = measurer.text_width(&text, config.font_size).max(10.0);
            let (mut width, mut height) = (
                text_width + 2.0 * config.node_padding,
                config.font_size + 2.0 * config.node_padding,
            );
            if node.shape == NodeShape::Diamond {
                // A diamond's usable interior is half the bounding box.
                width += text_width * 0.6;
                height += config.font_size;
            }
            PlacedNode {
                id: node.id.clone(),
                text,
                shape: node.shape,
                x: 0.0,
                y: 0.0,
                width,
                height,
            }
        })
        .collect();

    // Group nodes per rank, preserving declaration order.
    let mut per_rank: Vec<Vec<usize>> = vec![Vec::new(); max_rank + 1];
    for (idx, node) in sized.iter().enumerate() {
        per_rank[ranks[&node.id]].push(idx);
    }

    // Main-axis offsets: each rank is as thick as its thickest node.
    let mut main_offset = 0.0;
    for rank_nodes in &per_rank {
        let thickness = rank_nodes
            .iter()
            .map(|&i| main_extent(&sized[i], chart.direction))
            .fold(0.0f64, f64::max);

        // Cross-axis: center the rank's stack around zero.
        let total_cross: f64 = rank_nodes
            .iter()
            .map(|&i| cross_extent(&sized[i], chart.direction))
            .sum::<f64>()
            + config.node_spacing * rank_nodes.len().saturating_sub(1) as f64;
        let mut cross_offset = -total_cross / 2.0;

        for &i in rank_nodes {
            let node = &mut sized[i];
            let main = main_offset + thickness / 2.0;
            let cross = cross_offset + cross_extent(node, chart.direction) / 2.0;
            if chart.direction.is_horizontal() {
                node.x = main;
                node.y = cross;
            } else {
                node.x = cross;
                node.y = main;
            }
            cross_offset += cross_extent(node, chart.direction) + config.node_spacing;
        }
        main_offset += thickness + config.rank_spacing;
    }

    // Shift everything into positive coordinates with padding, accounting for
    // cluster boxes around grouped nodes.
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for node in &sized {
        min_x = min_x.min(node.x - node.width / 2.0);
        max_x = max_x.max(node.x + node.width / 2.0);
        min_y = min_y.min(node.y - node.height / 2.0);
        max_y = max_y.max(node.y + node.height / 2.0);
    }

    let cluster_title_space = config.font_size + config.cluster_padding;
    let pad = config.diagram_padding
        + if chart.subgraphs.is_empty() {
            0.0
        } else {
            config.cluster_padding + cluster_title_space
        };
    let shift_x = pad - min_x;
    let shift_y = pad - min_y;
    for node in &mut sized {
        node.x += shift_x;
        node.y += shift_y;
    }

    // Reverse-direction variants mirror along the main axis.
    let span_x = max_x - min_x + 2.0 * pad;
    let span_y = max_y - min_y + 2.0 * pad;
    if chart.direction == Direction::RL {
        for node in &mut sized {
            node.x = span_x - node.x;
        }
    }
    if chart.direction == Direction::BT {
        for node in &mut sized {
            node.y = span_y - node.y;
        }
    }

    let index: FxHashMap<&str, usize> = sized
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let clusters = chart
        .subgraphs
        .iter()
        .map(|group| {
            let mut cx0 = f64::INFINITY;
            let mut cy0 = f64::INFINITY;
            let mut cx1 = f64::NEG_INFINITY;
            let mut cy1 = f64::NEG_INFINITY;
            for member in &group.members {
                let Some(&i) = index.get(member.as_str()) else {
                    continue;
                };
                let node = &sized[i];
                cx0 = cx0.min(node.x - node.width / 2.0);
                cx1 = cx1.max(node.x + node.width / 2.0);
                cy0 = cy0.min(node.y - node.height / 2.0);
                cy1 = cy1.max(node.y + node.height / 2.0);
            }
            if !cx0.is_finite() {
                // Empty group: a small titled box at the origin.
                (cx0, cy0, cx1, cy1) = (
                    config.diagram_padding,
                    config.diagram_padding,
                    config.diagram_padding + 120.0,
                    config.diagram_padding + 40.0,
                );
            }
            Cluster {
                title: group.title.clone(),
                x: cx0 - config.cluster_padding,
                y: cy0 - config.cluster_padding - cluster_title_space,
                width: (cx1 - cx0) + 2.0 * config.cluster_padding,
                height: (cy1 - cy0) + 2.0 * config.cluster_padding + cluster_title_space,
            }
        })
        .collect::<Vec<_>>();

    let edges = chart
        .edges
        .iter()
        .filter_map(|edge| {
            let from = &sized[*index.get(edge.from.as_str())?];
            let to = &sized[*index.get(edge.to.as_str())?];
            Some(PlacedEdge {
                from: boundary_point(from, (to.x, to.y)),
                to: boundary_point(to, (from.x, from.y)),
                label: edge.label.clone(),
            })
        })
        .collect::<Vec<_>>();

    // Final extent over nodes and clusters.
    let mut width = 0.0f64;
    let mut height = 0.0f64;
    for node in &sized {
        width = width.max(node.x + node.width / 2.0);
        height = height.max(node.y + node.height / 2.0);
    }
    for cluster in &clusters {
        width = width.max(cluster.x + cluster.width);
        height = height.max(cluster.y + cluster.height);
    }

    Ok(Layout {
        direction: chart.direction,
        nodes: sized,
        edges,
        clusters,
        width: width + config.diagram_padding,
        height: height + config.diagram_padding,
    })
}

fn main_extent(node: &PlacedNode, direction: Direction) -> f64 {
    if direction.is_horizontal() {
        node.width
    } else {
        node.height
    }
}

fn cross_extent(node: &PlacedNode, direction: Direction) -> f64 {
    if direction.is_horizontal() {
        node.height
    } else {
        node.width
    }
}

/// Longest-path rank assignment, tolerant of cycles: relaxation stops after
/// `|V|` sweeps, so a cycle leaves its members at the last stable rank instead
/// of looping forever.
fn assign_ranks(chart: &Flowchart) -> FxHashMap<String, usize> {
    let mut ranks: FxHashMap<String, usize> =
        chart.nodes.keys().map(|id| (id.clone(), 0)).collect();

    for _ in 0..chart.nodes.len() {
        let mut changed = false;
        for edge in &chart.edges {
            let Some(&from_rank) = ranks.get(&edge.from) else {
                continue;
            };
            let Some(&to_rank) = ranks.get(&edge.to) else {
                continue;
            };
            if to_rank < from_rank + 1 && from_rank + 1 < chart.nodes.len() {
                ranks.insert(edge.to.clone(), from_rank + 1);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    ranks
}

/// Point on the node's rectangle boundary along the ray from its center toward
/// `target`.
fn boundary_point(node: &PlacedNode, target: (f64, f64)) -> (f64, f64) {
    let dx = target.0 - node.x;
    let dy = target.1 - node.y;
    if dx == 0.0 && dy == 0.0 {
        return (node.x, node.y);
    }
    let half_w = node.width / 2.0;
    let half_h = node.height / 2.0;
    let scale_x = if dx == 0.0 {
        f64::INFINITY
    } else {
        half_w / dx.abs()
    };
    let scale_y = if dy == 0.0 {
        f64::INFINITY
    } else {
        half_h / dy.abs()
    };
    let scale = scale_x.min(scale_y);
    (node.x + dx * scale, node.y + dy * scale)
}
