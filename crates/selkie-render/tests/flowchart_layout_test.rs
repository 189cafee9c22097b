use selkie_core::parse;
use selkie_render::layout::layout_flowchart;
use selkie_render::{DeterministicTextMeasurer, LayoutConfig};

fn layout(source: &str) -> selkie_render::Layout {
    let chart = parse(source).expect("valid source");
    layout_flowchart(&chart, &DeterministicTextMeasurer, &LayoutConfig::default())
        .expect("layout succeeds")
}

#[test]
fn every_node_is_placed() {
    let l = layout("flowchart TB\nA --> B --> C\nA --> C");
    assert_eq!(l.nodes.len(), 3);
    for node in &l.nodes {
        assert!(node.x.is_finite() && node.y.is_finite());
        assert!(node.width > 0.0 && node.height > 0.0);
    }
}

#[test]
fn ranks_advance_along_edges() {
    let l = layout("flowchart TB\nA --> B --> C");
    let y = |id: &str| l.nodes.iter().find(|n| n.id == id).unwrap().y;
    assert!(y("A") < y("B"));
    assert!(y("B") < y("C"));
}

#[test]
fn horizontal_chains_grow_in_width() {
    let l = layout("flowchart LR\nA --> B --> C --> D");
    assert!(
        l.width > l.height,
        "LR chain should be wide: {}x{}",
        l.width,
        l.height
    );
}

#[test]
fn vertical_chains_grow_in_height() {
    let l = layout("flowchart TB\nA --> B --> C --> D");
    assert!(l.height > l.width);
}

#[test]
fn bottom_to_top_reverses_rank_order() {
    let l = layout("flowchart BT\nA --> B");
    let y = |id: &str| l.nodes.iter().find(|n| n.id == id).unwrap().y;
    assert!(y("A") > y("B"));
}

#[test]
fn cycles_do_not_hang_layout() {
    let l = layout("flowchart TB\nA --> B\nB --> A");
    assert_eq!(l.nodes.len(), 2);
}

#[test]
fn clusters_contain_their_members() {
    let l = layout("flowchart LR\nsubgraph Group\nA --> B\nend\nC --> A");
    assert_eq!(l.clusters.len(), 1);
    let cluster = &l.clusters[0];
    for id in ["A", "B"] {
        let node = l.nodes.iter().find(|n| n.id == id).unwrap();
        assert!(node.x - node.width / 2.0 >= cluster.x);
        assert!(node.x + node.width / 2.0 <= cluster.x + cluster.width);
        assert!(node.y - node.height / 2.0 >= cluster.y);
        assert!(node.y + node.height / 2.0 <= cluster.y + cluster.height);
    }
}

#[test]
fn wider_labels_produce_wider_nodes() {
    let l = layout("flowchart TB\nA[\"a considerably longer label\"] --> B[\"b\"]");
    let w = |id: &str| l.nodes.iter().find(|n| n.id == id).unwrap().width;
    assert!(w("A") > w("B"));
}

#[test]
fn empty_diagram_is_a_layout_error() {
    let chart = parse("flowchart TB\n%% nothing here").unwrap();
    assert!(
        layout_flowchart(&chart, &DeterministicTextMeasurer, &LayoutConfig::default()).is_err()
    );
}
