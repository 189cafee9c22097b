use crate::orient::Direction;
use crate::parse::{NodeShape, parse};
use crate::{Error, normalize_fragment, recover_diagrams};

#[test]
fn parses_the_normalized_grammar() {
    let source = "flowchart LR\nA[\"Start\"] --> B(\"Work\")\nB --> C{\"Done?\"}";
    let chart = parse(source).unwrap();
    assert_eq!(chart.direction, Direction::LR);
    assert_eq!(chart.nodes.len(), 3);
    assert_eq!(chart.edges.len(), 2);
    assert_eq!(chart.nodes["A"].label.as_deref(), Some("Start"));
    assert_eq!(chart.nodes["B"].shape, NodeShape::Rounded);
    assert_eq!(chart.nodes["C"].shape, NodeShape::Diamond);
}

#[test]
fn parses_chained_edges_in_one_statement() {
    let chart = parse("flowchart TB\nA --> B --> C").unwrap();
    assert_eq!(chart.edges.len(), 2);
    assert_eq!(chart.edges[0].from, "A");
    assert_eq!(chart.edges[1].to, "C");
}

#[test]
fn keeps_edge_text() {
    let chart = parse("flowchart TB\nA -- yes --> B").unwrap();
    assert_eq!(chart.edges[0].label.as_deref(), Some("yes"));
}

#[test]
fn records_subgraph_membership() {
    let source = "flowchart LR\nsubgraph Billing\nA --> B\nend\nC --> A";
    let chart = parse(source).unwrap();
    assert_eq!(chart.subgraphs.len(), 1);
    assert_eq!(chart.subgraphs[0].title, "Billing");
    assert_eq!(chart.subgraphs[0].members, ["A", "B"]);
    // C is declared outside the group.
    assert!(!chart.subgraphs[0].members.contains(&"C".to_string()));
}

#[test]
fn missing_header_is_rejected() {
    assert!(matches!(parse("A --> B"), Err(Error::MissingHeader)));
}

#[test]
fn unknown_direction_is_rejected() {
    assert!(matches!(
        parse("flowchart XY\nA --> B"),
        Err(Error::UnknownDirection { .. })
    ));
}

#[test]
fn unbalanced_blocks_are_rejected() {
    assert!(parse("flowchart TB\nsubgraph G\nA --> B").is_err());
    assert!(parse("flowchart TB\nA --> B\nend").is_err());
}

#[test]
fn non_ascii_identifiers_fail_validation() {
    assert!(parse("flowchart TB\nПроцесс --> B").is_err());
}

#[test]
fn unquoted_labels_fail_validation() {
    assert!(parse("flowchart TB\nA[plain] --> B").is_err());
}

#[test]
fn unbalanced_brackets_fail_validation() {
    assert!(parse("flowchart TB\nA[\"x\" --> B").is_err());
    assert!(parse("flowchart TB\nA[x --> B").is_err());
}

#[test]
fn recovered_fragment_passes_strict_parse() {
    let recovered = recover_diagrams("graph TD; A[Start]-->B(Процесс);B-->C{Конец}");
    assert_eq!(recovered.len(), 1);
    let chart = parse(recovered[0].source.as_str()).unwrap();
    assert_eq!(chart.direction, Direction::LR);
    assert!(chart.nodes.keys().all(|id| id.is_ascii()));
}

#[test]
fn normalized_source_never_carries_cyrillic_identifiers() {
    let (source, _) = normalize_fragment("graph TB\nУзел1 --> Узел2");
    let chart = parse(source.as_str()).unwrap();
    for id in chart.nodes.keys() {
        assert!(id.is_ascii(), "identifier {id} is not ASCII");
    }
}
