use crate::detect::{extract_candidates, looks_like_flowchart};

#[test]
fn header_with_direction_is_a_candidate() {
    assert!(looks_like_flowchart("graph TD\nA-->B"));
    assert!(looks_like_flowchart("flowchart LR\nA-->B"));
}

#[test]
fn block_keyword_and_arrow_are_candidates() {
    assert!(looks_like_flowchart("subgraph Billing"));
    assert!(looks_like_flowchart("A --> B"));
}

#[test]
fn plain_prose_is_not_a_candidate() {
    assert!(!looks_like_flowchart("The system processes requests."));
}

#[test]
fn the_heuristic_tolerates_false_positives_by_design() {
    // Prose that merely resembles a header is flagged; the strict parser
    // rejects it downstream and the caller falls back to plain text.
    assert!(looks_like_flowchart("graph theory is fun"));
}

#[test]
fn extraction_starts_at_the_opening_keyword() {
    let text = "Here is the flow: graph TD; A-->B";
    let spans = extract_candidates(text);
    assert_eq!(spans.len(), 1);
    assert!(spans[0].text.starts_with("graph TD"));
    assert_eq!(&text[spans[0].start..spans[0].end], spans[0].text);
}

#[test]
fn extraction_stops_at_a_blank_line() {
    let text = "graph TD\nA-->B\n\nUnrelated closing prose.";
    let spans = extract_candidates(text);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "graph TD\nA-->B");
}

#[test]
fn each_diagram_paragraph_gets_its_own_span() {
    let text = "graph TD\nA-->B\n\ngraph LR\nC-->D";
    let spans = extract_candidates(text);
    assert_eq!(spans.len(), 2);
    assert!(spans[0].text.contains("A-->B"));
    assert!(spans[1].text.contains("C-->D"));
}

#[test]
fn fenced_block_is_trusted_as_pre_isolated() {
    let text = "Intro.\n\n```mermaid\ngraph TD\nA-->B\n```\n\nOutro.";
    let spans = extract_candidates(text);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "graph TD\nA-->B");
}

#[test]
fn non_candidate_paragraphs_yield_nothing() {
    assert!(extract_candidates("Just prose.\n\nMore prose.").is_empty());
}
