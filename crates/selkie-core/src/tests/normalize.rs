use crate::normalize::normalize_fragment;
use crate::orient::Direction;

fn normalized(raw: &str) -> String {
    normalize_fragment(raw).0.into_string()
}

#[test]
fn end_to_end_recovery_of_a_single_line_fragment() {
    let (source, decision) =
        normalize_fragment("graph TD; A[Start]-->B(Процесс);B-->C{Конец}");
    assert_eq!(decision.direction, Direction::LR);
    assert_eq!(
        source.as_str(),
        "flowchart LR\nA[\"Start\"] --> B(\"Процесс\")\nB --> C{\"Конец\"}"
    );
}

#[test]
fn normalization_is_idempotent() {
    let inputs = [
        "graph TD; A[Start]-->B(Процесс);B-->C{Конец}",
        "graph TD\nA[«x»] --> B\nsubgraph G\nC --> D\nend",
        "flowchart LR\nA -- yes --> B{\"ok?\"}",
        "Процесс: graph TB; subgraph One; A-->B; end; subgraph Two; C-->D; end",
    ];
    for input in inputs {
        let once = normalized(input);
        let twice = normalized(&once);
        assert_eq!(once, twice, "not idempotent for: {input}");
    }
}

#[test]
fn legacy_keyword_is_rewritten() {
    assert!(normalized("graph LR\nA-->B").starts_with("flowchart LR\n"));
}

#[test]
fn leading_prose_is_trimmed() {
    let out = normalized("Вот схема: graph LR\nA-->B");
    assert!(out.starts_with("flowchart LR"));
}

#[test]
fn statement_separator_punctuation_becomes_newlines() {
    let out = normalized("graph LR; A-->B; B-->C");
    assert_eq!(out, "flowchart LR\nA --> B\nB --> C");
}

#[test]
fn header_fused_with_first_statement_is_split() {
    let out = normalized("flowchart LR A-->B");
    assert_eq!(out, "flowchart LR\nA --> B");
}

#[test]
fn block_keywords_get_their_own_lines() {
    let out = normalized("flowchart LR\nsubgraph Billing A-->B end");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines,
        vec!["flowchart LR", "subgraph Billing A-->B", "end"]
    );
}

#[test]
fn fused_end_is_isolated() {
    let out = normalized("graph TB\nA-->B end");
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines, vec!["flowchart TB", "A --> B", "end"]);
}

#[test]
fn end_inside_quoted_label_is_left_alone() {
    let out = normalized("flowchart TB\nA[\"the end of it\"] --> B");
    assert_eq!(out, "flowchart TB\nA[\"the end of it\"] --> B");
}

#[test]
fn double_slash_comments_become_grammar_comments() {
    let out = normalized("graph TB\nA-->B\n// trailing note");
    assert!(out.contains("\n%% trailing note"));
}

#[test]
fn curly_quotes_and_dashes_are_folded_to_ascii() {
    let out = normalized("graph TB\nA[«Ввод–вывод»] --> B");
    assert!(out.contains("A[\"Ввод-вывод\"]"));
}

#[test]
fn edge_text_is_preserved_and_endpoints_sanitized() {
    let out = normalized("graph TB\nА -- да --> В");
    assert_eq!(out, "flowchart TB\nA -- да --> B");
}

#[test]
fn two_subgraphs_force_horizontal_header() {
    let out =
        normalized("graph TB\nsubgraph A\nN1-->N2\nend\nsubgraph B\nN3-->N4\nend");
    assert!(out.starts_with("flowchart LR\n"));
}

#[test]
fn direction_rewrite_replaces_only_the_header() {
    let (source, _) = normalize_fragment("graph TB\nA --> B");
    let turned = source.with_direction(Direction::LR);
    assert_eq!(turned.as_str(), "flowchart LR\nA --> B");
    // The original value is untouched.
    assert_eq!(source.as_str(), "flowchart TB\nA --> B");
}
