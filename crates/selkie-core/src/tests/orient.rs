use crate::orient::{Direction, initial_direction};

#[test]
fn two_subgraphs_force_horizontal() {
    let fragment = "flowchart TB\nsubgraph A\nend\nsubgraph B\nend";
    let decision = initial_direction(fragment, Some("TB"));
    assert_eq!(decision.direction, Direction::LR);
    assert_eq!(decision.subgraph_count, 2);
    assert!(!decision.corrected);
}

#[test]
fn single_subgraph_keeps_the_written_direction() {
    let fragment = "flowchart BT\nsubgraph A\nend";
    let decision = initial_direction(fragment, Some("BT"));
    assert_eq!(decision.direction, Direction::BT);
    assert_eq!(decision.subgraph_count, 1);
}

#[test]
fn legacy_td_token_is_forced_horizontal() {
    let decision = initial_direction("graph TD\nA-->B", Some("TD"));
    assert_eq!(decision.direction, Direction::LR);
}

#[test]
fn tb_token_without_blocks_is_kept_vertical() {
    let decision = initial_direction("flowchart TB\nA-->B", Some("TB"));
    assert_eq!(decision.direction, Direction::TB);
}

#[test]
fn missing_direction_defaults_to_tb() {
    let decision = initial_direction("flowchart\nA-->B", None);
    assert_eq!(decision.direction, Direction::TB);
}

#[test]
fn direction_token_parsing_accepts_the_td_alias() {
    assert_eq!(Direction::from_token("td"), Some(Direction::TB));
    assert_eq!(Direction::from_token("lr"), Some(Direction::LR));
    assert_eq!(Direction::from_token("sideways"), None);
}
