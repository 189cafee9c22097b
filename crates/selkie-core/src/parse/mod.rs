//! Strict parser for the repaired flowchart grammar.
//!
//! This is the validation layer the render adapter relies on: it accepts
//! exactly the output shape of the normalizer (ASCII identifiers, quoted
//! labels, one statement per line, isolated block keywords) and rejects
//! everything else with a positioned error. It never repairs input — repair is
//! the normalizer's job, and a strict failure here is what triggers the
//! caller's plain-text fallback.

mod scan;

pub(crate) use scan::scan_statement;
pub use scan::{BracketKind, Statement, Term};

use crate::error::{Error, Result};
use crate::orient::Direction;
use crate::sanitize::unquote_label;
use indexmap::IndexMap;
use indexmap::map::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeShape {
    /// `id[label]`
    Rect,
    /// `id(label)`
    Rounded,
    /// `id{label}`
    Diamond,
}

impl From<BracketKind> for NodeShape {
    fn from(kind: BracketKind) -> Self {
        match kind {
            BracketKind::Square => Self::Rect,
            BracketKind::Round => Self::Rounded,
            BracketKind::Curly => Self::Diamond,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    /// Display text with quoting/escapes removed; `None` renders the id.
    pub label: Option<String>,
    pub shape: NodeShape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subgraph {
    pub title: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flowchart {
    pub direction: Direction,
    pub nodes: IndexMap<String, Node>,
    pub edges: Vec<Edge>,
    pub subgraphs: Vec<Subgraph>,
}

pub fn parse(source: &str) -> Result<Flowchart> {
    let mut lines = source.lines().enumerate();

    let direction = loop {
        let Some((_, line)) = lines.next() else {
            return Err(Error::MissingHeader);
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }
        let Some(rest) = trimmed.strip_prefix("flowchart") else {
            return Err(Error::MissingHeader);
        };
        let token = rest.trim();
        if token.is_empty() {
            break Direction::TB;
        }
        break Direction::from_token(token).ok_or_else(|| Error::UnknownDirection {
            token: token.to_string(),
        })?;
    };

    let mut chart = Flowchart {
        direction,
        nodes: IndexMap::new(),
        edges: Vec::new(),
        subgraphs: Vec::new(),
    };
    let mut open_groups: Vec<usize> = Vec::new();
    let mut last_line = 0;

    for (idx, line) in lines {
        let lineno = idx + 1;
        last_line = lineno;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("%%") {
            continue;
        }

        if trimmed == "end" {
            if open_groups.pop().is_none() {
                return Err(Error::parse(lineno, "`end` without an open subgraph"));
            }
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix("subgraph") {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                let title = rest.trim();
                if title.is_empty() {
                    return Err(Error::parse(lineno, "subgraph without a title"));
                }
                chart.subgraphs.push(Subgraph {
                    title: title.to_string(),
                    members: Vec::new(),
                });
                open_groups.push(chart.subgraphs.len() - 1);
                continue;
            }
        }

        let statement = scan_statement(trimmed)
            .ok_or_else(|| Error::parse(lineno, "malformed statement"))?;
        add_statement(&mut chart, &open_groups, &statement, lineno)?;
    }

    if !open_groups.is_empty() {
        return Err(Error::parse(last_line, "unclosed subgraph"));
    }
    Ok(chart)
}

fn add_statement(
    chart: &mut Flowchart,
    open_groups: &[usize],
    statement: &Statement,
    lineno: usize,
) -> Result<()> {
    for term in &statement.terms {
        validate_term(term, lineno)?;

        let label = term
            .label
            .as_ref()
            .map(|(_, raw)| unquote_label(raw))
            .filter(|text| !text.is_empty());
        let shape = term
            .label
            .as_ref()
            .map(|(kind, _)| NodeShape::from(*kind));

        match chart.nodes.entry(term.id.clone()) {
            Entry::Occupied(mut occupied) => {
                // A later declaration with a label refines an earlier bare
                // mention.
                if label.is_some() {
                    let node = occupied.get_mut();
                    node.shape = shape.unwrap_or(node.shape);
                    node.label = label;
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Node {
                    id: term.id.clone(),
                    label,
                    shape: shape.unwrap_or(NodeShape::Rect),
                });
                if let Some(&group) = open_groups.last() {
                    chart.subgraphs[group].members.push(term.id.clone());
                }
            }
        }
    }

    for (i, link) in statement.links.iter().enumerate() {
        chart.edges.push(Edge {
            from: statement.terms[i].id.clone(),
            to: statement.terms[i + 1].id.clone(),
            label: link.clone(),
        });
    }
    Ok(())
}

fn validate_term(term: &Term, lineno: usize) -> Result<()> {
    if !term.id.is_ascii() {
        return Err(Error::parse(
            lineno,
            format!("non-ASCII identifier: {}", term.id),
        ));
    }
    if term.id.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return Err(Error::parse(
            lineno,
            format!("identifier starts with a digit: {}", term.id),
        ));
    }
    if let Some((_, raw)) = &term.label {
        if !raw.starts_with(['"', '\'']) {
            return Err(Error::parse(lineno, format!("unquoted label: {raw}")));
        }
    }
    Ok(())
}
