//! Layout orientation resolution.
//!
//! The initial decision is made from the raw fragment before the first render;
//! a second decision point (aspect-ratio correction after a successful render)
//! lives with the render adapter, which records it on the same
//! [`OrientationDecision`] value.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LR,
    RL,
    TB,
    BT,
}

impl Direction {
    pub fn token(self) -> &'static str {
        match self {
            Self::LR => "LR",
            Self::RL => "RL",
            Self::TB => "TB",
            Self::BT => "BT",
        }
    }

    /// Parses a direction token. `TD` is accepted as the legacy alias of `TB`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "LR" => Some(Self::LR),
            "RL" => Some(Self::RL),
            "TB" | "TD" => Some(Self::TB),
            "BT" => Some(Self::BT),
            _ => None,
        }
    }

    /// True when the main flow axis is horizontal.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::LR | Self::RL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientationDecision {
    pub direction: Direction,
    pub subgraph_count: usize,
    /// Set by the render adapter when the post-render aspect-ratio fallback
    /// rewrote the direction and re-rendered.
    pub corrected: bool,
}

fn subgraph_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bsubgraph\b").expect("valid regex"))
}

/// Decides the header direction for a fragment.
///
/// Two rules, applied in this order:
/// 1. Two or more `subgraph` blocks force `LR` (multi-group diagrams are
///    empirically wide and read better with horizontal flow); otherwise the
///    direction already written in the header is kept (`TB` when absent).
/// 2. A header whose direction was written as the legacy `TD` token is forced
///    to `LR` unconditionally.
///
/// Rule 2 intentionally runs after rule 1 even though the two can interact;
/// the precedence is preserved as observed rather than unified.
pub fn initial_direction(fragment: &str, header_token: Option<&str>) -> OrientationDecision {
    let subgraph_count = subgraph_re().find_iter(fragment).count();

    let token = if subgraph_count >= 2 {
        "LR"
    } else {
        header_token.unwrap_or("TB")
    };

    let direction = if token.eq_ignore_ascii_case("TD") {
        Direction::LR
    } else {
        Direction::from_token(token).unwrap_or(Direction::TB)
    };

    OrientationDecision {
        direction,
        subgraph_count,
        corrected: false,
    }
}
