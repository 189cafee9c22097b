#![forbid(unsafe_code)]

//! Flowchart recovery pipeline (headless).
//!
//! Scans free-form, possibly malformed generated text for embedded flowchart
//! descriptions, repairs them into a strict line-oriented grammar, resolves a
//! readable layout orientation, and validates the result for rendering.
//!
//! Design goals:
//! - best-effort repair: the pipeline stages never fail, only the strict
//!   parser does
//! - deterministic, testable passes (idempotent normalization, pure
//!   sanitization)
//! - no I/O, no global state

pub mod detect;
pub mod error;
pub mod normalize;
pub mod orient;
pub mod parse;
pub mod sanitize;

pub use detect::{RawSpan, extract_candidates, looks_like_flowchart};
pub use error::{Error, Result};
pub use normalize::{DiagramSource, normalize_fragment};
pub use orient::{Direction, OrientationDecision};
pub use parse::{Flowchart, parse};

/// One recovered diagram: where it came from, the repaired source, and the
/// orientation chosen for it.
#[derive(Debug, Clone)]
pub struct Recovered {
    pub span: RawSpan,
    pub source: DiagramSource,
    pub orientation: OrientationDecision,
}

/// Scans `text` for flowchart candidates and repairs each one.
///
/// Detection misses are not errors; text without candidates yields an empty
/// vector and the caller renders it as plain text.
pub fn recover_diagrams(text: &str) -> Vec<Recovered> {
    let spans = extract_candidates(text);
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        let (source, orientation) = normalize_fragment(&span.text);
        tracing::debug!(
            start = span.start,
            end = span.end,
            direction = orientation.direction.token(),
            subgraphs = orientation.subgraph_count,
            "recovered flowchart candidate"
        );
        out.push(Recovered {
            span,
            source,
            orientation,
        });
    }
    out
}

#[cfg(test)]
mod tests;
