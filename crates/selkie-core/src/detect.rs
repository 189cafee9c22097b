//! Flowchart candidate detection and extraction.
//!
//! The heuristic is deliberately liberal: it must not miss a malformed diagram
//! produced by an upstream text generator, at the cost of occasionally flagging
//! prose that merely contains arrow-like punctuation. A false positive is
//! harmless downstream — the strict parser rejects it and the caller falls
//! back to plain text.

use regex::Regex;
use std::sync::OnceLock;

/// A contiguous region of the input suspected to contain a flowchart.
///
/// Offsets are byte positions into the original text. The span is consumed
/// once by the normalizer and not retained afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(graph|flowchart)\s+[A-Za-z]+").expect("valid regex"))
}

fn mermaid_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```\s*mermaid").expect("valid regex"))
}

/// Liberal candidate check: an opening keyword followed by a direction-ish
/// word, a block-group keyword, or a directed-edge token.
pub fn looks_like_flowchart(text: &str) -> bool {
    header_re().is_match(text) || text.contains("subgraph") || text.contains("-->")
}

/// Extracts at most one candidate span per paragraph of `text`.
///
/// A paragraph already fenced as a labeled ` ```mermaid ` block is trusted as
/// pre-isolated and its body is extracted verbatim. Otherwise the span starts
/// at the first opening keyword (or the paragraph start when only the
/// secondary heuristics fired) and runs to the end of the paragraph.
pub fn extract_candidates(text: &str) -> Vec<RawSpan> {
    if mermaid_fence_re().is_match(text) {
        return extract_fenced(text);
    }

    let mut spans = Vec::new();
    for (para_start, para) in paragraphs(text) {
        if !looks_like_flowchart(para) {
            continue;
        }
        let rel = header_re().find(para).map(|m| m.start()).unwrap_or(0);
        let start = para_start + rel;
        let fragment = &para[rel..];
        spans.push(RawSpan {
            start,
            end: start + fragment.len(),
            text: fragment.to_string(),
        });
    }
    spans
}

fn extract_fenced(text: &str) -> Vec<RawSpan> {
    let mut spans = Vec::new();
    let mut search_from = 0;
    while let Some(m) = mermaid_fence_re().find_at(text, search_from) {
        let body_start = match text[m.end()..].find('\n') {
            Some(i) => m.end() + i + 1,
            None => break,
        };
        let body_end = text[body_start..]
            .find("```")
            .map(|i| body_start + i)
            .unwrap_or(text.len());
        let body = text[body_start..body_end].trim_end_matches('\n');
        if !body.trim().is_empty() {
            spans.push(RawSpan {
                start: body_start,
                end: body_start + body.len(),
                text: body.to_string(),
            });
        }
        // Skip past the closing fence.
        search_from = match text[body_end..].find('\n') {
            Some(i) => body_end + i + 1,
            None => text.len(),
        };
    }
    spans
}

/// Splits `text` into blank-line-separated paragraphs, yielding each
/// paragraph's byte offset alongside its (trimmed-boundary) content.
fn paragraphs(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut para_start: Option<usize> = None;
    let mut para_end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            if let Some(start) = para_start.take() {
                out.push((start, &text[start..para_end]));
            }
        } else {
            if para_start.is_none() {
                para_start = Some(offset);
            }
            para_end = offset + content.len();
        }
        offset += line.len();
    }
    if let Some(start) = para_start {
        out.push((start, &text[start..para_end]));
    }
    out
}
