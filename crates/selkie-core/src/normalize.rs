//! Syntax normalization: repairs a raw fragment into a well-formed flowchart
//! description.
//!
//! Each pass is a pure text transform with a fixed point, and the composition
//! is idempotent: normalizing an already-normalized source is byte-identical.
//! Nothing here ever fails — text the passes cannot make sense of is left
//! alone and surfaces later as a strict-parse failure.

use crate::orient::{self, Direction, OrientationDecision};
use crate::parse::scan_statement;
use crate::sanitize::{quote_label, sanitize_identifier};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A repaired flowchart description.
///
/// Invariants: every identifier is ASCII and does not begin with a digit,
/// every bracketed label is a validly quoted string, one statement per line.
/// A `DiagramSource` is immutable once produced — a failed render never
/// mutates it; the orientation fallback derives a new value via
/// [`DiagramSource::with_direction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSource(String);

impl DiagramSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns a copy of this source with the header direction replaced.
    pub fn with_direction(&self, direction: Direction) -> Self {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"^flowchart[ \t]+[A-Za-z]+").expect("valid regex")
        });
        Self(
            re.replace(&self.0, format!("flowchart {}", direction.token()))
                .into_owned(),
        )
    }
}

impl fmt::Display for DiagramSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs the full normalization pipeline on one extracted fragment.
pub fn normalize_fragment(raw: &str) -> (DiagramSource, OrientationDecision) {
    let text = scrub_punctuation(raw);
    let text = trim_leading_prose(&text);
    let (text, decision) = rewrite_header(&text);
    let text = split_statement_separators(&text);
    let text = break_after_header(&text);
    let text = isolate_block_keywords(&text);
    let text = rewrite_line_comments(&text);
    let text = fix_statements(&text);
    (DiagramSource(text.trim().to_string()), decision)
}

/// Pass 1: strip carriage returns, fold curly/guillemet quotation marks to
/// ASCII quotes and en/em dashes to hyphens.
fn scrub_punctuation(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\r' => {}
            '\u{201C}' | '\u{201D}' | '\u{00AB}' | '\u{00BB}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            _ => out.push(ch),
        }
    }
    out
}

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(graph|flowchart)\s+[A-Za-z]+").expect("valid regex"))
}

fn direction_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[ \t]*(?i:LR|RL|TB|TD|BT)\b").expect("valid regex"))
}

/// Pass 2: drop any prose before the first opening keyword.
fn trim_leading_prose(text: &str) -> String {
    match header_re().find(text) {
        Some(m) => text[m.start()..].to_string(),
        None => text.to_string(),
    }
}

/// Pass 3: rewrite the legacy `graph` keyword to `flowchart` and settle the
/// direction token per the orientation rules.
fn rewrite_header(text: &str) -> (String, OrientationDecision) {
    static HEAD: OnceLock<Regex> = OnceLock::new();
    let head = HEAD.get_or_init(|| Regex::new(r"^\s*(?i:graph|flowchart)\b").expect("valid regex"));

    let Some(m) = head.find(text) else {
        return (text.to_string(), orient::initial_direction(text, None));
    };

    let rest = &text[m.end()..];
    let (token, consumed) = match direction_token_re().find(rest) {
        Some(d) => (Some(d.as_str().trim()), m.end() + d.end()),
        None => (None, m.end()),
    };

    let decision = orient::initial_direction(text, token);
    let out = format!(
        "flowchart {}{}",
        decision.direction.token(),
        &text[consumed..]
    );
    (out, decision)
}

/// Pass 4: a fragment written as a single physical line with `;` separators
/// becomes one statement per line.
fn split_statement_separators(text: &str) -> String {
    if text.contains('\n') || !text.contains(';') {
        return text.to_string();
    }
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pass 5: the direction token is immediately followed by a line break so the
/// first statement is not fused onto the header line.
fn break_after_header(text: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(flowchart[ \t]+[A-Za-z]+)[ \t]+").expect("valid regex")
    });
    re.replace(text, "$1\n").into_owned()
}

/// Pass 6: every `subgraph` starts its own line with its title, every `end`
/// is isolated on its own line. Keyword matching skips quoted label text.
fn isolate_block_keywords(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        split_block_keywords(line, &mut out);
    }
    out.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKw {
    Subgraph,
    End,
}

fn split_block_keywords(line: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = line.chars().collect();
    match find_block_keyword(&chars) {
        None => out.push(line.to_string()),
        Some((i, BlockKw::End)) => {
            let before: String = chars[..i].iter().collect();
            if !before.trim().is_empty() {
                split_block_keywords(before.trim(), out);
            }
            out.push("end".to_string());
            let after: String = chars[i + "end".len()..].iter().collect();
            let after = after.trim().trim_start_matches(';').trim();
            if !after.is_empty() {
                split_block_keywords(after, out);
            }
        }
        Some((i, BlockKw::Subgraph)) => {
            let before: String = chars[..i].iter().collect();
            if !before.trim().is_empty() {
                split_block_keywords(before.trim(), out);
            }
            let rest = &chars[i + "subgraph".len()..];
            let stop = title_end(rest);
            let title: String = rest[..stop].iter().collect();
            let title = title.trim();
            if title.is_empty() {
                out.push("subgraph".to_string());
            } else {
                out.push(format!("subgraph {title}"));
            }
            let remainder: String = rest[stop..].iter().collect();
            let remainder = remainder.trim().trim_start_matches(';').trim();
            if !remainder.is_empty() {
                split_block_keywords(remainder, out);
            }
        }
    }
}

/// Finds the first out-of-quote block keyword in the line.
fn find_block_keyword(chars: &[char]) -> Option<(usize, BlockKw)> {
    let mut in_quote: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if let Some(quote) = in_quote {
            if ch == '\\' {
                i += 2;
                continue;
            }
            if ch == quote {
                in_quote = None;
            }
            i += 1;
            continue;
        }
        if matches!(ch, '"' | '\'') {
            in_quote = Some(ch);
            i += 1;
            continue;
        }
        let boundary = i == 0 || !is_word_char(chars[i - 1]);
        if boundary {
            if word_at_ci(chars, i, "subgraph") {
                return Some((i, BlockKw::Subgraph));
            }
            if word_at(chars, i, "end") {
                return Some((i, BlockKw::End));
            }
        }
        i += 1;
    }
    None
}

/// Length of the subgraph title: it runs to a statement separator or to the
/// next out-of-quote block keyword, whichever comes first.
fn title_end(chars: &[char]) -> usize {
    let mut in_quote: Option<char> = None;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if let Some(quote) = in_quote {
            if ch == '\\' {
                i += 2;
                continue;
            }
            if ch == quote {
                in_quote = None;
            }
            i += 1;
            continue;
        }
        if matches!(ch, '"' | '\'') {
            in_quote = Some(ch);
            i += 1;
            continue;
        }
        if ch == ';' {
            return i;
        }
        let boundary = i > 0 && !is_word_char(chars[i - 1]);
        if boundary && (word_at_ci(chars, i, "subgraph") || word_at(chars, i, "end")) {
            return i;
        }
        i += 1;
    }
    chars.len()
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn word_at_ci(chars: &[char], i: usize, word: &str) -> bool {
    let wlen = word.len();
    if i + wlen > chars.len() {
        return false;
    }
    let candidate: String = chars[i..i + wlen].iter().collect();
    if !candidate.eq_ignore_ascii_case(word) {
        return false;
    }
    !chars.get(i + wlen).copied().is_some_and(is_word_char)
}

fn word_at(chars: &[char], i: usize, word: &str) -> bool {
    let wlen = word.len();
    if i + wlen > chars.len() {
        return false;
    }
    let candidate: String = chars[i..i + wlen].iter().collect();
    if candidate != word {
        return false;
    }
    !chars.get(i + wlen).copied().is_some_and(is_word_char)
}

/// Pass 7: a same-line `//` comment marker becomes the grammar's `%%` marker.
fn rewrite_line_comments(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            match trimmed.strip_prefix("//") {
                Some(rest) => format!("%%{rest}"),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Final per-line token pass: sanitize identifiers and quote labels in every
/// line that reads as a statement chain; leave everything else untouched.
fn fix_statements(text: &str) -> String {
    text.lines()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with("%%")
                || trimmed == "end"
                || trimmed == "flowchart"
                || trimmed.starts_with("flowchart ")
                || trimmed == "subgraph"
                || trimmed.starts_with("subgraph ")
            {
                return line.to_string();
            }
            match scan_statement(trimmed) {
                Some(statement) => {
                    let mut out = String::new();
                    for (i, term) in statement.terms.iter().enumerate() {
                        if i > 0 {
                            match &statement.links[i - 1] {
                                Some(text) => {
                                    out.push_str(" -- ");
                                    out.push_str(text);
                                    out.push_str(" --> ");
                                }
                                None => out.push_str(" --> "),
                            }
                        }
                        out.push_str(&sanitize_identifier(&term.id));
                        if let Some((kind, raw)) = &term.label {
                            out.push(kind.open());
                            out.push_str(&quote_label(raw));
                            out.push(kind.close());
                        }
                    }
                    out
                }
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
