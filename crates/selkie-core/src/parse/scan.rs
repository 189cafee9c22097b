//! Statement scanner shared by the normalizer and the strict parser.
//!
//! A statement is a chain of node terms separated by directed-edge tokens:
//! `id`, `id[label]`, `id(label)`, `id{label}`, joined by `-->` or
//! `-- text -->`. The scanner is tolerant by construction (it accepts
//! non-ASCII identifiers and unquoted labels); strictness is layered on top by
//! the parser.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BracketKind {
    Square,
    Round,
    Curly,
}

impl BracketKind {
    pub fn open(self) -> char {
        match self {
            Self::Square => '[',
            Self::Round => '(',
            Self::Curly => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            Self::Square => ']',
            Self::Round => ')',
            Self::Curly => '}',
        }
    }

    fn from_open(ch: char) -> Option<Self> {
        match ch {
            '[' => Some(Self::Square),
            '(' => Some(Self::Round),
            '{' => Some(Self::Curly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub id: String,
    /// Bracket kind and the raw label text between the brackets (quotes, if
    /// any, included).
    pub label: Option<(BracketKind, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub terms: Vec<Term>,
    /// `links[i]` joins `terms[i]` to `terms[i + 1]`; `Some` carries edge text.
    pub links: Vec<Option<String>>,
}

/// Scans one physical line as a statement. Returns `None` when the line does
/// not read as a complete chain (callers treat that as "leave the line alone"
/// or as a validation failure, depending on context).
pub fn scan_statement(line: &str) -> Option<Statement> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let mut i = 0;
    let mut terms = Vec::new();
    let mut links = Vec::new();

    loop {
        skip_ws(&chars, &mut i);
        terms.push(scan_term(&chars, &mut i)?);
        skip_ws(&chars, &mut i);
        if i >= chars.len() {
            break;
        }
        links.push(scan_arrow(&chars, &mut i)?);
    }

    Some(Statement { terms, links })
}

fn skip_ws(chars: &[char], i: &mut usize) {
    while chars.get(*i).is_some_and(|c| c.is_whitespace()) {
        *i += 1;
    }
}

fn at_arrow_start(chars: &[char], i: usize) -> bool {
    chars.get(i) == Some(&'-') && chars.get(i + 1) == Some(&'-')
}

fn scan_term(chars: &[char], i: &mut usize) -> Option<Term> {
    let mut id = String::new();
    while let Some(&ch) = chars.get(*i) {
        if ch.is_whitespace() || matches!(ch, '[' | '(' | '{' | ']' | ')' | '}') {
            break;
        }
        if at_arrow_start(chars, *i) {
            break;
        }
        id.push(ch);
        *i += 1;
    }
    if id.is_empty() {
        return None;
    }

    let saved = *i;
    skip_ws(chars, i);
    if let Some(kind) = chars.get(*i).copied().and_then(BracketKind::from_open) {
        *i += 1;
        let raw = scan_label(chars, i, kind)?;
        Some(Term {
            id,
            label: Some((kind, raw)),
        })
    } else {
        *i = saved;
        Some(Term { id, label: None })
    }
}

fn scan_label(chars: &[char], i: &mut usize, kind: BracketKind) -> Option<String> {
    skip_ws(chars, i);
    let start = *i;

    if matches!(chars.get(*i), Some('"' | '\'')) {
        let quote = chars[*i];
        *i += 1;
        let mut closed = false;
        while let Some(&ch) = chars.get(*i) {
            if ch == '\\' {
                *i += 2;
                continue;
            }
            *i += 1;
            if ch == quote {
                closed = true;
                break;
            }
        }
        if !closed {
            return None;
        }
        let raw: String = chars[start..(*i).min(chars.len())].iter().collect();
        skip_ws(chars, i);
        if chars.get(*i) != Some(&kind.close()) {
            return None;
        }
        *i += 1;
        Some(raw.trim().to_string())
    } else {
        while chars.get(*i).is_some_and(|&c| c != kind.close()) {
            *i += 1;
        }
        if *i >= chars.len() {
            return None;
        }
        let raw: String = chars[start..*i].iter().collect();
        *i += 1;
        Some(raw.trim().to_string())
    }
}

/// Consumes `-->` or `-- text -->` starting at `*i`. Returns the edge text
/// (`None` for a bare or empty-text arrow).
fn scan_arrow(chars: &[char], i: &mut usize) -> Option<Option<String>> {
    let mut dashes = 0;
    while chars.get(*i) == Some(&'-') {
        dashes += 1;
        *i += 1;
    }
    if dashes < 2 {
        return None;
    }
    if chars.get(*i) == Some(&'>') {
        *i += 1;
        return Some(None);
    }

    // Labeled edge: the text runs until the closing arrow.
    let text_start = *i;
    let mut j = *i;
    loop {
        while j < chars.len() && !at_arrow_start(chars, j) {
            j += 1;
        }
        if j >= chars.len() {
            return None;
        }
        let mut k = j;
        while chars.get(k) == Some(&'-') {
            k += 1;
        }
        if chars.get(k) == Some(&'>') {
            let text: String = chars[text_start..j].iter().collect();
            *i = k + 1;
            let text = text.trim().to_string();
            return Some(if text.is_empty() { None } else { Some(text) });
        }
        j = k;
    }
}
