//! Facts and the run-scoped Fact Store.
//!
//! A fact is kept as the exact text the solver produced (`pipe(1,2).`). The
//! functor is located once, when the fact is built, so filtering never has to
//! scan the text again.

use std::fmt;
use std::str::FromStr;

use crate::error::SceneError;

/// One ground atom with its terminating `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fact {
    raw: String,
    functor_start: usize,
    functor_end: usize,
}

impl Fact {
    /// Parses a fact such as `block(1,1,1).` or `done.`.
    pub fn parse(text: &str) -> Result<Self, SceneError> {
        let raw = text.trim();
        let body = raw
            .strip_suffix('.')
            .ok_or_else(|| malformed(raw, "missing terminating '.'"))?;

        let functor_start = usize::from(body.starts_with('-'));
        let name = &body[functor_start..];
        let name_len = identifier_len(name);
        if name_len == 0 {
            return Err(malformed(raw, "expected a predicate name"));
        }

        let rest = &name[name_len..];
        if !rest.is_empty() && !is_argument_list(rest) {
            return Err(malformed(raw, "arguments must be one balanced parenthesised list"));
        }

        Ok(Self {
            raw: raw.to_string(),
            functor_start,
            functor_end: functor_start + name_len,
        })
    }

    /// Builds a fact from an atom as printed by the engine (no trailing `.`).
    pub fn from_atom(atom: &str) -> Result<Self, SceneError> {
        Self::parse(&format!("{}.", atom.trim()))
    }

    /// Predicate name, including the classical negation sign if present.
    pub fn functor(&self) -> &str {
        &self.raw[..self.functor_end]
    }

    /// Predicate name without any negation sign.
    pub fn predicate(&self) -> &str {
        &self.raw[self.functor_start..self.functor_end]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The atom without its terminating `.`.
    pub fn atom(&self) -> &str {
        &self.raw[..self.raw.len() - 1]
    }
}

/// Length of the clingo identifier at the start of `s`: `_*[a-z][A-Za-z0-9_']*`.
fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() && bytes[idx] == b'_' {
        idx += 1;
    }
    if idx >= bytes.len() || !bytes[idx].is_ascii_lowercase() {
        return 0;
    }
    idx += 1;
    while idx < bytes.len()
        && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_' || bytes[idx] == b'\'')
    {
        idx += 1;
    }
    idx
}

/// True when `s` is `(…)` whose opening parenthesis closes at the last byte.
/// Parentheses inside double-quoted strings do not count.
fn is_argument_list(s: &str) -> bool {
    if !s.starts_with('(') {
        return false;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in s.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return idx == s.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

fn malformed(raw: &str, reason: &str) -> SceneError {
    SceneError::MalformedFact(format!("{raw:?}: {reason}"))
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Fact {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Append-only accumulator of facts for a single generation run.
///
/// Duplicates are kept as-is; the solver tolerates them in its input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactStore {
    facts: Vec<Fact>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_facts(facts: Vec<Fact>) -> Self {
        Self { facts }
    }

    /// Parses every line of `lines` as a fact.
    pub fn parse_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self, SceneError> {
        let facts = lines
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(Fact::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { facts })
    }

    /// Appends `facts` in order and returns how many were added.
    pub fn merge(&mut self, facts: impl IntoIterator<Item = Fact>) -> usize {
        let before = self.facts.len();
        self.facts.extend(facts);
        self.facts.len() - before
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Renders the store as program text, one fact per line.
    pub fn to_program(&self) -> String {
        render_facts(&self.facts)
    }

    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for fact in &self.facts {
            hasher.update(fact.as_str().as_bytes());
            hasher.update(b"\n");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

impl<'a> IntoIterator for &'a FactStore {
    type Item = &'a Fact;
    type IntoIter = std::slice::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

impl IntoIterator for FactStore {
    type Item = Fact;
    type IntoIter = std::vec::IntoIter<Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.into_iter()
    }
}

/// One fact per line, as fed to the engine and printed for terminal stages.
pub fn render_facts(facts: &[Fact]) -> String {
    facts
        .iter()
        .map(Fact::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
