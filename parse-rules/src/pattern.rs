//! Anchored pattern matching.

use regex_automata::{meta::Regex, Anchored, Input};

use crate::error::GrammarError;

/// A compiled pattern: a plain prefix check or an anchored regex.
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

/// A successful match of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch<'a> {
    /// The whole matched text.
    pub text: &'a str,
    /// Explicit capture groups, `None` where a group did not participate.
    pub groups: Vec<Option<&'a str>>,
}

impl Pattern {
    /// Compile a regex source.
    ///
    /// Sources made only of ASCII word characters, whitespace and hyphens
    /// match themselves, so they become plain prefix checks.
    ///
    /// Classes such as `\d`, `\w` and `\s` are Unicode-aware. Use `[0-9]`
    /// or `(?-u:\d)` to accept ASCII only.
    pub fn new(source: &str) -> Result<Self, GrammarError> {
        if is_text_only(source) {
            return Ok(Pattern::Literal(source.to_owned()));
        }
        Regex::new(source)
            .map(Pattern::Regex)
            .map_err(|source_error| GrammarError::InvalidPattern {
                pattern: source.to_owned(),
                source: Box::new(source_error),
            })
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Match the pattern starting exactly at `offset`.
    pub fn find_at<'a>(&self, input: &'a str, offset: usize) -> Option<PatternMatch<'a>> {
        match self {
            Pattern::Literal(text) => {
                let rest = input.get(offset..)?;
                rest.starts_with(text.as_str()).then(|| PatternMatch {
                    text: &rest[..text.len()],
                    groups: Vec::new(),
                })
            }
            Pattern::Regex(regex) => {
                if offset > input.len() {
                    return None;
                }
                let search = Input::new(input).range(offset..).anchored(Anchored::Yes);
                let mut caps = regex.create_captures();
                regex.search_captures(&search, &mut caps);
                let found = caps.get_match()?;
                let groups = (1..caps.group_len())
                    .map(|index| caps.get_group(index).map(|span| &input[span.range()]))
                    .collect();
                Some(PatternMatch {
                    text: &input[found.range()],
                    groups,
                })
            }
        }
    }
}

fn is_text_only(source: &str) -> bool {
    !source.is_empty()
        && source
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c.is_ascii_whitespace())
}

/// The token-like fragment at `offset`, used in diagnostics.
///
/// A run of digits, else a run of word characters, else a single character.
pub(crate) fn unexpected_fragment(input: &str, offset: usize) -> &str {
    let Some(rest) = input.get(offset..) else {
        return "";
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits > 0 {
        return &rest[..digits];
    }
    let word = rest
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
        .count();
    if word > 0 {
        return &rest[..word];
    }
    rest.chars().next().map_or("", |c| &rest[..c.len_utf8()])
}
