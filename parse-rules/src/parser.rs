//! The consumption engine.
//!
//! If you only want to parse text, [`Grammar::parse`] is all you need. This
//! module holds the state of one such call.
//!
//! # How consumption works
//!
//! [`ParserState`] tries the alternatives of a rule in declaration order and
//! accepts the first one whose terms all match (and whose validator agrees).
//! Alternatives are matched term by term from a running offset: patterns and
//! tokens are matched anchored at that offset, rule references recurse.
//! Separators are consumed around terms according to each alternative's
//! [`SeparatorMode`].
//!
//! Left recursion is cut in two ways. A rule referencing itself as its first
//! term is rejected outright, and the chain of rules entered without
//! consuming input is checked for a repeated cycle before entering a rule.
//!
//! The state also records the furthest offset any attempt reached. When the
//! parse fails, that offset makes a better diagnostic than the place where
//! the winning alternative stopped.

use tracing::trace;

use crate::capture::{Capture, CaptureArena, CaptureNode, Matches, NodeId};
use crate::error::ParseError;
use crate::grammar::{Element, Grammar, RuleId, SeparatorMode};
use crate::memo::Memo;
use crate::pattern::unexpected_fragment;
use crate::recursive::has_circular_path;
use crate::value::Value;

/// The state of a single parse.
///
/// Everything that changes during a parse lives here, so the [`Grammar`]
/// stays read-only and a state is thrown away once the parse finishes.
pub struct ParserState<'g, 'i> {
    pub(crate) grammar: &'g Grammar,
    input: &'i str,
    furthest: Option<usize>,
    pub(crate) arena: CaptureArena,
    pub(crate) transformed: Memo<NodeId, Value>,
}

impl<'g, 'i> ParserState<'g, 'i> {
    pub fn new(grammar: &'g Grammar, input: &'i str) -> Self {
        Self {
            grammar,
            input,
            furthest: None,
            arena: CaptureArena::default(),
            transformed: Memo::default(),
        }
    }

    /// Consume the input from the initial rule and transform the result.
    pub fn run(mut self) -> Result<Value, ParseError> {
        let initial = self.grammar.initial;
        let node = self.consume_rule(initial, 0, vec![initial])?;

        if !self.input.is_empty() {
            if self.furthest != Some(self.input.len()) {
                let offset = self.furthest.unwrap_or(0);
                trace!(offset, "input not fully consumed");
                return Err(self.unexpected(offset));
            }
            match node {
                None => return Err(self.unexpected(0)),
                // An abandoned alternative reached the end, the accepted one did not.
                Some(node) if self.arena[node].offset != self.input.len() => {
                    return Err(self.unexpected(self.input.len()));
                }
                Some(_) => {}
            }
        } else if self.furthest.is_none() {
            return Err(ParseError::EmptyInput);
        }
        let node = node.ok_or(ParseError::EmptyInput)?;

        let value = self.transform(node);
        tracing::debug!(nodes = self.arena.len(), "parse accepted");
        Ok(value)
    }

    /// The furthest offset reached by any attempt so far.
    pub fn furthest(&self) -> Option<usize> {
        self.furthest
    }

    /// Try the alternatives of `id` at `offset_in`.
    ///
    /// `path` is the chain of rules entered since input was last consumed,
    /// ending with `id`. `Ok(None)` means no alternative matched; errors are
    /// fatal to the whole parse.
    pub fn consume_rule(
        &mut self,
        id: RuleId,
        offset_in: usize,
        path: Vec<RuleId>,
    ) -> Result<Option<NodeId>, ParseError> {
        let grammar = self.grammar;
        let rule = grammar.rule(id);
        if has_circular_path(&path) {
            trace!(rule = rule.name(), offset_in, "left recursion cut");
            return Ok(None);
        }
        trace!(rule = rule.name(), offset_in, "enter");

        // Sub-rule attempts by (rule, offset), failures included.
        let mut consumed: Memo<(RuleId, usize), Option<NodeId>> = Memo::default();

        'alternatives: for (index, alternative) in rule.alternatives.iter().enumerate() {
            let mut matches = Matches::Empty;
            let mut offset = offset_in;

            for (position, element) in alternative.elements.iter().enumerate() {
                match self.consume_separator(alternative.separator, offset) {
                    Some(length) => offset += length,
                    None if position != 0 => continue 'alternatives,
                    None => {}
                }

                match element {
                    Element::Pattern(pattern) => {
                        let Some(found) = pattern.find_at(self.input, offset) else {
                            continue 'alternatives;
                        };
                        if found.groups.is_empty() {
                            matches = matches.append(Capture::Text(found.text.to_owned()));
                        } else {
                            for group in found.groups {
                                let capture =
                                    group.map_or(Capture::Null, |text| Capture::Text(text.to_owned()));
                                matches = matches.append(capture);
                            }
                        }
                        offset += found.text.len();
                        self.reach(offset);
                    }
                    Element::Token(token) => {
                        let Some(length) = grammar.token(*token).consume(self.input, offset) else {
                            continue 'alternatives;
                        };
                        offset += length;
                        self.reach(offset);
                    }
                    Element::Rule(sub) => {
                        if position == 0 && *sub == id {
                            continue 'alternatives;
                        }
                        let node = match consumed.get(&(*sub, offset)) {
                            Some(node) => {
                                trace!(rule = grammar.rule(*sub).name(), offset, "reused");
                                *node
                            }
                            None => {
                                let sub_path = if offset == offset_in {
                                    let mut extended = path.clone();
                                    extended.push(*sub);
                                    extended
                                } else {
                                    vec![*sub]
                                };
                                let node = self.consume_rule(*sub, offset, sub_path)?;
                                consumed.insert((*sub, offset), node);
                                node
                            }
                        };
                        let Some(node) = node else {
                            continue 'alternatives;
                        };
                        matches = matches.append(Capture::Node(node));
                        offset = self.arena[node].offset;
                    }
                    Element::Null => matches = matches.or_null(),
                    Element::Unresolved(name) => {
                        return Err(ParseError::UnknownTerm {
                            term: name.clone(),
                            rule: rule.display_name(index),
                        });
                    }
                }
            }

            if alternative.separator != SeparatorMode::Mandatory {
                offset += self
                    .consume_separator(alternative.separator, offset)
                    .unwrap_or(0);
            }
            self.furthest.get_or_insert(0);

            let node = self.arena.alloc(CaptureNode {
                rule: id,
                alternative: index,
                offset,
                matches,
            });

            if let Some(validator) = &alternative.validator {
                let args = self.transform(node).into_list();
                match validator(&args) {
                    Ok(true) => {}
                    Ok(false) => {
                        trace!(rule = rule.name(), alternative = index, "rejected by validator");
                        continue 'alternatives;
                    }
                    Err(error) => {
                        let unexpected =
                            format!("unexpected \"{}\"", unexpected_fragment(self.input, offset_in));
                        return Err(error.into_parse_error(unexpected, offset_in));
                    }
                }
            }

            trace!(rule = rule.name(), alternative = index, offset, "accepted");
            return Ok(Some(node));
        }

        Ok(None)
    }

    /// Consume a separator at `offset` as `mode` allows.
    ///
    /// Returns the consumed length, or `None` when a mandatory separator is
    /// missing.
    fn consume_separator(&mut self, mode: SeparatorMode, offset: usize) -> Option<usize> {
        if mode == SeparatorMode::Disallowed {
            return Some(0);
        }
        let found = self
            .grammar
            .separator()
            .and_then(|separator| separator.consume(self.input, offset));
        match found {
            Some(length) => {
                self.reach(offset + length);
                Some(length)
            }
            None if mode == SeparatorMode::Mandatory => None,
            None => Some(0),
        }
    }

    fn reach(&mut self, offset: usize) {
        self.furthest = Some(self.furthest.map_or(offset, |furthest| furthest.max(offset)));
    }

    fn unexpected(&self, offset: usize) -> ParseError {
        ParseError::Unexpected {
            fragment: unexpected_fragment(self.input, offset).to_owned(),
            offset,
        }
    }
}
