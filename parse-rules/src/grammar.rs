//! The frozen grammar table.
//!
//! A [`Grammar`] is produced by [`GrammarBuilder::finish`] and never changes
//! afterwards. It holds no per-parse state, so one grammar can serve any
//! number of parses, including concurrent ones on different threads.
//!
//! [`GrammarBuilder::finish`]: crate::GrammarBuilder::finish

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::error::{ParseError, ValidationError};
use crate::parser::ParserState;
use crate::pattern::Pattern;
use crate::value::Value;

/// A transform callback: captured values in, result value out.
pub type Transform = Arc<dyn Fn(Vec<Value>) -> Value + Send + Sync>;

/// A validator callback, see [`Alternative::validate`].
pub type Validator = Arc<dyn Fn(&[Value]) -> Result<bool, ValidationError> + Send + Sync>;

/// How an alternative treats the separator between its terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeparatorMode {
    /// Consume a separator wherever one is present.
    #[default]
    Optional,
    /// Never consume a separator.
    Disallowed,
    /// Require a separator between every two terms.
    Mandatory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

impl RuleId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(usize);

impl TokenId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }
}

/// A term of an alternative, with names resolved.
#[derive(Debug, Clone)]
pub enum Element {
    Pattern(Pattern),
    Token(TokenId),
    Rule(RuleId),
    /// Epsilon: matches nothing, leaves a placeholder.
    Null,
    /// A name that is neither a token nor a rule.
    Unresolved(String),
}

/// A named terminal: ordered patterns, the first match wins.
#[derive(Debug, Clone)]
pub struct Token {
    pub(crate) name: String,
    pub(crate) patterns: Vec<Pattern>,
}

impl Token {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the first pattern matching at `offset`.
    pub(crate) fn consume(&self, input: &str, offset: usize) -> Option<usize> {
        self.patterns
            .iter()
            .find_map(|pattern| pattern.find_at(input, offset))
            .map(|found| found.text.len())
    }
}

/// One way of matching a rule.
#[derive(Clone)]
pub struct Alternative {
    pub(crate) elements: Vec<Element>,
    pub(crate) separator: SeparatorMode,
    pub(crate) transform: Option<Transform>,
    pub(crate) validator: Option<Validator>,
}

impl Alternative {
    pub(crate) fn new(elements: Vec<Element>, separator: SeparatorMode) -> Self {
        Self {
            elements,
            separator,
            transform: None,
            validator: None,
        }
    }

    /// Set the transform applied to this alternative's captures.
    ///
    /// Captures are passed as positional arguments. Without a transform the
    /// alternative returns its captures unchanged.
    pub fn transform<F, R>(&mut self, transform: F) -> &mut Self
    where
        F: Fn(Vec<Value>) -> R + Send + Sync + 'static,
        R: Into<Value>,
    {
        self.transform = Some(Arc::new(move |args: Vec<Value>| -> Value { transform(args).into() }));
        self
    }

    /// Set the validator run on the transformed value before acceptance.
    ///
    /// `Ok(false)` rejects the alternative so the next one is tried, an error
    /// aborts the whole parse.
    pub fn validate<F, R>(&mut self, validator: F) -> &mut Self
    where
        F: Fn(&[Value]) -> R + Send + Sync + 'static,
        R: crate::IntoValidation,
    {
        self.validator = Some(Arc::new(move |args: &[Value]| validator(args).into_validation()));
        self
    }

    /// Return the captures as a list, even a single one.
    pub fn wrap(&mut self) -> &mut Self {
        self.transform(Value::List)
    }

    pub fn separator_mode(&self) -> SeparatorMode {
        self.separator
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}

impl Debug for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alternative")
            .field("elements", &self.elements)
            .field("separator", &self.separator)
            .field("transform", &self.transform.is_some())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

/// A named rule with ordered alternatives.
#[derive(Debug, Clone)]
pub struct Rule {
    pub(crate) name: String,
    pub(crate) alternatives: Vec<Alternative>,
}

impl Rule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alternatives(&self) -> &[Alternative] {
        &self.alternatives
    }

    /// Name used in diagnostics, `name[i]` when the rule has several
    /// alternatives.
    pub(crate) fn display_name(&self, alternative: usize) -> String {
        if self.alternatives.len() > 1 {
            format!("{}[{alternative}]", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// An immutable grammar, ready to parse.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub(crate) tokens: Vec<Token>,
    pub(crate) separator: Option<Token>,
    pub(crate) rules: Vec<Rule>,
    pub(crate) initial: RuleId,
}

impl Grammar {
    /// Parse `input` from the initial rule and transform the result.
    #[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
    pub fn parse(&self, input: &str) -> Result<Value, ParseError> {
        ParserState::new(self, input).run()
    }

    pub fn initial_rule(&self) -> &str {
        &self.rules[self.initial.0].name
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    pub fn token_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|token| token.name.as_str())
    }

    pub fn separator(&self) -> Option<&Token> {
        self.separator.as_ref()
    }

    pub(crate) fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    pub(crate) fn token(&self, id: TokenId) -> &Token {
        &self.tokens[id.0]
    }
}
