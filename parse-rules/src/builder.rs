//! Declaring tokens and rules.
//!
//! ```
//! use parse_rules::{GrammarBuilder, Term, Value};
//!
//! let mut builder = GrammarBuilder::new();
//! builder.literal_tokens(["+"])?;
//! builder
//!     .rule("sum", [Term::name("number"), Term::name("+"), Term::name("sum")])?
//!     .transform(|args| args[0].as_f64().zip(args[1].as_f64()).map(|(a, b)| a + b));
//! builder.rule("sum", ["number"])?;
//! builder
//!     .rule("number", [Term::pattern(r"\d+")])?
//!     .transform(|args| args[0].as_str().and_then(|s| s.parse::<f64>().ok()));
//! let grammar = builder.finish()?;
//!
//! assert_eq!(grammar.parse("1 + 2 + 3")?, Value::Float(6.0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::GrammarError;
use crate::grammar::{Alternative, Element, Grammar, Rule, RuleId, SeparatorMode, Token, TokenId};
use crate::pattern::Pattern;

const DEFAULT_SEPARATOR: &str = r"\s+";

/// A term as written in a rule declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Reference to a token or a rule, resolved when the grammar is finished.
    Name(String),
    /// A regex; its groups (or its whole match) are captured.
    Pattern(String),
    /// Exact text, captured.
    Literal(String),
    /// Epsilon.
    Null,
}

impl Term {
    pub fn name(name: impl Into<String>) -> Self {
        Term::Name(name.into())
    }

    pub fn pattern(source: impl Into<String>) -> Self {
        Term::Pattern(source.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Term::Literal(text.into())
    }

    fn compile(self) -> Result<Element, GrammarError> {
        Ok(match self {
            Term::Name(name) => Element::Unresolved(name),
            Term::Pattern(source) => Element::Pattern(Pattern::new(&source)?),
            Term::Literal(text) => Element::Pattern(Pattern::literal(text)),
            Term::Null => Element::Null,
        })
    }
}

impl From<&str> for Term {
    fn from(name: &str) -> Self {
        Term::Name(name.to_owned())
    }
}

impl From<String> for Term {
    fn from(name: String) -> Self {
        Term::Name(name)
    }
}

/// One way a token can match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPattern {
    Literal(String),
    Regex(String),
}

impl TokenPattern {
    pub fn literal(text: impl Into<String>) -> Self {
        TokenPattern::Literal(text.into())
    }

    pub fn regex(source: impl Into<String>) -> Self {
        TokenPattern::Regex(source.into())
    }

    fn compile(self) -> Result<Pattern, GrammarError> {
        match self {
            TokenPattern::Literal(text) => Ok(Pattern::literal(text)),
            TokenPattern::Regex(source) => Pattern::new(&source),
        }
    }
}

impl From<&str> for TokenPattern {
    fn from(text: &str) -> Self {
        TokenPattern::literal(text)
    }
}

#[derive(Debug, Default)]
enum Separator {
    #[default]
    Whitespace,
    Custom(Token),
    Disabled,
}

/// Builds a [`Grammar`].
///
/// Tokens (and a custom separator) come first, then rules. Alternatives of
/// a rule are declared one after another; the first declared rule is the
/// initial one unless [`initial`](GrammarBuilder::initial) says otherwise.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    initial: Option<String>,
    separator: Separator,
    tokens: Vec<Token>,
    token_ids: FxHashMap<String, TokenId>,
    rules: Vec<Rule>,
    rule_ids: FxHashMap<String, RuleId>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start parsing from `name` instead of the first declared rule.
    pub fn initial(&mut self, name: impl Into<String>) -> &mut Self {
        self.initial = Some(name.into());
        self
    }

    /// Replace the separator, whitespace by default.
    pub fn separator<P: Into<TokenPattern>>(
        &mut self,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<&mut Self, GrammarError> {
        let token = self.compile_token("separator".to_owned(), patterns)?;
        self.separator = Separator::Custom(token);
        Ok(self)
    }

    /// Never consume separators.
    pub fn no_separator(&mut self) -> &mut Self {
        self.separator = Separator::Disabled;
        self
    }

    /// Declare a token matching the first of `patterns` that applies.
    pub fn token<P: Into<TokenPattern>>(
        &mut self,
        name: impl Into<String>,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<&mut Self, GrammarError> {
        let name = name.into();
        if self.token_ids.contains_key(&name) {
            return Err(GrammarError::DuplicateToken(name));
        }
        let token = self.compile_token(name, patterns)?;
        self.token_ids
            .insert(token.name.clone(), TokenId::new(self.tokens.len()));
        self.tokens.push(token);
        Ok(self)
    }

    /// Declare a token matching its own name.
    pub fn literal_token(&mut self, name: impl Into<String>) -> Result<&mut Self, GrammarError> {
        let name = name.into();
        let pattern = TokenPattern::Literal(name.clone());
        self.token(name, [pattern])
    }

    pub fn literal_tokens<S: Into<String>>(
        &mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<&mut Self, GrammarError> {
        for name in names {
            self.literal_token(name)?;
        }
        Ok(self)
    }

    /// Add an alternative where separators are optional.
    pub fn rule<T: Into<Term>>(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = T>,
    ) -> Result<&mut Alternative, GrammarError> {
        self.push_rule(name, terms, SeparatorMode::Optional)
    }

    /// Add an alternative that never consumes separators.
    pub fn rule_strict<T: Into<Term>>(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = T>,
    ) -> Result<&mut Alternative, GrammarError> {
        self.push_rule(name, terms, SeparatorMode::Disallowed)
    }

    /// Add an alternative requiring a separator between its terms.
    pub fn rule_separated<T: Into<Term>>(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = T>,
    ) -> Result<&mut Alternative, GrammarError> {
        self.push_rule(name, terms, SeparatorMode::Mandatory)
    }

    pub fn push_rule<T: Into<Term>>(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = T>,
        mode: SeparatorMode,
    ) -> Result<&mut Alternative, GrammarError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(GrammarError::InvalidIdentifier(name));
        }
        if self.token_ids.contains_key(&name) {
            return Err(GrammarError::ReservedForToken(name));
        }
        let is_new = match self.rule_ids.get(&name) {
            None => true,
            Some(_) if self.rules.last().is_some_and(|rule| rule.name == name) => false,
            Some(_) => return Err(GrammarError::NotSequential(name)),
        };
        let elements = terms
            .into_iter()
            .map(|term| term.into().compile())
            .collect::<Result<Vec<_>, _>>()?;
        if elements.is_empty() {
            return Err(GrammarError::EmptyRule(name));
        }

        if is_new {
            self.rule_ids.insert(name.clone(), RuleId::new(self.rules.len()));
            self.rules.push(Rule {
                name,
                alternatives: Vec::new(),
            });
        }
        let index = self.rules.len() - 1;
        let alternatives = &mut self.rules[index].alternatives;
        alternatives.push(Alternative::new(elements, mode));
        let last = alternatives.len() - 1;
        Ok(&mut alternatives[last])
    }

    /// Resolve names and freeze the grammar.
    pub fn finish(self) -> Result<Grammar, GrammarError> {
        if self.rules.is_empty() {
            return Err(GrammarError::NoRules);
        }
        let initial = match &self.initial {
            Some(name) => *self
                .rule_ids
                .get(name)
                .ok_or_else(|| GrammarError::UnknownInitialRule(name.clone()))?,
            None => RuleId::new(0),
        };
        let separator = match self.separator {
            Separator::Whitespace => Some(Token {
                name: "separator".to_owned(),
                patterns: vec![Pattern::new(DEFAULT_SEPARATOR)?],
            }),
            Separator::Custom(token) => Some(token),
            Separator::Disabled => None,
        };

        let token_ids = self.token_ids;
        let rule_ids = self.rule_ids;
        let mut rules = self.rules;
        for alternative in rules.iter_mut().flat_map(|rule| &mut rule.alternatives) {
            for element in &mut alternative.elements {
                let resolved = match element {
                    Element::Unresolved(name) => token_ids
                        .get(name)
                        .map(|id| Element::Token(*id))
                        .or_else(|| rule_ids.get(name).map(|id| Element::Rule(*id))),
                    _ => None,
                };
                if let Some(resolved) = resolved {
                    *element = resolved;
                }
            }
        }

        debug!(
            tokens = self.tokens.len(),
            rules = rules.len(),
            "grammar finished"
        );
        Ok(Grammar {
            tokens: self.tokens,
            separator,
            rules,
            initial,
        })
    }

    fn compile_token<P: Into<TokenPattern>>(
        &self,
        name: String,
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<Token, GrammarError> {
        if !self.rules.is_empty() {
            return Err(GrammarError::TokenAfterRules(name));
        }
        let patterns = patterns
            .into_iter()
            .map(|pattern| pattern.into().compile())
            .collect::<Result<Vec<_>, _>>()?;
        if patterns.is_empty() {
            return Err(GrammarError::EmptyToken(name));
        }
        Ok(Token { name, patterns })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defect(result: Result<impl std::fmt::Debug, GrammarError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn duplicate_token() {
        let mut builder = GrammarBuilder::new();
        builder.literal_token("test").unwrap();
        assert_eq!(
            defect(builder.literal_token("test").map(|_| ())),
            "token \"test\" already defined"
        );
    }

    #[test]
    fn tokens_before_rules() {
        let mut builder = GrammarBuilder::new();
        builder.rule("a", [Term::Null]).unwrap();
        assert_eq!(
            defect(builder.literal_token("b").map(|_| ())),
            "token \"b\" must be declared before rules"
        );
        assert_eq!(
            defect(builder.separator(["-"]).map(|_| ())),
            "token \"separator\" must be declared before rules"
        );
    }

    #[test]
    fn token_without_patterns() {
        let mut builder = GrammarBuilder::new();
        assert_eq!(
            defect(builder.token("t", Vec::<TokenPattern>::new()).map(|_| ())),
            "token \"t\" must define at least one pattern"
        );
    }

    #[test]
    fn rule_name_reserved_for_token() {
        let mut builder = GrammarBuilder::new();
        builder.literal_token("test").unwrap();
        assert_eq!(
            defect(builder.rule("test", [Term::Null]).map(|_| ())),
            "rule is using identifier \"test\" reserved for token"
        );
    }

    #[test]
    fn rule_identifiers() {
        let mut builder = GrammarBuilder::new();
        assert_eq!(
            defect(builder.rule("123", [Term::Null]).map(|_| ())),
            "rule \"123\" does not have a valid identifier"
        );
        assert!(builder.rule("_snake_case2", [Term::Null]).is_ok());
    }

    #[test]
    fn rules_are_declared_sequentially() {
        let mut builder = GrammarBuilder::new();
        builder.rule("a", [Term::Null]).unwrap();
        builder.rule("a", [Term::Null]).unwrap();
        builder.rule("b", [Term::Null]).unwrap();
        assert_eq!(
            defect(builder.rule("a", [Term::Null]).map(|_| ())),
            "rule \"a\" must be declared sequentially"
        );
    }

    #[test]
    fn rules_need_terms() {
        let mut builder = GrammarBuilder::new();
        assert_eq!(
            defect(builder.rule("a", Vec::<Term>::new()).map(|_| ())),
            "rule \"a\" must define at least one term"
        );
    }

    #[test]
    fn invalid_patterns_are_reported() {
        let mut builder = GrammarBuilder::new();
        let error = builder.rule("a", [Term::pattern("[")]).map(|_| ()).unwrap_err();
        assert!(matches!(error, GrammarError::InvalidPattern { pattern, .. } if pattern == "["));
    }

    #[test]
    fn finishing() {
        assert_eq!(defect(GrammarBuilder::new().finish()), "no rule specified");

        let mut builder = GrammarBuilder::new();
        builder.initial("missing").rule("a", [Term::Null]).unwrap();
        assert_eq!(defect(builder.finish()), "initial rule \"missing\" is not defined");
    }

    #[test]
    fn names_are_resolved_on_finish() {
        let mut builder = GrammarBuilder::new();
        builder.literal_token("+").unwrap();
        builder.rule("a", ["+", "b", "c"]).unwrap();
        builder.rule("b", [Term::literal("x")]).unwrap();
        let grammar = builder.finish().unwrap();

        let elements = grammar.rules[0].alternatives[0].elements();
        assert!(matches!(elements[0], Element::Token(_)));
        assert!(matches!(elements[1], Element::Rule(_)));
        assert!(matches!(&elements[2], Element::Unresolved(name) if name == "c"));
    }
}
