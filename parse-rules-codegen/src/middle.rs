use std::fmt::{self, Display};

use proc_macro2::TokenStream;

use crate::syntax::Callback;

/// How an alternative treats separators between its terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Optional,
    Strict,
    Separated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternImpl {
    Literal(String),
    Regex(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeparatorImpl {
    Default,
    Disabled,
    Custom(Vec<PatternImpl>),
}

#[derive(Debug)]
pub struct TokenImpl {
    pub name: String,
    pub patterns: Vec<PatternImpl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermImpl {
    Name(String),
    Pattern(String),
    Null,
}

#[derive(Debug)]
pub enum Action {
    None,
    Wrap,
    Transform(Callback),
}

#[derive(Debug)]
pub struct AlternativeImpl {
    pub mode: Mode,
    pub terms: Vec<TermImpl>,
    pub action: Action,
    pub validator: Option<Callback>,
}

#[derive(Debug)]
pub struct RuleImpl {
    pub name: String,
    pub alternatives: Vec<AlternativeImpl>,
}

/// Middle representation of a grammar: names resolved and checked, ready to
/// be expanded into builder calls.
#[derive(Debug)]
pub struct Middle {
    pub crate_name: TokenStream,
    pub initial: Option<String>,
    pub separator: SeparatorImpl,
    pub tokens: Vec<TokenImpl>,
    pub rules: Vec<RuleImpl>,
}

impl Display for PatternImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternImpl::Literal(text) => write!(f, "{text:?}"),
            PatternImpl::Regex(source) => write!(f, "/{source}/"),
        }
    }
}

impl Display for TermImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermImpl::Name(name) => write!(f, "{name}"),
            TermImpl::Pattern(source) => write!(f, "/{source}/"),
            TermImpl::Null => write!(f, "()"),
        }
    }
}

fn write_patterns(f: &mut fmt::Formatter<'_>, patterns: &[PatternImpl]) -> fmt::Result {
    for (i, pattern) in patterns.iter().enumerate() {
        if i != 0 {
            write!(f, " | ")?;
        }
        write!(f, "{pattern}")?;
    }
    Ok(())
}

/// A BNF-like dump, one line per declaration.
impl Display for Middle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(initial) = &self.initial {
            writeln!(f, "initial {initial}")?;
        }
        match &self.separator {
            SeparatorImpl::Default => {}
            SeparatorImpl::Disabled => writeln!(f, "separator none")?,
            SeparatorImpl::Custom(patterns) => {
                write!(f, "separator ")?;
                write_patterns(f, patterns)?;
                writeln!(f)?;
            }
        }
        for token in &self.tokens {
            write!(f, "token {:?} = ", token.name)?;
            write_patterns(f, &token.patterns)?;
            writeln!(f)?;
        }
        for rule in &self.rules {
            for alternative in &rule.alternatives {
                write!(f, "{} ->", rule.name)?;
                for term in &alternative.terms {
                    write!(f, " {term}")?;
                }
                match alternative.mode {
                    Mode::Optional => {}
                    Mode::Strict => write!(f, " #strict")?,
                    Mode::Separated => write!(f, " #separated")?,
                }
                match alternative.action {
                    Action::None => {}
                    Action::Wrap => write!(f, " #wrap")?,
                    Action::Transform(_) => write!(f, " => ..")?,
                }
                if alternative.validator.is_some() {
                    write!(f, " #validate")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
