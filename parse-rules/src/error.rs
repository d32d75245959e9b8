//! Errors raised while building a grammar or parsing with it.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A defect in a grammar definition, reported while the grammar is built.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("token \"{0}\" already defined")]
    DuplicateToken(String),
    #[error("token \"{0}\" must be declared before rules")]
    TokenAfterRules(String),
    #[error("token \"{0}\" must define at least one pattern")]
    EmptyToken(String),
    #[error("rule \"{0}\" does not have a valid identifier")]
    InvalidIdentifier(String),
    #[error("rule is using identifier \"{0}\" reserved for token")]
    ReservedForToken(String),
    #[error("rule \"{0}\" must be declared sequentially")]
    NotSequential(String),
    #[error("rule \"{0}\" must define at least one term")]
    EmptyRule(String),
    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex_automata::meta::BuildError>,
    },
    #[error("no rule specified")]
    NoRules,
    #[error("initial rule \"{0}\" is not defined")]
    UnknownInitialRule(String),
}

/// A failed parse.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input could not be consumed past `offset`.
    #[error("unexpected \"{fragment}\" at offset {offset}")]
    Unexpected { fragment: String, offset: usize },
    /// Nothing in the grammar could even be attempted on an empty input.
    #[error("unexpected empty input")]
    EmptyInput,
    /// A term names neither a token nor a rule.
    #[error("unknown term \"{term}\" at rule \"{rule}\"")]
    UnknownTerm { term: String, rule: String },
    /// A validator aborted the parse.
    #[error("{message}")]
    Validation {
        message: String,
        /// `unexpected "<fragment>"` at the start of the rejected alternative.
        unexpected: String,
        offset: usize,
        #[source]
        cause: Option<BoxError>,
    },
}

impl ParseError {
    /// Zero-based byte offset into the input the error refers to.
    pub fn offset(&self) -> usize {
        match self {
            ParseError::Unexpected { offset, .. } | ParseError::Validation { offset, .. } => *offset,
            ParseError::EmptyInput | ParseError::UnknownTerm { .. } => 0,
        }
    }

    /// The "unexpected token" diagnostic captured for validator errors.
    pub fn unexpected(&self) -> Option<&str> {
        match self {
            ParseError::Validation { unexpected, .. } => Some(unexpected),
            _ => None,
        }
    }
}

/// The error a validator raises to abort a parse.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Attach the underlying error.
    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn into_parse_error(self, unexpected: String, offset: usize) -> ParseError {
        ParseError::Validation {
            message: self.message,
            unexpected,
            offset,
            cause: self.cause,
        }
    }
}

impl From<&str> for ValidationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ValidationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Outcome of a validator: accept, reject (`Ok(false)`) or abort.
pub trait IntoValidation {
    fn into_validation(self) -> Result<bool, ValidationError>;
}

impl IntoValidation for bool {
    fn into_validation(self) -> Result<bool, ValidationError> {
        Ok(self)
    }
}

impl<E: Into<ValidationError>> IntoValidation for Result<bool, E> {
    fn into_validation(self) -> Result<bool, ValidationError> {
        self.map_err(Into::into)
    }
}

impl<E: Into<ValidationError>> IntoValidation for Result<(), E> {
    fn into_validation(self) -> Result<bool, ValidationError> {
        self.map(|()| true).map_err(Into::into)
    }
}
