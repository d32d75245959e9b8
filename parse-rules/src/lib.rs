#![doc = include_str!("../../README.md")]

pub mod builder;
pub mod capture;
pub mod error;
pub mod grammar;
pub mod memo;
pub mod parser;
pub mod pattern;
mod recursive;
mod transform;
pub mod value;

pub use parse_rules_macros::grammar;

pub use crate::builder::{GrammarBuilder, Term, TokenPattern};
pub use crate::error::{GrammarError, IntoValidation, ParseError, ValidationError};
pub use crate::grammar::{Alternative, Grammar, Rule, SeparatorMode, Token};
pub use crate::value::{Map, Value};
