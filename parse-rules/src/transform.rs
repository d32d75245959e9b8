//! Turning capture nodes into caller values.

use crate::capture::{Capture, Matches, NodeId};
use crate::parser::ParserState;
use crate::value::Value;

impl ParserState<'_, '_> {
    /// The transformed value of `node`.
    ///
    /// Each node is transformed at most once per parse: validators and the
    /// final pass share the cached result, so side effects in transforms are
    /// observed once.
    pub(crate) fn transform(&mut self, node: NodeId) -> Value {
        if let Some(value) = self.transformed.get(&node) {
            return value.clone();
        }

        let record = &self.arena[node];
        let grammar = self.grammar;
        let callback = grammar.rule(record.rule).alternatives[record.alternative]
            .transform
            .clone();
        let matches = record.matches.clone();

        let value = match matches {
            Matches::Text(text) => match &callback {
                Some(callback) => callback(vec![Value::Str(text)]),
                None => Value::Str(text),
            },
            Matches::Seq(items) => {
                let args: Vec<Value> = items
                    .into_iter()
                    .map(|item| self.capture_value(item))
                    .collect();
                match &callback {
                    Some(callback) => callback(args),
                    None => Value::List(args),
                }
            }
            Matches::Node(sub) => {
                let value = self.transform(sub);
                match &callback {
                    Some(callback) => callback(value.into_list()),
                    None => value,
                }
            }
            Matches::Empty | Matches::Null => match &callback {
                Some(callback) => callback(Vec::new()),
                None => Value::Null,
            },
        };

        self.transformed.insert(node, value.clone());
        value
    }

    fn capture_value(&mut self, capture: Capture) -> Value {
        match capture {
            Capture::Null => Value::Null,
            Capture::Text(text) => Value::Str(text),
            Capture::Node(node) => self.transform(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use crate::{GrammarBuilder, Term, Value};

    #[test]
    fn sequences_become_lists() {
        let mut builder = GrammarBuilder::new();
        builder.rule("initial", [Term::pattern("a"), Term::name("subrule")]).unwrap();
        builder.rule("subrule", [Term::pattern("b")]).unwrap();
        let grammar = builder.finish().unwrap();

        assert_eq!(
            grammar.parse("ab").unwrap(),
            Value::from(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn single_subrule_is_passed_through() {
        let mut builder = GrammarBuilder::new();
        builder.literal_token("a").unwrap();
        builder.rule("initial", ["a", "subrule"]).unwrap();
        builder.rule("subrule", [Term::pattern("b")]).unwrap();
        let grammar = builder.finish().unwrap();

        assert_eq!(grammar.parse("ab").unwrap(), Value::from("b"));
    }

    #[test]
    fn list_results_are_spread_into_outer_transforms() {
        let mut builder = GrammarBuilder::new();
        builder
            .rule("outer", ["inner"])
            .unwrap()
            .transform(|args| args.len() as i64);
        builder
            .rule("inner", [Term::pattern("a"), Term::pattern("b"), Term::pattern("c")])
            .unwrap();
        let grammar = builder.finish().unwrap();

        assert_eq!(grammar.parse("abc").unwrap(), Value::Int(3));
    }

    #[test]
    fn pattern_groups_are_separate_arguments() {
        let mut builder = GrammarBuilder::new();
        builder
            .rule("pair", [Term::pattern(r"(\w+)=(\d+)?")])
            .unwrap()
            .transform(|args| Value::map([("key", args[0].clone()), ("value", args[1].clone())]));
        let grammar = builder.finish().unwrap();

        let value = grammar.parse("width=10").unwrap();
        assert_eq!(value.get("key"), Some(&Value::from("width")));
        assert_eq!(value.get("value"), Some(&Value::from("10")));

        let value = grammar.parse("width=").unwrap();
        assert_eq!(value.get("value"), Some(&Value::Null));
    }

    #[test]
    fn epsilon_keeps_argument_positions() {
        let mut builder = GrammarBuilder::new();
        builder
            .rule("initial", [Term::Null, Term::pattern("x")])
            .unwrap()
            .transform(|args| args[1].clone());
        let grammar = builder.finish().unwrap();

        assert_eq!(grammar.parse("x").unwrap(), Value::from("x"));
    }

    #[test]
    fn validated_nodes_are_transformed_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut builder = GrammarBuilder::new();
        builder
            .rule("number", [Term::pattern(r"\d+")])
            .unwrap()
            .transform(move |args| {
                counter.fetch_add(1, Ordering::SeqCst);
                args[0].as_str().and_then(|text| text.parse::<i64>().ok())
            })
            .validate(|args| matches!(args[0].as_i64(), Some(n) if (0..=1000).contains(&n)));
        let grammar = builder.finish().unwrap();

        assert_eq!(grammar.parse("1000").unwrap(), Value::Int(1000));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
