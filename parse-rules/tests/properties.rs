//! Property-based tests for parsing invariants.

use parse_rules::{Grammar, GrammarBuilder, ParseError, SeparatorMode, Term, Value};
use proptest::prelude::*;

fn sum_grammar() -> Grammar {
    let mut builder = GrammarBuilder::new();
    builder.literal_token("+").unwrap();
    builder
        .rule("sum", ["number", "+", "sum"])
        .unwrap()
        .transform(|args| Some(args[0].as_i64()? + args[1].as_i64()?));
    builder.rule("sum", ["number"]).unwrap();
    builder
        .rule("number", [Term::pattern(r"\d+")])
        .unwrap()
        .transform(|args| args[0].as_str().and_then(|n| n.parse::<i64>().ok()));
    builder.finish().unwrap()
}

fn word_digits(mode: SeparatorMode) -> Grammar {
    let mut builder = GrammarBuilder::new();
    builder
        .push_rule("pair", [Term::pattern("[a-z]+"), Term::pattern("[0-9]+")], mode)
        .unwrap();
    builder.finish().unwrap()
}

fn arb_whitespace() -> impl Strategy<Value = String> {
    "[ \t\n]{0,3}"
}

fn arb_sum() -> impl Strategy<Value = (Vec<i64>, String)> {
    prop::collection::vec((0i64..1000, arb_whitespace(), arb_whitespace()), 1..12).prop_map(
        |terms| {
            let numbers = terms.iter().map(|(n, _, _)| *n).collect();
            let input = terms
                .iter()
                .map(|(n, before, after)| format!("{before}{n}{after}"))
                .collect::<Vec<_>>()
                .join("+");
            (numbers, input)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sums_are_computed((numbers, input) in arb_sum()) {
        let grammar = sum_grammar();
        let expected: i64 = numbers.iter().sum();
        prop_assert_eq!(grammar.parse(&input).unwrap(), Value::Int(expected));
    }

    #[test]
    fn parsing_is_repeatable(input in "[0-9+ ]{0,16}") {
        let grammar = sum_grammar();
        let first = grammar.parse(&input).map_err(|err| err.to_string());
        let second = grammar.parse(&input).map_err(|err| err.to_string());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn errors_point_into_the_input(input in "\\PC{0,24}") {
        let grammar = sum_grammar();
        if let Err(err) = grammar.parse(&input) {
            prop_assert!(err.offset() <= input.len());
            prop_assert!(input.is_char_boundary(err.offset()));
            if let ParseError::Unexpected { fragment, offset } = &err {
                prop_assert!(input[*offset..].starts_with(fragment.as_str()));
            }
        }
    }

    #[test]
    fn literal_rules_match_only_themselves(
        literal in "[a-z]{1,8}",
        suffix in "[a-z]{1,4}",
    ) {
        let mut builder = GrammarBuilder::new();
        builder.rule("literal", [Term::literal(literal.clone())]).unwrap();
        let grammar = builder.finish().unwrap();

        prop_assert_eq!(grammar.parse(&literal).unwrap(), Value::from(literal.as_str()));
        prop_assert_eq!(grammar.parse(&format!("  {literal}\n")).unwrap(), Value::from(literal.as_str()));

        let err = grammar.parse(&format!("{literal}{suffix}")).unwrap_err();
        prop_assert_eq!(err.offset(), literal.len());
        prop_assert_eq!(err.to_string(), format!("unexpected \"{suffix}\" at offset {}", literal.len()));
    }

    #[test]
    fn separator_modes(
        word in "[a-z]{1,6}",
        digits in "[0-9]{1,6}",
        gap in arb_whitespace(),
    ) {
        let input = format!("{word}{gap}{digits}");
        let expected = Value::from(vec![Value::from(word.as_str()), Value::from(digits.as_str())]);

        prop_assert_eq!(word_digits(SeparatorMode::Optional).parse(&input).unwrap(), expected.clone());

        let strict = word_digits(SeparatorMode::Disallowed).parse(&input);
        if gap.is_empty() {
            prop_assert_eq!(strict.unwrap(), expected.clone());
        } else {
            prop_assert_eq!(strict.unwrap_err().offset(), word.len());
        }

        let separated = word_digits(SeparatorMode::Mandatory).parse(&input);
        if gap.is_empty() {
            prop_assert_eq!(separated.unwrap_err().offset(), word.len());
        } else {
            prop_assert_eq!(separated.unwrap(), expected);
        }
    }
}
