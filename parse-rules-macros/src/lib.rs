/// Declare a grammar with the parse-rules DSL.
///
/// Expands to an expression of type
/// `Result<parse_rules::Grammar, parse_rules::GrammarError>`. See the crate
/// documentation of `parse-rules` for the syntax.
#[proc_macro]
pub fn grammar(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    parse_rules_codegen::grammar(input.into()).into()
}
