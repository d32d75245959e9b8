use proc_macro2::{Span, TokenStream};
use quote::{quote, quote_spanned};
use syn::ext::IdentExt;

use crate::hash::{HashMap, OrderedMap};
use crate::middle::{
    Action, AlternativeImpl, Middle, Mode, PatternImpl, RuleImpl, SeparatorImpl, TermImpl, TokenImpl,
};
use crate::syntax::{
    AlternativeDecl, GrammarDef, Item, ModeAttr, RuleDecl, SeparatorDecl, TermDecl, TokenDecl, TokenPat,
};

fn error(span: Span, message: impl std::fmt::Display) -> TokenStream {
    let message = message.to_string();
    quote_spanned! { span => compile_error!(#message) }
}

fn check_regex(source: &syn::LitStr) -> Result<String, TokenStream> {
    let value = source.value();
    match regex_syntax::parse(&value) {
        Ok(_) => Ok(value),
        Err(err) => Err(error(source.span(), format!("invalid regex: {err}"))),
    }
}

impl TokenPat {
    fn compile(&self) -> Result<PatternImpl, TokenStream> {
        match self {
            TokenPat::Literal(lit) => {
                let text = lit.value();
                if text.is_empty() {
                    return Err(error(lit.span(), "literal must not be empty"));
                }
                Ok(PatternImpl::Literal(text))
            }
            TokenPat::Regex(source) => check_regex(source).map(PatternImpl::Regex),
        }
    }
}

fn compile_patterns(patterns: &[TokenPat]) -> Result<Vec<PatternImpl>, TokenStream> {
    patterns.iter().map(TokenPat::compile).collect()
}

#[derive(Default)]
struct Context {
    separator: Option<Span>,
    tokens: HashMap<String, Span>,
    rules: OrderedMap<String, Span>,
}

impl Context {
    fn before_rules(&self, span: Span, what: &str) -> Result<(), TokenStream> {
        if self.rules.is_empty() {
            Ok(())
        } else {
            Err(error(span, format!("{what} must be declared before rules")))
        }
    }

    fn check_name(&self, name: &str, span: Span) -> Result<(), TokenStream> {
        if self.tokens.contains_key(name) || self.rules.contains_key(name) {
            Ok(())
        } else {
            Err(error(span, format!("unknown term `{name}`")))
        }
    }
}

impl GrammarDef {
    pub fn compile(self) -> Result<Middle, TokenStream> {
        let mut ctx = Context::default();
        let mut middle = Middle {
            crate_name: match self.config.crate_name {
                Some(path) => quote! { #path },
                None => quote! { ::parse_rules },
            },
            initial: None,
            separator: SeparatorImpl::Default,
            tokens: vec![],
            rules: vec![],
        };

        let mut rules = vec![];
        for item in self.items {
            match item {
                Item::Separator(decl) => middle.separator = decl.compile(&mut ctx)?,
                Item::Token(decl) => middle.tokens.extend(decl.compile(&mut ctx)?),
                Item::Rule(decl) => {
                    decl.declare(&mut ctx)?;
                    rules.push(decl);
                }
            }
        }

        // Rules may refer to rules declared after them.
        for rule in rules {
            middle.rules.push(rule.compile(&ctx)?);
        }

        if middle.rules.is_empty() {
            return Err(error(Span::call_site(), "no rule specified"));
        }
        if let Some(initial) = self.config.initial {
            let name = initial.value();
            if !ctx.rules.contains_key(&name) {
                return Err(error(initial.span(), format!("unknown initial rule `{name}`")));
            }
            middle.initial = Some(name);
        }

        Ok(middle)
    }
}

impl SeparatorDecl {
    fn compile(self, ctx: &mut Context) -> Result<SeparatorImpl, TokenStream> {
        if ctx.separator.replace(self.span).is_some() {
            return Err(error(self.span, "separator already defined"));
        }
        ctx.before_rules(self.span, "separator")?;
        match self.patterns {
            None => Ok(SeparatorImpl::Disabled),
            Some(patterns) => compile_patterns(&patterns).map(SeparatorImpl::Custom),
        }
    }
}

impl TokenDecl {
    fn compile(self, ctx: &mut Context) -> Result<Vec<TokenImpl>, TokenStream> {
        let declared = match self {
            TokenDecl::Literals(literals) => literals
                .into_iter()
                .map(|lit| {
                    let pattern = TokenPat::Literal(lit.clone()).compile()?;
                    Ok((lit.value(), lit.span(), vec![pattern]))
                })
                .collect::<Result<Vec<_>, TokenStream>>()?,
            TokenDecl::Named { name, patterns } => {
                vec![(name.value(), name.span(), compile_patterns(&patterns)?)]
            }
        };

        let mut tokens = vec![];
        for (name, span, patterns) in declared {
            if name.is_empty() {
                return Err(error(span, "token name must not be empty"));
            }
            if ctx.tokens.insert(name.clone(), span).is_some() {
                return Err(error(span, format!("token `{name}` already defined")));
            }
            ctx.before_rules(span, &format!("token `{name}`"))?;
            tokens.push(TokenImpl { name, patterns });
        }
        Ok(tokens)
    }
}

impl RuleDecl {
    fn declare(&self, ctx: &mut Context) -> Result<(), TokenStream> {
        let name = self.name.unraw().to_string();
        let span = self.name.span();
        if ctx.tokens.contains_key(&name) {
            return Err(error(
                span,
                format!("rule is using identifier `{name}` reserved for token"),
            ));
        }
        if ctx.rules.insert(name.clone(), span).is_some() {
            return Err(error(span, format!("rule `{name}` is already defined")));
        }
        if self.alternatives.is_empty() {
            return Err(error(
                span,
                format!("rule `{name}` must define at least one alternative"),
            ));
        }
        Ok(())
    }

    fn compile(self, ctx: &Context) -> Result<RuleImpl, TokenStream> {
        let default_mode = self.mode;
        let alternatives = self
            .alternatives
            .into_iter()
            .map(|alternative| alternative.compile(ctx, default_mode))
            .collect::<Result<_, _>>()?;
        Ok(RuleImpl {
            name: self.name.unraw().to_string(),
            alternatives,
        })
    }
}

impl AlternativeDecl {
    fn compile(
        self,
        ctx: &Context,
        default_mode: Option<ModeAttr>,
    ) -> Result<AlternativeImpl, TokenStream> {
        let mode = match self.mode.or(default_mode) {
            None => Mode::Optional,
            Some(ModeAttr::Strict) => Mode::Strict,
            Some(ModeAttr::Separated) => Mode::Separated,
        };

        let terms = self
            .terms
            .iter()
            .map(|term| term.compile(ctx))
            .collect::<Result<_, _>>()?;

        let action = match (self.wrap, self.action) {
            (Some(span), Some(_)) => {
                return Err(error(span, "`#[wrap]` conflicts with a transform"));
            }
            (Some(_), None) => Action::Wrap,
            (None, Some(callback)) => Action::Transform(callback),
            (None, None) => Action::None,
        };

        Ok(AlternativeImpl {
            mode,
            terms,
            action,
            validator: self.validate,
        })
    }
}

impl TermDecl {
    fn compile(&self, ctx: &Context) -> Result<TermImpl, TokenStream> {
        match self {
            TermDecl::Name(ident) => {
                let name = ident.unraw().to_string();
                ctx.check_name(&name, ident.span())?;
                Ok(TermImpl::Name(name))
            }
            TermDecl::Str(lit) => {
                let name = lit.value();
                ctx.check_name(&name, lit.span())?;
                Ok(TermImpl::Name(name))
            }
            TermDecl::Pattern(source) => check_regex(source).map(TermImpl::Pattern),
            TermDecl::Null(_) => Ok(TermImpl::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(input: &str) -> Result<Middle, String> {
        let grammar = syn::parse_str::<GrammarDef>(input).map_err(|err| err.to_string())?;
        grammar.compile().map_err(|err| err.to_string())
    }

    fn compile_error(input: &str) -> String {
        match compile(input) {
            Ok(middle) => panic!("expected an error, got:\n{middle}"),
            Err(err) => err,
        }
    }

    #[test]
    fn resolves_names_and_modes() {
        let middle = compile(
            r#"
            #[grammar(initial = "expr")]
            separator /r"[ \t]+"/;
            token "+";
            token NUMBER = /r"\d+"/;
            #[separated]
            rule sum { NUMBER "+" expr => |a, b| a }
            rule expr {
                #[strict] sum,
                #[wrap] NUMBER,
                (),
            }
            "#,
        )
        .unwrap();

        assert_eq!(
            middle.to_string(),
            concat!(
                "initial expr\n",
                "separator /[ \\t]+/\n",
                "token \"+\" = \"+\"\n",
                "token \"NUMBER\" = /\\d+/\n",
                "sum -> NUMBER + expr #separated => ..\n",
                "expr -> sum #strict\n",
                "expr -> NUMBER #wrap\n",
                "expr -> ()\n",
            )
        );
    }

    #[test]
    fn declaration_defects() {
        let cases = [
            (r#"token "a"; token "a"; rule r { a }"#, "token `a` already defined"),
            (r#"rule r { /"x"/ } token "a";"#, "token `a` must be declared before rules"),
            (r#"rule r { /"x"/ } separator none;"#, "separator must be declared before rules"),
            (r#"separator none; separator none; rule r { () }"#, "separator already defined"),
            (r#"token a = "x"; rule a { a }"#, "rule is using identifier `a` reserved for token"),
            (r#"rule a { () } rule a { () }"#, "rule `a` is already defined"),
            (r#"rule a { }"#, "rule `a` must define at least one alternative"),
            (r#"rule a { b }"#, "unknown term `b`"),
            (r#"rule a { "+" }"#, "unknown term `+`"),
            (r#"rule a { #[wrap] () => |x| x }"#, "`#[wrap]` conflicts with a transform"),
            (r#"#[grammar(initial = "b")] rule a { () }"#, "unknown initial rule `b`"),
            (r#"token "a";"#, "no rule specified"),
            (r#"token "";"#, "literal must not be empty"),
        ];
        for (input, expected) in cases {
            let err = compile_error(input);
            assert!(err.contains(expected), "{input}: {err}");
        }
    }

    #[test]
    fn invalid_regexes_are_reported() {
        let err = compile_error(r#"rule a { /"(x"/ }"#);
        assert!(err.contains("invalid regex"), "{err}");

        let err = compile_error(r#"token t = /"[a-"/; rule a { t }"#);
        assert!(err.contains("invalid regex"), "{err}");
    }

    #[test]
    fn raw_identifiers_are_unescaped() {
        let middle = compile(r#"rule r#type { /"t"/ } rule start { r#type }"#).unwrap();
        assert_eq!(middle.rules[0].name, "type");
        assert_eq!(middle.rules[1].alternatives[0].terms, [TermImpl::Name("type".into())]);
    }

    #[test]
    fn default_crate_path() {
        let middle = compile(r#"rule a { () }"#).unwrap();
        assert_eq!(middle.crate_name.to_string(), ":: parse_rules");

        let middle = compile(r#"#[grammar(crate = "crate")] rule a { () }"#).unwrap();
        assert_eq!(middle.crate_name.to_string(), "crate");
    }
}
