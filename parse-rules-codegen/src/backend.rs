use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};

use crate::middle::{Action, AlternativeImpl, Middle, Mode, PatternImpl, RuleImpl, SeparatorImpl, TermImpl, TokenImpl};
use crate::syntax::Callback;

pub struct Context {
    crate_name: TokenStream,
    builder: syn::Ident,
}

impl PatternImpl {
    fn expand(&self, ctx: &Context) -> TokenStream {
        let crate_name = &ctx.crate_name;
        match self {
            PatternImpl::Literal(text) => quote! { #crate_name::TokenPattern::literal(#text) },
            PatternImpl::Regex(source) => quote! { #crate_name::TokenPattern::regex(#source) },
        }
    }
}

impl TermImpl {
    fn expand(&self, ctx: &Context) -> TokenStream {
        let crate_name = &ctx.crate_name;
        match self {
            TermImpl::Name(name) => quote! { #crate_name::Term::name(#name) },
            TermImpl::Pattern(source) => quote! { #crate_name::Term::pattern(#source) },
            TermImpl::Null => quote! { #crate_name::Term::Null },
        }
    }
}

/// Give untyped closure parameters the `Value` type, so that closure bodies
/// can call methods on them.
fn annotate_params(closure: &mut syn::ExprClosure, ctx: &Context) {
    let crate_name = &ctx.crate_name;
    for input in closure.inputs.iter_mut() {
        if matches!(input, syn::Pat::Type(_)) {
            continue;
        }
        let pat = input.clone();
        *input = syn::Pat::Type(syn::PatType {
            attrs: vec![],
            pat: Box::new(pat),
            colon_token: Default::default(),
            ty: Box::new(syn::parse_quote! { #crate_name::Value }),
        });
    }
}

impl Callback {
    /// A transform taking the captured values as a vector.
    fn expand_transform(self, ctx: &Context) -> TokenStream {
        let crate_name = &ctx.crate_name;
        match self {
            Callback::Closure(closure) if closure.inputs.is_empty() => {
                quote! { move |_: ::std::vec::Vec<#crate_name::Value>| (#closure)() }
            }
            Callback::Closure(mut closure) => {
                annotate_params(&mut closure, ctx);
                let args = closure.inputs.iter().map(|_| {
                    quote! { __args.next().unwrap_or_default() }
                });
                quote! {
                    move |__args: ::std::vec::Vec<#crate_name::Value>| {
                        let mut __args = __args.into_iter();
                        (#closure)(#(#args),*)
                    }
                }
            }
            Callback::Expr(expr) => quote! { #expr },
        }
    }

    /// A validator taking the transformed value as a slice.
    fn expand_validator(self, ctx: &Context) -> TokenStream {
        let crate_name = &ctx.crate_name;
        match self {
            Callback::Closure(mut closure) => {
                annotate_params(&mut closure, ctx);
                let args = (0..closure.inputs.len()).map(|i| {
                    quote! { __args.get(#i).cloned().unwrap_or_default() }
                });
                quote! {
                    move |__args: &[#crate_name::Value]| (#closure)(#(#args),*)
                }
            }
            Callback::Expr(expr) => quote! { #expr },
        }
    }
}

impl TokenImpl {
    fn expand(&self, ctx: &Context) -> TokenStream {
        let builder = &ctx.builder;
        let name = &self.name;
        match &self.patterns[..] {
            [PatternImpl::Literal(text)] if text == name => {
                quote! { #builder.literal_token(#name)?; }
            }
            patterns => {
                let patterns = patterns.iter().map(|pattern| pattern.expand(ctx));
                quote! { #builder.token(#name, [#(#patterns),*])?; }
            }
        }
    }
}

impl AlternativeImpl {
    fn expand(self, name: &str, ctx: &Context) -> TokenStream {
        let builder = &ctx.builder;
        let method = match self.mode {
            Mode::Optional => format_ident!("rule"),
            Mode::Strict => format_ident!("rule_strict"),
            Mode::Separated => format_ident!("rule_separated"),
        };
        let terms = self.terms.iter().map(|term| term.expand(ctx));
        let action = match self.action {
            Action::None => quote! {},
            Action::Wrap => quote! { .wrap() },
            Action::Transform(callback) => {
                let transform = callback.expand_transform(ctx);
                quote! { .transform(#transform) }
            }
        };
        let validator = self.validator.map(|callback| {
            let validator = callback.expand_validator(ctx);
            quote! { .validate(#validator) }
        });
        quote! {
            #builder.#method(#name, [#(#terms),*])? #action #validator;
        }
    }
}

impl RuleImpl {
    fn expand(self, ctx: &Context) -> TokenStream {
        let name = self.name;
        let alternatives = self
            .alternatives
            .into_iter()
            .map(|alternative| alternative.expand(&name, ctx));
        quote! { #(#alternatives)* }
    }
}

impl Middle {
    /// Expand into an expression of type `Result<Grammar, GrammarError>`.
    pub fn expand(self) -> TokenStream {
        let ctx = Context {
            crate_name: self.crate_name,
            builder: format_ident!("__builder", span = Span::mixed_site()),
        };
        let crate_name = &ctx.crate_name;
        let builder = &ctx.builder;

        let initial = self.initial.map(|initial| quote! { #builder.initial(#initial); });
        let separator = match &self.separator {
            SeparatorImpl::Default => quote! {},
            SeparatorImpl::Disabled => quote! { #builder.no_separator(); },
            SeparatorImpl::Custom(patterns) => {
                let patterns = patterns.iter().map(|pattern| pattern.expand(&ctx));
                quote! { #builder.separator([#(#patterns),*])?; }
            }
        };
        let tokens = self.tokens.iter().map(|token| token.expand(&ctx));
        let rules = self.rules.into_iter().map(|rule| rule.expand(&ctx));

        quote! {
            (move || -> ::std::result::Result<#crate_name::Grammar, #crate_name::GrammarError> {
                let mut #builder = #crate_name::GrammarBuilder::new();
                #initial
                #separator
                #(#tokens)*
                #(#rules)*
                #builder.finish()
            })()
        }
    }
}
