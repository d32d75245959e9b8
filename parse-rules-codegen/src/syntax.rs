//! Surface syntax of the `grammar!` DSL.

use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{Attribute, Token};

mod kw {
    syn::custom_keyword!(separator);
    syn::custom_keyword!(token);
    syn::custom_keyword!(rule);
    syn::custom_keyword!(none);
}

#[derive(Debug, Default)]
pub struct GrammarConfig {
    pub crate_name: Option<syn::Path>,
    pub initial: Option<syn::LitStr>,
}

impl GrammarConfig {
    fn parse_attrs(attrs: Vec<Attribute>) -> syn::Result<Self> {
        let mut config = GrammarConfig::default();
        for attr in attrs {
            if !attr.path().is_ident("grammar") {
                return Err(syn::Error::new_spanned(attr, "expected `#[grammar(..)]`"));
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("crate") {
                    let value = meta.value()?;
                    let value = value.parse::<syn::LitStr>()?;
                    config.crate_name = Some(value.parse().map_err(|_| {
                        syn::Error::new_spanned(&value, "expected a valid path")
                    })?);
                } else if meta.path.is_ident("initial") {
                    let value = meta.value()?;
                    config.initial = Some(value.parse::<syn::LitStr>()?);
                } else {
                    Err(syn::Error::new_spanned(meta.path, "unknown attribute"))?
                }
                Ok(())
            })?;
        }
        Ok(config)
    }
}

/// ```text
/// Grammar ::= Config? Item*
/// Item ::= Separator | Token | Rule
/// ```
#[derive(Debug)]
pub struct GrammarDef {
    pub config: GrammarConfig,
    pub items: Vec<Item>,
}

impl Parse for GrammarDef {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        // Leading attributes other than `#[grammar]` belong to the first rule.
        let (config, mut pending): (Vec<_>, Vec<_>) = input
            .call(Attribute::parse_outer)?
            .into_iter()
            .partition(|attr| attr.path().is_ident("grammar"));
        let config = GrammarConfig::parse_attrs(config)?;

        let mut items = vec![];
        while !input.is_empty() || !pending.is_empty() {
            let mut attrs = std::mem::take(&mut pending);
            attrs.extend(input.call(Attribute::parse_outer)?);
            items.push(Item::parse_with_attrs(input, attrs)?);
        }
        Ok(Self { config, items })
    }
}

#[derive(Debug)]
pub enum Item {
    Separator(SeparatorDecl),
    Token(TokenDecl),
    Rule(RuleDecl),
}

impl Item {
    fn parse_with_attrs(input: ParseStream, attrs: Vec<Attribute>) -> syn::Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(kw::rule) {
            return Ok(Item::Rule(RuleDecl::parse_with_attrs(input, attrs)?));
        }
        if let Some(attr) = attrs.first() {
            return Err(syn::Error::new_spanned(attr, "attributes are only allowed on rules"));
        }
        if lookahead.peek(kw::separator) {
            Ok(Item::Separator(input.parse()?))
        } else if lookahead.peek(kw::token) {
            Ok(Item::Token(input.parse()?))
        } else {
            Err(lookahead.error())
        }
    }
}

/// ```text
/// Separator ::= 'separator' ('none' | TokenPat ('|' TokenPat)*) ';'
/// ```
#[derive(Debug)]
pub struct SeparatorDecl {
    pub span: Span,
    /// `None` disables the separator.
    pub patterns: Option<Vec<TokenPat>>,
}

impl Parse for SeparatorDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let keyword = input.parse::<kw::separator>()?;
        let patterns = if input.peek(kw::none) {
            input.parse::<kw::none>()?;
            None
        } else {
            Some(parse_token_pats(input)?)
        };
        input.parse::<Token![;]>()?;
        Ok(Self {
            span: keyword.span,
            patterns,
        })
    }
}

/// ```text
/// Token ::= 'token' LitStr (',' LitStr)* ';'
///         | 'token' TokenName '=' TokenPat ('|' TokenPat)* ';'
/// ```
#[derive(Debug)]
pub enum TokenDecl {
    /// Tokens named by, and matching, their own text.
    Literals(Vec<syn::LitStr>),
    Named {
        name: TokenName,
        patterns: Vec<TokenPat>,
    },
}

impl Parse for TokenDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        input.parse::<kw::token>()?;
        let name = input.parse::<TokenName>()?;
        let decl = if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            let patterns = parse_token_pats(input)?;
            TokenDecl::Named { name, patterns }
        } else {
            let TokenName::Str(first) = name else {
                return Err(input.error("expected `=`"));
            };
            let mut literals = vec![first];
            while input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
                literals.push(input.parse()?);
            }
            TokenDecl::Literals(literals)
        };
        input.parse::<Token![;]>()?;
        Ok(decl)
    }
}

#[derive(Debug, Clone)]
pub enum TokenName {
    Ident(syn::Ident),
    Str(syn::LitStr),
}

impl TokenName {
    pub fn value(&self) -> String {
        match self {
            TokenName::Ident(ident) => ident.to_string(),
            TokenName::Str(lit) => lit.value(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TokenName::Ident(ident) => ident.span(),
            TokenName::Str(lit) => lit.span(),
        }
    }
}

impl Parse for TokenName {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(syn::LitStr) {
            Ok(TokenName::Str(input.parse()?))
        } else if lookahead.peek(syn::Ident) {
            Ok(TokenName::Ident(input.parse()?))
        } else {
            Err(lookahead.error())
        }
    }
}

/// ```text
/// TokenPat ::= LitStr | '/' LitStr '/'
/// ```
#[derive(Debug, Clone)]
pub enum TokenPat {
    Literal(syn::LitStr),
    Regex(syn::LitStr),
}

impl Parse for TokenPat {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Token![/]) {
            Ok(TokenPat::Regex(parse_regex(input)?))
        } else {
            Ok(TokenPat::Literal(input.parse()?))
        }
    }
}

fn parse_token_pats(input: ParseStream) -> syn::Result<Vec<TokenPat>> {
    let mut patterns = vec![input.parse::<TokenPat>()?];
    while input.peek(Token![|]) {
        input.parse::<Token![|]>()?;
        patterns.push(input.parse()?);
    }
    Ok(patterns)
}

fn parse_regex(input: ParseStream) -> syn::Result<syn::LitStr> {
    input.parse::<Token![/]>()?;
    let source = input.parse::<syn::LitStr>()?;
    input.parse::<Token![/]>()?;
    Ok(source)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeAttr {
    Strict,
    Separated,
}

/// ```text
/// Rule ::= ('#[strict]' | '#[separated]')? 'rule' Ident '{' Alternative (',' Alternative)* ','? '}'
/// ```
#[derive(Debug)]
pub struct RuleDecl {
    pub mode: Option<ModeAttr>,
    pub name: syn::Ident,
    pub alternatives: Vec<AlternativeDecl>,
}

impl RuleDecl {
    fn parse_with_attrs(input: ParseStream, attrs: Vec<Attribute>) -> syn::Result<Self> {
        let mut mode = None;
        for attr in attrs {
            let parsed = parse_mode_attr(&attr).ok_or_else(|| {
                syn::Error::new_spanned(&attr, "expected `#[strict]` or `#[separated]`")
            })?;
            set_mode(&mut mode, parsed, &attr)?;
        }
        input.parse::<kw::rule>()?;
        let name = input.parse::<syn::Ident>()?;

        let content;
        syn::braced!(content in input);
        let mut alternatives = vec![];
        while !content.is_empty() {
            alternatives.push(content.parse::<AlternativeDecl>()?);
        }

        Ok(Self {
            mode,
            name,
            alternatives,
        })
    }
}

fn parse_mode_attr(attr: &Attribute) -> Option<ModeAttr> {
    if !matches!(attr.meta, syn::Meta::Path(_)) {
        return None;
    }
    if attr.path().is_ident("strict") {
        Some(ModeAttr::Strict)
    } else if attr.path().is_ident("separated") {
        Some(ModeAttr::Separated)
    } else {
        None
    }
}

fn set_mode(slot: &mut Option<ModeAttr>, mode: ModeAttr, attr: &Attribute) -> syn::Result<()> {
    if slot.replace(mode).is_some() {
        return Err(syn::Error::new_spanned(attr, "separator mode specified twice"));
    }
    Ok(())
}

/// A transform or validator attached to an alternative.
#[derive(Debug, Clone)]
pub enum Callback {
    /// Parameters bind captured values positionally.
    Closure(syn::ExprClosure),
    /// Any other expression is used as the callback itself.
    Expr(syn::Expr),
}

impl Callback {
    pub fn span(&self) -> Span {
        match self {
            Callback::Closure(closure) => closure.span(),
            Callback::Expr(expr) => expr.span(),
        }
    }
}

impl From<syn::Expr> for Callback {
    fn from(expr: syn::Expr) -> Self {
        match expr {
            syn::Expr::Closure(closure) => Callback::Closure(closure),
            expr => Callback::Expr(expr),
        }
    }
}

/// ```text
/// Alternative ::= AltAttr* Term+ ('=>' Expr)?
/// AltAttr ::= '#[strict]' | '#[separated]' | '#[wrap]' | '#[validate(' Expr ')]'
/// ```
#[derive(Debug)]
pub struct AlternativeDecl {
    pub span: Span,
    pub mode: Option<ModeAttr>,
    pub wrap: Option<Span>,
    pub validate: Option<Callback>,
    pub terms: Vec<TermDecl>,
    pub action: Option<Callback>,
}

impl Parse for AlternativeDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let span = input.span();
        let mut mode = None;
        let mut wrap = None;
        let mut validate = None;
        for attr in input.call(Attribute::parse_outer)? {
            if let Some(parsed) = parse_mode_attr(&attr) {
                set_mode(&mut mode, parsed, &attr)?;
            } else if attr.path().is_ident("wrap") {
                attr.meta.require_path_only()?;
                wrap = Some(attr.span());
            } else if attr.path().is_ident("validate") {
                if validate.is_some() {
                    return Err(syn::Error::new_spanned(attr, "validator specified twice"));
                }
                validate = Some(attr.parse_args::<syn::Expr>()?.into());
            } else {
                return Err(syn::Error::new_spanned(attr, "unknown attribute"));
            }
        }

        let mut terms = vec![];
        while !input.is_empty() && !input.peek(Token![=>]) && !input.peek(Token![,]) {
            terms.push(input.parse::<TermDecl>()?);
        }
        if terms.is_empty() {
            return Err(syn::Error::new(
                span,
                "alternative must define at least one term, use `()` to match nothing",
            ));
        }

        let action = if input.peek(Token![=>]) {
            input.parse::<Token![=>]>()?;
            let expr = input.parse::<syn::Expr>()?;
            let needs_comma = requires_comma_to_be_match_arm(&expr);
            if (needs_comma && !input.is_empty()) || input.peek(Token![,]) {
                input.parse::<Token![,]>()?;
            }
            Some(expr.into())
        } else {
            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
            None
        };

        Ok(Self {
            span,
            mode,
            wrap,
            validate,
            terms,
            action,
        })
    }
}

/// ```text
/// Term ::= Ident | LitStr | '/' LitStr '/' | '(' ')'
/// ```
#[derive(Debug, Clone)]
pub enum TermDecl {
    Name(syn::Ident),
    Str(syn::LitStr),
    Pattern(syn::LitStr),
    Null(Span),
}

impl Parse for TermDecl {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let lookahead = input.lookahead1();
        if lookahead.peek(syn::Ident) {
            Ok(TermDecl::Name(input.parse()?))
        } else if lookahead.peek(syn::LitStr) {
            Ok(TermDecl::Str(input.parse()?))
        } else if lookahead.peek(Token![/]) {
            Ok(TermDecl::Pattern(parse_regex(input)?))
        } else if lookahead.peek(syn::token::Paren) {
            let content;
            let paren = syn::parenthesized!(content in input);
            if !content.is_empty() {
                return Err(content.error("expected `()`"));
            }
            Ok(TermDecl::Null(paren.span.join()))
        } else {
            Err(lookahead.error())
        }
    }
}

fn requires_comma_to_be_match_arm(expr: &syn::Expr) -> bool {
    use syn::Expr;
    !matches!(
        expr,
        Expr::If(_)
            | Expr::Match(_)
            | Expr::Block(_)
            | Expr::Unsafe(_)
            | Expr::While(_)
            | Expr::Loop(_)
            | Expr::ForLoop(_)
            | Expr::TryBlock(_)
            | Expr::Const(_)
    )
}
