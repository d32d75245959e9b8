//! Code generation behind the `grammar!` macro.
//!
//! The pipeline has three stages: [`syntax`] parses the DSL, [`frontend`]
//! resolves and checks it into the [`middle`] representation, and [`backend`]
//! expands that into calls to the runtime's grammar builder.

pub mod backend;
pub mod frontend;
mod hash;
pub mod middle;
pub mod syntax;

use proc_macro2::TokenStream;
use syntax::GrammarDef;

/// Run the whole pipeline, turning checks that fail into `compile_error!`.
pub fn grammar(input: TokenStream) -> TokenStream {
    let grammar = match syn::parse2::<GrammarDef>(input) {
        Ok(grammar) => grammar,
        Err(err) => return err.to_compile_error(),
    };
    match grammar.compile() {
        Ok(middle) => middle.expand(),
        Err(err) => err,
    }
}
