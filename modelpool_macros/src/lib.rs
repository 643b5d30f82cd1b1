use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::{
    Error, Ident, LitInt, Result,
    parse::{Parse, ParseStream},
    parse_macro_input,
    token::Comma,
};

struct AllTuples {
    macro_ident: Ident,
    start: usize,
    end: usize,
}

impl Parse for AllTuples {
    fn parse(input: ParseStream) -> Result<Self> {
        let macro_ident = input.parse::<Ident>()?;
        input.parse::<Comma>()?;
        let start_lit = input.parse::<LitInt>()?;
        let start = start_lit.base10_parse()?;
        input.parse::<Comma>()?;
        let end = input.parse::<LitInt>()?.base10_parse()?;

        if start > end {
            return Err(Error::new(
                start_lit.span(),
                "tuple range start must not exceed its end",
            ));
        }

        Ok(AllTuples {
            macro_ident,
            start,
            end,
        })
    }
}

/// Invokes `macro_ident!(C0, C1, ..)` once for every tuple arity in `start..=end`.
///
/// ```ignore
/// all_tuples!(impl_component_set, 1, 8);
/// // expands to
/// impl_component_set!(C0);
/// impl_component_set!(C0, C1);
/// // ...
/// ```
#[proc_macro]
pub fn all_tuples(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as AllTuples);
    let items: Vec<Ident> = (0..input.end)
        .map(|i| format_ident!("C{}", i, span = Span::call_site()))
        .collect();

    let macro_ident = &input.macro_ident;
    let invocations = (input.start..=input.end).map(|arity| {
        let tuples = &items[..arity];

        quote! {
            #macro_ident!(#(#tuples),*);
        }
    });

    quote! {
        #(
            #invocations
        )*
    }
    .into()
}
