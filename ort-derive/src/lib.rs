//! Derive macros shared by `libort`.
//!
//! Kept as a standalone proc-macro crate in the same style as the rest of the
//! workspace: the macro only ever has to forward to whichever enum variant is
//! active, so it stays a thin wrapper around a `match`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::*;

/// Derives `libort::obj::StoreObject` for an enum whose every variant wraps a
/// single value that itself implements `StoreObject`. Saves writing out the
/// same `match self { Self::V(x) => x.oid(), ... }` boilerplate for every
/// accessor whenever a new object kind is added to [`libort::obj::Object`].
#[proc_macro_derive(StoreObject)]
pub fn derive_store_object(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let name = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match input.data {
        Data::Enum(data) => data,
        _ => panic!("`StoreObject` can only be derived for enums"),
    };

    let oid_arms = data.variants.iter().map(|variant| {
        let vname = &variant.ident;
        quote! { Self::#vname(x) => x.oid(), }
    });

    let kind_arms = data.variants.iter().map(|variant| {
        let vname = &variant.ident;
        quote! { Self::#vname(x) => x.kind(), }
    });

    let expanded: TokenStream = quote! {
        impl #impl_generics crate::obj::StoreObject for #name #ty_generics #where_clause {
            fn oid(&self) -> crate::hash::Oid {
                match self {
                    #(#oid_arms)*
                }
            }

            fn kind(&self) -> crate::obj::ObjectKind {
                match self {
                    #(#kind_arms)*
                }
            }
        }
    };

    proc_macro::TokenStream::from(expanded)
}
