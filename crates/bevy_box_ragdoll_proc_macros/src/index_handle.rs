use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Index, parse_macro_input};

/// Generates conversions between a handle newtype and the `usize` position it wraps.
///
/// The wrapped field must be annotated with `#[index]` and have an unsigned integer type.
pub(crate) fn index_handle(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return error(&input, "IndexHandle only works on structs.");
    };

    if data_struct.fields.len() != 1 {
        return error(&input, "IndexHandle requires a struct with exactly one field.");
    }

    let Some((index_field_idx, index_field)) = data_struct
        .fields
        .iter()
        .enumerate()
        .find(|(_, field)| field.attrs.iter().any(|attr| attr.path().is_ident("index")))
    else {
        return error(
            &input,
            "IndexHandle requires an #[index] annotation on its field",
        );
    };

    let index_ty = &index_field.ty;

    let (index_field_accessor, constructor) = if let Some(ident) = index_field.ident.as_ref() {
        let accessor = quote! {#ident};
        let constructor = quote! { #name { #ident: index as #index_ty } };
        (accessor, constructor)
    } else {
        let index_field_index = Index::from(index_field_idx);
        let accessor = quote! {#index_field_index};
        let constructor = quote! { #name(index as #index_ty) };
        (accessor, constructor)
    };

    let name_str = name.to_string();

    TokenStream::from(quote! {
        impl #name {
            /// Position of this handle in the arena that issued it.
            pub fn index(&self) -> usize {
                self.#index_field_accessor as usize
            }

            pub fn from_index(index: usize) -> Self {
                #constructor
            }
        }

        impl From<#name> for usize {
            fn from(value: #name) -> Self {
                value.index()
            }
        }

        impl ::core::fmt::Display for #name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}#{}", #name_str, self.index())
            }
        }
    })
}

fn error(input: &DeriveInput, msg: impl std::fmt::Display) -> TokenStream {
    syn::Error::new_spanned(input, msg)
        .to_compile_error()
        .into()
}
