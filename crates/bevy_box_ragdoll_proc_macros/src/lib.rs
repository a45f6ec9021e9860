mod index_handle;

use proc_macro::TokenStream;

use crate::index_handle::index_handle;

#[proc_macro_derive(IndexHandle, attributes(index))]
pub fn derive_index_handle(input: TokenStream) -> TokenStream {
    index_handle(input)
}
