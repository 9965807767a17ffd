use proc_macro::TokenStream;

mod record;

/// Derive `rowmap::Record` for a struct with named fields.
///
/// Only fields carrying `#[rowmap("<column>[,<modifier>...]")]` are mapped;
/// the tag text is validated by the metadata cache on first use.
#[proc_macro_derive(Record, attributes(rowmap))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
