use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Error, Fields, LitStr};

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = if let Data::Struct(data) = &input.data {
        if let Fields::Named(named) = &data.fields {
            &named.named
        } else {
            let err = Error::new_spanned(
                &data.fields,
                "Record can only be derived for structs with named fields",
            );
            return err.to_compile_error();
        }
    } else {
        let err = Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs with named fields",
        );
        return err.to_compile_error();
    };

    // (ident, type, tag) of every tagged field, in declaration order.
    let mut mapped = Vec::new();
    for field in fields {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        match field_tag(&field.attrs) {
            Ok(Some(tag)) => mapped.push((field_ident, &field.ty, tag)),
            Ok(None) => {}
            Err(err) => return err.to_compile_error(),
        }
    }

    let tag_exprs = mapped.iter().map(|(field_ident, ty, tag)| {
        let field_name = field_ident.to_string();
        let tag_text = tag.value();

        if is_embed(&tag_text) {
            quote! {
                ::rowmap::FieldTag::embed(
                    #field_name,
                    #tag_text,
                    <#ty as ::rowmap::Record>::field_tags,
                )
            }
        } else {
            quote! { ::rowmap::FieldTag::new(#field_name, #tag_text) }
        }
    });

    let get_arms = mapped.iter().enumerate().map(|(index, (field_ident, _, tag))| {
        if is_embed(&tag.value()) {
            quote! {
                [#index, rest @ ..] if !rest.is_empty() => {
                    ::rowmap::Record::field_value(&self.#field_ident, rest)
                }
            }
        } else {
            quote! {
                [#index] => ::rowmap::ToValue::to_value(&self.#field_ident),
            }
        }
    });

    let set_arms = mapped.iter().enumerate().map(|(index, (field_ident, _, tag))| {
        if is_embed(&tag.value()) {
            quote! {
                [#index, rest @ ..] if !rest.is_empty() => {
                    ::rowmap::Record::set_field_value(&mut self.#field_ident, rest, value)
                }
            }
        } else {
            quote! {
                [#index] => {
                    self.#field_ident = ::rowmap::FromValue::from_value(value)?;
                    ::core::result::Result::Ok(())
                }
            }
        }
    });

    quote! {
        impl #impl_generics ::rowmap::Record for #ident #ty_generics #where_clause {
            fn field_tags() -> ::std::vec::Vec<::rowmap::FieldTag> {
                ::std::vec![#(#tag_exprs),*]
            }

            fn field_value(
                &self,
                path: &[usize],
            ) -> ::core::result::Result<::rowmap::Value, ::rowmap::CoerceError> {
                match path {
                    #(#get_arms)*
                    _ => ::core::result::Result::Err(::rowmap::CoerceError::unknown_field(path)),
                }
            }

            fn set_field_value(
                &mut self,
                path: &[usize],
                value: ::rowmap::Value,
            ) -> ::core::result::Result<(), ::rowmap::CoerceError> {
                match path {
                    #(#set_arms)*
                    _ => ::core::result::Result::Err(::rowmap::CoerceError::unknown_field(path)),
                }
            }
        }
    }
}

fn field_tag(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut found = None;
    for attr in attrs {
        if !attr.path().is_ident("rowmap") {
            continue;
        }
        if found.is_some() {
            return Err(Error::new_spanned(attr, "duplicate #[rowmap] attribute"));
        }
        found = Some(attr.parse_args::<LitStr>()?);
    }

    Ok(found)
}

// Only `embed` changes the generated code; every other modifier is
// interpreted at runtime by the metadata cache.
fn is_embed(tag: &str) -> bool {
    tag.split(',').skip(1).any(|modifier| modifier.trim() == "embed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embed_modifier_is_detected_after_the_column() {
        assert!(is_embed("address,embed"));
        assert!(is_embed("address, pk , embed"));
        assert!(!is_embed("embed"));
        assert!(!is_embed("id,pk,generated"));
    }

    #[test]
    fn non_struct_input_is_rejected() {
        let out = derive_record(quote! { enum Color { Red } }).to_string();
        assert!(out.contains("compile_error"));
    }

    #[test]
    fn untagged_fields_are_skipped() {
        let out = derive_record(quote! {
            struct User {
                #[rowmap("id,pk")]
                id: i64,
                scratch: String,
            }
        })
        .to_string();
        assert!(out.contains("\"id,pk\""));
        assert!(!out.contains("scratch"));
    }
}
