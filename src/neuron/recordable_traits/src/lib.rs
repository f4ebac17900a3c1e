use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DataStruct, DeriveInput, Fields};


/// Derive macro to implement the `Recordables` trait, every field marked with
/// `#[recordable]` is added to a static table that maps the field name to an
/// accessor returning the current value, `Recordable` and `Recordables` must
/// be in scope where the macro is used
#[proc_macro_derive(Recordables, attributes(recordable))]
pub fn derive_recordables(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = input.ident;

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "Recordables can only be derived for structs without generics",
        )
        .to_compile_error()
        .into();
    }

    let fields = match input.data {
        Data::Struct(DataStruct { fields: Fields::Named(named), .. }) => named.named,
        _ => {
            return syn::Error::new_spanned(
                &name,
                "Recordables can only be derived for structs with named fields",
            )
            .to_compile_error()
            .into();
        }
    };

    let recordable_fields: Vec<_> = fields.iter()
        .filter(|field| field.attrs.iter().any(|attr| attr.path.is_ident("recordable")))
        .filter_map(|field| field.ident.clone())
        .collect();

    let recordable_names: Vec<String> = recordable_fields.iter()
        .map(|ident| ident.to_string())
        .collect();

    let expanded = quote! {
        impl Recordables for #name {
            fn recordables() -> &'static [Recordable<Self>] {
                static RECORDABLES: &[Recordable<#name>] = &[
                    #(
                        Recordable {
                            name: #recordable_names,
                            accessor: |state: &#name| state.#recordable_fields,
                        },
                    )*
                ];

                RECORDABLES
            }
        }
    };

    TokenStream::from(expanded)
}
