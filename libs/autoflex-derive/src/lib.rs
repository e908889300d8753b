use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr, Visibility};

/// Derive macro for transcodable records.
///
/// Implements `autoflex::Flex` and `autoflex::Record` on the annotated
/// struct. Only `pub` fields take part in transcoding; other fields are left
/// out of the descriptor and never written.
///
/// The struct must implement `Default` (nested records are built from it).
/// Fields marked `skip` are left out entirely, so their type need not
/// implement `Flex`.
///
/// # Example
///
/// ```ignore
/// #[derive(Record, Default)]
/// pub struct ClusterModel {
///     pub name: Attr<String>,
///
///     #[flex(rename = "node_count", narrowing)]
///     pub nodes: Attr<i64>,
///
///     #[flex(skip)]
///     pub timeouts: Timeouts,
/// }
/// ```
///
/// Field options: `rename = "..."`, `skip`, `legacy`, `omit_empty`,
/// `narrowing`.
#[proc_macro_derive(Record, attributes(flex))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match derive_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

struct FieldSpec {
    ident: syn::Ident,
    name: String,
    ty: syn::Type,
    legacy: bool,
    omit_empty: bool,
    narrowing: bool,
    skip: bool,
}

fn derive_impl(input: &DeriveInput) -> Result<proc_macro2::TokenStream, syn::Error> {
    let name = &input.ident;
    let record_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Record only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "Record only supports structs")),
    };

    let mut specs = Vec::new();
    for field in fields {
        if !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected named field"))?;

        let mut spec = FieldSpec {
            name: ident.to_string(),
            ident,
            ty: field.ty.clone(),
            legacy: false,
            omit_empty: false,
            narrowing: false,
            skip: false,
        };

        for attr in &field.attrs {
            if !attr.path().is_ident("flex") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    spec.name = value.value();
                } else if meta.path.is_ident("skip") {
                    spec.skip = true;
                } else if meta.path.is_ident("legacy") {
                    spec.legacy = true;
                } else if meta.path.is_ident("omit_empty") {
                    spec.omit_empty = true;
                } else if meta.path.is_ident("narrowing") {
                    spec.narrowing = true;
                } else {
                    return Err(meta.error(
                        "unknown flex option (expected rename, skip, legacy, omit_empty, narrowing)",
                    ));
                }
                Ok(())
            })?;
        }

        if spec.name.is_empty() {
            return Err(syn::Error::new_spanned(&spec.ident, "rename must not be empty"));
        }
        if let Some(prev) = specs.iter().find(|s: &&FieldSpec| s.name == spec.name) {
            return Err(syn::Error::new_spanned(
                &spec.ident,
                format!("field name '{}' is already used by '{}'", spec.name, prev.ident),
            ));
        }
        specs.push(spec);
    }

    let mut field_desc_tokens = Vec::new();
    let mut to_value_tokens = Vec::new();
    let mut store_field_arms = Vec::new();

    // Skipped fields stay in `specs` for the duplicate-name check only.
    for spec in specs.iter().filter(|s| !s.skip) {
        let ident = &spec.ident;
        let field_name = &spec.name;
        let ty = &spec.ty;
        let (legacy, omit_empty, narrowing, skip) =
            (spec.legacy, spec.omit_empty, spec.narrowing, spec.skip);

        field_desc_tokens.push(quote! {
            autoflex::schema::FieldDesc::new(
                #field_name,
                <#ty as autoflex::Flex>::describe(),
            )
            .with_options(autoflex::schema::FieldOptions {
                legacy: #legacy,
                omit_empty: #omit_empty,
                narrowing: #narrowing,
                skip: #skip,
            })
        });

        to_value_tokens.push(quote! {
            (#field_name, autoflex::Flex::to_value(&self.#ident))
        });

        store_field_arms.push(quote! {
            #field_name => autoflex::Flex::store(&mut self.#ident, __value),
        });
    }

    let expanded = quote! {
        impl #impl_generics autoflex::Flex for #name #ty_generics #where_clause {
            fn describe() -> autoflex::schema::TypeDesc {
                autoflex::schema::TypeDesc::Record(autoflex::schema::RecordDesc::new(
                    #record_name,
                    <Self as autoflex::Record>::fields,
                ))
            }

            fn to_value(&self) -> autoflex::Value {
                autoflex::Value::Record(vec![
                    #(#to_value_tokens),*
                ])
            }

            fn from_value(
                __value: autoflex::Value,
            ) -> Result<Self, autoflex::FlexError> {
                let mut result = <Self as Default>::default();
                autoflex::Flex::store(&mut result, __value)?;
                Ok(result)
            }

            fn store(
                &mut self,
                __value: autoflex::Value,
            ) -> Result<(), autoflex::FlexError> {
                match __value {
                    autoflex::Value::Record(__fields) => {
                        for (__name, __field) in __fields {
                            autoflex::Flex::store_field(self, __name, __field)
                                .map_err(|e| e.in_field(__name))?;
                        }
                        Ok(())
                    }
                    other => Err(autoflex::FlexError::store(
                        &<Self as autoflex::Flex>::describe(),
                        &other,
                    )),
                }
            }

            fn store_field(
                &mut self,
                __name: &str,
                __value: autoflex::Value,
            ) -> Result<(), autoflex::FlexError> {
                match __name {
                    #(#store_field_arms)*
                    _ => Err(autoflex::FlexError::shape(format!(
                        "record {} has no field '{}'",
                        #record_name, __name
                    ))),
                }
            }
        }

        impl #impl_generics autoflex::Record for #name #ty_generics #where_clause {
            fn fields() -> Vec<autoflex::schema::FieldDesc> {
                vec![
                    #(#field_desc_tokens),*
                ]
            }
        }
    };

    Ok(expanded)
}
