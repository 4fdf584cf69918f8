//! Implementation of the `#[derive(Model)]` macro.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Field, Fields, Ident, LitInt, LitStr, Type, parse_quote};

/// Parse and generate code for the `#[derive(Model)]` macro.
pub fn derive_model_impl(input: &DeriveInput) -> Result<TokenStream, syn::Error> {
    let name = &input.ident;
    let mut generics = input.generics.clone();
    if generics.type_params().next().is_some() {
        let (_, ty_generics, _) = input.generics.split_for_impl();
        generics.make_where_clause().predicates.push(parse_quote! {
            #name #ty_generics: ::mogo::serde::Serialize
                + ::mogo::serde::de::DeserializeOwned
                + ::core::marker::Unpin
                + ::core::marker::Send
                + ::core::marker::Sync
        });
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Model derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Model derive only supports structs",
            ));
        }
    };

    let struct_attrs = parse_struct_attrs(input)?;

    let collection_fn = struct_attrs.collection.map(|collection| {
        quote! {
            fn collection_name() -> ::std::string::String {
                ::std::string::String::from(#collection)
            }
        }
    });

    let indexes_fn = if struct_attrs.indexes.is_empty() {
        None
    } else {
        let indexes = struct_attrs.indexes.iter().map(IndexAttr::expand);
        Some(quote! {
            fn indexes() -> ::std::vec::Vec<::mogo::Index> {
                ::std::vec![#(#indexes),*]
            }
        })
    };

    let (id_body, set_id_body) = match find_id_field(input, fields.iter())? {
        Some(IdField { ident, optional }) if optional => (
            quote! { self.#ident },
            quote! { self.#ident = ::core::option::Option::Some(id); },
        ),
        Some(IdField { ident, .. }) => (
            quote! { ::core::option::Option::Some(self.#ident) },
            quote! { self.#ident = id; },
        ),
        None => (
            quote! { ::core::option::Option::None },
            quote! { let _ = id; },
        ),
    };

    Ok(quote! {
        impl #impl_generics ::mogo::Model for #name #ty_generics #where_clause {
            #collection_fn

            #indexes_fn

            fn id(&self) -> ::core::option::Option<::mogo::ObjectId> {
                #id_body
            }

            fn set_id(&mut self, id: ::mogo::ObjectId) {
                #set_id_body
            }
        }
    })
}

/// Struct-level attributes parsed from `#[mogo(...)]`.
#[derive(Debug, Default)]
struct StructAttrs {
    collection: Option<String>,
    indexes: Vec<IndexAttr>,
}

/// One `#[mogo(index(...))]` declaration.
#[derive(Debug, Default)]
struct IndexAttr {
    keys: Vec<String>,
    unique: bool,
    sparse: bool,
    background: bool,
    name: Option<String>,
    expire_after_secs: Option<u64>,
}

impl IndexAttr {
    fn expand(&self) -> TokenStream {
        let keys = &self.keys;
        let mut tokens = quote! { ::mogo::Index::new([#(#keys),*]) };
        if self.unique {
            tokens.extend(quote! { .unique() });
        }
        if self.sparse {
            tokens.extend(quote! { .sparse() });
        }
        if self.background {
            tokens.extend(quote! { .background() });
        }
        if let Some(ref name) = self.name {
            tokens.extend(quote! { .name(#name) });
        }
        if let Some(secs) = self.expire_after_secs {
            tokens.extend(quote! { .expire_after(::std::time::Duration::from_secs(#secs)) });
        }
        tokens
    }
}

/// Parse struct-level `#[mogo(...)]` attributes.
fn parse_struct_attrs(input: &DeriveInput) -> Result<StructAttrs, syn::Error> {
    let mut attrs = StructAttrs::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("mogo") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().trim().is_empty() {
                    return Err(syn::Error::new_spanned(value, "collection name must not be empty"));
                }
                attrs.collection = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("index") {
                let mut index = IndexAttr::default();
                meta.parse_nested_meta(|meta| {
                    if meta.path.is_ident("keys") {
                        let value: LitStr = meta.value()?.parse()?;
                        index.keys = value
                            .value()
                            .split(',')
                            .map(|key| key.trim().to_string())
                            .filter(|key| !key.is_empty() && key != "-" && key != "+")
                            .collect();
                    } else if meta.path.is_ident("unique") {
                        index.unique = true;
                    } else if meta.path.is_ident("sparse") {
                        index.sparse = true;
                    } else if meta.path.is_ident("background") {
                        index.background = true;
                    } else if meta.path.is_ident("name") {
                        let value: LitStr = meta.value()?.parse()?;
                        index.name = Some(value.value());
                    } else if meta.path.is_ident("expire_after_secs") {
                        let value: LitInt = meta.value()?.parse()?;
                        index.expire_after_secs = Some(value.base10_parse()?);
                    } else {
                        return Err(meta.error("unknown index attribute"));
                    }
                    Ok(())
                })?;

                if index.keys.is_empty() {
                    return Err(meta.error("index requires `keys = \"field,-other\"`"));
                }
                attrs.indexes.push(index);
                Ok(())
            } else {
                Err(meta.error("unknown mogo attribute"))
            }
        })?;
    }

    Ok(attrs)
}

/// The field holding the document `_id`.
#[derive(Debug)]
struct IdField {
    ident: Ident,
    optional: bool,
}

/// Find the id field: the one marked `#[mogo(id)]`, else one named `id` or
/// `_id`.
fn find_id_field<'a>(
    input: &DeriveInput,
    fields: impl Iterator<Item = &'a Field>,
) -> Result<Option<IdField>, syn::Error> {
    let mut marked: Option<&Field> = None;
    let mut by_name: Option<&Field> = None;

    for field in fields {
        if has_id_marker(field)? {
            if marked.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field may be marked #[mogo(id)]",
                ));
            }
            marked = Some(field);
        }
        if field
            .ident
            .as_ref()
            .is_some_and(|ident| ident == "id" || ident == "_id")
        {
            by_name = by_name.or(Some(field));
        }
    }

    let Some(field) = marked.or(by_name) else {
        return Ok(None);
    };
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(input, "Fields must be named"))?;

    if ident != "_id" && !renamed_to_underscore_id(field) {
        return Err(syn::Error::new_spanned(
            field,
            format!(
                "id field `{}` must be stored as `_id`; add #[serde(rename = \"_id\")]",
                ident
            ),
        ));
    }

    let optional = match id_type(&field.ty) {
        Some(optional) => optional,
        None => {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "id field must be `ObjectId` or `Option<ObjectId>`",
            ));
        }
    };

    Ok(Some(IdField { ident, optional }))
}

/// Check for `#[mogo(id)]` on a field.
fn has_id_marker(field: &Field) -> Result<bool, syn::Error> {
    let mut is_id = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("mogo") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                is_id = true;
                Ok(())
            } else {
                Err(meta.error("unknown mogo field attribute"))
            }
        })?;
    }
    Ok(is_id)
}

/// Check for `#[serde(rename = "_id")]` among a field's serde attributes.
fn renamed_to_underscore_id(field: &Field) -> bool {
    field.attrs.iter().any(|attr| {
        attr.path().is_ident("serde")
            && attr
                .meta
                .to_token_stream()
                .to_string()
                .replace(' ', "")
                .contains("rename=\"_id\"")
    })
}

/// `Some(false)` for `ObjectId`, `Some(true)` for `Option<ObjectId>`,
/// `None` for anything else.
fn id_type(ty: &Type) -> Option<bool> {
    let segment = last_segment(ty)?;
    if segment.ident == "ObjectId" {
        return Some(false);
    }
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first() {
        Some(syn::GenericArgument::Type(inner))
            if last_segment(inner).is_some_and(|s| s.ident == "ObjectId") =>
        {
            Some(true)
        }
        _ => None,
    }
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(type_path) => type_path.path.segments.last(),
        _ => None,
    }
}
