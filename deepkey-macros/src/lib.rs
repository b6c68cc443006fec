use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Index, Meta, NestedMeta, Type};

/// Implements `deepkey::Reflect` for a struct.
///
/// Also implements `deepkey::ToValue`, so the struct can be passed by value
/// or nested by value inside another reflectable struct.
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_reflect(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

/// Implements `deepkey::ToValue` for a fieldless enum.
#[proc_macro_derive(KeyEnum)]
pub fn derive_key_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_key_enum(&input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

#[derive(Default)]
struct FieldOptions {
    skip: bool,
    parent: bool,
}

fn field_options(field: &syn::Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in field.attrs.iter().filter(|a| a.path.is_ident("reflect")) {
        let list = match attr.parse_meta()? {
            Meta::List(list) => list,
            other => {
                return Err(syn::Error::new_spanned(
                    other,
                    "expected #[reflect(skip)] or #[reflect(parent)]",
                ))
            }
        };
        for nested in list.nested {
            match nested {
                NestedMeta::Meta(Meta::Path(path)) if path.is_ident("skip") => options.skip = true,
                NestedMeta::Meta(Meta::Path(path)) if path.is_ident("parent") => {
                    options.parent = true
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "unknown reflect option, expected `skip` or `parent`",
                    ))
                }
            }
        }
    }
    if options.skip && options.parent {
        return Err(syn::Error::new_spanned(
            field,
            "a field cannot be both `skip` and `parent`",
        ));
    }
    Ok(options)
}

fn is_phantom(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map_or(false, |segment| segment.ident == "PhantomData"),
        _ => false,
    }
}

fn expand_reflect(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Reflect cannot be derived for generic types",
        ));
    }
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "Reflect can only be derived for structs",
            ))
        }
    };

    let mut infos = Vec::new();
    let mut arms = Vec::new();
    let mut parent = None;

    for (index, field) in fields.iter().enumerate() {
        let options = field_options(field)?;
        let (label, access) = match &field.ident {
            Some(ident) => (ident.to_string(), quote!(self.#ident)),
            None => {
                let index = Index::from(index);
                (index.index.to_string(), quote!(self.#index))
            }
        };

        if options.parent {
            if parent.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "only one field can be marked #[reflect(parent)]",
                ));
            }
            parent = Some((field.ty.clone(), access));
        } else if options.skip || is_phantom(&field.ty) {
            infos.push(quote!(::deepkey::FieldInfo::synthetic(#label)));
        } else {
            infos.push(quote!(::deepkey::FieldInfo::new(#label)));
            arms.push(quote! {
                #label => ::core::option::Option::Some(::deepkey::ToValue::to_value(&#access)),
            });
        }
    }

    let (parent_info, inherited) = match &parent {
        Some((ty, access)) => (
            quote!(::core::option::Option::Some(<#ty as ::deepkey::Reflect>::reflected_type)),
            quote!(::deepkey::Reflect::read_field(&#access, slot)),
        ),
        None => (
            quote!(::core::option::Option::None),
            quote!(::core::option::Option::None),
        ),
    };

    let info = format_ident!("__{}_TYPE_INFO", name.to_string().to_uppercase());
    let type_name = name.to_string();

    Ok(quote! {
        impl ::deepkey::Reflect for #name {
            fn reflected_type() -> &'static ::deepkey::TypeInfo {
                #[allow(non_upper_case_globals)]
                static #info: ::deepkey::TypeInfo = ::deepkey::TypeInfo {
                    name: ::core::concat!(::core::module_path!(), "::", #type_name),
                    fields: &[#(#infos),*],
                    parent: #parent_info,
                };
                &#info
            }

            fn type_info(&self) -> &'static ::deepkey::TypeInfo {
                <Self as ::deepkey::Reflect>::reflected_type()
            }

            fn read_field(
                &self,
                slot: &::deepkey::FieldSlot,
            ) -> ::core::option::Option<::deepkey::Value> {
                if !slot.is_owned_by(<Self as ::deepkey::Reflect>::reflected_type()) {
                    return #inherited;
                }
                match slot.name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::deepkey::ToValue for #name {
            fn to_value(&self) -> ::deepkey::Value {
                ::deepkey::Value::object(::deepkey::FieldSnapshot::capture(self))
            }
        }
    })
}

fn expand_key_enum(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "KeyEnum cannot be derived for generic types",
        ));
    }
    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(syn::Error::new(
                input.span(),
                "KeyEnum can only be derived for enums",
            ))
        }
    };

    let mut arms = Vec::new();
    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "KeyEnum variants cannot carry data",
            ));
        }
        let ident = &variant.ident;
        let member = ident.to_string();
        arms.push(quote!(#name::#ident => #member,));
    }

    let type_name = name.to_string();
    let body = if arms.is_empty() {
        quote!(match *self {})
    } else {
        quote! {
            let member: &'static str = match *self {
                #(#arms)*
            };
            ::deepkey::Value::enum_value(
                ::core::concat!(::core::module_path!(), "::", #type_name),
                member,
            )
        }
    };

    Ok(quote! {
        impl ::deepkey::ToValue for #name {
            fn to_value(&self) -> ::deepkey::Value {
                #body
            }
        }
    })
}
