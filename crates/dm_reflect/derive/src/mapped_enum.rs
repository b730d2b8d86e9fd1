use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

use crate::attributes::{TypeAttributes, parse_map_as};
use crate::path;

pub(crate) fn expand(ast: &DeriveInput) -> syn::Result<TokenStream> {
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "`MappedEnum` cannot be derived for generic types",
        ));
    }
    let Data::Enum(data) = &ast.data else {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "`MappedEnum` can only be derived for enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "`MappedEnum` needs at least one variant",
        ));
    }

    let dm_reflect_path = path::dm_reflect();
    let info_ = path::info_(&dm_reflect_path);
    let exports_ = path::exports_(&dm_reflect_path);

    let attrs = TypeAttributes::parse(&ast.attrs)?;
    let ident = &ast.ident;

    let mut variants = Vec::new();
    let mut arms = Vec::new();
    for (index, variant) in data.variants.iter().enumerate() {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                &variant.fields,
                "`MappedEnum` variants cannot carry fields",
            ));
        }
        let variant_ident = &variant.ident;
        let variant_str = variant_ident.to_string();
        let map_as = match parse_map_as(&variant.attrs)? {
            Some(lit) => quote! { ::core::option::Option::Some(#lit) },
            None => quote! { ::core::option::Option::None },
        };
        variants.push(quote! {
            #info_::VariantDescription::new(
                #variant_str,
                #map_as,
                || ::std::boxed::Box::new(Self::#variant_ident),
            )
        });
        arms.push(quote! {
            Self::#variant_ident => ::core::result::Result::Ok(#index),
        });
    }

    let type_path_impl = path::type_path_impl(&dm_reflect_path, ident, attrs.type_path.as_ref());
    let auto_register_impl =
        path::auto_register_impl(&dm_reflect_path, ident, attrs.auto_register);

    Ok(quote! {
        const _: () = {
            #type_path_impl

            impl #info_::Typed for #ident {
                #[inline]
                fn type_ref() -> #info_::TypeRef {
                    #info_::TypeRef::enumeration::<Self>()
                }
            }

            impl #info_::MappedEnum for #ident {
                fn describe_enum() -> #info_::EnumDescription {
                    #info_::EnumDescription::new::<Self>(
                        ::std::vec![#(#variants),*],
                        |value| match #exports_::owner_ref::<Self>(value)? {
                            #(#arms)*
                        },
                    )
                }
            }

            #auto_register_impl
        };
    })
}
