use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Fields, LitStr};

use crate::attributes::{FieldAttributes, TypeAttributes};
use crate::path;

pub(crate) fn expand(ast: &DeriveInput) -> syn::Result<TokenStream> {
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "`Mapped` cannot be derived for generic types",
        ));
    }
    let Data::Struct(DataStruct {
        fields: Fields::Named(named),
        ..
    }) = &ast.data
    else {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "`Mapped` can only be derived for structs with named fields",
        ));
    };

    let dm_reflect_path = path::dm_reflect();
    let info_ = path::info_(&dm_reflect_path);
    let exports_ = path::exports_(&dm_reflect_path);
    let reflect_ = path::reflect_(&dm_reflect_path);

    let attrs = TypeAttributes::parse(&ast.attrs)?;
    let ident = &ast.ident;

    let marker = match (&attrs.model, attrs.mapped) {
        (Some(model), _) => quote! { .model(#model) },
        (None, true) => quote! { .mapped() },
        (None, false) => TokenStream::new(),
    };
    let default = match attrs.default {
        true => quote! { .with_default::<Self>() },
        false => TokenStream::new(),
    };
    let constructors = match attrs.constructors {
        true => quote! { .with_constructors(<Self as #info_::MappedConstructors>::constructors()) },
        false => TokenStream::new(),
    };

    let mut fields = Vec::new();
    for field in &named.named {
        let Some(field_attrs) = FieldAttributes::parse(&field.attrs)? else {
            continue;
        };
        let Some(member) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let member_str = member.to_string();
        let member_str = member_str.trim_start_matches("r#");
        let name = field_attrs
            .name
            .unwrap_or_else(|| LitStr::new(member_str, member.span()));
        let unique = field_attrs.unique.then(|| quote! { .unique() });
        let use_default = field_attrs.use_default.then(|| quote! { .use_default() });

        fields.push(quote! {
            .with_field(
                #info_::FieldDescription::new(
                    #member_str,
                    #name,
                    <#ty as #info_::Typed>::type_ref(),
                    #info_::FieldAccessor::new(
                        |owner| ::core::result::Result::Ok(
                            &#exports_::owner_ref::<Self>(owner)?.#member as &dyn #reflect_
                        ),
                        |owner, value| {
                            #exports_::owner_mut::<Self>(owner)?.#member =
                                #exports_::assign::<#ty>(value, #name)?;
                            ::core::result::Result::Ok(())
                        },
                    ),
                )
                #unique
                #use_default
            )
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
                    #info_::TypeRef::mapped::<Self>()
                }
            }

            impl #info_::Mapped for #ident {
                fn describe() -> #info_::TypeDescription {
                    #info_::TypeDescription::new::<Self>()
                        #marker
                        #default
                        #constructors
                        #(#fields)*
                }
            }

            #auto_register_impl
        };
    })
}
