use proc_macro2::TokenStream;
use quote::quote;
use syn::{FnArg, ImplItem, ItemImpl, Pat};

use crate::attributes::{ConstructorAttributes, parse_param_field, strip_docmap_attrs};
use crate::path;

pub(crate) fn expand(mut item: ItemImpl) -> syn::Result<TokenStream> {
    if let Some((_, trait_path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            trait_path,
            "`#[constructors]` only applies to inherent impl blocks",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "`#[constructors]` cannot be used on generic impl blocks",
        ));
    }

    let dm_reflect_path = path::dm_reflect();
    let info_ = path::info_(&dm_reflect_path);
    let exports_ = path::exports_(&dm_reflect_path);
    let reflect_ = path::reflect_(&dm_reflect_path);

    let mut descriptions = Vec::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(func) = impl_item else {
            continue;
        };
        let ctor_attrs = ConstructorAttributes::parse(&func.attrs)?;
        strip_docmap_attrs(&mut func.attrs);
        let Some(ctor_attrs) = ctor_attrs else {
            continue;
        };

        let fn_ident = func.sig.ident.clone();
        let fn_name = fn_ident.to_string();
        let mut params = Vec::new();
        let mut args = Vec::new();
        for input in &mut func.sig.inputs {
            let FnArg::Typed(pat_type) = input else {
                return Err(syn::Error::new_spanned(
                    input,
                    "designated constructors cannot take `self`",
                ));
            };
            let field = parse_param_field(&pat_type.attrs)?;
            strip_docmap_attrs(&mut pat_type.attrs);

            let ty = &pat_type.ty;
            let param_name = match &*pat_type.pat {
                Pat::Ident(pat_ident) => pat_ident.ident.to_string(),
                _ => String::from("_"),
            };
            match &field {
                Some(field) => {
                    params.push(quote! {
                        #info_::ParamDescription::bound::<#ty>(#param_name, #field)
                    });
                    args.push(quote! {
                        #exports_::argument::<#ty>(__args.next().flatten(), #field)?
                    });
                }
                None => {
                    params.push(quote! {
                        #info_::ParamDescription::unbound::<#ty>(#param_name)
                    });
                    args.push(quote! {
                        #exports_::argument::<#ty>(__args.next().flatten(), #param_name)?
                    });
                }
            }
        }

        let full = ctor_attrs.full.then(|| quote! { .full() });
        descriptions.push(quote! {
            #info_::ConstructorDescription::new(
                #fn_name,
                ::std::vec![#(#params),*],
                |__args| {
                    #[allow(unused_mut, unused_variables)]
                    let mut __args = __args.into_iter();
                    ::core::result::Result::Ok(
                        ::std::boxed::Box::new(Self::#fn_ident(#(#args),*))
                            as ::std::boxed::Box<dyn #reflect_>
                    )
                },
            )
            #full
        });
    }

    let self_ty = &item.self_ty;
    Ok(quote! {
        #item

        const _: () = {
            impl #info_::MappedConstructors for #self_ty {
                fn constructors() -> ::std::vec::Vec<#info_::ConstructorDescription> {
                    ::std::vec![#(#descriptions),*]
                }
            }
        };
    })
}
