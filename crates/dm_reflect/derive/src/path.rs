use proc_macro2::TokenStream;
use quote::quote;

/// Path of `dm_reflect` as seen from the crate being compiled.
///
/// Reading the manifest is not cheap, so each expansion calls this once and
/// passes the path around.
pub(crate) fn dm_reflect() -> syn::Path {
    dm_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("dm_reflect"))
}

#[inline(always)]
pub(crate) fn info_(dm_reflect_path: &syn::Path) -> TokenStream {
    quote! { #dm_reflect_path::info }
}

#[inline(always)]
pub(crate) fn exports_(dm_reflect_path: &syn::Path) -> TokenStream {
    quote! { #dm_reflect_path::__macro_exports }
}

#[inline(always)]
pub(crate) fn reflect_(dm_reflect_path: &syn::Path) -> TokenStream {
    quote! { #dm_reflect_path::Reflect }
}

/// `TypePath` implementation for a non-generic type.
pub(crate) fn type_path_impl(
    dm_reflect_path: &syn::Path,
    ident: &syn::Ident,
    custom: Option<&syn::LitStr>,
) -> TokenStream {
    let info_ = info_(dm_reflect_path);
    let name = ident.to_string();
    let path = match custom {
        Some(path) => quote! { #path },
        None => quote! { ::core::concat!(::core::module_path!(), "::", #name) },
    };
    quote! {
        impl #info_::TypePath for #ident {
            #[inline]
            fn type_path() -> &'static str {
                #path
            }

            #[inline]
            fn type_name() -> &'static str {
                #name
            }
        }
    }
}

/// `inventory` submission for `#[docmap(auto_register)]`.
#[cfg(feature = "auto_register")]
pub(crate) fn auto_register_impl(
    dm_reflect_path: &syn::Path,
    ident: &syn::Ident,
    span: Option<proc_macro2::Span>,
) -> TokenStream {
    let Some(span) = span else {
        return TokenStream::new();
    };
    let exports_ = exports_(dm_reflect_path);
    let info_ = info_(dm_reflect_path);
    quote::quote_spanned! { span =>
        #exports_::auto_register::inventory::submit! {
            #exports_::auto_register::AutoRegistration::new(
                <#ident as #info_::Typed>::type_ref
            )
        }
    }
}

#[cfg(not(feature = "auto_register"))]
pub(crate) fn auto_register_impl(
    _: &syn::Path,
    _: &syn::Ident,
    _: Option<proc_macro2::Span>,
) -> TokenStream {
    TokenStream::new()
}
