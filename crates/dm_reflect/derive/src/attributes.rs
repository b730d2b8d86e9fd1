//! Parsers for `#[docmap(...)]` attributes.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, LitStr, Token};

use crate::DOCMAP_ATTRIBUTE_NAME;

fn docmap_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident(DOCMAP_ATTRIBUTE_NAME))
}

/// Removes `#[docmap(...)]` attributes, which are inert only inside derives.
pub(crate) fn strip_docmap_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !attr.path().is_ident(DOCMAP_ATTRIBUTE_NAME));
}

// -----------------------------------------------------------------------------
// Type

#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub mapped: bool,
    pub model: Option<LitStr>,
    pub default: bool,
    pub constructors: bool,
    pub auto_register: Option<Span>,
    pub type_path: Option<LitStr>,
}

impl TypeAttributes {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in docmap_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("mapped") {
                    out.mapped = true;
                } else if meta.path.is_ident("model") {
                    out.model = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("default") {
                    out.default = true;
                } else if meta.path.is_ident("constructors") {
                    out.constructors = true;
                } else if meta.path.is_ident("auto_register") {
                    out.auto_register = Some(meta.path.span());
                } else if meta.path.is_ident("type_path") {
                    out.type_path = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error(
                        "unknown type attribute, expected `mapped`, `model`, `default`, \
                         `constructors`, `auto_register` or `type_path`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

// -----------------------------------------------------------------------------
// Field

pub(crate) struct FieldAttributes {
    /// External name, `None` means the Rust field name.
    pub name: Option<LitStr>,
    pub unique: bool,
    pub use_default: bool,
}

impl FieldAttributes {
    /// `None` for fields without `#[docmap(field)]`.
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Option<Self>> {
        let mut marked = false;
        let mut out = Self {
            name: None,
            unique: false,
            use_default: false,
        };
        let mut flag_span = None;
        for attr in docmap_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("field") {
                    marked = true;
                    if meta.input.peek(Token![=]) {
                        out.name = Some(meta.value()?.parse()?);
                    }
                } else if meta.path.is_ident("unique") {
                    out.unique = true;
                    flag_span.get_or_insert(meta.path.span());
                } else if meta.path.is_ident("use_default") {
                    out.use_default = true;
                    flag_span.get_or_insert(meta.path.span());
                } else {
                    return Err(meta.error(
                        "unknown field attribute, expected `field`, `unique` or `use_default`",
                    ));
                }
                Ok(())
            })?;
        }
        match (marked, flag_span) {
            (true, _) => Ok(Some(out)),
            (false, Some(span)) => Err(syn::Error::new(
                span,
                "`unique` and `use_default` need `#[docmap(field)]` on the same field",
            )),
            (false, None) => Ok(None),
        }
    }
}

// -----------------------------------------------------------------------------
// Variant

pub(crate) fn parse_map_as(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut map_as = None;
    for attr in docmap_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("map_as") {
                map_as = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown variant attribute, expected `map_as`"))
            }
        })?;
    }
    Ok(map_as)
}

// -----------------------------------------------------------------------------
// Constructor

pub(crate) struct ConstructorAttributes {
    pub full: bool,
}

impl ConstructorAttributes {
    /// `None` for functions without `#[docmap(constructor)]`.
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Option<Self>> {
        let mut marked = false;
        let mut full = false;
        for attr in docmap_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("constructor") {
                    marked = true;
                } else if meta.path.is_ident("full") {
                    full = true;
                } else {
                    return Err(meta.error(
                        "unknown constructor attribute, expected `constructor` or `full`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(marked.then_some(Self { full }))
    }
}

pub(crate) fn parse_param_field(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    let mut field = None;
    for attr in docmap_attrs(attrs) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("field") {
                field = Some(meta.value()?.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown parameter attribute, expected `field = \"...\"`"))
            }
        })?;
    }
    Ok(field)
}
