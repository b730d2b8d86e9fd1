//! Derive macros of `dm_reflect`:
//!
//! - [`Mapped`]: struct metadata.
//! - [`MappedEnum`]: enum constant mapping.
//! - [`constructors`]: designated constructors of an impl block.

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl, parse_macro_input};

static DOCMAP_ATTRIBUTE_NAME: &str = "docmap";

// -----------------------------------------------------------------------------
// Modules

mod attributes;
mod constructors;
mod mapped;
mod mapped_enum;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// Implements `TypePath`, `Typed` and `Mapped` for a struct with named fields.
///
/// ## Type attributes
///
/// - `#[docmap(mapped)]`: a plain mapped type, embedded in other documents.
/// - `#[docmap(model = "users")]`: a model stored in the `users` collection.
/// - `#[docmap(default)]`: `Default::default()` is the no-argument constructor.
/// - `#[docmap(constructors)]`: take designated constructors from a
///   [`macro@constructors`] impl block.
/// - `#[docmap(auto_register)]`: submit the type for `auto_register`.
/// - `#[docmap(type_path = "my_crate::User")]`: override the type path.
///
/// Without `mapped` or `model` the type is described but schema builders
/// skip it.
///
/// ## Field attributes
///
/// Only fields carrying `#[docmap(field)]` are mapped.
///
/// - `#[docmap(field)]`: stored under the Rust field name.
/// - `#[docmap(field = "_id")]`: stored under another name.
/// - `#[docmap(unique)]`: gets a unique index on the model's collection.
/// - `#[docmap(use_default)]`: a `null` in the document keeps the value set
///   by the no-argument constructor.
///
/// ```rust, ignore
/// #[derive(Mapped, Default)]
/// #[docmap(model = "users", default)]
/// struct User {
///     #[docmap(field = "_id")]
///     id: Option<ObjectId>,
///     #[docmap(field, unique)]
///     email: String,
///     #[docmap(field, use_default)]
///     score: i64,
/// }
/// ```
///
/// Generic structs are not supported.
#[proc_macro_derive(Mapped, attributes(docmap))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    mapped::expand(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Implements `TypePath`, `Typed` and `MappedEnum` for a fieldless enum.
///
/// Each variant declares its external value with `#[docmap(map_as = "A")]`.
/// A variant without one still compiles; building its enum schema fails.
///
/// ```rust, ignore
/// #[derive(MappedEnum)]
/// enum Status {
///     #[docmap(map_as = "A")]
///     Active,
///     #[docmap(map_as = "B")]
///     Banned,
/// }
/// ```
#[proc_macro_derive(MappedEnum, attributes(docmap))]
pub fn derive_mapped_enum(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    mapped_enum::expand(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Implements `MappedConstructors` from the marked functions of an
/// inherent impl block.
///
/// - `#[docmap(constructor)]` marks an associated function returning `Self`
///   as a designated constructor.
/// - `#[docmap(constructor, full)]` also requires the parameters to cover
///   every mapped field.
/// - `#[docmap(field = "email")]` on a parameter binds it to a field.
///
/// ```rust, ignore
/// #[constructors]
/// impl User {
///     #[docmap(constructor)]
///     fn new(#[docmap(field = "email")] email: String) -> Self {
///         Self { id: None, email, score: 0 }
///     }
/// }
/// ```
///
/// The type opts in with `#[docmap(constructors)]`.
#[proc_macro_attribute]
pub fn constructors(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "`#[constructors]` takes no arguments",
        )
        .into_compile_error()
        .into();
    }
    let item = parse_macro_input!(item as ItemImpl);
    constructors::expand(item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
