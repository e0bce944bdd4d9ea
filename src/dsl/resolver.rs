//! Field-path resolution: turning a path handle into the dotted wire path
//! the server expects, plus (for array-capable fields) a guarantee that the
//! path may legally carry `$in`/`$all`/`$elemMatch`.
//!
//! Three flavors of handle exist, matching the host-language possibilities:
//!
//! 1. [`AnyField::path`](struct.AnyField.html#method.path) - a raw, untyped
//!    dotted path. Array-capability is unknown until render time, when it is
//!    looked up via [`Doc::schema_field`](../../doc/trait.Doc.html#method.schema_field).
//! 2. [`Field<D, F>`](struct.Field.html) / [`ArrField<D, Item>`](struct.ArrField.html) -
//!    a path tied at compile time to a declared Rust type. The "serializer
//!    lookup" that a reflective implementation would perform at runtime is
//!    performed by the Rust compiler instead, via the `Serialize` bound on
//!    `F`/`Item`; array-capability is therefore known statically.
//! 3. A compiled member-access expression. Producing one requires walking a
//!    document type's field metadata at compile time, which is host-language
//!    expression analysis and explicitly out of scope; callers who have such
//!    a compiler available can still feed its `(path, is_array)` result into
//!    [`AnyField::typed`](struct.AnyField.html#method.typed).

use std::fmt;
use std::borrow::Cow;
use std::marker::PhantomData;
use crate::error::{ ErrorKind, Error, Result };

/// What the renderer learned about a field from a document's schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    /// Whether the field's declared type is array-capable (so that
    /// `$in`/`$all`/`$elemMatch` may legally target it).
    pub is_array: bool,
}

/// Whether a field handle's array-capability is known up front or must be
/// looked up from the document's schema at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capability {
    Known(bool),
    Unknown,
}

/// A resolved-or-resolvable reference to a field of document type `D`.
/// This is what every [`FilterTerm`](../filter/enum.FilterTerm.html) variant
/// actually stores; the typed [`Field`](struct.Field.html) and
/// [`ArrField`](struct.ArrField.html) handles used by the builder façade are
/// erased into this type as soon as a filter term is constructed.
pub struct AnyField<D> {
    path: Cow<'static, str>,
    capability: Capability,
    _marker: PhantomData<fn() -> D>,
}

impl<D> AnyField<D> {
    /// Flavor 1: an untyped, raw dotted path.
    pub fn path(path: impl Into<Cow<'static, str>>) -> Self {
        AnyField { path: path.into(), capability: Capability::Unknown, _marker: PhantomData }
    }

    /// Flavor 2/3: a path whose array-capability is known up front, either
    /// because it came from a statically typed handle or from an external
    /// expression compiler.
    pub fn typed(path: impl Into<Cow<'static, str>>, is_array: bool) -> Self {
        AnyField { path: path.into(), capability: Capability::Known(is_array), _marker: PhantomData }
    }

    /// The empty-path convention used for `$elemMatch` over a scalar array:
    /// the inner filter's field names the array element itself.
    pub fn this() -> Self {
        Self::path("")
    }

    /// The dotted, server-visible path.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Confirms that this field may legally be targeted by an array
    /// operator, consulting `schema` (the document's
    /// [`Doc::schema_field`](../../doc/trait.Doc.html#method.schema_field))
    /// when capability wasn't already known statically. `schema` is `None`
    /// when rendering has no document type to consult (e.g. the element
    /// type of an `$elemMatch`), in which case an unknown capability is
    /// trusted.
    pub(crate) fn require_array_capable(&self, schema: Option<&dyn Fn(&str) -> Option<FieldMeta>>) -> Result<()> {
        let is_array = match self.capability {
            Capability::Known(is_array) => Some(is_array),
            Capability::Unknown => schema.and_then(|lookup| lookup(&self.path)).map(|meta| meta.is_array),
        };

        match is_array {
            Some(false) => {
                let msg = format!("serializer for field '{}' is not array-capable", self.path);
                Err(Error::with_kind(ErrorKind::SerializerMismatch, msg))
            }
            Some(true) | None => Ok(()),
        }
    }
}

impl<D> Clone for AnyField<D> {
    fn clone(&self) -> Self {
        AnyField { path: self.path.clone(), capability: self.capability, _marker: PhantomData }
    }
}

impl<D> fmt::Debug for AnyField<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("AnyField").field(&self.path).finish()
    }
}

/// A field of document type `D` whose declared Rust type is `F`. Array
/// operators aren't available on a plain `Field`; use
/// [`ArrField`](struct.ArrField.html) for those.
pub struct Field<D, F> {
    path: Cow<'static, str>,
    _marker: PhantomData<fn() -> (D, F)>,
}

impl<D, F> Field<D, F> {
    /// Creates a typed field handle for the dotted path.
    pub fn new(path: impl Into<Cow<'static, str>>) -> Self {
        Field { path: path.into(), _marker: PhantomData }
    }

    /// The dotted, server-visible path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Erases the static type, producing the handle the filter AST stores.
    pub fn into_any(self) -> AnyField<D> {
        AnyField::typed(self.path, false)
    }
}

impl<D, F> From<Field<D, F>> for AnyField<D> {
    fn from(field: Field<D, F>) -> Self {
        field.into_any()
    }
}

impl<D, F> Clone for Field<D, F> {
    fn clone(&self) -> Self {
        Field { path: self.path.clone(), _marker: PhantomData }
    }
}

impl<D, F> fmt::Debug for Field<D, F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Field").field(&self.path).finish()
    }
}

/// A field of document type `D` declared as an array of `Item`. Carries
/// array-capability statically, so `$in`/`$all`/`$elemMatch` built from it
/// never fail with `SerializerMismatch`.
pub struct ArrField<D, Item> {
    path: Cow<'static, str>,
    _marker: PhantomData<fn() -> (D, Item)>,
}

impl<D, Item> ArrField<D, Item> {
    /// Creates a typed array-field handle for the dotted path.
    pub fn new(path: impl Into<Cow<'static, str>>) -> Self {
        ArrField { path: path.into(), _marker: PhantomData }
    }

    /// The dotted, server-visible path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Erases the static type, producing the handle the filter AST stores.
    pub fn into_any(self) -> AnyField<D> {
        AnyField::typed(self.path, true)
    }
}

impl<D, Item> From<ArrField<D, Item>> for AnyField<D> {
    fn from(field: ArrField<D, Item>) -> Self {
        field.into_any()
    }
}

impl<D, Item> Clone for ArrField<D, Item> {
    fn clone(&self) -> Self {
        ArrField { path: self.path.clone(), _marker: PhantomData }
    }
}

impl<D, Item> fmt::Debug for ArrField<D, Item> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ArrField").field(&self.path).finish()
    }
}
