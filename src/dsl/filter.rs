//! The filter abstract syntax tree: an immutable, tagged representation of a
//! query filter over documents of type `D`. Terms are constructed once (by
//! the [`builder`](../builder/index.html) façade, normally) and rendered to
//! BDOC by [`render`](../render/fn.render.html); construction never touches
//! a document serializer or registry, and rendering never mutates the tree.

use std::fmt;
use bson::Document;
use crate::error::{ Error, ErrorKind, Result };
use crate::dsl::bdoc::WriteValue;
use crate::dsl::resolver::AnyField;

/// An immutable filter predicate over documents of type `D`. See the module
/// documentation for the data flow, and [`render`](../render/fn.render.html)
/// for how a term becomes a BDOC document.
pub enum FilterTerm<D> {
    /// `{path: value}`.
    Simple(AnyField<D>, Box<dyn WriteValue>),
    /// `{path: {op: value}}`.
    Operator(AnyField<D>, &'static str, Box<dyn WriteValue>),
    /// `{path: {op: [items...]}}`; `op` is one of `$in`, `$nin`, `$all`.
    ArrayOperator(AnyField<D>, &'static str, Vec<Box<dyn WriteValue>>),
    /// `{path: {op: {$geometry: geometry}}}`; `op` is `$geoIntersects` or
    /// `$geoWithin`. `$geoWithin`'s legacy (non-GeoJSON) shapes are
    /// represented as a plain `Operator` instead, since they don't nest
    /// under `$geometry`.
    Geometry(AnyField<D>, &'static str, Box<dyn WriteValue>),
    /// `{path: {($near|$nearSphere): {$geometry: point, $maxDistance?: max, $minDistance?: min}}}`.
    Near {
        /// The field being queried.
        field: AnyField<D>,
        /// The reference point, a GeoJSON `Point` geometry.
        point: Box<dyn WriteValue>,
        /// Whether to use `$nearSphere` (spherical distance) or `$near`.
        spherical: bool,
        /// Optional upper distance bound, in meters.
        max_distance: Option<f64>,
        /// Optional lower distance bound, in meters.
        min_distance: Option<f64>,
    },
    /// `{path: {$elemMatch: render(inner)}}`. `inner` ranges over the array
    /// element type, which need not be `D`, hence the type-erasing
    /// [`ElemRender`](trait.ElemRender.html) object.
    ElementMatch(AnyField<D>, Box<dyn ElemRender>),
    /// Logical conjunction; see [`render`](../render/fn.render.html) for the
    /// merge-vs-promote normalization this performs.
    And(Vec<FilterTerm<D>>),
    /// Logical disjunction; renders as `{"$or": [...]}`, flattening nested
    /// `Or`s into the same array.
    Or(Vec<FilterTerm<D>>),
    /// Logical negation; lowered per the table in the renderer, never left
    /// as a bare `$not` at the document's top level.
    Not(Box<FilterTerm<D>>),
    /// A pre-built document, passed through as-is.
    Raw(Document),
    /// An opaque host-side predicate, lowered to BDOC by an external
    /// compiler not specified here.
    Expression(Box<dyn Fn() -> Result<Document> + Send + Sync>),
    /// `{"<path>.<index>": {$exists: bool}}`; the synthetic form used for
    /// `$size` range predicates.
    ArrayIndexExists(AnyField<D>, usize, bool),
}

/// Fails construction if `path` is empty. The empty path is a reserved
/// sentinel (see [`AnyField::this`](../resolver/struct.AnyField.html#method.this))
/// for `$elemMatch` over scalar arrays, not a name a caller should supply.
fn check_path(path: &str) -> Result<()> {
    if path.is_empty() {
        Err(Error::with_kind(ErrorKind::InvalidFilter, "field name must not be empty"))
    } else {
        Ok(())
    }
}

impl<D> FilterTerm<D> {
    /// `Simple(field, value)`.
    pub fn simple(field: AnyField<D>, value: Box<dyn WriteValue>) -> Result<Self> {
        check_path(field.as_str())?;
        Ok(FilterTerm::Simple(field, value))
    }

    /// `Operator(field, op, value)`.
    pub fn operator(field: AnyField<D>, op: &'static str, value: Box<dyn WriteValue>) -> Result<Self> {
        check_path(field.as_str())?;
        Ok(FilterTerm::Operator(field, op, value))
    }

    /// `ArrayOperator(field, op, items)`.
    pub fn array_operator(field: AnyField<D>, op: &'static str, items: Vec<Box<dyn WriteValue>>) -> Result<Self> {
        check_path(field.as_str())?;
        Ok(FilterTerm::ArrayOperator(field, op, items))
    }

    /// `Geometry(field, op, geometry)`.
    pub fn geometry(field: AnyField<D>, op: &'static str, value: Box<dyn WriteValue>) -> Result<Self> {
        check_path(field.as_str())?;
        Ok(FilterTerm::Geometry(field, op, value))
    }

    /// `Near(field, point, spherical, max, min)`.
    pub fn near(
        field: AnyField<D>,
        point: Box<dyn WriteValue>,
        spherical: bool,
        max_distance: Option<f64>,
        min_distance: Option<f64>,
    ) -> Result<Self> {
        check_path(field.as_str())?;
        Ok(FilterTerm::Near { field, point, spherical, max_distance, min_distance })
    }

    /// `ElementMatch(field, inner)`.
    pub fn element_match(field: AnyField<D>, inner: Box<dyn ElemRender>) -> Result<Self> {
        check_path(field.as_str())?;
        Ok(FilterTerm::ElementMatch(field, inner))
    }

    /// `And(children)`.
    pub fn and(children: Vec<FilterTerm<D>>) -> Self {
        FilterTerm::And(children)
    }

    /// `Or(children)`.
    pub fn or(children: Vec<FilterTerm<D>>) -> Self {
        FilterTerm::Or(children)
    }

    /// `Not(child)`.
    pub fn not(child: FilterTerm<D>) -> Self {
        FilterTerm::Not(Box::new(child))
    }

    /// `Raw(doc)`.
    pub fn raw(doc: Document) -> Self {
        FilterTerm::Raw(doc)
    }

    /// `Expression(lambda)`.
    pub fn expression<F>(lowering: F) -> Self
        where F: Fn() -> Result<Document> + Send + Sync + 'static
    {
        FilterTerm::Expression(Box::new(lowering))
    }

    /// `ArrayIndexExists(field, index, exists)`.
    pub fn array_index_exists(field: AnyField<D>, index: usize, exists: bool) -> Result<Self> {
        check_path(field.as_str())?;
        Ok(FilterTerm::ArrayIndexExists(field, index, exists))
    }
}

impl<D> fmt::Debug for FilterTerm<D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FilterTerm::Simple(field, value) => {
                f.debug_tuple("Simple").field(field).field(value).finish()
            }
            FilterTerm::Operator(field, op, value) => {
                f.debug_tuple("Operator").field(field).field(op).field(value).finish()
            }
            FilterTerm::ArrayOperator(field, op, items) => {
                f.debug_tuple("ArrayOperator").field(field).field(op).field(items).finish()
            }
            FilterTerm::Geometry(field, op, value) => {
                f.debug_tuple("Geometry").field(field).field(op).field(value).finish()
            }
            FilterTerm::Near { field, point, spherical, max_distance, min_distance } => {
                f.debug_struct("Near")
                    .field("field", field)
                    .field("point", point)
                    .field("spherical", spherical)
                    .field("max_distance", max_distance)
                    .field("min_distance", min_distance)
                    .finish()
            }
            FilterTerm::ElementMatch(field, inner) => {
                f.debug_tuple("ElementMatch").field(field).field(inner).finish()
            }
            FilterTerm::And(children) => f.debug_tuple("And").field(children).finish(),
            FilterTerm::Or(children) => f.debug_tuple("Or").field(children).finish(),
            FilterTerm::Not(child) => f.debug_tuple("Not").field(child).finish(),
            FilterTerm::Raw(doc) => f.debug_tuple("Raw").field(doc).finish(),
            FilterTerm::Expression(_) => f.write_str("Expression(..)"),
            FilterTerm::ArrayIndexExists(field, index, exists) => {
                f.debug_tuple("ArrayIndexExists").field(field).field(index).field(exists).finish()
            }
        }
    }
}

/// Type-erases the element type of an `$elemMatch` inner filter, which
/// ranges over the array's element type rather than the outer document `D`
/// (and for scalar arrays isn't a document type at all).
pub trait ElemRender: fmt::Debug {
    /// Renders the inner filter with no document schema available; an
    /// untyped field path nested inside it is trusted rather than checked
    /// for array-capability (there is no registry to check it against).
    fn render_elem(&self) -> Result<Document>;
}

impl<Elem> ElemRender for FilterTerm<Elem> {
    fn render_elem(&self) -> Result<Document> {
        crate::dsl::render::render_elem(self)
    }
}
