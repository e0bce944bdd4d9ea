//! Ergonomic constructors for filter terms. Every factory is generic over
//! both the field handle (a string path, a typed [`Field`](../resolver/struct.Field.html)/
//! [`ArrField`](../resolver/struct.ArrField.html), or any other type that
//! erases into an [`AnyField`](../resolver/struct.AnyField.html)) and, where
//! relevant, the literal's host type — Rust's generics collapse the "typed
//! handle + typed literal" and "string path + BDOC value" forms the same
//! factory supports into a single function, since a `bson::Bson` value is
//! itself `Serialize`. Building a term never touches a serializer registry;
//! that only happens at [`render`](../render/fn.render.html) time.

use std::fmt::Debug;
use serde::Serialize;
use bson::Bson;
use crate::error::{ Error, ErrorKind, Result };
use crate::literal::{ BsonType, RegexOpts };
use crate::dsl::bdoc::WriteValue;
use crate::dsl::filter::FilterTerm;
use crate::dsl::resolver::AnyField;
use crate::dsl::geo::{ Geometry, Point, WithinShape };

fn boxed<T: Serialize + Debug + 'static>(value: T) -> Box<dyn WriteValue> {
    Box::new(value)
}

/// `{field: value}`.
pub fn eq<D>(field: impl Into<AnyField<D>>, value: impl Serialize + Debug + 'static) -> Result<FilterTerm<D>> {
    FilterTerm::simple(field.into(), boxed(value))
}

/// `{field: {$ne: value}}`.
pub fn ne<D>(field: impl Into<AnyField<D>>, value: impl Serialize + Debug + 'static) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$ne", boxed(value))
}

/// `{field: {$gt: value}}`.
pub fn gt<D>(field: impl Into<AnyField<D>>, value: impl Serialize + Debug + 'static) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$gt", boxed(value))
}

/// `{field: {$gte: value}}`.
pub fn gte<D>(field: impl Into<AnyField<D>>, value: impl Serialize + Debug + 'static) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$gte", boxed(value))
}

/// `{field: {$lt: value}}`.
pub fn lt<D>(field: impl Into<AnyField<D>>, value: impl Serialize + Debug + 'static) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$lt", boxed(value))
}

/// `{field: {$lte: value}}`.
pub fn lte<D>(field: impl Into<AnyField<D>>, value: impl Serialize + Debug + 'static) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$lte", boxed(value))
}

/// `{field: {$exists: present}}`.
pub fn exists<D>(field: impl Into<AnyField<D>>, present: bool) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$exists", boxed(present))
}

/// `{field: {$in: [values...]}}`.
pub fn in_<D, V>(field: impl Into<AnyField<D>>, values: impl IntoIterator<Item = V>) -> Result<FilterTerm<D>>
    where V: Serialize + Debug + 'static
{
    let items = values.into_iter().map(boxed).collect();
    FilterTerm::array_operator(field.into(), "$in", items)
}

/// `{field: {$nin: [values...]}}`.
pub fn nin<D, V>(field: impl Into<AnyField<D>>, values: impl IntoIterator<Item = V>) -> Result<FilterTerm<D>>
    where V: Serialize + Debug + 'static
{
    let items = values.into_iter().map(boxed).collect();
    FilterTerm::array_operator(field.into(), "$nin", items)
}

/// `{field: {$all: [values...]}}`.
pub fn all<D, V>(field: impl Into<AnyField<D>>, values: impl IntoIterator<Item = V>) -> Result<FilterTerm<D>>
    where V: Serialize + Debug + 'static
{
    let items = values.into_iter().map(boxed).collect();
    FilterTerm::array_operator(field.into(), "$all", items)
}

/// `{field: {$elemMatch: render(inner)}}`.
pub fn elem_match<D, Item>(field: impl Into<AnyField<D>>, inner: FilterTerm<Item>) -> Result<FilterTerm<D>>
    where Item: 'static
{
    FilterTerm::element_match(field.into(), Box::new(inner))
}

/// `{field: {$size: n}}`.
pub fn size<D>(field: impl Into<AnyField<D>>, n: i64) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$size", boxed(n))
}

/// Array has more than `n` elements: `{"field.n": {$exists: true}}`.
pub fn size_gt<D>(field: impl Into<AnyField<D>>, n: usize) -> Result<FilterTerm<D>> {
    FilterTerm::array_index_exists(field.into(), n, true)
}

/// Array has at least `n` elements (`n >= 1`): `{"field.(n-1)": {$exists: true}}`.
pub fn size_gte<D>(field: impl Into<AnyField<D>>, n: usize) -> Result<FilterTerm<D>> {
    let index = n.checked_sub(1)
        .ok_or_else(|| Error::with_kind(ErrorKind::InvalidFilter, "sizeGte requires n >= 1"))?;
    FilterTerm::array_index_exists(field.into(), index, true)
}

/// Array has fewer than `n` elements (`n >= 1`): `{"field.(n-1)": {$exists: false}}`.
pub fn size_lt<D>(field: impl Into<AnyField<D>>, n: usize) -> Result<FilterTerm<D>> {
    let index = n.checked_sub(1)
        .ok_or_else(|| Error::with_kind(ErrorKind::InvalidFilter, "sizeLt requires n >= 1"))?;
    FilterTerm::array_index_exists(field.into(), index, false)
}

/// Array has at most `n` elements: `{"field.n": {$exists: false}}`.
pub fn size_lte<D>(field: impl Into<AnyField<D>>, n: usize) -> Result<FilterTerm<D>> {
    FilterTerm::array_index_exists(field.into(), n, false)
}

/// `{field: {$type: ty}}`.
pub fn type_<D>(field: impl Into<AnyField<D>>, ty: BsonType) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$type", boxed(ty))
}

/// `{field: {$mod: [divisor, remainder]}}`.
pub fn mod_<D>(field: impl Into<AnyField<D>>, divisor: i64, remainder: i64) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$mod", boxed(vec![divisor, remainder]))
}

/// `{field: /pattern/opts}`, a literal BSON regular expression value rather
/// than an `$regex`/`$options` operator pair (both forms are accepted by the
/// server; the literal form is what the `$elemMatch` scalar fixup expects
/// to find and is therefore what this builder produces).
pub fn regex<D>(field: impl Into<AnyField<D>>, pattern: impl Into<String>, opts: RegexOpts) -> Result<FilterTerm<D>> {
    let opts = match bson::to_bson(&opts) {
        Ok(Bson::String(s)) => s,
        _ => String::new(),
    };
    FilterTerm::simple(field.into(), boxed(Bson::RegExp(pattern.into(), opts)))
}

/// `And(children)`.
pub fn and_<D>(children: Vec<FilterTerm<D>>) -> FilterTerm<D> {
    FilterTerm::and(children)
}

/// `Or(children)`.
pub fn or_<D>(children: Vec<FilterTerm<D>>) -> FilterTerm<D> {
    FilterTerm::or(children)
}

/// `Not(child)`.
pub fn not_<D>(child: FilterTerm<D>) -> FilterTerm<D> {
    FilterTerm::not(child)
}

/// `{field: {$geoIntersects: {$geometry: geometry}}}`.
pub fn geo_intersects<D>(field: impl Into<AnyField<D>>, geometry: Geometry) -> Result<FilterTerm<D>> {
    FilterTerm::geometry(field.into(), "$geoIntersects", boxed(geometry))
}

/// `{field: {$geoWithin: {$geometry: geometry}}}`.
pub fn geo_within<D>(field: impl Into<AnyField<D>>, geometry: Geometry) -> Result<FilterTerm<D>> {
    FilterTerm::geometry(field.into(), "$geoWithin", boxed(geometry))
}

/// `{field: {$geoWithin: {$box: [min, max]}}}`.
pub fn geo_within_box<D>(field: impl Into<AnyField<D>>, corners: [Point; 2]) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$geoWithin", boxed(WithinShape::Box(corners)))
}

/// `{field: {$geoWithin: {$center: [center, radius]}}}`.
pub fn geo_within_center<D>(field: impl Into<AnyField<D>>, center: Point, radius: f64) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$geoWithin", boxed(WithinShape::Center { center, radius }))
}

/// `{field: {$geoWithin: {$centerSphere: [center, radiusRadians]}}}`.
pub fn geo_within_center_sphere<D>(field: impl Into<AnyField<D>>, center: Point, radius: f64) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$geoWithin", boxed(WithinShape::CenterSphere { center, radius }))
}

/// `{field: {$geoWithin: {$polygon: [points...]}}}`.
pub fn geo_within_polygon<D>(field: impl Into<AnyField<D>>, points: Vec<Point>) -> Result<FilterTerm<D>> {
    FilterTerm::operator(field.into(), "$geoWithin", boxed(WithinShape::Polygon(points)))
}

/// `{field: {$near: {$geometry: point, $maxDistance?: max, $minDistance?: min}}}`.
pub fn near<D>(
    field: impl Into<AnyField<D>>,
    point: Point,
    max_distance: Option<f64>,
    min_distance: Option<f64>,
) -> Result<FilterTerm<D>> {
    FilterTerm::near(field.into(), boxed(point), false, max_distance, min_distance)
}

/// `{field: {$nearSphere: {$geometry: point, $maxDistance?: max, $minDistance?: min}}}`.
pub fn near_sphere<D>(
    field: impl Into<AnyField<D>>,
    point: Point,
    max_distance: Option<f64>,
    min_distance: Option<f64>,
) -> Result<FilterTerm<D>> {
    FilterTerm::near(field.into(), boxed(point), true, max_distance, min_distance)
}

/// `{"$text": {"$search": query, "$language"?: language}}`. A collection-wide
/// predicate rather than a per-field one, so it takes no field handle.
pub fn text<D>(query: impl Into<String>, language: Option<impl Into<String>>) -> FilterTerm<D> {
    let mut search = doc! { "$search": query.into() };

    if let Some(language) = language {
        search.insert("$language", language.into());
    }

    FilterTerm::raw(doc! { "$text": search })
}

/// An opaque host-side predicate, lowered to BDOC by `lowering` at render
/// time.
pub fn where_<D, F>(lowering: F) -> FilterTerm<D>
    where F: Fn() -> Result<bson::Document> + Send + Sync + 'static
{
    FilterTerm::expression(lowering)
}

/// A pre-built document, passed through as-is.
pub fn raw<D>(doc: bson::Document) -> FilterTerm<D> {
    FilterTerm::raw(doc)
}
