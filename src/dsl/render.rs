//! Renders a [`FilterTerm`](../filter/enum.FilterTerm.html) tree to a BDOC
//! document. This is where every piece of server-semantics-aware
//! normalization lives: conjunction merge-vs-promote, negation lowering,
//! disjunction flattening, and the `$elemMatch` scalar fixup.
//!
//! Rendering is a pure function of the term (plus, for typed documents, the
//! schema hook consulted for untyped field handles); it allocates a fresh
//! document and never observes or mutates global state.

use bson::{ Bson, Document };
use crate::doc::Doc;
use crate::error::Result;
use crate::dsl::bdoc::{ Writer, WriteValue };
use crate::dsl::filter::FilterTerm;
use crate::dsl::resolver::{ AnyField, FieldMeta };

/// Renders `term` to its canonical BDOC document form.
pub fn render<D: Doc>(term: &FilterTerm<D>) -> Result<Document> {
    let schema: fn(&str) -> Option<FieldMeta> = D::schema_field;
    render_inner(term, Some(&schema))
}

/// Renders an `$elemMatch` inner filter, which ranges over an array's
/// element type rather than a genuine document type. There is no schema to
/// consult for untyped field handles nested inside it.
pub(crate) fn render_elem<Elem>(term: &FilterTerm<Elem>) -> Result<Document> {
    render_inner(term, None)
}

type Schema<'a> = Option<&'a dyn Fn(&str) -> Option<FieldMeta>>;

fn render_inner<D>(term: &FilterTerm<D>, schema: Schema) -> Result<Document> {
    match term {
        FilterTerm::Simple(field, value) => render_simple(field, value.as_ref()),
        FilterTerm::Operator(field, op, value) => render_operator(field, op, value.as_ref()),
        FilterTerm::ArrayOperator(field, op, items) => render_array_operator(field, op, items, schema),
        FilterTerm::Geometry(field, op, value) => render_geometry(field, op, value.as_ref()),
        FilterTerm::Near { field, point, spherical, max_distance, min_distance } =>
            render_near(field, point.as_ref(), *spherical, *max_distance, *min_distance),
        FilterTerm::ElementMatch(field, inner) => render_element_match(field, inner.as_ref(), schema),
        FilterTerm::And(children) => render_and(children, schema),
        FilterTerm::Or(children) => render_or(children, schema),
        FilterTerm::Not(child) => render_not(child, schema),
        FilterTerm::Raw(doc) => Ok(doc.clone()),
        FilterTerm::Expression(lowering) => lowering(),
        FilterTerm::ArrayIndexExists(field, index, exists) => render_array_index_exists(field, *index, *exists),
    }
}

fn render_simple<D>(field: &AnyField<D>, value: &dyn WriteValue) -> Result<Document> {
    let mut w = Writer::new();
    w.write_value(field.as_str(), value);
    w.finish()
}

fn render_operator<D>(field: &AnyField<D>, op: &str, value: &dyn WriteValue) -> Result<Document> {
    let mut w = Writer::new();
    w.write_doc(field.as_str(), |inner| { inner.write_value(op, value); });
    w.finish()
}

fn render_array_operator<D>(
    field: &AnyField<D>,
    op: &str,
    items: &[Box<dyn WriteValue>],
    schema: Schema,
) -> Result<Document> {
    field.require_array_capable(schema)?;

    let mut array = Vec::with_capacity(items.len());
    for item in items {
        array.push(item.to_bson()?);
    }

    let mut w = Writer::new();
    w.write_doc(field.as_str(), move |inner| { inner.write_bson(op, Bson::Array(array)); });
    w.finish()
}

fn render_geometry<D>(field: &AnyField<D>, op: &str, value: &dyn WriteValue) -> Result<Document> {
    let mut w = Writer::new();
    w.write_doc(field.as_str(), |inner| {
        inner.write_doc(op, |geo| { geo.write_value("$geometry", value); });
    });
    w.finish()
}

#[allow(clippy::too_many_arguments)]
fn render_near<D>(
    field: &AnyField<D>,
    point: &dyn WriteValue,
    spherical: bool,
    max_distance: Option<f64>,
    min_distance: Option<f64>,
) -> Result<Document> {
    let op = if spherical { "$nearSphere" } else { "$near" };
    let mut w = Writer::new();
    w.write_doc(field.as_str(), |inner| {
        inner.write_doc(op, |near| {
            near.write_value("$geometry", point);
            if let Some(max) = max_distance {
                near.write_bson("$maxDistance", max);
            }
            if let Some(min) = min_distance {
                near.write_bson("$minDistance", min);
            }
        });
    });
    w.finish()
}

fn render_element_match<D>(
    field: &AnyField<D>,
    inner: &dyn crate::dsl::filter::ElemRender,
    schema: Schema,
) -> Result<Document> {
    field.require_array_capable(schema)?;

    let mut body = inner.render_elem()?;

    if let Some(scalar) = body.remove("") {
        match scalar {
            Bson::Document(promoted) => {
                for (key, value) in promoted {
                    body.insert(key, value);
                }
            }
            Bson::RegExp(pattern, opts) => {
                body.insert("$regex", Bson::RegExp(pattern, opts));
            }
            other => {
                body.insert("$eq", other);
            }
        }
    }

    let mut w = Writer::new();
    w.write_doc(field.as_str(), move |outer| { outer.write_bson("$elemMatch", body); });
    w.finish()
}

fn render_array_index_exists<D>(field: &AnyField<D>, index: usize, exists: bool) -> Result<Document> {
    let path = format!("{}.{}", field.as_str(), index);
    let mut w = Writer::new();
    w.write_doc(path, |inner| { inner.write_bson("$exists", exists); });
    w.finish()
}

fn render_and<D>(children: &[FilterTerm<D>], schema: Schema) -> Result<Document> {
    let mut acc = Document::new();

    for child in children {
        let clause = render_inner(child, schema)?;
        fold_and_clause(&mut acc, clause);
    }

    Ok(acc)
}

/// Folds every entry of a rendered `And` clause into the accumulator,
/// implementing the merge-vs-promote rewrite.
fn fold_and_clause(acc: &mut Document, clause: Document) {
    for (name, value) in clause {
        fold_and_entry(acc, name, value);
    }
}

fn fold_and_entry(acc: &mut Document, name: String, value: Bson) {
    if name == "$and" {
        if let Bson::Array(items) = value {
            for item in items {
                if let Bson::Document(nested) = item {
                    fold_and_clause(acc, nested);
                }
            }
        }
        return;
    }

    if acc.len() == 1 && acc.contains_key("$and") {
        if let Some(Bson::Array(items)) = acc.get_mut("$and") {
            let mut one = Document::new();
            one.insert(name, value);
            items.push(Bson::Document(one));
        }
        return;
    }

    if let Some(existing) = acc.get(&name).cloned() {
        let disjoint = match (&existing, &value) {
            (Bson::Document(a), Bson::Document(b)) => a.keys().all(|k| !b.contains_key(k)),
            _ => false,
        };

        if disjoint {
            if let (Bson::Document(mut a), Bson::Document(b)) = (existing, value) {
                for (k, v) in b {
                    a.insert(k, v);
                }
                acc.insert(name, Bson::Document(a));
            }
        } else {
            promote(acc, name, value);
        }

        return;
    }

    acc.insert(name, value);
}

/// Moves every current element of `acc` into a new `$and` array and appends
/// `(name, value)` as its own one-element document.
fn promote(acc: &mut Document, name: String, value: Bson) {
    let mut items = Vec::with_capacity(acc.len() + 1);

    for (k, v) in acc.iter() {
        let mut one = Document::new();
        one.insert(k.clone(), v.clone());
        items.push(Bson::Document(one));
    }

    let mut last = Document::new();
    last.insert(name, value);
    items.push(Bson::Document(last));

    acc.clear();
    acc.insert("$and", Bson::Array(items));
}

fn render_or<D>(children: &[FilterTerm<D>], schema: Schema) -> Result<Document> {
    let mut items = Vec::with_capacity(children.len());

    for child in children {
        let rendered = render_inner(child, schema)?;

        if rendered.len() == 1 {
            if let Some(Bson::Array(nested)) = rendered.get("$or") {
                items.extend(nested.iter().cloned());
                continue;
            }
        }

        items.push(Bson::Document(rendered));
    }

    let mut out = Document::new();
    out.insert("$or", Bson::Array(items));
    Ok(out)
}

fn render_not<D>(child: &FilterTerm<D>, schema: Schema) -> Result<Document> {
    let rendered = render_inner(child, schema)?;
    Ok(lower_not(rendered))
}

/// Lowers a rendered document to its negated form, per the table in
/// [the module-level documentation's rendering guide].
fn lower_not(r: Document) -> Document {
    if r.len() != 1 {
        return wrap_nor(r);
    }

    let (key, value) = r.into_iter().next().expect("checked len() == 1 above");

    if key.starts_with('$') {
        return match key.as_str() {
            "$or" => single(Cow2::Nor, value),
            "$nor" => single(Cow2::Or, value),
            _ => wrap_nor(single_doc(key, value)),
        };
    }

    let is_operator_doc = match &value {
        Bson::Document(inner) => inner.keys().next()
            .map_or(false, |first| first.starts_with('$') && first != "$ref"),
        _ => false,
    };

    if is_operator_doc {
        if let Bson::Document(inner) = &value {
            if inner.len() == 1 {
                let (op, opval) = inner.iter().next().expect("checked len() == 1 above");
                return negate_operator(key, op, opval.clone());
            }
        }
        return wrap_nor(single_doc(key, value));
    }

    if let Bson::RegExp(..) = &value {
        let mut inner = Document::new();
        inner.insert("$not", value);
        return single_doc(key, Bson::Document(inner));
    }

    let mut inner = Document::new();
    inner.insert("$ne", value);
    single_doc(key, Bson::Document(inner))
}

/// Tiny enum so `lower_not` can share one helper for the `$or`/`$nor` swap.
enum Cow2 { Or, Nor }

fn single(which: Cow2, value: Bson) -> Document {
    let key = match which { Cow2::Or => "$or", Cow2::Nor => "$nor" };
    single_doc(key.to_owned(), value)
}

fn single_doc(key: String, value: Bson) -> Document {
    let mut doc = Document::new();
    doc.insert(key, value);
    doc
}

fn wrap_nor(doc: Document) -> Document {
    let mut out = Document::new();
    out.insert("$nor", Bson::Array(vec![Bson::Document(doc)]));
    out
}

/// Per-operator negation table (§4.4).
fn negate_operator(field: String, op: &str, value: Bson) -> Document {
    match op {
        "$exists" => {
            let flipped = match value {
                Bson::Boolean(b) => Bson::Boolean(!b),
                other => other,
            };
            single_doc(field, Bson::Document(single_doc("$exists".to_owned(), flipped)))
        }
        "$in" => single_doc(field, Bson::Document(single_doc("$nin".to_owned(), value))),
        "$nin" => single_doc(field, Bson::Document(single_doc("$in".to_owned(), value))),
        "$ne" | "$not" => single_doc(field, value),
        _ => {
            let wrapped = Bson::Document(single_doc(op.to_owned(), value));
            single_doc(field, Bson::Document(single_doc("$not".to_owned(), wrapped)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::builder::*;
    use crate::dsl::resolver::AnyField;

    #[derive(Debug, Serialize, Deserialize)]
    struct Thing {
        #[serde(rename = "_id")]
        id: bson::oid::ObjectId,
    }

    impl Doc for Thing {
        type Id = bson::oid::ObjectId;
        const NAME: &'static str = "Thing";
    }

    #[test]
    fn not_eq_becomes_ne() {
        let term = not_(eq(AnyField::<Thing>::path("x"), 5).unwrap());
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "x": { "$ne": 5 } });
    }

    #[test]
    fn not_in_becomes_nin() {
        let term = not_(in_(AnyField::<Thing>::path("x"), vec![1, 2]).unwrap());
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "x": { "$nin": [1, 2] } });
    }

    #[test]
    fn not_exists_flips_bool() {
        let term = not_(exists(AnyField::<Thing>::path("x"), true).unwrap());
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "x": { "$exists": false } });
    }

    #[test]
    fn not_or_becomes_nor() {
        let term = not_(or_(vec![
            eq(AnyField::<Thing>::path("a"), 1).unwrap(),
            eq(AnyField::<Thing>::path("b"), 2).unwrap(),
        ]));
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "$nor": [{ "a": 1 }, { "b": 2 }] });
    }

    #[test]
    fn and_merges_disjoint_same_field_operators() {
        let term = and_(vec![
            gt(AnyField::<Thing>::path("x"), 1).unwrap(),
            lt(AnyField::<Thing>::path("x"), 10).unwrap(),
        ]);
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "x": { "$gt": 1, "$lt": 10 } });
    }

    #[test]
    fn and_promotes_conflicting_same_field_keys() {
        let term = and_(vec![
            eq(AnyField::<Thing>::path("x"), 1).unwrap(),
            eq(AnyField::<Thing>::path("x"), 2).unwrap(),
        ]);
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "$and": [{ "x": 1 }, { "x": 2 }] });
    }

    #[test]
    fn or_flattens_nested_or() {
        let inner = or_(vec![
            eq(AnyField::<Thing>::path("a"), 1).unwrap(),
            eq(AnyField::<Thing>::path("b"), 2).unwrap(),
        ]);
        let term = or_(vec![inner, eq(AnyField::<Thing>::path("c"), 3).unwrap()]);
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "$or": [{ "a": 1 }, { "b": 2 }, { "c": 3 }] });
    }

    #[test]
    fn elem_match_promotes_scalar_operator() {
        let inner: FilterTerm<i32> = gt(AnyField::<i32>::this(), 5).unwrap();
        let term = elem_match(AnyField::<Thing>::path("nums"), inner).unwrap();
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "nums": { "$elemMatch": { "$gt": 5 } } });
    }

    #[test]
    fn elem_match_promotes_scalar_eq() {
        let inner: FilterTerm<i32> = eq(AnyField::<i32>::this(), 5).unwrap();
        let term = elem_match(AnyField::<Thing>::path("nums"), inner).unwrap();
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "nums": { "$elemMatch": { "$eq": 5 } } });
    }

    #[test]
    fn size_gt_lowers_to_index_exists() {
        let term: FilterTerm<Thing> = size_gt(AnyField::path("nums"), 2).unwrap();
        let doc = render(&term).unwrap();
        assert_eq!(doc, doc!{ "nums.2": { "$exists": true } });
    }

    #[test]
    fn size_gte_zero_is_rejected() {
        let err = size_gte::<Thing>(AnyField::path("nums"), 0).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidFilter);
    }
}
