//! Blanket implementations of the `ops` traits for convenience: a raw,
//! loosely-typed `bson::Document` can always stand in for a filter
//! criterion, wrapped as a [`FilterTerm::raw`](dsl/filter/enum.FilterTerm.html#method.raw)
//! passed straight through to the server.

use bson::Document;
use crate::doc::Doc;
use crate::ops::{ Count, Query, Delete };
use crate::dsl::filter::FilterTerm;

impl<T: Doc> Count<T> for Document {
    fn filter(&self) -> FilterTerm<T> {
        FilterTerm::raw(self.clone())
    }
}

impl<T: Doc> Query<T> for Document {
    type Output = T;

    fn filter(&self) -> FilterTerm<T> {
        FilterTerm::raw(self.clone())
    }
}

impl<T: Doc> Delete<T> for Document {
    fn filter(&self) -> FilterTerm<T> {
        FilterTerm::raw(self.clone())
    }
}
