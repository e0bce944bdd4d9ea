//! The document/value model filter terms are rendered into, and a thin
//! writer for building it up incrementally instead of constructing throwaway
//! sub-documents for every leaf.
//!
//! The underlying `bson` crate already models its `Document` as a tree
//! (ordered map of `String` to `Bson`), so `Writer` is a builder facade over
//! that tree rather than a byte-level codec; it exists so that rendering
//! code reads as "begin a field, write its value" instead of juggling
//! intermediate `Document`s by hand.

use std::fmt;
use bson::{ Bson, Document };
use serde::Serialize;
use crate::error::{ Error, ErrorKind, Result, ResultExt };

/// A deferred BSON value: constructing a filter term does not immediately
/// serialize its literal operand(s), so that rendering can interleave
/// serialization with document emission and report errors at `render` time,
/// at the point where the offending field is known.
pub trait WriteValue: fmt::Debug {
    /// Serializes the receiver to a `Bson` value.
    fn to_bson(&self) -> Result<Bson>;
}

impl<T> WriteValue for T where T: Serialize + fmt::Debug {
    fn to_bson(&self) -> Result<Bson> {
        bson::to_bson(self)
            .chain(|| format!("couldn't serialize filter literal {:?}", self))
            .map_err(|err| err.tagged(ErrorKind::InvalidFilter))
    }
}

/// A builder for a single BDOC document. Balances `begin`/`end` implicitly:
/// a `Writer` always yields a complete, well-formed document on `finish()`,
/// even if individual field writes failed (the first error is latched and
/// returned, so later writes on the same `Writer` are skipped).
#[derive(Debug, Default)]
pub struct Writer {
    doc: Document,
    error: Option<Error>,
}

impl Writer {
    /// Creates a fresh, empty writer.
    pub fn new() -> Self {
        Writer::default()
    }

    /// Writes a name/value pair whose value is already a `Bson`.
    pub fn write_bson(&mut self, name: impl Into<String>, value: impl Into<Bson>) -> &mut Self {
        if self.error.is_none() {
            self.doc.insert(name.into(), value.into());
        }
        self
    }

    /// Writes a name/value pair, deferring serialization of the value to
    /// this call site via the [`WriteValue`](trait.WriteValue.html) object.
    pub fn write_value(&mut self, name: impl Into<String>, value: &dyn WriteValue) -> &mut Self {
        if self.error.is_none() {
            match value.to_bson() {
                Ok(bson) => { self.doc.insert(name.into(), bson); }
                Err(err) => { self.error = Some(err); }
            }
        }
        self
    }

    /// Writes a nested document built by the given closure under `name`.
    pub fn write_doc<F>(&mut self, name: impl Into<String>, build: F) -> &mut Self
        where F: FnOnce(&mut Writer)
    {
        if self.error.is_none() {
            let mut inner = Writer::new();
            build(&mut inner);
            match inner.finish() {
                Ok(doc) => { self.doc.insert(name.into(), doc); }
                Err(err) => { self.error = Some(err); }
            }
        }
        self
    }

    /// Consumes the writer, returning the finished document, or the first
    /// error encountered while writing to it.
    pub fn finish(self) -> Result<Document> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.doc),
        }
    }
}
