//! The Tamarind prelude provides re-exports of the most commonly used traits
//! and types for convenience, including ones from crates `bson` and `mongodb`.

pub use crate::db::DatabaseExt;
pub use crate::coll::Collection;
pub use crate::doc::Doc;
pub use crate::ops::*;
pub use crate::literal::{ Order, BsonType, RegexOpts, DateTimeType };
pub use crate::error::{ Error, ErrorKind, Result as TamarindResult };
pub use crate::dsl::filter::FilterTerm;
pub use crate::dsl::resolver::{ AnyField, Field, ArrField };
pub use crate::dsl::geo::{ Geometry, Point, WithinShape };
pub use crate::dsl::builder::*;
pub use crate::dsl::update::{ UpdateSpec, Modification };
pub use bson::{ Bson, Document, oid::ObjectId };
pub use mongodb::{ Client, ThreadedClient };
