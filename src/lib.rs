//! # Tamarind: a strongly-typed filter/query DSL for a document-oriented database
//!
//! This library lets MongoDB users build query filters as an ordinary Rust
//! value instead of hand-assembling `bson::Document`s full of stringly-typed
//! operator keys. A filter is constructed once as an immutable
//! [`FilterTerm`](dsl/filter/enum.FilterTerm.html) tree, then rendered to
//! BDOC (the operator-document shape the server expects) right before a
//! [`Collection`](coll/struct.Collection.html) method hands it to the
//! underlying driver.
//!
//! ### The Prelude
//!
//! Let's get this one out of the way quickly. The most useful and most
//! frequently utilized types from Tamarind as well as the `mongodb` and
//! `bson` crates are publicly re-exported under the module
//! [`prelude`](prelude/index.html). Therefore, for most purposes, it's
//! enough to import the library in your code like this:
//!
//! ```rust
//! extern crate tamarind;
//!
//! use tamarind::prelude::*;
//! ```
//!
//! ### Documents
//!
//! The first step is defining your domain model / entity types. Transcoding
//! them to and from BSON is handled by Serde and the BSON crate.
//!
//! Tamarind can handle any top-level entity type with the following properties:
//! * It is `Serialize` and `Deserialize`
//! * It has a serializable and deserializable unique ID which appears under
//!   the key `_id` at the top level
//! * It has a name that is globally unique within the given MongoDB database
//!
//! These constraints are captured by the [`Doc`](doc/trait.Doc.html) trait.
//! Implementing it manually gives complete control over indexes and database
//! operation options:
//!
//! ```ignore
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Product {
//!     #[serde(rename = "_id")]
//!     pub id: ObjectId,
//!     pub name: String,
//!     pub num_employees: usize,
//! }
//!
//! impl Doc for Product {
//!     // Mandatory associated items:
//!     type Id = ObjectId;
//!
//!     const NAME: &'static str = "Product";
//!
//!     // optionally, you can e.g. override the `indexes()` method:
//!     fn indexes() -> Vec<IndexModel> {
//!         vec![
//!             IndexModel {
//!                 keys: doc!{ "name": Order::Ascending },
//!                 options: IndexOptions::default(),
//!             }
//!         ]
//!     }
//! }
//! ```
//!
//! Note that the model type `Product`:
//!   * Implements the `Serialize` and `Deserialize` traits
//!   * Implements the `Debug` trait. This is *not* strictly necessary, however
//!     it is **very strongly** recommended.
//!   * Has a field which is serialized as `_id`. It doesn't matter what the
//!     name of the field is in Rust; here it's `id` but it could have been
//!     anything else, as long as it serializes/deserializes as `_id` in BSON.
//!   * the `Id` associated type is exactly the type of the `_id` field
//!   * the `NAME` associated constant describes and identifies the collection
//!     of values of this type.
//!
//! This trait is also responsible for a couple of other collection-related
//! properties, such as specifying the indexes to be created on this collection,
//! by means of the `indexes()` static method. By default, this returns an
//! empty vector meaning no custom indexes apart from the automatically-created
//! index on the `_id` field.
//!
//! A couple more static methods are also available for customizing the default
//! behavior of the collection when performing various database operations,
//! e.g. querying or insertion. If you don't implement these methods, they
//! return sensible defaults. We'll see more on this later.
//!
//! Documents whose fields may be targeted by `$in`/`$all`/`$elemMatch` can
//! also override [`Doc::schema_field`](doc/trait.Doc.html#method.schema_field)
//! so that filters built from untyped string paths (rather than the typed
//! [`Field`](dsl/resolver/struct.Field.html)/[`ArrField`](dsl/resolver/struct.ArrField.html)
//! handles) still get checked for array-capability at render time.
//!
//! ### Collections and Databases
//!
//! Once we have defined our entity types, we can start storing and retrieving
//! them. For this, we'll need a database of collections, and one collection
//! per entity type.
//!
//! Tamarind piggybacks on top of the `mongodb` crate. You connect to a MongoDB
//! client using exactly the same code that you would use if you were using
//! the driver in its "raw" form, and you obtain a named database in exactly
//! the same manner.
//!
//! Once you have a handle to the desired database, you obtain a handle to a
//! collection within that database. This is where the workflow departs from
//! that of the `mongodb` crate: Tamarind has its own, strongly-typed, generic
//! `Collection` type. Let's see how these different parts all work together:
//! ```no_run
//! # #[macro_use]
//! # extern crate serde_derive;
//! # extern crate serde;
//! # extern crate bson;
//! # extern crate mongodb;
//! # extern crate tamarind;
//! # use tamarind::prelude::*;
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct User {
//!     #[serde(rename = "_id")]
//!     id: ObjectId,
//!     legal_name: String,
//! }
//!
//! impl Doc for User {
//!     type Id = ObjectId;
//!     const NAME: &'static str = "User";
//! }
//!
//! # fn main() -> TamarindResult<()> {
//! // Connect to the server using the underlying mongodb crate.
//! let client = Client::with_uri("mongodb://localhost:27017/")?;
//!
//! // Obtain a database handle, still using the underlying mongodb crate.
//! let db = client.db("tamarind_example_db");
//!
//! // Tamarind extends database handle types with useful methods which let
//! // you obtain strongly-typed, generic collection handles.
//!
//! // This is how you obtain such a **new, empty** collection. Note that
//! // **this drops and recreates the collection.**
//! let users: Collection<User> = db.empty_collection_novalidate()?;
//!
//! // If you need to access an **existing collection without emptying it,**
//! // here's how you do it:
//! let users_existing: Collection<User> = db.existing_collection();
//! # Ok(())
//! # }
//! ```
//!
//! ### Operations
//!
//! Once we get hold of a collection, we can finally start performing actual
//! database operations. Some of the most basic ones are:
//!   1. First, we can try and insert some entities.
//!   2. Then, we can update them based on their identity (`_id` field).
//!   3. Finally, we can retrieve them subject to some filtering criteria.
//!
//! Let's see what this looks like in terms of concrete code!
//! ```no_run
//! # #[macro_use]
//! # extern crate serde_derive;
//! # extern crate serde;
//! # extern crate bson;
//! # extern crate mongodb;
//! # extern crate tamarind;
//! # use tamarind::prelude::*;
//! #
//! # #[derive(Debug, Clone, Serialize, Deserialize)]
//! # struct User {
//! #    #[serde(rename = "_id")]
//! #    id: ObjectId,
//! #    legal_name: String,
//! # }
//! #
//! # impl Doc for User {
//! #     type Id = ObjectId;
//! #     const NAME: &'static str = "User";
//! # }
//! #
//! #
//! # fn main() -> TamarindResult<()> {
//! # let client = Client::with_uri("mongodb://localhost:27017/")?;
//! # let db = client.db("tamarind_example_db");
//! # let users: Collection<User> = db.empty_collection_novalidate()?;
//! #
//! let alice = User {
//!     id: ObjectId::new()?,
//!     legal_name: String::from("Alice Wonderland"),
//! };
//! let bob = User {
//!     id: ObjectId::new()?,
//!     legal_name: String::from("Robert Tables"), // xkcd.com/327
//! };
//!
//! // You can insert a single entity using `Collection::insert_one()`.
//! users.insert_one(&alice)?;
//!
//! // If you have multiple entities, it's more efficient to use
//! // `insert_many()` instead. It will save you precious network round-trips.
//! users.insert_many(vec![&alice, &bob])?;
//!
//! // Now that we have some data, we can retrieve and filter it. Instead of
//! // a raw, loosely-typed BSON document, a filter criterion is built with
//! // the functions in the `dsl::builder` module (re-exported from the
//! // prelude), which return an ordinary `FilterTerm<User>`:
//! #[derive(Debug)]
//! struct ByLegalName(String);
//!
//! impl Query<User> for ByLegalName {
//!     type Output = User;
//!
//!     fn filter(&self) -> FilterTerm<User> {
//!         eq(AnyField::path("legal_name"), self.0.clone())
//!     }
//! }
//!
//! for result in users.find_many(&ByLegalName("Robert Tables".into()))? {
//!     let entity = result?;
//!     println!("Found entity: {:#?}", entity);
//! }
//! #
//! # Ok(())
//! # }
//! ```
//!
//! For this more advanced (and recommended) use case, see the traits in the
//! [`ops` module](ops/index.html) and the corresponding
//! [methods on `Collection`](coll/struct.Collection.html#methods).
//!
//! For using more descriptive names for some constants in filter or update
//! specification documents, and also for preventing certain classes of typos
//! related to the stringly-typed nature of BSON, several "smart literal" types
//! are provided in the [`literal`](literal/index.html) module.

#![doc(html_root_url = "https://docs.rs/tamarind/0.1.0")]
#![deny(missing_debug_implementations, missing_copy_implementations,
        trivial_casts, trivial_numeric_casts,
        unsafe_code,
        unstable_features,
        unused_import_braces, unused_qualifications, missing_docs)]
#![allow(clippy::single_match, clippy::match_same_arms, clippy::match_ref_pats,
         clippy::clone_on_ref_ptr, clippy::needless_pass_by_value)]
#![deny(clippy::wrong_pub_self_convention, clippy::used_underscore_binding,
        clippy::stutter, clippy::similar_names, clippy::pub_enum_variant_names,
        clippy::missing_docs_in_private_items,
        clippy::non_ascii_literal, clippy::unicode_not_nfc,
        clippy::result_unwrap_used, clippy::option_unwrap_used,
        clippy::option_map_unwrap_or_else, clippy::option_map_unwrap_or,
        clippy::filter_map,
        clippy::shadow_unrelated, clippy::shadow_reuse, clippy::shadow_same,
        clippy::int_plus_one, clippy::string_add_assign, clippy::if_not_else,
        clippy::invalid_upcast_comparisons,
        clippy::cast_precision_loss, clippy::cast_lossless,
        clippy::cast_possible_wrap, clippy::cast_possible_truncation,
        clippy::mutex_integer, clippy::mut_mut, clippy::items_after_statements,
        clippy::print_stdout, clippy::mem_forget, clippy::maybe_infinite_iter)]

#[macro_use]
extern crate bitflags;
extern crate mongodb;
#[macro_use]
extern crate bson;
#[macro_use]
extern crate serde_derive;
extern crate serde;
extern crate serde_json;
extern crate backtrace;

pub mod db;
pub mod coll;
pub mod cursor;
pub mod doc;
pub mod ops;
pub mod literal;
pub mod bsn;
pub mod utils;
pub mod error;
pub mod dsl;
pub mod impls;
pub mod prelude;
