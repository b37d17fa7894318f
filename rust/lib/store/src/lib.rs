//! Generic entity store.
//!
//! One store implementation covers every table-backed record type: an
//! entity describes its table (column names, kinds, primary key) through
//! a static descriptor, and [`EntityStore`] translates entity values into
//! parameterized SQL — save, key lookup, full listing, search by example,
//! range search, delete.

pub mod entity;
pub mod store;

pub use entity::{integer_or_null, text_or_null, Entity, FieldDef, FieldKind, TableDef};
pub use store::{Direction, EntityStore, Order, Page, SearchOptions, StoreError};
