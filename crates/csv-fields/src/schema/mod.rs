//! Field descriptor registry.
//!
//! Turns a record type's declared field table into a validated
//! [`RecordDescriptor`]:
//!
//! - **Position metadata** ([`index`]): [`FieldIndex`], a 1-based column
//!   index that cannot be constructed below 1
//! - **Field declarations** ([`field`]): [`FieldDecl`] rows with typed
//!   accessors and the declared [`FieldType`]
//! - **Descriptors** ([`descriptor`]): the [`Record`] trait and the
//!   per-type [`RecordDescriptor`], sorted by index for both encoding and
//!   column lookup
//! - **Registry** ([`registry`]): a global cache so each type is described
//!   once
//!
//! ```text
//! Record::fields()  ──►  RecordDescriptor::build()  ──►  DESCRIPTOR_REGISTRY
//!   [FieldDecl]            validate positions            TypeId → descriptor
//!                          reject duplicates
//!                          sort by index
//! ```

pub mod descriptor;
pub mod error;
pub mod field;
pub mod index;
pub mod registry;

pub use descriptor::{FieldDescriptor, Record, RecordDescriptor};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDecl, FieldType, ValueKind};
pub use index::FieldIndex;
pub use registry::{describe, DescriptorRegistry, DESCRIPTOR_REGISTRY};
