//! Mirror runtime: reflection over registered types.
//!
//! This crate provides the runtime half of the reflection layer:
//! - [`Registry`]: append-only columnar store of types, inheritance rows,
//!   members, metadata and converters
//! - [`Variant`]: type-erased value container with conversion and
//!   cross-type comparison
//! - [`cast`]: the pointer adjustment vocabulary behind
//!   [`Registry::apply_offset`]
//!
//! # Design Philosophy
//!
//! - **Ids, not references**: every type is a `TypeId`; lookups never hand
//!   out borrows of registry storage
//! - **Sentinels on the fast path**: failed lookups return the invalid id,
//!   an empty `Variant` or a null `ObjPtr`; `try_*` twins say why
//! - **First registration wins**: duplicates are absorbed and traced
//!
//! # Example
//!
//! ```
//! use mirror_rt::{Registry, TypeId, Variant};
//!
//! let registry = Registry::new();
//! let answer = Variant::from(42_i32);
//! let text = answer.convert_to(&registry, TypeId::STRING);
//! assert_eq!(text.and_then(|v| v.to_string_value()).as_deref(), Some("42"));
//! ```

pub mod cast;
mod config;
mod converter;
mod error;
mod member;
mod metadata;
mod registry;
mod trace;
mod variant;

pub use config::RegistryConfig;
pub use converter::{ConvertFn, TypeConverter};
pub use error::{ReflectError, ReflectResult};
pub use member::{
    AccessLevel, Constructor, ConstructorFn, Destructor, DestructorFn, Enumeration, GetterFn,
    Method, MethodFn, ParameterInfo, Property, SetterFn,
};
pub use metadata::{Metadata, MetadataKey, MetadataList};
pub use registry::{Registry, SharedRegistry, TypeRegistration, VariantCtorFn};
pub use trace::init_tracing;
pub use variant::{Reflect, Variant};

pub use mirror_ir::{TypeFlags, TypeId, TypeKind};
