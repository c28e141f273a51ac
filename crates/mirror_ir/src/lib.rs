//! Mirror IR - type identity primitives.
//!
//! This crate holds the small, dependency-free vocabulary shared by the
//! reflection runtime:
//! - `TypeId`: the dense registry handle, with fixed builtin ids
//! - `TypeFlags`: per-type kind bits stored in the registry's flag column
//! - Name hashing, normalisation and custom-name derivation
//!
//! # Design Philosophy
//!
//! - **Index Everything**: types are `TypeId(u32)`, columns are indexed by it
//! - **Sentinel, not Option**: id 0 is invalid and always resolvable
//! - **Copy handles**: every type here is cheap to pass by value

mod flags;
mod name;
mod type_id;

pub use flags::{TypeFlags, TypeKind};
pub use name::{derive_name, name_hash, normalize_name, NameHash};
pub use type_id::TypeId;
