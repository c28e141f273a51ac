//! Errors reported by the `try_*` entry points.
//!
//! The plain operations keep the sentinel conventions (invalid `TypeId`,
//! empty `Variant`, null `ObjPtr`); their `try_*` twins report the reason.

use mirror_ir::TypeId;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ReflectError {
    #[error("no type is registered under the name `{name}`")]
    NotRegistered { name: String },

    #[error("`{name}` cannot be invoked with argument types {args:?}")]
    SignatureMismatch { name: String, args: Vec<TypeId> },

    #[error("cannot convert a value of type {from} to {to}")]
    ConversionFailure { from: TypeId, to: TypeId },

    #[error("{from} is not related to {to}")]
    CastFailure { from: TypeId, to: TypeId },

    #[error("a type named `{name}` is already registered as {existing}")]
    RegistrationConflict { name: String, existing: TypeId },
}

pub type ReflectResult<T> = Result<T, ReflectError>;
