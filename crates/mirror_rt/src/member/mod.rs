//! Reflected members: methods, properties, constructors, destructors and
//! enumerations.
//!
//! Members are plain records built by the caller and handed to the
//! registry, which stamps the declaring type and stores them behind `Arc`.
//! Invocation goes through a stored closure; argument types are checked
//! exactly against the declared parameter types before the closure runs.

mod constructor;
mod enumeration;
mod method;
mod property;

use std::borrow::Cow;

use mirror_ir::TypeId;

use crate::error::ReflectError;
use crate::metadata::{Metadata, MetadataKey, MetadataList};
use crate::Variant;

pub use constructor::{Constructor, ConstructorFn, Destructor, DestructorFn};
pub use enumeration::Enumeration;
pub use method::{Method, MethodFn};
pub use property::{GetterFn, Property, SetterFn};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum AccessLevel {
    #[default]
    Public,
    Protected,
    Private,
}

#[derive(Clone, Debug)]
pub struct ParameterInfo {
    ty: TypeId,
    name: Option<String>,
    default: Option<Variant>,
}

impl ParameterInfo {
    pub fn new(ty: TypeId) -> Self {
        ParameterInfo {
            ty,
            name: None,
            default: None,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Value used when the argument is omitted. Only trailing parameters
    /// can be omitted.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Variant>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn default_value(&self) -> Option<&Variant> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Common surface of records stored in the registry's member tables.
pub(crate) trait Member {
    fn name(&self) -> &str;
    fn set_declaring_type(&mut self, ty: TypeId);
    /// Parameter list used to tell overloads apart.
    fn parameters(&self) -> &[ParameterInfo] {
        &[]
    }
}

/// Whether `params` accepts exactly the argument types `types`.
pub(crate) fn matches_types(params: &[ParameterInfo], types: &[TypeId]) -> bool {
    params.len() == types.len() && params.iter().zip(types).all(|(p, ty)| p.ty == *ty)
}

/// Whether `params` accepts `args`, filling missing trailing arguments from
/// defaults.
pub(crate) fn accepts_args(params: &[ParameterInfo], args: &[Variant]) -> bool {
    if args.len() > params.len() {
        return false;
    }
    params.iter().enumerate().all(|(i, param)| match args.get(i) {
        Some(arg) => arg.get_type() == param.ty,
        None => param.has_default(),
    })
}

/// Check `args` against `params` and append defaults for omitted trailing
/// arguments.
pub(crate) fn bind_arguments<'a>(
    name: &str,
    params: &[ParameterInfo],
    args: &'a [Variant],
) -> Result<Cow<'a, [Variant]>, ReflectError> {
    if !accepts_args(params, args) {
        return Err(ReflectError::SignatureMismatch {
            name: name.to_owned(),
            args: args.iter().map(Variant::get_type).collect(),
        });
    }
    if args.len() == params.len() {
        return Ok(Cow::Borrowed(args));
    }
    let mut bound = args.to_vec();
    bound.extend(
        params[args.len()..]
            .iter()
            .filter_map(|param| param.default.clone()),
    );
    Ok(Cow::Owned(bound))
}

/// Builder helper shared by all member kinds.
fn push_metadata(list: &mut MetadataList, key: impl Into<MetadataKey>, value: impl Into<Variant>) {
    list.insert(Metadata::new(key, value));
}
