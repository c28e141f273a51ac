//! User-registered conversions between types.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use mirror_ir::TypeId;

use crate::{Reflect, Variant};

pub type ConvertFn = Arc<dyn Fn(&Variant) -> Option<Variant> + Send + Sync>;

/// Conversion from one source type to `target`, keyed in the registry by
/// the source's raw type.
#[derive(Clone)]
pub struct TypeConverter {
    target: TypeId,
    convert: ConvertFn,
}

impl TypeConverter {
    pub fn new<F>(target: TypeId, convert: F) -> Self
    where
        F: Fn(&Variant) -> Option<Variant> + Send + Sync + 'static,
    {
        TypeConverter {
            target,
            convert: Arc::new(convert),
        }
    }

    /// Converter whose result is a builtin value, such as `String` or a
    /// number.
    pub fn typed<S, T, F>(target: TypeId, convert: F) -> Self
    where
        S: Any,
        T: Into<Variant>,
        F: Fn(&S) -> Option<T> + Send + Sync + 'static,
    {
        Self::new(target, move |value| {
            value.get_value::<S>().and_then(&convert).map(Into::into)
        })
    }

    /// Converter producing a boxed object of the registered type `target`.
    pub fn to_object<S, T, F>(target: TypeId, convert: F) -> Self
    where
        S: Any,
        T: Reflect,
        F: Fn(&S) -> Option<T> + Send + Sync + 'static,
    {
        Self::new(target, move |value| {
            value
                .get_value::<S>()
                .and_then(&convert)
                .map(|converted| Variant::object(target, converted))
        })
    }

    pub fn target(&self) -> TypeId {
        self.target
    }

    /// Run the conversion; `None` when it fails or yields the wrong type.
    pub fn convert(&self, value: &Variant) -> Option<Variant> {
        (self.convert)(value).filter(|converted| converted.get_type() == self.target)
    }
}

impl fmt::Debug for TypeConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeConverter")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
