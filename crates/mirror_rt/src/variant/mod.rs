//! Type-erased value container.
//!
//! # Storage
//!
//! Builtin values (bool, char, integers, floats, strings) and object
//! pointers are stored inline in their own enum arm; every other value is
//! boxed behind its [`Reflect`] policy together with the registered type it
//! was created as.
//!
//! An empty variant has type [`TypeId::INVALID`] and is what every failed
//! lookup, conversion or invocation hands back.

mod compare;
mod convert;
mod policy;

use std::any::Any;
use std::fmt;

use mirror_ir::TypeId;

use crate::cast::ObjPtr;

pub use policy::Reflect;
use policy::Policy;

#[derive(Clone, Default)]
pub struct Variant {
    repr: Repr,
}

#[derive(Clone, Default)]
enum Repr {
    #[default]
    Empty,
    Void,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Pointer { ty: TypeId, ptr: ObjPtr },
    Object { ty: TypeId, value: Box<dyn Policy> },
}

impl Variant {
    /// The empty variant.
    pub const fn new() -> Self {
        Variant { repr: Repr::Empty }
    }

    /// A valid variant of type `void`, returned by methods without a result.
    pub const fn void() -> Self {
        Variant { repr: Repr::Void }
    }

    /// Box `value` as an instance of the registered type `ty`.
    ///
    /// Returns the empty variant when `ty` is invalid.
    pub fn object<T: Reflect>(ty: TypeId, value: T) -> Self {
        if !ty.is_valid() {
            return Variant::new();
        }
        Variant {
            repr: Repr::Object {
                ty,
                value: Box::new(value),
            },
        }
    }

    /// An object pointer of the registered pointer type `ty`.
    pub const fn pointer(ty: TypeId, ptr: ObjPtr) -> Self {
        Variant {
            repr: Repr::Pointer { ty, ptr },
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self.repr, Repr::Empty)
    }

    pub fn get_type(&self) -> TypeId {
        match &self.repr {
            Repr::Empty => TypeId::INVALID,
            Repr::Void => TypeId::VOID,
            Repr::Bool(_) => TypeId::BOOL,
            Repr::Char(_) => TypeId::CHAR,
            Repr::I8(_) => TypeId::I8,
            Repr::I16(_) => TypeId::I16,
            Repr::I32(_) => TypeId::I32,
            Repr::I64(_) => TypeId::I64,
            Repr::U8(_) => TypeId::U8,
            Repr::U16(_) => TypeId::U16,
            Repr::U32(_) => TypeId::U32,
            Repr::U64(_) => TypeId::U64,
            Repr::F32(_) => TypeId::F32,
            Repr::F64(_) => TypeId::F64,
            Repr::Str(_) => TypeId::STRING,
            Repr::Pointer { ty, .. } | Repr::Object { ty, .. } => *ty,
        }
    }

    /// Drop the payload, leaving the variant empty.
    pub fn clear(&mut self) {
        self.repr = Repr::Empty;
    }

    /// Move the payload out, leaving `self` empty.
    #[must_use]
    pub fn take(&mut self) -> Variant {
        std::mem::take(self)
    }

    pub fn swap(&mut self, other: &mut Variant) {
        std::mem::swap(&mut self.repr, &mut other.repr);
    }

    /// Whether the payload is a `T`.
    pub fn is_type<T: Any>(&self) -> bool {
        self.payload().is_some_and(|any| any.is::<T>())
    }

    pub fn get_value<T: Any>(&self) -> Option<&T> {
        self.payload()?.downcast_ref::<T>()
    }

    pub fn get_value_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.payload_mut()?.downcast_mut::<T>()
    }

    /// Move the payload out as a `T`, or hand the variant back unchanged.
    pub fn into_value<T: Any>(self) -> Result<T, Variant> {
        if !self.is_type::<T>() {
            return Err(self);
        }
        let boxed: Box<dyn Any> = match self.repr {
            Repr::Empty => return Err(Variant::new()),
            Repr::Void => Box::new(()),
            Repr::Bool(v) => Box::new(v),
            Repr::Char(v) => Box::new(v),
            Repr::I8(v) => Box::new(v),
            Repr::I16(v) => Box::new(v),
            Repr::I32(v) => Box::new(v),
            Repr::I64(v) => Box::new(v),
            Repr::U8(v) => Box::new(v),
            Repr::U16(v) => Box::new(v),
            Repr::U32(v) => Box::new(v),
            Repr::U64(v) => Box::new(v),
            Repr::F32(v) => Box::new(v),
            Repr::F64(v) => Box::new(v),
            Repr::Str(v) => Box::new(v),
            Repr::Pointer { ptr, .. } => Box::new(ptr),
            Repr::Object { value, .. } => value.into_any(),
        };
        boxed.downcast::<T>().map(|v| *v).map_err(|_| Variant::new())
    }

    /// Address held by a pointer variant.
    pub fn as_ptr(&self) -> Option<ObjPtr> {
        match self.repr {
            Repr::Pointer { ptr, .. } => Some(ptr),
            _ => None,
        }
    }

    /// Address of the boxed object, for handing to member invokers.
    pub fn object_address(&self) -> Option<ObjPtr> {
        match &self.repr {
            Repr::Object { value, .. } => Some(value.address()),
            _ => None,
        }
    }

    pub fn is_nullptr(&self) -> bool {
        matches!(self.repr, Repr::Pointer { ptr, .. } if ptr.is_null())
    }

    pub fn is_array(&self) -> bool {
        matches!(&self.repr, Repr::Object { value, .. } if value.to_array().is_some())
    }

    /// Element view of a sequence-like payload.
    pub fn to_array(&self) -> Option<Vec<Variant>> {
        match &self.repr {
            Repr::Object { value, .. } => value.to_array(),
            _ => None,
        }
    }

    fn payload(&self) -> Option<&dyn Any> {
        let any: &dyn Any = match &self.repr {
            Repr::Empty => return None,
            Repr::Void => &(),
            Repr::Bool(v) => v,
            Repr::Char(v) => v,
            Repr::I8(v) => v,
            Repr::I16(v) => v,
            Repr::I32(v) => v,
            Repr::I64(v) => v,
            Repr::U8(v) => v,
            Repr::U16(v) => v,
            Repr::U32(v) => v,
            Repr::U64(v) => v,
            Repr::F32(v) => v,
            Repr::F64(v) => v,
            Repr::Str(v) => v,
            Repr::Pointer { ptr, .. } => ptr,
            Repr::Object { value, .. } => value.as_any(),
        };
        Some(any)
    }

    fn payload_mut(&mut self) -> Option<&mut dyn Any> {
        let any: &mut dyn Any = match &mut self.repr {
            Repr::Empty | Repr::Void => return None,
            Repr::Bool(v) => v,
            Repr::Char(v) => v,
            Repr::I8(v) => v,
            Repr::I16(v) => v,
            Repr::I32(v) => v,
            Repr::I64(v) => v,
            Repr::U8(v) => v,
            Repr::U16(v) => v,
            Repr::U32(v) => v,
            Repr::U64(v) => v,
            Repr::F32(v) => v,
            Repr::F64(v) => v,
            Repr::Str(v) => v,
            Repr::Pointer { ptr, .. } => ptr,
            Repr::Object { value, .. } => value.as_any_mut(),
        };
        Some(any)
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Empty => f.write_str("Variant(<empty>)"),
            Repr::Void => f.write_str("Variant(void)"),
            Repr::Bool(v) => write!(f, "Variant(bool: {v})"),
            Repr::Char(v) => write!(f, "Variant(char: {v:?})"),
            Repr::I8(v) => write!(f, "Variant(i8: {v})"),
            Repr::I16(v) => write!(f, "Variant(i16: {v})"),
            Repr::I32(v) => write!(f, "Variant(i32: {v})"),
            Repr::I64(v) => write!(f, "Variant(i64: {v})"),
            Repr::U8(v) => write!(f, "Variant(u8: {v})"),
            Repr::U16(v) => write!(f, "Variant(u16: {v})"),
            Repr::U32(v) => write!(f, "Variant(u32: {v})"),
            Repr::U64(v) => write!(f, "Variant(u64: {v})"),
            Repr::F32(v) => write!(f, "Variant(f32: {v})"),
            Repr::F64(v) => write!(f, "Variant(f64: {v})"),
            Repr::Str(v) => write!(f, "Variant(String: {v:?})"),
            Repr::Pointer { ty, ptr } => write!(f, "Variant({ty:?}: {ptr:?})"),
            Repr::Object { ty, value } => write!(f, "Variant({ty:?}: {value:?})"),
        }
    }
}

macro_rules! impl_from_builtin {
    ($($ty:ty => $arm:ident),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(value: $ty) -> Self {
                    Variant { repr: Repr::$arm(value) }
                }
            }
        )*
    };
}

impl_from_builtin! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => Str,
}

impl From<&str> for Variant {
    fn from(value: &str) -> Self {
        Variant {
            repr: Repr::Str(value.to_owned()),
        }
    }
}

impl From<()> for Variant {
    fn from((): ()) -> Self {
        Variant::void()
    }
}
