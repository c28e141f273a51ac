//! Cast Engine vocabulary.
//!
//! A registered class carries one row of [`BaseEdge`]s per ancestor. Each
//! edge knows how to turn a pointer to the class into a pointer to that
//! ancestor: usually a constant byte offset, sometimes a user function, and
//! after transitive flattening a chain of both.
//!
//! Pointers cross the registry as [`ObjPtr`]: a plain address that is never
//! dereferenced outside of [`Registry::cast_ref`](crate::Registry::cast_ref).

use std::fmt;
use std::sync::Arc;

use mirror_ir::TypeId;

/// Type-erased object address.
///
/// `ObjPtr` carries no provenance and no lifetime; holding one does not keep
/// the object alive.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct ObjPtr(usize);

impl ObjPtr {
    /// The null address.
    pub const NULL: Self = Self(0);

    /// Address of a borrowed object.
    #[inline]
    pub fn from_ref<T: ?Sized>(value: &T) -> Self {
        Self((value as *const T).cast::<()>() as usize)
    }

    /// Address of a raw pointer.
    #[inline]
    pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr.cast::<()>() as usize)
    }

    #[inline]
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    #[inline]
    pub const fn addr(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Shift the address by `delta` bytes. Null stays null.
    #[inline]
    #[must_use]
    pub const fn byte_offset(self, delta: isize) -> Self {
        if self.is_null() {
            self
        } else {
            Self(self.0.wrapping_add_signed(delta))
        }
    }

    #[inline]
    pub fn as_ptr<T>(self) -> *const T {
        self.0 as *const T
    }
}

impl fmt::Debug for ObjPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjPtr({:#x})", self.0)
    }
}

/// How a pointer to a derived class becomes a pointer to one of its bases.
#[derive(Clone, Debug)]
pub enum Adjustment {
    /// Constant byte offset of the base sub-object.
    Offset(isize),
    /// User supplied conversion, for layouts an offset cannot describe.
    Custom(fn(ObjPtr) -> ObjPtr),
    /// Adjustments applied left to right; produced by flattening.
    Chain(Arc<[Adjustment]>),
}

impl Adjustment {
    /// The identity adjustment.
    pub const IDENTITY: Self = Self::Offset(0);

    pub fn apply(&self, ptr: ObjPtr) -> ObjPtr {
        match self {
            Self::Offset(delta) => ptr.byte_offset(*delta),
            Self::Custom(convert) => convert(ptr),
            Self::Chain(steps) => steps.iter().fold(ptr, |p, step| step.apply(p)),
        }
    }

    /// Compose `self` followed by `next`.
    ///
    /// Two offsets fold into one; anything else becomes a chain.
    #[must_use]
    pub fn then(&self, next: &Adjustment) -> Adjustment {
        match (self, next) {
            (Self::Offset(a), Self::Offset(b)) => Self::Offset(a.wrapping_add(*b)),
            (Self::Offset(0), other) | (other, Self::Offset(0)) => other.clone(),
            _ => {
                let mut steps = Vec::with_capacity(2);
                self.push_steps(&mut steps);
                next.push_steps(&mut steps);
                Self::Chain(steps.into())
            }
        }
    }

    fn push_steps(&self, steps: &mut Vec<Adjustment>) {
        match self {
            Self::Chain(inner) => steps.extend(inner.iter().cloned()),
            other => steps.push(other.clone()),
        }
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One declared base class of a type.
#[derive(Clone, Debug)]
pub struct BaseEdge {
    pub base: TypeId,
    pub adjust: Adjustment,
}

impl BaseEdge {
    pub fn new(base: TypeId, adjust: Adjustment) -> Self {
        BaseEdge { base, adjust }
    }

    /// Base sub-object located `offset` bytes into the derived object.
    ///
    /// Offsets come from `std::mem::offset_of!` and always fit in `isize`.
    #[allow(
        clippy::cast_possible_wrap,
        reason = "field offsets are bounded by isize::MAX"
    )]
    pub fn at_offset(base: TypeId, offset: usize) -> Self {
        BaseEdge {
            base,
            adjust: Adjustment::Offset(offset as isize),
        }
    }
}

/// Most-derived type and address of an object, as reported by its hook.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DerivedInfo {
    pub ty: TypeId,
    pub ptr: ObjPtr,
}

/// Per-type hook answering "what is this object really?".
///
/// Implemented for any `Fn(ObjPtr) -> DerivedInfo`, so closures over a
/// side table can be registered directly.
pub trait DerivedInfoProvider: Send + Sync {
    fn derived_info(&self, ptr: ObjPtr) -> DerivedInfo;
}

impl<F> DerivedInfoProvider for F
where
    F: Fn(ObjPtr) -> DerivedInfo + Send + Sync,
{
    fn derived_info(&self, ptr: ObjPtr) -> DerivedInfo {
        self(ptr)
    }
}
