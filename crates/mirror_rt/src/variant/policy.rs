//! Per-type behaviour of boxed variant payloads.
//!
//! Every Rust type stored in a [`Variant`] object slot implements
//! [`Reflect`]. The blanket [`Policy`] impl turns that into the object-safe
//! operation set the variant dispatches through: clone, downcast, compare,
//! element view and address.

use std::any::Any;
use std::fmt;

use dyn_clone::DynClone;

use crate::cast::ObjPtr;
use crate::Variant;

/// A Rust type that can live inside a [`Variant`].
///
/// Comparison and element access are opt-in: the defaults report the
/// operation as unsupported, which surfaces as `None` from
/// [`Variant::compare_equal`] and friends.
pub trait Reflect: Any + Clone + fmt::Debug + Send + Sync {
    fn reflect_eq(&self, _other: &Self) -> Option<bool> {
        None
    }

    fn reflect_lt(&self, _other: &Self) -> Option<bool> {
        None
    }

    /// Elements of a sequence-like value.
    fn reflect_elements(&self) -> Option<Vec<Variant>> {
        None
    }
}

impl Reflect for Vec<Variant> {
    fn reflect_elements(&self) -> Option<Vec<Variant>> {
        Some(self.clone())
    }
}

pub(crate) trait Policy: DynClone + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn compare_equal(&self, other: &dyn Policy) -> Option<bool>;
    fn compare_less(&self, other: &dyn Policy) -> Option<bool>;
    fn to_array(&self) -> Option<Vec<Variant>>;
    fn address(&self) -> ObjPtr;
}

dyn_clone::clone_trait_object!(Policy);

impl<T: Reflect> Policy for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn compare_equal(&self, other: &dyn Policy) -> Option<bool> {
        other
            .as_any()
            .downcast_ref::<T>()
            .and_then(|other| self.reflect_eq(other))
    }

    fn compare_less(&self, other: &dyn Policy) -> Option<bool> {
        other
            .as_any()
            .downcast_ref::<T>()
            .and_then(|other| self.reflect_lt(other))
    }

    fn to_array(&self) -> Option<Vec<Variant>> {
        self.reflect_elements()
    }

    fn address(&self) -> ObjPtr {
        ObjPtr::from_ref(self)
    }
}
