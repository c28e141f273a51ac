//! Variant comparison.
//!
//! Comparisons answer `Some(bool)` or `None` when the two values cannot be
//! compared at all; "not comparable" is never reported as `false`.
//!
//! Order of attempts:
//! 1. both arithmetic: numeric comparison, floats approximately
//! 2. same type: the type's own comparison
//! 3. equality converts the right side to the left side's type and the left
//!    side to the right side's type; the values are equal if either
//!    direction finds them equal. Ordering converts the left side only.
//! 4. a null pointer on the right: equal only to another null pointer, and
//!    no non-null value is less than it
//! 5. both sides convertible to `String`: compare the strings

use mirror_ir::TypeId;

use super::convert::Number;
use super::{Repr, Variant};
use crate::Registry;

/// Relative float equality with a 1e-12 tolerance; exact equality always
/// counts, which also covers matching infinities.
#[allow(clippy::float_cmp, reason = "exact equality short-circuits the tolerance check")]
pub(crate) fn almost_equal(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() * 1e12 <= a.abs().min(b.abs())
}

#[derive(Copy, Clone)]
enum Op {
    Equal,
    Less,
}

impl Variant {
    /// Equality across types. Two empty variants are equal; an empty and a
    /// valid one are not.
    pub fn compare_equal(&self, other: &Variant, registry: &Registry) -> Option<bool> {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => return Some(true),
            (true, false) | (false, true) => return Some(false),
            (true, true) => {}
        }
        self.compare(other, registry, Op::Equal)
    }

    /// Strict ordering across types. Empty variants are not ordered.
    pub fn compare_less(&self, other: &Variant, registry: &Registry) -> Option<bool> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }
        self.compare(other, registry, Op::Less)
    }

    /// Equal or less.
    pub fn le(&self, other: &Variant, registry: &Registry) -> Option<bool> {
        if self.compare_equal(other, registry) == Some(true) {
            return Some(true);
        }
        self.compare_less(other, registry)
    }

    /// Neither equal nor less, so values within the float tolerance are
    /// never greater than each other.
    pub fn gt(&self, other: &Variant, registry: &Registry) -> Option<bool> {
        let equal = self.compare_equal(other, registry)?;
        let less = self.compare_less(other, registry)?;
        Some(!equal && !less)
    }

    /// Equal or not less. Empty variants are not ordered.
    pub fn ge(&self, other: &Variant, registry: &Registry) -> Option<bool> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }
        if self.compare_equal(other, registry) == Some(true) {
            return Some(true);
        }
        self.compare_less(other, registry).map(|less| !less)
    }

    /// Arithmetic or same-type comparison, without consulting a registry.
    pub(crate) fn equals_direct(&self, other: &Variant) -> Option<bool> {
        self.compare_direct(other, Op::Equal)
    }

    fn compare(&self, other: &Variant, registry: &Registry, op: Op) -> Option<bool> {
        if let Some(result) = self.compare_direct(other, op) {
            return Some(result);
        }
        if self.get_type() != other.get_type() {
            let converted = match op {
                Op::Equal => self.equal_after_conversion(other, registry),
                Op::Less => self
                    .convert_to(registry, other.get_type())
                    .and_then(|lhs| lhs.compare_direct(other, op)),
            };
            if converted.is_some() {
                return converted;
            }
            if other.is_nullptr() {
                match op {
                    Op::Equal => return Some(self.is_nullptr()),
                    Op::Less if !self.is_nullptr() => return Some(false),
                    Op::Less => {}
                }
            }
        }
        let lhs = self.convert_to(registry, TypeId::STRING)?;
        let rhs = other.convert_to(registry, TypeId::STRING)?;
        lhs.compare_direct(&rhs, op)
    }

    /// Both conversion directions, right side first. Symmetric in its
    /// arguments: `Some(true)` when either direction finds the values equal.
    fn equal_after_conversion(&self, other: &Variant, registry: &Registry) -> Option<bool> {
        let rhs_converted = other
            .convert_to(registry, self.get_type())
            .and_then(|rhs| self.compare_direct(&rhs, Op::Equal));
        if rhs_converted == Some(true) {
            return rhs_converted;
        }
        let lhs_converted = self
            .convert_to(registry, other.get_type())
            .and_then(|lhs| lhs.compare_direct(other, Op::Equal));
        lhs_converted.or(rhs_converted)
    }

    fn compare_direct(&self, other: &Variant, op: Op) -> Option<bool> {
        if let (Some(lhs), Some(rhs)) = (self.as_number(), other.as_number()) {
            return Some(compare_numbers(lhs, rhs, op));
        }
        match (&self.repr, &other.repr) {
            (Repr::Void, Repr::Void) => Some(matches!(op, Op::Equal)),
            (Repr::Str(a), Repr::Str(b)) => Some(match op {
                Op::Equal => a == b,
                Op::Less => a < b,
            }),
            (Repr::Pointer { ty: ta, ptr: a }, Repr::Pointer { ty: tb, ptr: b }) if ta == tb => {
                Some(match op {
                    Op::Equal => a == b,
                    Op::Less => a < b,
                })
            }
            (Repr::Object { ty: ta, value: a }, Repr::Object { ty: tb, value: b }) if ta == tb => {
                match op {
                    Op::Equal => a.compare_equal(&**b),
                    Op::Less => a.compare_less(&**b),
                }
            }
            _ => None,
        }
    }
}

fn compare_numbers(lhs: Number, rhs: Number, op: Op) -> bool {
    match (lhs, rhs, op) {
        (Number::Int(a), Number::Int(b), Op::Equal) => a == b,
        (Number::Int(a), Number::Int(b), Op::Less) => a < b,
        (a, b, op) => {
            let (a, b) = (a.to_float(), b.to_float());
            match op {
                Op::Equal => almost_equal(a, b),
                Op::Less => a < b,
            }
        }
    }
}
