//! Variant conversions.
//!
//! Resolution order for `convert_to(target)`:
//! 1. same type: clone
//! 2. builtin table: arithmetic to arithmetic (range checked), arithmetic to
//!    and from `String`
//! 3. single-level object pointers: through the Cast Engine
//! 4. a converter registered for `(raw source type, target)`
//! 5. enumerations to and from their names, and to and from arithmetic
//!    values through their underlying integers

use mirror_ir::TypeId;

use super::{Repr, Variant};
use crate::cast::ObjPtr;
use crate::error::{ReflectError, ReflectResult};
use crate::Registry;

/// Widest intermediate form of an arithmetic value.
#[derive(Copy, Clone, Debug)]
pub(super) enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    /// Truncates toward zero; non-finite floats have no integer value.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "saturating float to int cast, narrowed by try_from afterwards"
    )]
    fn to_int(self) -> Option<i128> {
        match self {
            Number::Int(value) => Some(value),
            Number::Float(value) if value.is_finite() => Some(value.trunc() as i128),
            Number::Float(_) => None,
        }
    }

    #[allow(clippy::cast_precision_loss, reason = "int to float is lossy by definition")]
    pub(super) fn to_float(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    fn is_nonzero(self) -> bool {
        match self {
            Number::Int(value) => value != 0,
            Number::Float(value) => value != 0.0,
        }
    }
}

macro_rules! narrow_int {
    ($number:expr, $ty:ty) => {
        $number
            .to_int()
            .and_then(|value| <$ty>::try_from(value).ok())
            .map(Variant::from)
    };
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "f64 to f32 keeps the nearest representable value"
)]
fn number_to_variant(number: Number, target: TypeId) -> Option<Variant> {
    match target {
        TypeId::BOOL => Some(Variant::from(number.is_nonzero())),
        TypeId::CHAR => number
            .to_int()
            .and_then(|value| u32::try_from(value).ok())
            .and_then(char::from_u32)
            .map(Variant::from),
        TypeId::I8 => narrow_int!(number, i8),
        TypeId::I16 => narrow_int!(number, i16),
        TypeId::I32 => narrow_int!(number, i32),
        TypeId::I64 => narrow_int!(number, i64),
        TypeId::U8 => narrow_int!(number, u8),
        TypeId::U16 => narrow_int!(number, u16),
        TypeId::U32 => narrow_int!(number, u32),
        TypeId::U64 => narrow_int!(number, u64),
        TypeId::F32 => Some(Variant::from(number.to_float() as f32)),
        TypeId::F64 => Some(Variant::from(number.to_float())),
        _ => None,
    }
}

/// `""`, `"0"` and `"false"` are false, ignoring case and surrounding
/// whitespace; everything else is true.
fn string_to_bool(text: &str) -> bool {
    let text = text.trim();
    !(text.is_empty() || text == "0" || text.eq_ignore_ascii_case("false"))
}

fn parse_builtin(text: &str, target: TypeId) -> Option<Variant> {
    match target {
        TypeId::BOOL => Some(Variant::from(string_to_bool(text))),
        TypeId::CHAR => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Variant::from(c)),
                _ => None,
            }
        }
        TypeId::F32 => text.trim().parse::<f32>().ok().map(Variant::from),
        TypeId::F64 => text.trim().parse::<f64>().ok().map(Variant::from),
        _ if target.is_arithmetic() => {
            let value = text.trim().parse::<i128>().ok()?;
            number_to_variant(Number::Int(value), target)
        }
        _ => None,
    }
}

macro_rules! typed_conversions {
    ($($name:ident => $ty:ty, $id:ident;)*) => {
        $(
            #[doc = concat!("Builtin conversion to `", stringify!($ty), "`.")]
            pub fn $name(&self) -> Option<$ty> {
                self.convert_builtin(TypeId::$id)?.into_value::<$ty>().ok()
            }
        )*
    };
}

impl Variant {
    pub(super) fn as_number(&self) -> Option<Number> {
        Some(match self.repr {
            Repr::Bool(v) => Number::Int(i128::from(v)),
            Repr::Char(v) => Number::Int(i128::from(u32::from(v))),
            Repr::I8(v) => Number::Int(i128::from(v)),
            Repr::I16(v) => Number::Int(i128::from(v)),
            Repr::I32(v) => Number::Int(i128::from(v)),
            Repr::I64(v) => Number::Int(i128::from(v)),
            Repr::U8(v) => Number::Int(i128::from(v)),
            Repr::U16(v) => Number::Int(i128::from(v)),
            Repr::U32(v) => Number::Int(i128::from(v)),
            Repr::U64(v) => Number::Int(i128::from(v)),
            Repr::F32(v) => Number::Float(f64::from(v)),
            Repr::F64(v) => Number::Float(v),
            _ => return None,
        })
    }

    fn builtin_string(&self) -> Option<String> {
        Some(match &self.repr {
            Repr::Bool(v) => v.to_string(),
            Repr::Char(v) => v.to_string(),
            Repr::I8(v) => v.to_string(),
            Repr::I16(v) => v.to_string(),
            Repr::I32(v) => v.to_string(),
            Repr::I64(v) => v.to_string(),
            Repr::U8(v) => v.to_string(),
            Repr::U16(v) => v.to_string(),
            Repr::U32(v) => v.to_string(),
            Repr::U64(v) => v.to_string(),
            Repr::F32(v) => v.to_string(),
            Repr::F64(v) => v.to_string(),
            Repr::Str(v) => v.clone(),
            _ => return None,
        })
    }

    /// Conversions that need no registry: arithmetic and string builtins.
    pub(crate) fn convert_builtin(&self, target: TypeId) -> Option<Variant> {
        if target == TypeId::STRING {
            return self.builtin_string().map(Variant::from);
        }
        if let Some(number) = self.as_number() {
            return number_to_variant(number, target);
        }
        match &self.repr {
            Repr::Str(text) => parse_builtin(text, target),
            _ => None,
        }
    }

    typed_conversions! {
        to_bool => bool, BOOL;
        to_char => char, CHAR;
        to_i8 => i8, I8;
        to_i16 => i16, I16;
        to_i32 => i32, I32;
        to_i64 => i64, I64;
        to_u8 => u8, U8;
        to_u16 => u16, U16;
        to_u32 => u32, U32;
        to_u64 => u64, U64;
        to_f32 => f32, F32;
        to_f64 => f64, F64;
        to_string_value => String, STRING;
    }

    /// Whether a value of this variant's type can in principle be converted
    /// to `target`. Parsing may still fail for a particular string.
    pub fn can_convert(&self, registry: &Registry, target: TypeId) -> bool {
        let source = self.get_type();
        if !source.is_valid() || !target.is_valid() {
            return false;
        }
        if source == target {
            return true;
        }
        let textual = |ty: TypeId| ty.is_arithmetic() || ty == TypeId::STRING;
        if textual(source) && textual(target) {
            return true;
        }
        if registry.pointer_dimension(source) == 1
            && registry.pointer_dimension(target) == 1
            && (registry.is_derived_from(source, target)
                || registry.is_derived_from(target, source))
        {
            return true;
        }
        if registry.get_converter(source, target).is_some() {
            return true;
        }
        let enum_facing = |ty: TypeId| ty == TypeId::STRING || ty.is_arithmetic();
        (enum_facing(target) && registry.get_enumeration(source).is_some())
            || (enum_facing(source) && registry.get_enumeration(target).is_some())
    }

    /// Convert to `target`, leaving `self` untouched.
    pub fn convert_to(&self, registry: &Registry, target: TypeId) -> Option<Variant> {
        let source = self.get_type();
        if !source.is_valid() || !target.is_valid() {
            return None;
        }
        if source == target {
            return Some(self.clone());
        }
        if let Some(converted) = self.convert_builtin(target) {
            return Some(converted);
        }
        if let Repr::Pointer { ty, ptr } = self.repr {
            if let Some(converted) = convert_pointer(registry, ty, ptr, target) {
                return Some(converted);
            }
        }
        if let Some(converter) = registry.get_converter(source, target) {
            if let Some(converted) = converter.convert(self) {
                return Some(converted);
            }
        }
        self.convert_enumeration(registry, target)
    }

    pub fn try_convert(&self, registry: &Registry, target: TypeId) -> ReflectResult<Variant> {
        self.convert_to(registry, target)
            .ok_or(ReflectError::ConversionFailure {
                from: self.get_type(),
                to: target,
            })
    }

    /// Convert in place. On failure `self` is left unchanged.
    pub fn convert(&mut self, registry: &Registry, target: TypeId) -> bool {
        match self.convert_to(registry, target) {
            Some(converted) => {
                *self = converted;
                true
            }
            None => false,
        }
    }

    /// Enum values convert to their names and, through their underlying
    /// integer, to any arithmetic type; names and numbers convert back.
    fn convert_enumeration(&self, registry: &Registry, target: TypeId) -> Option<Variant> {
        if let Some(enumeration) = registry.get_enumeration(self.get_type()) {
            if target == TypeId::STRING {
                return enumeration.value_to_name(self).map(Variant::from);
            }
            if target.is_arithmetic() {
                return enumeration
                    .value_to_underlying(self)?
                    .convert_builtin(target);
            }
            return None;
        }
        let enumeration = registry.get_enumeration(target)?;
        let value = match &self.repr {
            Repr::Str(name) => enumeration.name_to_value(name),
            _ if self.get_type().is_arithmetic() => enumeration.underlying_to_value(self),
            _ => None,
        };
        value.filter(Variant::is_valid)
    }
}

fn convert_pointer(
    registry: &Registry,
    source: TypeId,
    ptr: ObjPtr,
    target: TypeId,
) -> Option<Variant> {
    if registry.pointer_dimension(source) != 1 || registry.pointer_dimension(target) != 1 {
        return None;
    }
    if ptr.is_null() {
        let related =
            registry.is_derived_from(source, target) || registry.is_derived_from(target, source);
        return related
            .then(|| registry.create_variant(target, ObjPtr::NULL))
            .filter(Variant::is_valid);
    }
    let cast = registry.apply_offset(ptr, source, target);
    if cast.is_null() {
        return None;
    }
    Some(registry.create_variant(target, cast)).filter(Variant::is_valid)
}
