//! Dense type identifier.
//!
//! `TypeId` is the handle every registry column is indexed by.
//!
//! # Design
//!
//! - 32-bit dense indices, assigned in registration order
//! - Id 0 is the permanently invalid sentinel; its registry row holds
//!   neutral values so lookups never branch on existence
//! - Builtin payload types have fixed ids (1-14) so a `Variant` can report
//!   its type without a registry
//! - Ids are process-local: never persist or transmit them

use std::fmt;

/// A 32-bit index into the type registry.
///
/// Types are compared by index equality, never structurally.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// The invalid type. Every lookup miss resolves to this id.
    pub const INVALID: Self = Self(0);

    // === Builtin Types (indices 1-14) ===
    // Pre-registered by every registry at these fixed indices.

    /// The unit type `()`.
    pub const VOID: Self = Self(1);
    /// `bool`.
    pub const BOOL: Self = Self(2);
    /// `char`.
    pub const CHAR: Self = Self(3);
    /// `i8`.
    pub const I8: Self = Self(4);
    /// `i16`.
    pub const I16: Self = Self(5);
    /// `i32`.
    pub const I32: Self = Self(6);
    /// `i64`.
    pub const I64: Self = Self(7);
    /// `u8`.
    pub const U8: Self = Self(8);
    /// `u16`.
    pub const U16: Self = Self(9);
    /// `u32`.
    pub const U32: Self = Self(10);
    /// `u64`.
    pub const U64: Self = Self(11);
    /// `f32`.
    pub const F32: Self = Self(12);
    /// `f64`.
    pub const F64: Self = Self(13);
    /// `String`.
    pub const STRING: Self = Self(14);

    /// Number of builtin types (excluding the invalid sentinel).
    pub const BUILTIN_COUNT: u32 = 14;

    /// First index handed out to user registrations.
    pub const FIRST_DYNAMIC: u32 = Self::BUILTIN_COUNT + 1;

    /// All builtin ids in index order.
    pub const BUILTINS: [Self; Self::BUILTIN_COUNT as usize] = [
        Self::VOID,
        Self::BOOL,
        Self::CHAR,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::STRING,
    ];

    /// Create an id from a raw index.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw index.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into registry columns.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Check if this is anything but the invalid sentinel.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Check if this is one of the pre-registered builtin types.
    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 != 0 && self.0 < Self::FIRST_DYNAMIC
    }

    /// Check if this is a builtin arithmetic type (`bool`, `char` and the
    /// integer and float widths).
    #[inline]
    pub const fn is_arithmetic(self) -> bool {
        self.0 >= Self::BOOL.0 && self.0 <= Self::F64.0
    }

    /// Check if this is `f32` or `f64`.
    #[inline]
    pub const fn is_floating_point(self) -> bool {
        self.0 == Self::F32.0 || self.0 == Self::F64.0
    }

    /// Get the name of a builtin type.
    ///
    /// Returns `None` for the invalid id and for user registrations, which
    /// need a registry to render their names.
    #[inline]
    pub const fn builtin_name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("()"),
            2 => Some("bool"),
            3 => Some("char"),
            4 => Some("i8"),
            5 => Some("i16"),
            6 => Some("i32"),
            7 => Some("i64"),
            8 => Some("u8"),
            9 => Some("u16"),
            10 => Some("u32"),
            11 => Some("u64"),
            12 => Some("f32"),
            13 => Some("f64"),
            14 => Some("String"),
            _ => None,
        }
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => write!(f, "TypeId({name})"),
            None if self.is_valid() => write!(f, "TypeId({})", self.0),
            None => write!(f, "TypeId::INVALID"),
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin_name() {
            Some(name) => f.write_str(name),
            None if self.is_valid() => write!(f, "type#{}", self.0),
            None => f.write_str("<invalid>"),
        }
    }
}

// Compile-time size assertion: TypeId must be exactly 4 bytes
const _: () = assert!(std::mem::size_of::<TypeId>() == 4);
