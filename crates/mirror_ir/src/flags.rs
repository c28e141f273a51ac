//! Per-type kind flags.
//!
//! `TypeFlags` are supplied once when a type is registered and stored in the
//! registry's flag column, enabling O(1) kind queries.
//!
//! # Design
//!
//! Flags are organized into categories:
//! - **Kind flags**: What sort of type is this (class, enum, array, ...)?
//! - **Pointer flags**: Which pointer-like shape does it have?
//! - **Number flags**: Arithmetic sub-kinds used by the conversion tables.

use bitflags::bitflags;

bitflags! {
    /// Pre-computed type properties for O(1) queries.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct TypeFlags: u32 {
        // === Kind Flags (bits 0-7) ===

        /// User-defined class/struct type; may have bases and members.
        const IS_CLASS = 1 << 0;
        /// Enumeration type.
        const IS_ENUM = 1 << 1;
        /// Array or sequence type exposing elements.
        const IS_ARRAY = 1 << 2;
        /// Wrapper type (smart pointer, reference wrapper).
        const IS_WRAPPER = 1 << 3;

        // === Pointer Flags (bits 8-15) ===

        /// Object pointer type (`T*`).
        const IS_POINTER = 1 << 8;
        /// Function pointer type.
        const IS_FUNCTION_POINTER = 1 << 9;
        /// Pointer to a data member.
        const IS_MEMBER_OBJECT_POINTER = 1 << 10;
        /// Pointer to a member function.
        const IS_MEMBER_FUNCTION_POINTER = 1 << 11;

        // === Number Flags (bits 16-23) ===

        /// Arithmetic type (bool, char, integers, floats).
        const IS_ARITHMETIC = 1 << 16;
        /// Signed integer.
        const IS_SIGNED = 1 << 17;
        /// Floating point.
        const IS_FLOAT = 1 << 18;
    }
}

impl TypeFlags {
    /// Flags shared by every pointer-like kind.
    pub const ANY_POINTER: Self = Self::from_bits_truncate(
        Self::IS_POINTER.bits()
            | Self::IS_FUNCTION_POINTER.bits()
            | Self::IS_MEMBER_OBJECT_POINTER.bits()
            | Self::IS_MEMBER_FUNCTION_POINTER.bits(),
    );

    /// Check if the type is a class.
    #[inline]
    pub const fn is_class(self) -> bool {
        self.contains(Self::IS_CLASS)
    }

    /// Check if the type is an enumeration.
    #[inline]
    pub const fn is_enum(self) -> bool {
        self.contains(Self::IS_ENUM)
    }

    /// Check if the type is arithmetic.
    #[inline]
    pub const fn is_arithmetic(self) -> bool {
        self.contains(Self::IS_ARITHMETIC)
    }

    /// Check if the type is any kind of pointer.
    #[inline]
    pub const fn is_pointer_like(self) -> bool {
        self.intersects(Self::ANY_POINTER)
    }

    /// Get the primary kind of a type based on its flags.
    #[inline]
    pub const fn kind(self) -> TypeKind {
        if self.contains(Self::IS_ARITHMETIC) {
            TypeKind::Arithmetic
        } else if self.contains(Self::IS_ENUM) {
            TypeKind::Enumeration
        } else if self.contains(Self::IS_ARRAY) {
            TypeKind::Array
        } else if self.intersects(Self::ANY_POINTER) {
            TypeKind::Pointer
        } else if self.contains(Self::IS_WRAPPER) {
            TypeKind::Wrapper
        } else if self.contains(Self::IS_CLASS) {
            TypeKind::Class
        } else {
            TypeKind::Other
        }
    }
}

/// Primary kind of a type, derived from [`TypeFlags`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Arithmetic,
    Enumeration,
    Array,
    Pointer,
    Wrapper,
    Class,
    /// Strings, void and anything else without a kind flag.
    Other,
}

impl Default for TypeFlags {
    fn default() -> Self {
        Self::empty()
    }
}
