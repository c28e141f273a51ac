//! Type registry.
//!
//! The registry owns every piece of reflection data: the columnar type
//! table, the flattened inheritance rows, member tables, metadata and
//! converters. It is append-only; registering a name twice hands back the
//! first id and ignores the rest of the second registration.
//!
//! # Thread Safety
//!
//! All state sits behind one `parking_lot::RwLock`. Registration takes the
//! write lock; lookups take the read lock and return owned ids or `Arc`
//! handles, never references into the tables.
//!
//! # Builtins
//!
//! A new registry already holds `()`, `bool`, `char`, the fixed-width
//! integers, `f32`, `f64` and `String` at the ids named on
//! [`TypeId`](mirror_ir::TypeId).

mod hierarchy;
mod members;
mod table;

use std::sync::Arc;

use mirror_ir::{TypeFlags, TypeId, TypeKind};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::cast::ObjPtr;
use crate::config::RegistryConfig;
use crate::converter::TypeConverter;
use crate::error::{ReflectError, ReflectResult};
use crate::member::{Constructor, Destructor, Enumeration, Method, Property};
use crate::metadata::{Metadata, MetadataKey, MetadataList};
use crate::Variant;

use members::MemberTable;
pub use table::{TypeRegistration, VariantCtorFn};
use table::TypeTable;

/// A registry shared between threads.
pub type SharedRegistry = Arc<Registry>;

pub struct Registry {
    db: RwLock<Database>,
}

struct Database {
    types: TypeTable,
    methods: MemberTable<Method>,
    properties: MemberTable<Property>,
    constructors: MemberTable<Constructor>,
    destructors: FxHashMap<TypeId, Arc<Destructor>>,
    enumerations: FxHashMap<TypeId, Arc<Enumeration>>,
    metadata: FxHashMap<TypeId, MetadataList>,
    converters: FxHashMap<(TypeId, TypeId), TypeConverter>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let mut db = Database {
            types: TypeTable::with_capacity(config.type_capacity),
            methods: MemberTable::with_capacity(config.member_capacity),
            properties: MemberTable::with_capacity(config.member_capacity),
            constructors: MemberTable::with_capacity(config.member_capacity),
            destructors: FxHashMap::default(),
            enumerations: FxHashMap::default(),
            metadata: FxHashMap::default(),
            converters: FxHashMap::default(),
        };
        db.register_builtins();
        Registry {
            db: RwLock::new(db),
        }
    }

    /// A new registry wrapped for sharing.
    pub fn shared() -> SharedRegistry {
        Arc::new(Self::new())
    }

    // --- Registration ---

    /// Register a type, or return the id already registered under its name.
    pub fn register_type(&self, reg: TypeRegistration) -> TypeId {
        self.db.write().register_type(reg).unwrap_or_else(|existing| existing)
    }

    /// Like [`Registry::register_type`], but reports a name that is already
    /// taken instead of absorbing the registration.
    pub fn try_register_type(&self, reg: TypeRegistration) -> ReflectResult<TypeId> {
        let name = reg.name.clone();
        self.db
            .write()
            .register_type(reg)
            .map_err(|existing| ReflectError::RegistrationConflict { name, existing })
    }

    /// Register the Rust type `T` as a class named `name`.
    pub fn register<T: 'static>(&self, name: &str) -> TypeId {
        self.register_type(TypeRegistration::of::<T>(name).flags(TypeFlags::IS_CLASS))
    }

    /// Register (or find) the single-level object pointer type to `raw`,
    /// named `"<raw name>*"`.
    pub fn pointer_type(&self, raw: TypeId) -> TypeId {
        let raw = self.raw_type(raw);
        if !raw.is_valid() {
            return TypeId::INVALID;
        }
        let name = format!("{}*", self.name(raw));
        self.register_type(
            TypeRegistration::new(name)
                .raw(raw)
                .array_raw(raw)
                .size(std::mem::size_of::<usize>())
                .flags(TypeFlags::IS_POINTER)
                .pointer_dimension(1)
                .variant_ctor(Variant::pointer),
        )
    }

    /// Give `ty` a display name; pointer and array types built on `ty` are
    /// renamed along with it.
    pub fn register_custom_name(&self, ty: TypeId, name: &str) {
        if !ty.is_valid() {
            return;
        }
        self.db.write().types.set_custom_name(ty, name);
    }

    /// Attach metadata to a type. Keys already present keep their value.
    pub fn register_metadata(&self, ty: TypeId, items: impl IntoIterator<Item = Metadata>) {
        if !ty.is_valid() {
            return;
        }
        self.db.write().metadata.entry(ty).or_default().extend(items);
    }

    /// Register a converter from `source` to the converter's target type.
    /// The first converter for a pair wins.
    pub fn register_converter(&self, source: TypeId, converter: TypeConverter) {
        if !source.is_valid() || !converter.target().is_valid() {
            return;
        }
        let mut db = self.db.write();
        let key = (db.types.raw_type(source), converter.target());
        if db.converters.contains_key(&key) {
            trace!(source = %key.0, target = %key.1, "converter already registered");
            return;
        }
        db.converters.insert(key, converter);
    }

    // --- Lookup ---

    /// Id of the type whose display name is `name`; invalid when unknown.
    pub fn get_by_name(&self, name: &str) -> TypeId {
        self.db
            .read()
            .types
            .by_custom_name(name)
            .unwrap_or(TypeId::INVALID)
    }

    pub fn try_get_by_name(&self, name: &str) -> ReflectResult<TypeId> {
        let id = self.get_by_name(name);
        if id.is_valid() {
            Ok(id)
        } else {
            Err(ReflectError::NotRegistered {
                name: name.to_owned(),
            })
        }
    }

    /// Id registered for the Rust type `T`; invalid when unknown.
    pub fn type_of<T: 'static>(&self) -> TypeId {
        self.db
            .read()
            .types
            .by_rust_type(std::any::TypeId::of::<T>())
            .unwrap_or(TypeId::INVALID)
    }

    /// Every registered type, in registration order.
    pub fn get_types(&self) -> Vec<TypeId> {
        self.db.read().types.ids().collect()
    }

    pub fn type_count(&self) -> usize {
        self.db.read().types.len() - 1
    }

    // --- Columns ---

    /// Name the type was registered with; empty for invalid ids.
    pub fn name(&self, ty: TypeId) -> String {
        self.db.read().types.name(ty).to_owned()
    }

    /// Display name, after custom names are applied.
    pub fn custom_name(&self, ty: TypeId) -> String {
        self.db.read().types.custom_name(ty).to_owned()
    }

    pub fn raw_type(&self, ty: TypeId) -> TypeId {
        self.db.read().types.raw_type(ty)
    }

    pub fn wrapped_type(&self, ty: TypeId) -> TypeId {
        self.db.read().types.wrapped_type(ty)
    }

    pub fn array_raw_type(&self, ty: TypeId) -> TypeId {
        self.db.read().types.array_raw_type(ty)
    }

    pub fn size_of(&self, ty: TypeId) -> usize {
        self.db.read().types.size_of(ty)
    }

    pub fn flags(&self, ty: TypeId) -> TypeFlags {
        self.db.read().types.flags(ty)
    }

    pub fn kind(&self, ty: TypeId) -> TypeKind {
        self.flags(ty).kind()
    }

    pub fn pointer_dimension(&self, ty: TypeId) -> u8 {
        self.db.read().types.pointer_dimension(ty)
    }

    pub fn is_class(&self, ty: TypeId) -> bool {
        self.flags(ty).is_class()
    }

    pub fn is_enumeration(&self, ty: TypeId) -> bool {
        self.flags(ty).is_enum()
    }

    pub fn is_array(&self, ty: TypeId) -> bool {
        self.flags(ty).contains(TypeFlags::IS_ARRAY)
    }

    pub fn is_pointer(&self, ty: TypeId) -> bool {
        self.flags(ty).contains(TypeFlags::IS_POINTER)
    }

    pub fn is_arithmetic(&self, ty: TypeId) -> bool {
        self.flags(ty).is_arithmetic()
    }

    pub fn is_wrapper(&self, ty: TypeId) -> bool {
        self.flags(ty).contains(TypeFlags::IS_WRAPPER)
    }

    pub fn is_function_pointer(&self, ty: TypeId) -> bool {
        self.flags(ty).contains(TypeFlags::IS_FUNCTION_POINTER)
    }

    pub fn is_member_object_pointer(&self, ty: TypeId) -> bool {
        self.flags(ty).contains(TypeFlags::IS_MEMBER_OBJECT_POINTER)
    }

    pub fn is_member_function_pointer(&self, ty: TypeId) -> bool {
        self.flags(ty).contains(TypeFlags::IS_MEMBER_FUNCTION_POINTER)
    }

    /// Metadata value attached to `ty` under `key`; empty when absent.
    pub fn get_metadata(&self, ty: TypeId, key: impl Into<MetadataKey>) -> Variant {
        let key = key.into();
        self.db
            .read()
            .metadata
            .get(&ty)
            .and_then(|list| list.get(&key))
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_converter(&self, source: TypeId, target: TypeId) -> Option<TypeConverter> {
        let db = self.db.read();
        let key = (db.types.raw_type(source), target);
        db.converters.get(&key).cloned()
    }

    /// Variant holding `ptr` as a value of the pointer type `ty`, built by
    /// the type's registered constructor; empty when it has none.
    pub fn create_variant(&self, ty: TypeId, ptr: ObjPtr) -> Variant {
        let db = self.db.read();
        match db.types.variant_ctor(ty) {
            Some(ctor) => ctor(ty, ptr),
            None if db.types.flags(ty).contains(TypeFlags::IS_POINTER) => Variant::pointer(ty, ptr),
            None => Variant::new(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.type_count())
            .finish_non_exhaustive()
    }
}

impl Database {
    /// `Err` carries the id already registered under the same name.
    fn register_type(&mut self, mut reg: TypeRegistration) -> Result<TypeId, TypeId> {
        if let Some(existing) = self.types.lookup_orig(&reg.name) {
            trace!(name = %reg.name, id = %existing, "type already registered");
            return Err(existing);
        }
        let bases = std::mem::take(&mut reg.bases);
        let id = self.types.insert(&mut reg);
        debug!(name = self.types.name(id), %id, "registered type");

        if !bases.is_empty() {
            if self.types.raw_type(id) == id {
                self.register_base_class_info(id, &bases);
            } else {
                trace!(%id, "base classes ignored on a non-raw type");
            }
        }
        Ok(id)
    }

    fn register_builtins(&mut self) {
        let arith = TypeFlags::IS_ARITHMETIC;
        let signed = arith | TypeFlags::IS_SIGNED;
        let float = signed | TypeFlags::IS_FLOAT;
        let builtins = [
            TypeRegistration::of::<()>("()"),
            TypeRegistration::of::<bool>("bool").flags(arith),
            TypeRegistration::of::<char>("char").flags(arith),
            TypeRegistration::of::<i8>("i8").flags(signed),
            TypeRegistration::of::<i16>("i16").flags(signed),
            TypeRegistration::of::<i32>("i32").flags(signed),
            TypeRegistration::of::<i64>("i64").flags(signed),
            TypeRegistration::of::<u8>("u8").flags(arith),
            TypeRegistration::of::<u16>("u16").flags(arith),
            TypeRegistration::of::<u32>("u32").flags(arith),
            TypeRegistration::of::<u64>("u64").flags(arith),
            TypeRegistration::of::<f32>("f32").flags(float),
            TypeRegistration::of::<f64>("f64").flags(float),
            TypeRegistration::of::<String>("String"),
        ];
        for (reg, expected) in builtins.into_iter().zip(TypeId::BUILTINS) {
            let id = self.register_type(reg).unwrap_or_else(|existing| existing);
            debug_assert_eq!(id, expected, "builtin registered out of order");
        }
    }
}

#[cfg(test)]
mod tests;
