//! Columnar type storage.
//!
//! Every per-type attribute lives in its own `Vec`, indexed by
//! `TypeId::index()`. Row 0 is the invalid type; ids that were never handed
//! out resolve to it, so column reads never fail.

use std::sync::Arc;

use mirror_ir::{derive_name, normalize_name, TypeFlags, TypeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::cast::{Adjustment, BaseEdge, DerivedInfoProvider, ObjPtr};
use crate::Variant;

/// Builds the variant for a pointer of the given type.
pub type VariantCtorFn = fn(TypeId, ObjPtr) -> Variant;

/// Everything known about a type at registration time.
pub struct TypeRegistration {
    pub(crate) name: String,
    pub(crate) raw: TypeId,
    pub(crate) wrapped: TypeId,
    pub(crate) array_raw: TypeId,
    pub(crate) bases: Vec<BaseEdge>,
    pub(crate) derived_info: Option<Arc<dyn DerivedInfoProvider>>,
    pub(crate) variant_ctor: Option<VariantCtorFn>,
    pub(crate) size: usize,
    pub(crate) flags: TypeFlags,
    pub(crate) pointer_dimension: u8,
    pub(crate) rust_type: Option<std::any::TypeId>,
}

impl TypeRegistration {
    /// A type that is its own raw type, with no bases and no flags.
    pub fn new(name: impl Into<String>) -> Self {
        TypeRegistration {
            name: name.into(),
            raw: TypeId::INVALID,
            wrapped: TypeId::INVALID,
            array_raw: TypeId::INVALID,
            bases: Vec::new(),
            derived_info: None,
            variant_ctor: None,
            size: 0,
            flags: TypeFlags::empty(),
            pointer_dimension: 0,
            rust_type: None,
        }
    }

    /// Registration bound to the Rust type `T`, so that
    /// [`Registry::type_of`](crate::Registry::type_of) finds it.
    pub fn of<T: 'static>(name: impl Into<String>) -> Self {
        let mut reg = Self::new(name);
        reg.size = std::mem::size_of::<T>();
        reg.rust_type = Some(std::any::TypeId::of::<T>());
        reg
    }

    /// Type with qualifiers and pointers stripped. Defaults to the type
    /// itself.
    #[must_use]
    pub fn raw(mut self, raw: TypeId) -> Self {
        self.raw = raw;
        self
    }

    #[must_use]
    pub fn wrapped(mut self, wrapped: TypeId) -> Self {
        self.wrapped = wrapped;
        self
    }

    /// Element type with all array and pointer layers stripped; custom
    /// names of that type are derived onto this one.
    #[must_use]
    pub fn array_raw(mut self, array_raw: TypeId) -> Self {
        self.array_raw = array_raw;
        self
    }

    #[must_use]
    pub fn base(mut self, edge: BaseEdge) -> Self {
        self.bases.push(edge);
        self
    }

    #[must_use]
    pub fn bases(mut self, edges: impl IntoIterator<Item = BaseEdge>) -> Self {
        self.bases.extend(edges);
        self
    }

    #[must_use]
    pub fn derived_info(mut self, provider: impl DerivedInfoProvider + 'static) -> Self {
        self.derived_info = Some(Arc::new(provider));
        self
    }

    #[must_use]
    pub fn variant_ctor(mut self, ctor: VariantCtorFn) -> Self {
        self.variant_ctor = Some(ctor);
        self
    }

    #[must_use]
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn pointer_dimension(mut self, dimension: u8) -> Self {
        self.pointer_dimension = dimension;
        self
    }
}

/// One flattened inheritance edge: an ancestor and how to reach it.
#[derive(Clone, Debug)]
pub(crate) struct BaseSlot {
    pub base: TypeId,
    pub adjust: Adjustment,
}

pub(crate) type BaseRow = SmallVec<[BaseSlot; 4]>;
pub(crate) type DerivedRow = SmallVec<[TypeId; 4]>;

pub(crate) struct TypeTable {
    orig_names: Vec<String>,
    custom_names: Vec<String>,
    raw: Vec<TypeId>,
    wrapped: Vec<TypeId>,
    array_raw: Vec<TypeId>,
    sizes: Vec<usize>,
    flags: Vec<TypeFlags>,
    pointer_dims: Vec<u8>,
    variant_ctors: Vec<Option<VariantCtorFn>>,
    derived_info: Vec<Option<Arc<dyn DerivedInfoProvider>>>,
    pub(crate) base_rows: Vec<BaseRow>,
    pub(crate) derived_rows: Vec<DerivedRow>,
    orig_index: FxHashMap<String, TypeId>,
    custom_index: FxHashMap<String, TypeId>,
    rust_types: FxHashMap<std::any::TypeId, TypeId>,
}

impl TypeTable {
    pub fn with_capacity(capacity: usize) -> Self {
        let mut table = TypeTable {
            orig_names: Vec::with_capacity(capacity),
            custom_names: Vec::with_capacity(capacity),
            raw: Vec::with_capacity(capacity),
            wrapped: Vec::with_capacity(capacity),
            array_raw: Vec::with_capacity(capacity),
            sizes: Vec::with_capacity(capacity),
            flags: Vec::with_capacity(capacity),
            pointer_dims: Vec::with_capacity(capacity),
            variant_ctors: Vec::with_capacity(capacity),
            derived_info: Vec::with_capacity(capacity),
            base_rows: Vec::with_capacity(capacity),
            derived_rows: Vec::with_capacity(capacity),
            orig_index: FxHashMap::default(),
            custom_index: FxHashMap::default(),
            rust_types: FxHashMap::default(),
        };
        table.push_row(String::new(), String::new(), TypeId::INVALID);
        table
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Row of `id`, or row 0 for ids never handed out.
    #[inline]
    fn slot(&self, id: TypeId) -> usize {
        let index = id.index();
        if index < self.raw.len() {
            index
        } else {
            0
        }
    }

    fn push_row(&mut self, orig: String, custom: String, id: TypeId) {
        self.orig_names.push(orig);
        self.custom_names.push(custom);
        self.raw.push(id);
        self.wrapped.push(TypeId::INVALID);
        self.array_raw.push(id);
        self.sizes.push(0);
        self.flags.push(TypeFlags::empty());
        self.pointer_dims.push(0);
        self.variant_ctors.push(None);
        self.derived_info.push(None);
        self.base_rows.push(BaseRow::new());
        self.derived_rows.push(DerivedRow::new());
    }

    /// Id registered under `name`, compared after whitespace normalisation.
    pub fn lookup_orig(&self, name: &str) -> Option<TypeId> {
        self.orig_index.get(&normalize_name(name)).copied()
    }

    /// Append a new row. The caller has already checked that the name is
    /// unused; base edges are installed separately.
    pub fn insert(&mut self, reg: &mut TypeRegistration) -> TypeId {
        let id = id_at(self.raw.len());

        // Unknown or missing ids fall back to the type itself.
        let raw = Some(self.raw_type(reg.raw))
            .filter(|raw| raw.is_valid())
            .unwrap_or(id);
        let array_raw = Some(self.array_raw_type(reg.array_raw))
            .filter(|raw| raw.is_valid())
            .unwrap_or(id);

        let normalized = normalize_name(&reg.name);
        let custom = if array_raw == id {
            normalized.clone()
        } else {
            derive_name(
                &normalized,
                &normalize_name(self.name(array_raw)),
                self.custom_name(array_raw),
            )
        };

        self.push_row(std::mem::take(&mut reg.name), custom.clone(), id);
        let row = id.index();
        self.raw[row] = raw;
        self.wrapped[row] = reg.wrapped;
        self.array_raw[row] = array_raw;
        self.sizes[row] = reg.size;
        self.flags[row] = reg.flags;
        self.pointer_dims[row] = reg.pointer_dimension;
        self.variant_ctors[row] = reg.variant_ctor;
        if let Some(provider) = reg.derived_info.take() {
            let raw_row = raw.index();
            if self.derived_info[raw_row].is_none() {
                self.derived_info[raw_row] = Some(provider);
            }
        }

        self.orig_index.entry(normalized).or_insert(id);
        self.custom_index.entry(custom).or_insert(id);
        if let Some(rust_type) = reg.rust_type {
            self.rust_types.entry(rust_type).or_insert(id);
        }
        id
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.orig_names[self.slot(id)]
    }

    pub fn custom_name(&self, id: TypeId) -> &str {
        &self.custom_names[self.slot(id)]
    }

    pub fn raw_type(&self, id: TypeId) -> TypeId {
        self.raw[self.slot(id)]
    }

    pub fn wrapped_type(&self, id: TypeId) -> TypeId {
        self.wrapped[self.slot(id)]
    }

    pub fn array_raw_type(&self, id: TypeId) -> TypeId {
        self.array_raw[self.slot(id)]
    }

    pub fn size_of(&self, id: TypeId) -> usize {
        self.sizes[self.slot(id)]
    }

    pub fn flags(&self, id: TypeId) -> TypeFlags {
        self.flags[self.slot(id)]
    }

    pub fn pointer_dimension(&self, id: TypeId) -> u8 {
        self.pointer_dims[self.slot(id)]
    }

    pub fn variant_ctor(&self, id: TypeId) -> Option<VariantCtorFn> {
        self.variant_ctors[self.slot(id)]
    }

    /// Most-derived hook registered for the raw type of `id`.
    pub fn derived_info_provider(&self, id: TypeId) -> Option<Arc<dyn DerivedInfoProvider>> {
        self.derived_info[self.slot(self.raw_type(id))].clone()
    }

    pub fn bases(&self, id: TypeId) -> &BaseRow {
        &self.base_rows[self.slot(id)]
    }

    pub fn derived(&self, id: TypeId) -> &DerivedRow {
        &self.derived_rows[self.slot(id)]
    }

    pub fn by_custom_name(&self, name: &str) -> Option<TypeId> {
        self.custom_index.get(&normalize_name(name)).copied()
    }

    pub fn by_rust_type(&self, rust_type: std::any::TypeId) -> Option<TypeId> {
        self.rust_types.get(&rust_type).copied()
    }

    /// Rename `id` and re-derive the names of every type whose array raw
    /// type it is.
    pub fn set_custom_name(&mut self, id: TypeId, custom: &str) {
        if self.slot(id) == 0 {
            return;
        }
        let raw_name = normalize_name(self.name(id));
        let custom = normalize_name(custom);
        for row in 1..self.len() {
            if self.array_raw[row] != id {
                continue;
            }
            let ty = id_at(row);
            let orig = normalize_name(&self.orig_names[row]);
            let derived = derive_name(&orig, &raw_name, &custom);
            let old = std::mem::replace(&mut self.custom_names[row], derived.clone());
            if self.custom_index.get(&old) == Some(&ty) {
                self.custom_index.remove(&old);
            }
            self.custom_index.insert(derived, ty);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = TypeId> {
        (1..self.len()).map(id_at)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "rows are only ever created for u32 ids"
)]
#[inline]
fn id_at(row: usize) -> TypeId {
    TypeId::from_raw(row as u32)
}
