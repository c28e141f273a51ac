//! Inheritance rows and the Cast Engine.
//!
//! Each raw class owns a row of every ancestor it can be cast to, direct or
//! inherited, with the adjustment that reaches it. Rows are sorted by base
//! id, which puts roots (registered first) at the front.
//!
//! Casting with [`Registry::apply_offset`]:
//! 1. same raw type, or a null pointer: nothing to do
//! 2. ask the source type's hook for the most-derived type and address
//! 3. that type is the target: done
//! 4. otherwise the target must be in the most-derived type's row

use mirror_ir::TypeId;
use rustc_hash::FxHashSet;
use tracing::trace;

use super::table::{BaseRow, BaseSlot};
use super::{Database, Registry};
use crate::cast::{BaseEdge, DerivedInfo, ObjPtr};
use crate::error::{ReflectError, ReflectResult};

impl Database {
    /// Install the flattened base row of the raw class `id`.
    ///
    /// A base reachable along several paths keeps the edge declared first.
    pub(super) fn register_base_class_info(&mut self, id: TypeId, edges: &[BaseEdge]) {
        let mut flat: Vec<BaseSlot> = Vec::with_capacity(edges.len());
        for edge in edges {
            let base = self.types.raw_type(edge.base);
            if !base.is_valid() || base == id {
                trace!(%id, base = %edge.base, "skipping unusable base edge");
                continue;
            }
            flat.push(BaseSlot {
                base,
                adjust: edge.adjust.clone(),
            });
            for inherited in self.types.bases(base) {
                flat.push(BaseSlot {
                    base: inherited.base,
                    adjust: edge.adjust.then(&inherited.adjust),
                });
            }
        }

        let mut seen = FxHashSet::default();
        flat.retain(|slot| seen.insert(slot.base));
        flat.sort_by_key(|slot| slot.base);

        for slot in &flat {
            let derived = &mut self.types.derived_rows[slot.base.index()];
            if !derived.contains(&id) {
                derived.push(id);
            }
        }
        self.types.base_rows[id.index()] = flat.into_iter().collect::<BaseRow>();
    }
}

impl Registry {
    /// Whether `ty` is `other` or has it as a (transitive) base.
    pub fn is_derived_from(&self, ty: TypeId, other: TypeId) -> bool {
        let db = self.db.read();
        let source = db.types.raw_type(ty);
        let target = db.types.raw_type(other);
        source.is_valid()
            && (source == target || db.types.bases(source).iter().any(|slot| slot.base == target))
    }

    /// Every ancestor of `ty`, roots first.
    pub fn get_base_classes(&self, ty: TypeId) -> Vec<TypeId> {
        let db = self.db.read();
        let raw = db.types.raw_type(ty);
        db.types.bases(raw).iter().map(|slot| slot.base).collect()
    }

    /// Every registered descendant of `ty`, in registration order.
    pub fn get_derived_classes(&self, ty: TypeId) -> Vec<TypeId> {
        let db = self.db.read();
        let raw = db.types.raw_type(ty);
        db.types.derived(raw).to_vec()
    }

    /// Convert `ptr`, statically typed as `source`, into a pointer to its
    /// `target` sub-object. Returns null when the object is not a `target`.
    ///
    /// The most-derived hook runs without the registry lock held, so it may
    /// itself query the registry.
    pub fn apply_offset(&self, ptr: ObjPtr, source: TypeId, target: TypeId) -> ObjPtr {
        let (source_raw, target_raw, provider) = {
            let db = self.db.read();
            (
                db.types.raw_type(source),
                db.types.raw_type(target),
                db.types.derived_info_provider(source),
            )
        };
        if source_raw == target_raw || ptr.is_null() {
            return ptr;
        }

        let info = match provider {
            Some(provider) => provider.derived_info(ptr),
            None => DerivedInfo {
                ty: source_raw,
                ptr,
            },
        };

        let db = self.db.read();
        let dynamic = db.types.raw_type(info.ty);
        if dynamic == target_raw {
            return info.ptr;
        }
        if let Some(slot) = db.types.bases(dynamic).iter().find(|slot| slot.base == target_raw) {
            return slot.adjust.apply(info.ptr);
        }
        trace!(%source, %target, %dynamic, "no inheritance path");
        ObjPtr::NULL
    }

    /// [`Registry::apply_offset`] reporting unrelated types as an error.
    /// A null pointer casts to null.
    pub fn try_apply_offset(
        &self,
        ptr: ObjPtr,
        source: TypeId,
        target: TypeId,
    ) -> ReflectResult<ObjPtr> {
        let cast = self.apply_offset(ptr, source, target);
        if cast.is_null() && !ptr.is_null() {
            return Err(ReflectError::CastFailure {
                from: source,
                to: target,
            });
        }
        Ok(cast)
    }

    /// Cast a reference between two registered Rust types.
    ///
    /// Returns `None` when either type is unregistered or the object is not
    /// a `T`.
    ///
    /// # Safety
    ///
    /// The base edges and most-derived hooks registered for `S`, `T` and
    /// every type in between must describe the real memory layout: the
    /// address they produce must point at a live, properly aligned `T`
    /// inside the object behind `value`.
    #[allow(unsafe_code, reason = "dereferences an address produced by registered layout data")]
    pub unsafe fn cast_ref<'a, S: 'static, T: 'static>(&self, value: &'a S) -> Option<&'a T> {
        let source = self.type_of::<S>();
        let target = self.type_of::<T>();
        if !source.is_valid() || !target.is_valid() {
            return None;
        }
        let ptr = self.apply_offset(ObjPtr::from_ref(value), source, target);
        if ptr.is_null() {
            return None;
        }
        // SAFETY: the caller guarantees the registered layout is accurate,
        // so `ptr` addresses a `T` borrowed from `value`.
        Some(unsafe { &*ptr.as_ptr::<T>() })
    }
}
