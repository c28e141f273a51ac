//! Member tables and member lookup.
//!
//! Methods, properties and constructors live in one sorted vector per kind,
//! ordered by `(class, name hash)`; global members use the invalid class.
//! Entries with equal keys stay in registration order, so a bucket scan
//! returns overloads in the order they were declared.

use std::sync::Arc;

use mirror_ir::{name_hash, NameHash, TypeId};
use tracing::trace;

use super::{Database, Registry};
use crate::member::{
    accepts_args, matches_types, Constructor, Destructor, Enumeration, Member, Method, Property,
};
use crate::Variant;

struct MemberSlot<M> {
    class: TypeId,
    hash: NameHash,
    order: u32,
    member: Arc<M>,
}

pub(super) struct MemberTable<M> {
    entries: Vec<MemberSlot<M>>,
    next_order: u32,
}

impl<M: Member> MemberTable<M> {
    pub fn with_capacity(capacity: usize) -> Self {
        MemberTable {
            entries: Vec::with_capacity(capacity),
            next_order: 0,
        }
    }

    fn bucket(&self, class: TypeId, hash: NameHash) -> &[MemberSlot<M>] {
        let key = (class, hash);
        let start = self.entries.partition_point(|slot| (slot.class, slot.hash) < key);
        let len = self.entries[start..].partition_point(|slot| (slot.class, slot.hash) == key);
        &self.entries[start..start + len]
    }

    /// Insert unless `same` reports an existing member with the same name
    /// as a duplicate.
    fn insert(&mut self, class: TypeId, mut member: M, same: impl Fn(&M, &M) -> bool) -> bool {
        let hash = name_hash(member.name());
        let duplicate = self
            .bucket(class, hash)
            .iter()
            .any(|slot| slot.member.name() == member.name() && same(&slot.member, &member));
        if duplicate {
            return false;
        }
        member.set_declaring_type(class);
        let key = (class, hash);
        let pos = self.entries.partition_point(|slot| (slot.class, slot.hash) <= key);
        self.entries.insert(
            pos,
            MemberSlot {
                class,
                hash,
                order: self.next_order,
                member: Arc::new(member),
            },
        );
        self.next_order += 1;
        true
    }

    /// Members of `class` named `name`, in registration order.
    fn named<'a>(&'a self, class: TypeId, name: &'a str) -> impl Iterator<Item = &'a Arc<M>> {
        self.bucket(class, name_hash(name))
            .iter()
            .filter(move |slot| slot.member.name() == name)
            .map(|slot| &slot.member)
    }

    /// Every member of `class`, in registration order.
    fn of_class(&self, class: TypeId) -> Vec<Arc<M>> {
        let start = self.entries.partition_point(|slot| slot.class < class);
        let end = self.entries.partition_point(|slot| slot.class <= class);
        let mut slots: Vec<&MemberSlot<M>> = self.entries[start..end].iter().collect();
        slots.sort_by_key(|slot| slot.order);
        slots.into_iter().map(|slot| Arc::clone(&slot.member)).collect()
    }
}

fn log_duplicate(added: bool, class: TypeId, what: &str) -> bool {
    if !added {
        trace!(%class, what, "duplicate member ignored");
    }
    added
}

fn same_signature<M: Member>(a: &M, b: &M) -> bool {
    let types: Vec<TypeId> = b.parameters().iter().map(|p| p.ty()).collect();
    matches_types(a.parameters(), &types)
}

impl Database {
    /// The class itself, then its bases roots first. Empty for invalid ids,
    /// which must not reach the global members.
    fn lookup_chain(&self, ty: TypeId) -> Vec<TypeId> {
        let raw = self.types.raw_type(ty);
        if !raw.is_valid() {
            return Vec::new();
        }
        std::iter::once(raw)
            .chain(self.types.bases(raw).iter().map(|slot| slot.base))
            .collect()
    }

    fn find_method(&self, ty: TypeId, name: &str, accept: impl Fn(&Method) -> bool) -> Option<Arc<Method>> {
        self.lookup_chain(ty).into_iter().find_map(|class| {
            self.methods
                .named(class, name)
                .find(|method| accept(method))
                .cloned()
        })
    }

    fn find_property(&self, ty: TypeId, name: &str) -> Option<Arc<Property>> {
        self.lookup_chain(ty)
            .into_iter()
            .find_map(|class| self.properties.named(class, name).next().cloned())
    }
}

impl Registry {
    // --- Registration ---

    /// Register a method on `ty`. An overload with the same name and
    /// parameter types is kept instead.
    pub fn register_method(&self, ty: TypeId, method: Method) -> bool {
        if !ty.is_valid() {
            return false;
        }
        let mut db = self.db.write();
        let class = db.types.raw_type(ty);
        log_duplicate(db.methods.insert(class, method, same_signature), class, "method")
    }

    pub fn register_global_method(&self, method: Method) -> bool {
        let added = self
            .db
            .write()
            .methods
            .insert(TypeId::INVALID, method, same_signature);
        log_duplicate(added, TypeId::INVALID, "global method")
    }

    /// Register a property on `ty`. A property with the same name is kept
    /// instead.
    pub fn register_property(&self, ty: TypeId, property: Property) -> bool {
        if !ty.is_valid() {
            return false;
        }
        let mut db = self.db.write();
        let class = db.types.raw_type(ty);
        log_duplicate(db.properties.insert(class, property, |_, _| true), class, "property")
    }

    pub fn register_global_property(&self, property: Property) -> bool {
        let added = self
            .db
            .write()
            .properties
            .insert(TypeId::INVALID, property, |_, _| true);
        log_duplicate(added, TypeId::INVALID, "global property")
    }

    /// Register a constructor of `ty`. One with the same parameter types is
    /// kept instead.
    pub fn register_constructor(&self, ty: TypeId, constructor: Constructor) -> bool {
        if !ty.is_valid() {
            return false;
        }
        let mut db = self.db.write();
        let class = db.types.raw_type(ty);
        let added = db.constructors.insert(class, constructor, same_signature);
        log_duplicate(added, class, "constructor")
    }

    /// Register the destructor of `ty`; the first one wins.
    pub fn register_destructor(&self, ty: TypeId, mut destructor: Destructor) -> bool {
        if !ty.is_valid() {
            return false;
        }
        let mut db = self.db.write();
        let class = db.types.raw_type(ty);
        let added = !db.destructors.contains_key(&class);
        if added {
            destructor.set_declaring_type(class);
            db.destructors.insert(class, Arc::new(destructor));
        }
        log_duplicate(added, class, "destructor")
    }

    /// Register the name/value table of the enumeration `ty`; the first one
    /// wins.
    pub fn register_enumeration(&self, ty: TypeId, mut enumeration: Enumeration) -> bool {
        if !ty.is_valid() {
            return false;
        }
        let mut db = self.db.write();
        let added = !db.enumerations.contains_key(&ty);
        if added {
            enumeration.set_declaring_type(ty);
            db.enumerations.insert(ty, Arc::new(enumeration));
        }
        log_duplicate(added, ty, "enumeration")
    }

    // --- Methods ---

    /// First method named `name` on `ty` or, failing that, on its bases.
    pub fn get_method(&self, ty: TypeId, name: &str) -> Option<Arc<Method>> {
        self.db.read().find_method(ty, name, |_| true)
    }

    /// Overload of `name` taking exactly `params`.
    pub fn get_method_with_types(
        &self,
        ty: TypeId,
        name: &str,
        params: &[TypeId],
    ) -> Option<Arc<Method>> {
        self.db
            .read()
            .find_method(ty, name, |method| matches_types(method.parameter_infos(), params))
    }

    /// Overload of `name` that accepts `args`, defaults included.
    pub fn get_method_for_args(
        &self,
        ty: TypeId,
        name: &str,
        args: &[Variant],
    ) -> Option<Arc<Method>> {
        self.db
            .read()
            .find_method(ty, name, |method| accepts_args(method.parameter_infos(), args))
    }

    /// Methods of `ty` followed by those of its bases, roots first.
    pub fn get_methods(&self, ty: TypeId) -> Vec<Arc<Method>> {
        let db = self.db.read();
        db.lookup_chain(ty)
            .into_iter()
            .flat_map(|class| db.methods.of_class(class))
            .collect()
    }

    pub fn get_global_method(&self, name: &str) -> Option<Arc<Method>> {
        self.db.read().methods.named(TypeId::INVALID, name).next().cloned()
    }

    pub fn get_global_method_for_args(&self, name: &str, args: &[Variant]) -> Option<Arc<Method>> {
        self.db
            .read()
            .methods
            .named(TypeId::INVALID, name)
            .find(|method| accepts_args(method.parameter_infos(), args))
            .cloned()
    }

    pub fn get_global_methods(&self) -> Vec<Arc<Method>> {
        self.db.read().methods.of_class(TypeId::INVALID)
    }

    /// Find the overload of `name` matching `args` and invoke it.
    ///
    /// Returns the empty variant when no overload accepts the arguments, or
    /// when a non-static method is given an instance whose type does not
    /// derive from the method's class.
    pub fn invoke(&self, ty: TypeId, name: &str, instance: &mut Variant, args: &[Variant]) -> Variant {
        match self.get_method_for_args(ty, name, args) {
            Some(method)
                if method.is_static()
                    || self.accepts_instance(method.declaring_type(), instance) =>
            {
                method.invoke(instance, args)
            }
            Some(_) => {
                trace!(%ty, method = name, instance = %instance.get_type(), "instance rejected");
                Variant::new()
            }
            None => Variant::new(),
        }
    }

    pub fn invoke_global(&self, name: &str, args: &[Variant]) -> Variant {
        match self.get_global_method_for_args(name, args) {
            Some(method) => method.invoke_static(args),
            None => Variant::new(),
        }
    }

    // --- Properties ---

    pub fn get_property(&self, ty: TypeId, name: &str) -> Option<Arc<Property>> {
        self.db.read().find_property(ty, name)
    }

    /// Properties of `ty` followed by those of its bases, roots first.
    pub fn get_properties(&self, ty: TypeId) -> Vec<Arc<Property>> {
        let db = self.db.read();
        db.lookup_chain(ty)
            .into_iter()
            .flat_map(|class| db.properties.of_class(class))
            .collect()
    }

    /// Read property `name` of `ty` from `instance`. Empty when there is no
    /// such property or the instance is not a `ty` object.
    pub fn get_property_value(&self, ty: TypeId, name: &str, instance: &Variant) -> Variant {
        match self.get_property(ty, name) {
            Some(property) if self.accepts_instance(property.declaring_type(), instance) => {
                property.get_value(instance)
            }
            _ => Variant::new(),
        }
    }

    /// Write property `name` of `ty` on `instance`, with the same instance
    /// check as [`get_property_value`](Self::get_property_value).
    pub fn set_property_value(
        &self,
        ty: TypeId,
        name: &str,
        instance: &mut Variant,
        value: Variant,
    ) -> bool {
        match self.get_property(ty, name) {
            Some(property) if self.accepts_instance(property.declaring_type(), instance) => {
                property.set_value(instance, value)
            }
            _ => false,
        }
    }

    /// Instance members of `declaring` need an instance of it or of a
    /// derived class; global members take anything.
    fn accepts_instance(&self, declaring: TypeId, instance: &Variant) -> bool {
        !declaring.is_valid() || self.is_derived_from(instance.get_type(), declaring)
    }

    pub fn get_global_property(&self, name: &str) -> Option<Arc<Property>> {
        self.db.read().properties.named(TypeId::INVALID, name).next().cloned()
    }

    pub fn get_global_properties(&self) -> Vec<Arc<Property>> {
        self.db.read().properties.of_class(TypeId::INVALID)
    }

    // --- Construction ---

    /// Constructor of `ty` taking exactly `params`.
    pub fn get_constructor(&self, ty: TypeId, params: &[TypeId]) -> Option<Arc<Constructor>> {
        let db = self.db.read();
        let class = db.types.raw_type(ty);
        let found = db
            .constructors
            .named(class, "")
            .find(|ctor| matches_types(ctor.parameter_infos(), params))
            .cloned();
        found
    }

    pub fn get_constructor_for_args(&self, ty: TypeId, args: &[Variant]) -> Option<Arc<Constructor>> {
        let db = self.db.read();
        let class = db.types.raw_type(ty);
        let found = db
            .constructors
            .named(class, "")
            .find(|ctor| accepts_args(ctor.parameter_infos(), args))
            .cloned();
        found
    }

    pub fn get_constructors(&self, ty: TypeId) -> Vec<Arc<Constructor>> {
        let db = self.db.read();
        db.constructors.of_class(db.types.raw_type(ty))
    }

    /// Build an instance of `ty` with the first constructor accepting
    /// `args`; empty when none does.
    pub fn create(&self, ty: TypeId, args: &[Variant]) -> Variant {
        match self.get_constructor_for_args(ty, args) {
            Some(ctor) => ctor.invoke(args),
            None => Variant::new(),
        }
    }

    pub fn get_destructor(&self, ty: TypeId) -> Option<Arc<Destructor>> {
        let db = self.db.read();
        db.destructors.get(&db.types.raw_type(ty)).cloned()
    }

    /// Destroy the object held by `object` with its type's destructor.
    pub fn destroy(&self, object: &mut Variant) -> bool {
        self.get_destructor(object.get_type())
            .is_some_and(|destructor| destructor.invoke(object))
    }

    pub fn get_enumeration(&self, ty: TypeId) -> Option<Arc<Enumeration>> {
        self.db.read().enumerations.get(&ty).cloned()
    }
}
