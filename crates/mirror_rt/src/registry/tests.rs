use super::*;
use crate::cast::{Adjustment, BaseEdge, DerivedInfo, ObjPtr};
use crate::member::ParameterInfo;
use pretty_assertions::assert_eq;

fn class(registry: &Registry, name: &str) -> TypeId {
    registry.register_type(TypeRegistration::new(name).flags(TypeFlags::IS_CLASS))
}

fn derived(registry: &Registry, name: &str, bases: &[(TypeId, isize)]) -> TypeId {
    registry.register_type(
        TypeRegistration::new(name)
            .flags(TypeFlags::IS_CLASS)
            .bases(
                bases
                    .iter()
                    .map(|&(base, offset)| BaseEdge::new(base, Adjustment::Offset(offset))),
            ),
    )
}

// === Type table ===

#[test]
fn builtins_have_fixed_ids() {
    let registry = Registry::new();
    for id in TypeId::BUILTINS {
        assert_eq!(Some(registry.name(id).as_str()), id.builtin_name());
        assert_eq!(registry.raw_type(id), id);
    }
    assert_eq!(registry.type_of::<i32>(), TypeId::I32);
    assert_eq!(registry.type_of::<String>(), TypeId::STRING);
    assert_eq!(registry.type_count(), TypeId::BUILTIN_COUNT as usize);
}

#[test]
fn builtin_flags() {
    let registry = Registry::new();
    assert!(registry.is_arithmetic(TypeId::U8));
    assert!(registry.flags(TypeId::I8).contains(TypeFlags::IS_SIGNED));
    assert!(!registry.flags(TypeId::U8).contains(TypeFlags::IS_SIGNED));
    assert!(registry.flags(TypeId::F64).contains(TypeFlags::IS_FLOAT));
    assert_eq!(registry.kind(TypeId::STRING), TypeKind::Other);
    assert_eq!(registry.size_of(TypeId::I64), 8);
}

#[test]
fn user_ids_start_after_builtins() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    assert_eq!(foo.raw(), TypeId::FIRST_DYNAMIC);
    assert_eq!(registry.get_types().last(), Some(&foo));
}

#[test]
fn registration_is_idempotent() {
    let registry = Registry::new();
    let first = class(&registry, "Foo");
    let second = registry.register_type(TypeRegistration::new("Foo").size(64));
    assert_eq!(first, second);
    assert_eq!(registry.size_of(first), 0);
    assert!(registry.is_class(first));
}

#[test]
fn conflicting_registration_is_reported() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    assert_eq!(
        registry.try_register_type(TypeRegistration::new("Foo")),
        Err(ReflectError::RegistrationConflict {
            name: "Foo".to_owned(),
            existing: foo,
        })
    );
}

#[test]
fn names_are_normalized() {
    let registry = Registry::new();
    let a = class(&registry, "const  Foo");
    let b = class(&registry, " const Foo ");
    assert_eq!(a, b);
    assert_eq!(registry.get_by_name("const Foo"), a);
}

#[test]
fn unknown_ids_resolve_to_invalid_row() {
    let registry = Registry::new();
    let bogus = TypeId::from_raw(10_000);
    assert_eq!(registry.raw_type(bogus), TypeId::INVALID);
    assert_eq!(registry.name(bogus), "");
    assert_eq!(registry.flags(bogus), TypeFlags::empty());
    assert!(registry.get_base_classes(bogus).is_empty());
}

#[test]
fn get_by_name_unknown() {
    let registry = Registry::new();
    assert_eq!(registry.get_by_name("Nope"), TypeId::INVALID);
    assert_eq!(
        registry.try_get_by_name("Nope"),
        Err(ReflectError::NotRegistered {
            name: "Nope".to_owned()
        })
    );
}

#[test]
fn typed_registration() {
    use std::time::Duration;

    let registry = Registry::new();
    let duration = registry.register::<Duration>("Duration");
    assert_eq!(registry.type_of::<Duration>(), duration);
    assert_eq!(registry.size_of(duration), std::mem::size_of::<Duration>());
    assert_eq!(registry.kind(duration), TypeKind::Class);
}

// === Custom names ===

#[test]
fn pointer_type_is_named_after_raw() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    let foo_ptr = registry.pointer_type(foo);
    assert_eq!(registry.name(foo_ptr), "Foo*");
    assert_eq!(registry.raw_type(foo_ptr), foo);
    assert_eq!(registry.pointer_dimension(foo_ptr), 1);
    assert!(registry.is_pointer(foo_ptr));
    assert_eq!(registry.pointer_type(foo_ptr), foo_ptr);
}

#[test]
fn custom_name_propagates_to_pointer() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    let foo_ptr = registry.pointer_type(foo);

    registry.register_custom_name(foo, "Alias");

    assert_eq!(registry.custom_name(foo), "Alias");
    assert_eq!(registry.custom_name(foo_ptr), "Alias*");
    assert_eq!(registry.get_by_name("Alias*"), foo_ptr);
    assert_eq!(registry.get_by_name("Foo*"), TypeId::INVALID);
    assert_eq!(registry.get_by_name("Alias"), foo);
}

#[test]
fn custom_name_applies_to_later_pointers() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    registry.register_custom_name(foo, "Alias");

    let foo_ptr = registry.pointer_type(foo);
    assert_eq!(registry.custom_name(foo_ptr), "Alias*");
}

// === Metadata and converters ===

#[test]
fn type_metadata_first_wins() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    registry.register_metadata(foo, [Metadata::new("version", 1_i32)]);
    registry.register_metadata(foo, [Metadata::new("version", 2_i32)]);

    assert_eq!(registry.get_metadata(foo, "version").to_i32(), Some(1));
    assert!(!registry.get_metadata(foo, "absent").is_valid());
}

#[test]
fn converter_first_wins() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    registry.register_converter(foo, TypeConverter::new(TypeId::I32, |_| Some(1_i32.into())));
    registry.register_converter(foo, TypeConverter::new(TypeId::I32, |_| Some(2_i32.into())));

    let converter = registry.get_converter(foo, TypeId::I32);
    let converted = converter.and_then(|c| c.convert(&Variant::new()));
    assert_eq!(converted.and_then(|v| v.to_i32()), Some(1));
}

// === Inheritance ===

#[test]
fn base_rows_are_flattened_and_sorted() {
    let registry = Registry::new();
    let root = class(&registry, "Root");
    let other = class(&registry, "Other");
    let mid = derived(&registry, "Mid", &[(root, 0)]);
    let leaf = derived(&registry, "Leaf", &[(other, 16), (mid, 0)]);

    assert_eq!(registry.get_base_classes(leaf), vec![root, other, mid]);
    assert!(registry.is_derived_from(leaf, root));
    assert!(registry.is_derived_from(leaf, leaf));
    assert!(!registry.is_derived_from(root, leaf));
    assert_eq!(registry.get_derived_classes(root), vec![mid, leaf]);
}

#[test]
fn duplicate_bases_keep_first_edge() {
    let registry = Registry::new();
    let root = class(&registry, "Root");
    let left = derived(&registry, "Left", &[(root, 0)]);
    let right = derived(&registry, "Right", &[(root, 0)]);
    let diamond = derived(&registry, "Diamond", &[(left, 0), (right, 32)]);

    let bases = registry.get_base_classes(diamond);
    assert_eq!(bases, vec![root, left, right]);

    let ptr = ObjPtr::from_addr(0x1000);
    assert_eq!(registry.apply_offset(ptr, diamond, root), ptr);
    assert_eq!(registry.apply_offset(ptr, diamond, right).addr(), 0x1020);
}

#[test]
fn bases_ignored_on_non_raw_type() {
    let registry = Registry::new();
    let root = class(&registry, "Root");
    let foo = class(&registry, "Foo");
    let alias = registry.register_type(
        TypeRegistration::new("const Foo")
            .raw(foo)
            .base(BaseEdge::at_offset(root, 0)),
    );
    assert_eq!(registry.raw_type(alias), foo);
    assert!(registry.get_base_classes(foo).is_empty());
}

#[test]
fn cast_same_type_and_null() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    let other = class(&registry, "Other");
    let ptr = ObjPtr::from_addr(0x40);

    assert_eq!(registry.apply_offset(ptr, foo, foo), ptr);
    assert!(registry.apply_offset(ObjPtr::NULL, foo, other).is_null());
    assert!(registry.apply_offset(ptr, foo, other).is_null());
    assert_eq!(
        registry.try_apply_offset(ptr, foo, other),
        Err(ReflectError::CastFailure {
            from: foo,
            to: other
        })
    );
    assert_eq!(registry.try_apply_offset(ObjPtr::NULL, foo, other), Ok(ObjPtr::NULL));
}

#[test]
fn downcast_needs_hook() {
    let registry = Registry::new();
    let base = class(&registry, "Base");
    let child = derived(&registry, "Child", &[(base, 8)]);
    let ptr = ObjPtr::from_addr(0x108);

    assert!(registry.apply_offset(ptr, base, child).is_null());
}

#[test]
fn hook_reports_most_derived() {
    let registry = Registry::new();
    let child_id = TypeId::from_raw(TypeId::FIRST_DYNAMIC + 1);
    let base = registry.register_type(
        TypeRegistration::new("Base")
            .flags(TypeFlags::IS_CLASS)
            .derived_info(move |ptr: ObjPtr| DerivedInfo {
                ty: child_id,
                ptr: ptr.byte_offset(-8),
            }),
    );
    let child = derived(&registry, "Child", &[(base, 8)]);
    assert_eq!(child, child_id);

    let base_ptr = ObjPtr::from_addr(0x108);
    assert_eq!(registry.apply_offset(base_ptr, base, child).addr(), 0x100);
}

// === Members ===

fn getter(value: i32) -> impl Fn(&Variant) -> Variant + Send + Sync + 'static {
    move |_| Variant::from(value)
}

#[test]
fn members_are_found_on_bases() {
    let registry = Registry::new();
    let base = class(&registry, "Base");
    let child = derived(&registry, "Child", &[(base, 0)]);

    registry.register_method(base, Method::new("hello", TypeId::VOID, |_, _| Variant::void()));
    registry.register_property(base, Property::new("x", TypeId::I32, getter(1)));
    registry.register_property(child, Property::new("y", TypeId::I32, getter(2)));

    let method = registry.get_method(child, "hello");
    assert_eq!(method.map(|m| m.declaring_type()), Some(base));

    let names: Vec<String> = registry
        .get_properties(child)
        .iter()
        .map(|p| p.name().to_owned())
        .collect();
    assert_eq!(names, vec!["y", "x"]);
    assert!(registry.get_method(base, "missing").is_none());
}

#[test]
fn own_member_shadows_base() {
    let registry = Registry::new();
    let base = class(&registry, "Base");
    let child = derived(&registry, "Child", &[(base, 0)]);
    registry.register_property(base, Property::new("x", TypeId::I32, getter(1)));
    registry.register_property(child, Property::new("x", TypeId::I32, getter(2)));

    let property = registry.get_property(child, "x");
    assert_eq!(
        property.map(|p| p.get_value(&Variant::new()).to_i32()),
        Some(Some(2))
    );
}

#[test]
fn overloads_by_parameter_types() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    let one = Method::new("f", TypeId::I32, |_, _| Variant::from(1_i32))
        .param(ParameterInfo::new(TypeId::I32));
    let two = Method::new("f", TypeId::I32, |_, _| Variant::from(2_i32))
        .param(ParameterInfo::new(TypeId::STRING));
    let dup = Method::new("f", TypeId::I32, |_, _| Variant::from(3_i32))
        .param(ParameterInfo::new(TypeId::I32));

    assert!(registry.register_method(foo, one));
    assert!(registry.register_method(foo, two));
    assert!(!registry.register_method(foo, dup));
    assert_eq!(registry.get_methods(foo).len(), 2);

    let by_string = registry.get_method_with_types(foo, "f", &[TypeId::STRING]);
    assert!(by_string.is_some());

    let mut instance = Variant::pointer(registry.pointer_type(foo), ObjPtr::NULL);
    let result = registry.invoke(foo, "f", &mut instance, &[Variant::from(7_i32)]);
    assert_eq!(result.to_i32(), Some(1));
    let result = registry.invoke(foo, "f", &mut instance, &[Variant::from("x")]);
    assert_eq!(result.to_i32(), Some(2));
    assert!(!registry.invoke(foo, "f", &mut instance, &[]).is_valid());
}

#[test]
fn methods_in_registration_order() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    for name in ["zeta", "alpha", "mid"] {
        registry.register_method(foo, Method::new(name, TypeId::VOID, |_, _| Variant::void()));
    }
    let names: Vec<String> = registry
        .get_methods(foo)
        .iter()
        .map(|m| m.name().to_owned())
        .collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn global_members_are_separate() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    registry.register_global_method(Method::new("tick", TypeId::I32, |_, _| Variant::from(5_i32)));
    registry.register_global_property(Property::new("answer", TypeId::I32, getter(42)));

    assert!(registry.get_method(foo, "tick").is_none());
    assert!(registry.get_method(TypeId::INVALID, "tick").is_none());
    assert_eq!(registry.invoke_global("tick", &[]).to_i32(), Some(5));
    assert_eq!(registry.get_global_methods().len(), 1);
    assert_eq!(
        registry
            .get_global_property("answer")
            .map(|p| p.get_value(&Variant::new()).to_i32()),
        Some(Some(42))
    );
    assert_eq!(registry.get_global_properties().len(), 1);
}

#[test]
fn members_on_invalid_type_are_dropped() {
    let registry = Registry::new();
    assert!(!registry.register_property(TypeId::INVALID, Property::new("x", TypeId::I32, getter(1))));
    assert!(registry.get_global_property("x").is_none());
}

#[test]
fn constructors_and_destructor() {
    let registry = Registry::new();
    let foo = class(&registry, "Foo");
    registry.register_constructor(foo, Constructor::new(|_| Variant::from(0_i32)));
    registry.register_constructor(
        foo,
        Constructor::new(|args| args[0].clone()).param(ParameterInfo::new(TypeId::I32)),
    );
    assert!(!registry.register_constructor(foo, Constructor::new(|_| Variant::from(9_i32))));
    assert_eq!(registry.get_constructors(foo).len(), 2);
    assert!(registry.get_constructor(foo, &[TypeId::I32]).is_some());
    assert!(registry.get_constructor(foo, &[TypeId::F32]).is_none());
    assert!(registry.get_constructor_for_args(foo, &[Variant::from(2_i32)]).is_some());
    assert!(registry.get_constructor_for_args(foo, &[Variant::from("x")]).is_none());

    assert_eq!(registry.create(foo, &[]).to_i32(), Some(0));
    assert_eq!(registry.create(foo, &[Variant::from(3_i32)]).to_i32(), Some(3));

    assert!(registry.register_destructor(foo, Destructor::dropping()));
    assert!(!registry.register_destructor(foo, Destructor::dropping()));
    assert_eq!(registry.get_destructor(foo).map(|d| d.declaring_type()), Some(foo));
}

#[test]
fn enumeration_registration_first_wins() {
    let registry = Registry::new();
    let color = registry.register_type(TypeRegistration::new("Color").flags(TypeFlags::IS_ENUM));
    assert!(registry.register_enumeration(color, Enumeration::new(TypeId::I32).value("red", 0_i32)));
    assert!(!registry.register_enumeration(color, Enumeration::new(TypeId::I32)));

    let enumeration = registry.get_enumeration(color);
    assert_eq!(enumeration.as_ref().map(|e| e.declaring_type()), Some(color));
    assert!(registry.is_enumeration(color));
}

#[test]
fn shared_across_threads() {
    let registry = Registry::shared();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = std::sync::Arc::clone(&registry);
            std::thread::spawn(move || {
                registry.register_type(TypeRegistration::new("Shared"));
                registry.register_type(TypeRegistration::new(format!("T{i}")))
            })
        })
        .collect();
    let ids: Vec<TypeId> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or(TypeId::INVALID))
        .collect();

    assert!(ids.iter().all(|id| id.is_valid()));
    assert_eq!(registry.type_count(), TypeId::BUILTIN_COUNT as usize + 5);
    assert!(registry.get_by_name("Shared").is_valid());
}

#[test]
fn instance_must_derive_from_the_declaring_class() {
    let registry = Registry::new();
    let base = class(&registry, "Base");
    let child = derived(&registry, "Child", &[(base, 0)]);
    let stranger = class(&registry, "Stranger");
    registry.register_method(
        base,
        Method::new("id", TypeId::I32, |_, _| Variant::from(7_i32)),
    );
    registry.register_method(
        base,
        Method::new("make", TypeId::I32, |_, _| Variant::from(8_i32)).static_method(),
    );

    let mut own = Variant::pointer(registry.pointer_type(base), ObjPtr::NULL);
    let mut derived = Variant::pointer(registry.pointer_type(child), ObjPtr::NULL);
    let mut foreign = Variant::pointer(registry.pointer_type(stranger), ObjPtr::NULL);
    let mut empty = Variant::new();

    assert_eq!(registry.invoke(base, "id", &mut own, &[]).to_i32(), Some(7));
    assert_eq!(registry.invoke(child, "id", &mut derived, &[]).to_i32(), Some(7));
    assert!(!registry.invoke(base, "id", &mut foreign, &[]).is_valid());
    assert!(!registry.invoke(base, "id", &mut empty, &[]).is_valid());
    assert_eq!(registry.invoke(base, "make", &mut empty, &[]).to_i32(), Some(8));
}

#[test]
fn checked_property_access() {
    let registry = Registry::new();
    let base = class(&registry, "Base");
    let stranger = class(&registry, "Stranger");
    registry.register_property(
        base,
        Property::new("tag", TypeId::I32, |_| Variant::from(5_i32)).setter(|_, _| true),
    );

    let mut own = Variant::pointer(registry.pointer_type(base), ObjPtr::NULL);
    let mut foreign = Variant::pointer(registry.pointer_type(stranger), ObjPtr::NULL);

    assert_eq!(registry.get_property_value(base, "tag", &own).to_i32(), Some(5));
    assert!(!registry.get_property_value(base, "tag", &foreign).is_valid());
    assert!(!registry.get_property_value(base, "missing", &own).is_valid());

    assert!(registry.set_property_value(base, "tag", &mut own, Variant::from(1_i32)));
    assert!(!registry.set_property_value(base, "tag", &mut foreign, Variant::from(1_i32)));
    assert!(!registry.set_property_value(base, "tag", &mut own, Variant::from("1")));
}
