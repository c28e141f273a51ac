//! Value-level behavior through the public API.

use mirror_rt::{Enumeration, Reflect, Registry, TypeConverter, TypeId, TypeRegistration, Variant};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Color {
    Red,
    Green,
    Blue,
}

impl Reflect for Color {
    fn reflect_eq(&self, other: &Self) -> Option<bool> {
        Some(self == other)
    }

    fn reflect_lt(&self, other: &Self) -> Option<bool> {
        Some(self < other)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Celsius(f64);

impl Reflect for Celsius {}

fn color_type(registry: &Registry) -> TypeId {
    let color = registry.register_type(TypeRegistration::of::<Color>("Color"));
    registry.register_enumeration(
        color,
        Enumeration::new(TypeId::I32)
            .entry("red", Variant::object(color, Color::Red), Color::Red as i32)
            .entry("green", Variant::object(color, Color::Green), Color::Green as i32)
            .entry("blue", Variant::object(color, Color::Blue), Color::Blue as i32),
    );
    color
}

#[test]
fn forty_two_converts_to_text() {
    let registry = Registry::new();
    let text = Variant::from(42_i32).convert_to(&registry, TypeId::STRING);
    assert_eq!(text.and_then(|v| v.to_string_value()).as_deref(), Some("42"));
}

#[test]
fn close_doubles_are_equal() {
    let registry = Registry::new();
    let a = Variant::from(1.000_000_000_000_1_f64);
    let b = Variant::from(1.000_000_000_000_2_f64);
    assert_eq!(a.compare_equal(&b, &registry), Some(true));

    let one = Variant::from(1.0_f64);
    let two = Variant::from(2.0_f64);
    assert_eq!(one.compare_equal(&two, &registry), Some(false));
    assert_eq!(one.compare_less(&two, &registry), Some(true));
}

#[test]
fn clear_is_idempotent() {
    let mut value = Variant::from("payload");
    value.clear();
    assert!(!value.is_valid());
    value.clear();
    assert!(!value.is_valid());
    assert_eq!(value.get_type(), TypeId::INVALID);
}

#[test]
fn moving_out_leaves_the_source_empty() {
    let registry = Registry::new();
    let color = color_type(&registry);
    let mut source = Variant::object(color, Color::Blue);

    let moved = std::mem::take(&mut source);
    assert!(!source.is_valid());
    assert_eq!(moved.get_value::<Color>(), Some(&Color::Blue));
}

#[test]
fn failed_conversion_leaves_value_untouched() {
    let registry = Registry::new();
    let color = color_type(&registry);
    let celsius = registry.register_type(TypeRegistration::of::<Celsius>("Celsius"));

    let mut value = Variant::object(celsius, Celsius(21.5));
    assert!(!value.convert(&registry, color));
    assert_eq!(value.get_type(), celsius);
    assert_eq!(value.get_value::<Celsius>(), Some(&Celsius(21.5)));
}

#[test]
fn enumeration_names_round_trip() {
    let registry = Registry::new();
    let color = color_type(&registry);

    let green = Variant::object(color, Color::Green);
    let name = green.convert_to(&registry, TypeId::STRING);
    assert_eq!(name.and_then(|v| v.to_string_value()).as_deref(), Some("green"));

    let parsed = Variant::from("blue").convert_to(&registry, color);
    assert_eq!(parsed.as_ref().and_then(Variant::get_value::<Color>), Some(&Color::Blue));
    assert!(Variant::from("purple").convert_to(&registry, color).is_none());

    let enumeration = registry.get_enumeration(color);
    let names: Vec<String> = enumeration
        .iter()
        .flat_map(|e| e.names().map(str::to_owned).collect::<Vec<_>>())
        .collect();
    assert_eq!(names, ["red", "green", "blue"]);
}

#[test]
fn enumeration_converts_through_its_underlying_integer() {
    let registry = Registry::new();
    let color = color_type(&registry);
    let green = Variant::object(color, Color::Green);

    assert!(green.can_convert(&registry, TypeId::I32));
    assert_eq!(green.convert_to(&registry, TypeId::I32).and_then(|v| v.to_i32()), Some(1));
    assert_eq!(green.convert_to(&registry, TypeId::F64).and_then(|v| v.to_f64()), Some(1.0));

    assert!(Variant::from(1_i32).can_convert(&registry, color));
    let from_int = Variant::from(1_i32).convert_to(&registry, color);
    assert_eq!(from_int.as_ref().and_then(Variant::get_value::<Color>), Some(&Color::Green));
    let from_wide = Variant::from(2_i64).convert_to(&registry, color);
    assert_eq!(from_wide.as_ref().and_then(Variant::get_value::<Color>), Some(&Color::Blue));
    assert!(Variant::from(7_i32).convert_to(&registry, color).is_none());

    assert_eq!(green.compare_equal(&Variant::from(1_u8), &registry), Some(true));
    assert_eq!(Variant::from(0_i32).compare_equal(&green, &registry), Some(false));
}

#[test]
fn enum_value_compares_with_its_name() {
    let registry = Registry::new();
    let color = color_type(&registry);
    let red = Variant::object(color, Color::Red);
    assert_eq!(red.compare_equal(&Variant::from("red"), &registry), Some(true));
    assert_eq!(red.compare_equal(&Variant::from("blue"), &registry), Some(false));
}

#[test]
fn registered_converter_drives_conversion_and_comparison() {
    let registry = Registry::new();
    let celsius = registry.register_type(TypeRegistration::of::<Celsius>("Celsius"));
    registry.register_converter(
        celsius,
        TypeConverter::typed::<Celsius, f64, _>(TypeId::F64, |c| Some(c.0)),
    );
    registry.register_converter(
        TypeId::F64,
        TypeConverter::to_object::<f64, Celsius, _>(celsius, |v| Some(Celsius(*v))),
    );

    let warm = Variant::object(celsius, Celsius(30.0));
    assert!(warm.can_convert(&registry, TypeId::F64));
    assert_eq!(
        warm.convert_to(&registry, TypeId::F64).and_then(|v| v.to_f64()),
        Some(30.0)
    );

    // Objects without their own equality fall back to the converted value.
    assert_eq!(warm.compare_equal(&Variant::from(30.0_f64), &registry), Some(true));

    let back = Variant::from(12.5_f64).convert_to(&registry, celsius);
    assert_eq!(back.as_ref().and_then(Variant::get_value::<Celsius>), Some(&Celsius(12.5)));

    assert!(!warm.can_convert(&registry, TypeId::BOOL));
}

proptest! {
    #[test]
    fn integers_survive_text(n in any::<i64>()) {
        let registry = Registry::new();
        let text = Variant::from(n).convert_to(&registry, TypeId::STRING);
        let back = text.and_then(|t| t.convert_to(&registry, TypeId::I64));
        prop_assert_eq!(back.and_then(|v| v.to_i64()), Some(n));
    }

    #[test]
    fn decimal_strings_parse_exactly(n in any::<i64>()) {
        let registry = Registry::new();
        let parsed = Variant::from(n.to_string()).convert_to(&registry, TypeId::I64);
        prop_assert_eq!(parsed.and_then(|v| v.to_i64()), Some(n));
    }

    #[test]
    fn unsigned_survive_text(n in any::<u32>()) {
        let registry = Registry::new();
        let text = Variant::from(n).convert_to(&registry, TypeId::STRING);
        let back = text.and_then(|t| t.convert_to(&registry, TypeId::U32));
        prop_assert_eq!(back.and_then(|v| v.to_u32()), Some(n));
    }

    #[test]
    fn doubles_survive_text(x in -1.0e12_f64..1.0e12) {
        let registry = Registry::new();
        let original = Variant::from(x);
        let text = original.convert_to(&registry, TypeId::STRING);
        let back = text.and_then(|t| t.convert_to(&registry, TypeId::F64));
        prop_assert!(back.is_some());
        let back = back.unwrap_or_default();
        prop_assert_eq!(back.compare_equal(&original, &registry), Some(true));
    }

    #[test]
    fn integers_order_like_numbers(a in any::<i32>(), b in any::<i32>()) {
        let registry = Registry::new();
        let less = Variant::from(a).compare_less(&Variant::from(f64::from(b)), &registry);
        prop_assert_eq!(less, Some(a < b));
    }
}
