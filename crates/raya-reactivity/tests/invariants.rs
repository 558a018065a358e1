//! Integration tests for views over non-configurable and sealed objects
//!
//! Tests cover:
//! - Non-configurable properties defined or observed through a view
//! - Frozen nested values read through descriptors and plain gets
//! - Key reporting after extensions are prevented

use raya_object::{ObjectError, ObjectRef, PropertyDescriptor, PropertyKey, Value};
use raya_reactivity::{Membrane, ReactivityOptions};

fn obj(value: &Value) -> &ObjectRef {
    value.as_object().expect("expected an object")
}

#[test]
fn test_non_configurable_define_is_mirrored() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::default();
    let wet = membrane.reactive(&raw);

    obj(&wet)
        .define_property("b", PropertyDescriptor::new().with_value(2).with_configurable(false))
        .unwrap();
    let names = obj(&wet).own_property_names().unwrap();
    assert_eq!(names.iter().filter(|k| **k == PropertyKey::from("b")).count(), 1);
    assert_eq!(raw.get_value("b").unwrap(), Value::from(2));

    assert!(matches!(
        obj(&wet).define_property("b", PropertyDescriptor::new().with_enumerable(true)),
        Err(ObjectError::ProtocolViolation(_))
    ));
}

#[test]
fn test_repeated_descriptor_reads_agree() {
    let inner = ObjectRef::from_entries([("c", 1)]);
    let raw = ObjectRef::new();
    raw.define_property("b", PropertyDescriptor::frozen(&inner))
        .unwrap();
    let membrane = Membrane::default();
    let wet = membrane.reactive(&raw);

    let first = obj(&wet).get_own_property(&"b".into()).unwrap().unwrap();
    let second = obj(&wet).get_own_property(&"b".into()).unwrap().unwrap();
    assert_eq!(first.value, second.value);
    assert!(membrane.is_reactive(first.value.as_ref().unwrap()));
}

#[test]
fn test_frozen_nested_values() {
    let inner = ObjectRef::from_entries([("c", 1)]);
    let raw = ObjectRef::from_entries([("a", &inner)]);
    raw.freeze().unwrap();
    let membrane = Membrane::default();

    for wet in [membrane.reactive(&raw), membrane.readonly(&raw)] {
        let desc = obj(&wet).get_own_property(&"a".into()).unwrap().unwrap();
        let value = obj(&wet).get_value("a").unwrap();
        assert_eq!(desc.value, Some(value.clone()));
        assert_eq!(membrane.to_raw(&value), Value::from(&inner));
    }
}

#[test]
fn test_writable_non_configurable_value_can_change() {
    let raw = ObjectRef::new();
    raw.define_property(
        "n",
        PropertyDescriptor::data(1).with_configurable(false),
    )
    .unwrap();
    let membrane = Membrane::default();
    let wet = membrane.reactive(&raw);

    obj(&wet).get_own_property(&"n".into()).unwrap();
    obj(&wet).put("n", 2).unwrap();
    let desc = obj(&wet).get_own_property(&"n".into()).unwrap().unwrap();
    assert_eq!(desc.value, Some(Value::from(2)));
    assert_eq!(obj(&wet).get_value("n").unwrap(), Value::from(2));
}

#[test]
fn test_prevent_extensions_reports_identification() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::new(ReactivityOptions::new().identification("iden"));
    let wet = membrane.reactive(&raw);

    obj(&wet).prevent_extensions_strict().unwrap();
    assert!(!obj(&wet).is_extensible().unwrap());
    assert_eq!(
        obj(&wet).own_property_keys().unwrap(),
        vec![PropertyKey::from("iden"), PropertyKey::from("a")]
    );
    assert!(obj(&wet).get_value("iden").unwrap().is_undefined());
}

#[test]
fn test_raw_delete_after_prevent_extensions_desyncs_view() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::default();
    let wet = membrane.reactive(&raw);

    obj(&wet).prevent_extensions_strict().unwrap();
    raw.delete_property("a").unwrap();
    assert!(matches!(
        obj(&wet).own_property_keys(),
        Err(ObjectError::InvariantViolation(_))
    ));
}

#[test]
fn test_delete_after_prevent_extensions() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::default();
    let wet = membrane.reactive(&raw);

    obj(&wet).prevent_extensions_strict().unwrap();
    obj(&wet).delete_property("a").unwrap();
    assert!(obj(&wet).own_property_keys().unwrap().is_empty());
    assert!(!raw.has_own_property("a").unwrap());
}
