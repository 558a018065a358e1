//! Integration tests for read-only views

use raya_object::{ObjectError, ObjectRef, PropertyDescriptor, Value};
use raya_reactivity::{Membrane, OnViolation, ReactivityOptions};
use std::cell::Cell;
use std::rc::Rc;

fn obj(value: &Value) -> &ObjectRef {
    value.as_object().expect("expected an object")
}

fn is_read_only_violation<T>(result: Result<T, ObjectError>) -> bool {
    matches!(result, Err(ObjectError::ReadOnlyViolation(_)))
}

#[test]
fn test_idempotent() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::default();

    let wet1 = membrane.readonly(&raw);
    let wet2 = membrane.readonly(&raw);
    assert_eq!(wet1, wet2);
    assert_eq!(membrane.readonly(&wet1), wet1);
    assert_ne!(membrane.reactive(&raw), wet1);
}

#[test]
fn test_frozen_objects() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    raw.freeze().unwrap();
    let membrane = Membrane::default();
    let wet = membrane.readonly(&raw);

    assert_eq!(obj(&wet).get_value("a").unwrap(), Value::from(1));
    assert!(is_read_only_violation(obj(&wet).put("a", 2)));
}

#[test]
fn test_every_mutation_is_refused() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::default();
    let wet = membrane.readonly(&raw);
    let view = obj(&wet);

    assert!(is_read_only_violation(view.put("a", 2)));
    assert!(is_read_only_violation(
        view.define_property("b", PropertyDescriptor::new().with_value(2))
    ));
    assert!(is_read_only_violation(view.delete_property("a")));
    assert!(is_read_only_violation(
        view.set_prototype(Some(ObjectRef::new()))
    ));
    assert!(is_read_only_violation(view.prevent_extensions_strict()));

    assert_eq!(raw.get_value("a").unwrap(), Value::from(1));
    assert!(!raw.has_own_property("b").unwrap());
    assert!(raw.is_extensible().unwrap());
}

#[test]
fn test_nested_values_are_read_only() {
    let inner = ObjectRef::from_entries([("b", 1)]);
    let raw = ObjectRef::from_entries([("raw2", &inner)]);
    let membrane = Membrane::default();
    let wet = membrane.readonly(&raw);

    let nested = obj(&wet).get_value("raw2").unwrap();
    assert!(membrane.is_readonly(&nested));
    assert!(is_read_only_violation(obj(&nested).put("b", 2)));
    assert!(is_read_only_violation(
        obj(&nested).set_prototype(Some(ObjectRef::new()))
    ));
    assert_eq!(inner.get_value("b").unwrap(), Value::from(1));
}

#[test]
fn test_getter_result_is_read_only() {
    let v = ObjectRef::from_entries([("b", 2)]);
    let raw = ObjectRef::from_entries([("a", 1)]);
    let getter = {
        let v = v.clone();
        ObjectRef::function(move |_, _| Ok(Value::from(&v)))
    };
    raw.define_property(
        "v",
        PropertyDescriptor::accessor(Some(getter.clone()), None).with_configurable(false),
    )
    .unwrap();

    let membrane = Membrane::default();
    let wet = membrane.readonly(&raw);
    let through_view = obj(&wet).get_value("v").unwrap();
    assert_eq!(membrane.to_raw(&through_view), Value::from(&v));
    assert!(membrane.is_readonly(&through_view));

    // The raw getter itself is untouched
    assert_eq!(getter.call(&wet, &[]).unwrap(), Value::from(&v));
}

#[test]
fn test_is_extensible() {
    let membrane = Membrane::default();
    let wet = membrane.readonly(ObjectRef::from_entries([("a", 1)]));
    assert!(obj(&wet).is_extensible().unwrap());
}

#[test]
fn test_setter_from_descriptor_is_refused() {
    let value = Rc::new(Cell::new(1.0));
    let raw = ObjectRef::new();
    let getter = {
        let value = Rc::clone(&value);
        ObjectRef::function(move |_, _| Ok(Value::from(value.get())))
    };
    let setter = {
        let value = Rc::clone(&value);
        ObjectRef::function(move |_, args| {
            value.set(args.first().and_then(Value::as_number).unwrap_or(f64::NAN));
            Ok(Value::Undefined)
        })
    };
    raw.define_property("a", PropertyDescriptor::accessor(Some(getter), Some(setter)))
        .unwrap();

    let membrane = Membrane::default();
    let wet = membrane.readonly(&raw);
    let desc = obj(&wet).get_own_property(&"a".into()).unwrap().unwrap();

    assert!(is_read_only_violation(
        desc.setter().unwrap().call(&wet, &[Value::from(2)])
    ));
    assert_eq!(value.get(), 1.0);
    assert_eq!(desc.getter().unwrap().call(&wet, &[]).unwrap(), Value::from(1));
}

#[test]
fn test_getter_from_descriptor_wraps_fresh_objects() {
    let raw = ObjectRef::new();
    let getter = ObjectRef::function(|_, _| Ok(Value::from(ObjectRef::from_entries([("b", 2)]))));
    raw.define_property("a", PropertyDescriptor::accessor(Some(getter), None))
        .unwrap();

    let membrane = Membrane::default();
    let wet = membrane.readonly(&raw);
    let desc = obj(&wet).get_own_property(&"a".into()).unwrap().unwrap();

    let fresh = desc.getter().unwrap().call(&Value::Undefined, &[]).unwrap();
    assert!(is_read_only_violation(obj(&fresh).put("b", 3)));
}

#[test]
fn test_ignore_mode_absorbs_violations() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::new(ReactivityOptions::new().on_violation(OnViolation::Ignore));
    let wet = membrane.readonly(&raw);
    let view = obj(&wet);

    assert!(!view.set_value("a", 2).unwrap());
    assert!(!view
        .define_own_property(&"b".into(), PropertyDescriptor::data(2))
        .unwrap());
    assert!(!view.delete(&"a".into()).unwrap());
    assert!(!view.set_prototype_of(Some(ObjectRef::new())).unwrap());
    assert!(!view.prevent_extensions().unwrap());

    assert_eq!(raw.get_value("a").unwrap(), Value::from(1));
    assert!(!raw.has_own_property("b").unwrap());

    // Strict callers still see the refusal
    assert!(matches!(
        view.put("a", 2),
        Err(ObjectError::ProtocolViolation(_))
    ));
}
