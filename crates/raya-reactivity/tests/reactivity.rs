//! Integration tests for membrane configuration
//!
//! Tests cover:
//! - Default and empty configuration
//! - Observers, distortion and the observability predicate
//! - Identification keys (string and symbol)
//! - Violation policy

use raya_object::{ObjectError, ObjectRef, PropertyDescriptor, PropertyKey, Symbol, Value};
use raya_reactivity::{Membrane, OnViolation, ReactivityOptions};
use std::cell::Cell;
use std::rc::Rc;

fn obj(value: &Value) -> &ObjectRef {
    value.as_object().expect("expected an object")
}

fn counting(counter: &Rc<Cell<usize>>) -> impl Fn(&ObjectRef, &PropertyKey) + 'static {
    let counter = Rc::clone(counter);
    move |_: &ObjectRef, _: &PropertyKey| counter.set(counter.get() + 1)
}

#[test]
fn test_without_any_config() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::default();
    let wet = membrane.reactive(&raw);
    assert_eq!(obj(&wet).get_value("a").unwrap(), Value::from(1));
}

#[test]
fn test_with_empty_config() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::new(ReactivityOptions::new());
    let wet = membrane.reactive(&raw);
    assert_eq!(obj(&wet).get_value("a").unwrap(), Value::from(1));
}

#[test]
fn test_access_observer() {
    let accesses = Rc::new(Cell::new(0));
    let membrane = Membrane::new(ReactivityOptions::new().access_observer(counting(&accesses)));
    let wet = membrane.reactive(ObjectRef::from_entries([("a", 1)]));

    obj(&wet).get_value("a").unwrap();
    assert_eq!(accesses.get(), 1);
}

#[test]
fn test_mutation_observer() {
    let mutations = Rc::new(Cell::new(0));
    let membrane =
        Membrane::new(ReactivityOptions::new().mutation_observer(counting(&mutations)));
    let wet = membrane.reactive(ObjectRef::from_entries([("a", 1)]));

    obj(&wet).get_value("a").unwrap();
    assert_eq!(mutations.get(), 0);
    obj(&wet).put("a", "new value").unwrap();
    assert_eq!(mutations.get(), 1);
}

#[test]
fn test_distortion() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::new(
        ReactivityOptions::new().distortion_handler(|_| Value::from("distorted value")),
    );
    assert_eq!(membrane.reactive(&raw), Value::from("distorted value"));
    assert_eq!(membrane.readonly(&raw), Value::from("distorted value"));
}

#[test]
fn test_distortion_substitutes_object() {
    let replacement = ObjectRef::from_entries([("replaced", true)]);
    let membrane = Membrane::new(ReactivityOptions::new().distortion_handler({
        let replacement = replacement.clone();
        move |_| Value::from(&replacement)
    }));
    let wet = membrane.reactive(ObjectRef::new());
    assert_eq!(membrane.to_raw(&wet), Value::from(&replacement));
    assert_eq!(obj(&wet).get_value("replaced").unwrap(), Value::from(true));
}

#[test]
fn test_observability_predicate() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::new(ReactivityOptions::new().is_value_observable(|_| false));

    let wet = membrane.reactive(&raw);
    obj(&wet).put("x", "new value").unwrap();
    assert_eq!(wet, Value::from(&raw));
    assert!(!membrane.is_view(&wet));
}

#[test]
fn test_predicate_excludes_nested_values() {
    let excluded = ObjectRef::from_entries([("skip", true)]);
    let raw = ObjectRef::from_entries([("lib", &excluded)]);
    let membrane = Membrane::new(ReactivityOptions::new().is_value_observable(|value| {
        value
            .as_object()
            .is_some_and(|o| !o.has_own_property("skip").unwrap_or(true))
    }));

    let wet = membrane.reactive(&raw);
    assert!(membrane.is_reactive(&wet));
    let lib = obj(&wet).get_value("lib").unwrap();
    assert_eq!(lib, Value::from(&excluded));
}

#[test]
fn test_identification_as_string() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::new(ReactivityOptions::new().identification("iden"));
    let wet = membrane.reactive(&raw);

    assert!(!raw.has("iden").unwrap());
    assert!(obj(&wet).has("iden").unwrap());
    assert!(obj(&wet).get_value("iden").unwrap().is_undefined());

    let names = obj(&wet).own_property_names().unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names[0], PropertyKey::from("iden"));
}

#[test]
fn test_identification_as_symbol() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let iden = Symbol::new();
    let membrane = Membrane::new(ReactivityOptions::new().identification(&iden));
    let wet = membrane.reactive(&raw);

    assert!(!raw.has(&iden).unwrap());
    assert!(obj(&wet).has(&iden).unwrap());
    assert!(obj(&wet).get_value("iden").unwrap().is_undefined());

    let symbols = obj(&wet).own_property_symbols().unwrap();
    assert_eq!(symbols, vec![PropertyKey::from(&iden)]);
}

#[test]
fn test_identification_descriptor() {
    let membrane = Membrane::new(ReactivityOptions::new().identification("iden"));
    let wet = membrane.readonly(ObjectRef::from_entries([("a", 1)]));

    let desc = obj(&wet).get_own_property(&"iden".into()).unwrap().unwrap();
    assert_eq!(desc, PropertyDescriptor::frozen(Value::Undefined));
    // Reported the same way on every call
    let again = obj(&wet).get_own_property(&"iden".into()).unwrap().unwrap();
    assert_eq!(again, desc);
}

#[test]
fn test_identification_access_is_observed() {
    let accesses = Rc::new(Cell::new(0));
    let membrane = Membrane::new(
        ReactivityOptions::new()
            .identification("iden")
            .access_observer(counting(&accesses)),
    );
    let wet = membrane.reactive(ObjectRef::from_entries([("a", 1)]));

    obj(&wet).get_value("iden").unwrap();
    assert_eq!(accesses.get(), 1);
}

#[test]
fn test_identification_cannot_be_defined() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let membrane = Membrane::new(ReactivityOptions::new().identification("iden"));
    let wet = membrane.reactive(&raw);

    assert!(matches!(
        obj(&wet).define_property("iden", PropertyDescriptor::data(1)),
        Err(ObjectError::ProtocolViolation(_))
    ));
    assert!(!raw.has_own_property("iden").unwrap());
}

#[test]
fn test_identification_cannot_be_assigned() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let mutations = Rc::new(Cell::new(0));
    let membrane = Membrane::new(
        ReactivityOptions::new()
            .identification("iden")
            .mutation_observer(counting(&mutations)),
    );
    let wet = membrane.reactive(&raw);

    assert!(matches!(
        obj(&wet).put("iden", 5),
        Err(ObjectError::ProtocolViolation(_))
    ));
    assert!(!raw.has_own_property("iden").unwrap());
    assert!(obj(&wet).get_value("iden").unwrap().is_undefined());
    assert_eq!(mutations.get(), 0);

    let lenient = Membrane::new(
        ReactivityOptions::new()
            .identification("iden")
            .on_violation(OnViolation::Ignore),
    );
    let wet = lenient.reactive(&raw);
    assert!(!obj(&wet).set_value("iden", 5).unwrap());
    assert!(!raw.has_own_property("iden").unwrap());
    assert!(obj(&wet).get_value("iden").unwrap().is_undefined());
}

#[test]
fn test_identification_survives_writes_after_being_described() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    let mutations = Rc::new(Cell::new(0));
    let membrane = Membrane::new(
        ReactivityOptions::new()
            .identification("iden")
            .mutation_observer(counting(&mutations)),
    );
    let wet = membrane.reactive(&raw);
    obj(&wet).get_own_property(&"iden".into()).unwrap();

    assert!(matches!(
        obj(&wet).delete_property("iden"),
        Err(ObjectError::ProtocolViolation(_))
    ));
    assert!(matches!(
        obj(&wet).put("iden", 5),
        Err(ObjectError::ProtocolViolation(_))
    ));
    assert_eq!(mutations.get(), 0);
    assert!(!raw.has_own_property("iden").unwrap());
    assert!(obj(&wet).has("iden").unwrap());

    let lenient = Membrane::new(
        ReactivityOptions::new()
            .identification("iden")
            .on_violation(OnViolation::Ignore),
    );
    let wet = lenient.reactive(&raw);
    obj(&wet).get_own_property(&"iden".into()).unwrap();
    assert!(!obj(&wet).delete(&"iden".into()).unwrap());
    assert!(obj(&wet).has("iden").unwrap());
}

#[test]
fn test_identification_on_raw_is_not_duplicated() {
    let raw = ObjectRef::from_entries([("iden", 7), ("a", 1)]);
    let membrane = Membrane::new(ReactivityOptions::new().identification("iden"));
    let wet = membrane.reactive(&raw);

    assert_eq!(obj(&wet).own_property_names().unwrap().len(), 2);
    assert_eq!(obj(&wet).get_value("iden").unwrap(), Value::from(7));
}

#[test]
fn test_ignore_mode_on_reactive_views() {
    let raw = ObjectRef::from_entries([("a", 1)]);
    raw.define_property("fixed", PropertyDescriptor::frozen(1))
        .unwrap();
    let membrane = Membrane::new(ReactivityOptions::new().on_violation(OnViolation::Ignore));
    let wet = membrane.reactive(&raw);
    let view = obj(&wet);

    assert!(!view.set_prototype_of(Some(ObjectRef::new())).unwrap());
    assert!(!view.set_value("fixed", 2).unwrap());
    assert!(!view.delete(&"fixed".into()).unwrap());
    assert!(!view
        .define_own_property(&"fixed".into(), PropertyDescriptor::new().with_value(3))
        .unwrap());
    assert_eq!(raw.get_value("fixed").unwrap(), Value::from(1));

    // Ordinary writes still go through
    assert!(view.set_value("a", 2).unwrap());
    assert_eq!(raw.get_value("a").unwrap(), Value::from(2));
}

#[test]
fn test_membranes_are_independent() {
    let raw = ObjectRef::new();
    let first = Membrane::default();
    let second = Membrane::default();

    let a = first.reactive(&raw);
    let b = second.reactive(&raw);
    assert_ne!(a, b);
    assert!(!first.is_view(&b));
    // Wrapping a foreign view wraps the view itself
    let wrapped = first.reactive(&b);
    assert_ne!(wrapped, a);
    assert_eq!(first.to_raw(&wrapped), b);
}
