//! Ref views
//!
//! A ref is a plain object with a single accessor property, `value`, whose
//! getter and setter share one captured slot. No proxy is involved.

use crate::membrane::MembraneInner;
use raya_object::{ObjectRef, PropertyDescriptor, PropertyKey, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Name of the single property a ref exposes
pub const REF_VALUE_KEY: &str = "value";

pub(crate) fn create_ref(membrane: &Rc<MembraneInner>, value: Value) -> ObjectRef {
    let slot = Rc::new(RefCell::new(value));
    let key = PropertyKey::from(REF_VALUE_KEY);

    let getter = {
        let membrane = Rc::clone(membrane);
        let slot = Rc::clone(&slot);
        let key = key.clone();
        ObjectRef::function(move |this, _args| {
            if let Value::Object(target) = this {
                membrane.observe_access(target, &key);
            }
            let value = slot.borrow().clone();
            Ok(value)
        })
    };

    let setter = {
        let membrane = Rc::clone(membrane);
        let key = key.clone();
        ObjectRef::function(move |this, args| {
            let next = args.first().cloned().unwrap_or_default();
            if let Value::Object(target) = this {
                membrane.observe_mutation(target, &key);
            }
            *slot.borrow_mut() = next;
            Ok(Value::Undefined)
        })
    };

    let reference = ObjectRef::from_descriptors([(
        key,
        PropertyDescriptor::accessor(Some(getter), Some(setter)).with_configurable(false),
    )]);
    tracing::trace!(reference = %reference.id(), "created ref");
    reference
}
