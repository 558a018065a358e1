//! Proxy objects
//!
//! A proxy forwards every internal method to a [`ProxyHandler`]. Handler
//! methods default to forwarding to the target, so a handler overrides only
//! the traps it cares about.
//!
//! After a trap returns, its result is checked against the target: a trap
//! may not report a non-configurable property as missing, an extensibility
//! state the target does not have, a key set that differs from a
//! non-extensible target's, and so on. A failed check surfaces as
//! `ObjectError::InvariantViolation`.

use crate::descriptor::{is_compatible_descriptor, PropertyDescriptor};
use crate::error::{ObjectError, ObjectResult};
use crate::key::PropertyKey;
use crate::object::ObjectRef;
use crate::value::Value;
use rustc_hash::FxHashSet;
use std::rc::Rc;

/// Trap set for a proxy
///
/// `target` is always the proxy's target; `receiver` is the value the
/// lookup started from (usually the proxy itself).
pub trait ProxyHandler {
    /// `getPrototypeOf` trap
    fn get_prototype_of(&self, target: &ObjectRef) -> ObjectResult<Option<ObjectRef>> {
        target.get_prototype_of()
    }

    /// `setPrototypeOf` trap
    fn set_prototype_of(
        &self,
        target: &ObjectRef,
        prototype: Option<ObjectRef>,
    ) -> ObjectResult<bool> {
        target.set_prototype_of(prototype)
    }

    /// `isExtensible` trap
    fn is_extensible(&self, target: &ObjectRef) -> ObjectResult<bool> {
        target.is_extensible()
    }

    /// `preventExtensions` trap
    fn prevent_extensions(&self, target: &ObjectRef) -> ObjectResult<bool> {
        target.prevent_extensions()
    }

    /// `getOwnPropertyDescriptor` trap
    fn get_own_property(
        &self,
        target: &ObjectRef,
        key: &PropertyKey,
    ) -> ObjectResult<Option<PropertyDescriptor>> {
        target.get_own_property(key)
    }

    /// `defineProperty` trap
    fn define_own_property(
        &self,
        target: &ObjectRef,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> ObjectResult<bool> {
        target.define_own_property(key, desc)
    }

    /// `has` trap
    fn has(&self, target: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
        target.has_property(key)
    }

    /// `get` trap
    fn get(&self, target: &ObjectRef, key: &PropertyKey, receiver: &Value) -> ObjectResult<Value> {
        target.get(key, receiver)
    }

    /// `set` trap
    fn set(
        &self,
        target: &ObjectRef,
        key: &PropertyKey,
        value: Value,
        receiver: &Value,
    ) -> ObjectResult<bool> {
        target.set(key, value, receiver)
    }

    /// `deleteProperty` trap
    fn delete(&self, target: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
        target.delete(key)
    }

    /// `ownKeys` trap
    fn own_keys(&self, target: &ObjectRef) -> ObjectResult<Vec<PropertyKey>> {
        target.own_property_keys()
    }

    /// `apply` trap (only reached when the target is callable)
    fn call(&self, target: &ObjectRef, this: &Value, args: &[Value]) -> ObjectResult<Value> {
        target.call(this, args)
    }
}

/// Target and handler of a proxy
pub(crate) struct ProxyObject {
    target: ObjectRef,
    handler: Rc<dyn ProxyHandler>,
}

fn violation(trap: &str, message: impl std::fmt::Display) -> ObjectError {
    ObjectError::InvariantViolation(format!("proxy {}: {}", trap, message))
}

impl ProxyObject {
    pub(crate) fn new(target: ObjectRef, handler: Rc<dyn ProxyHandler>) -> Self {
        Self { target, handler }
    }

    pub(crate) fn target(&self) -> &ObjectRef {
        &self.target
    }

    pub(crate) fn get_prototype_of(&self) -> ObjectResult<Option<ObjectRef>> {
        let result = self.handler.get_prototype_of(&self.target)?;
        if !self.target.is_extensible()? {
            let actual = self.target.get_prototype_of()?;
            if !same_object(result.as_ref(), actual.as_ref()) {
                return Err(violation(
                    "getPrototypeOf",
                    "must report the prototype of a non-extensible target",
                ));
            }
        }
        Ok(result)
    }

    pub(crate) fn set_prototype_of(&self, prototype: Option<ObjectRef>) -> ObjectResult<bool> {
        let result = self
            .handler
            .set_prototype_of(&self.target, prototype.clone())?;
        if result && !self.target.is_extensible()? {
            let actual = self.target.get_prototype_of()?;
            if !same_object(prototype.as_ref(), actual.as_ref()) {
                return Err(violation(
                    "setPrototypeOf",
                    "cannot change the prototype of a non-extensible target",
                ));
            }
        }
        Ok(result)
    }

    pub(crate) fn is_extensible(&self) -> ObjectResult<bool> {
        let result = self.handler.is_extensible(&self.target)?;
        if result != self.target.is_extensible()? {
            return Err(violation(
                "isExtensible",
                "result must match the target's extensibility",
            ));
        }
        Ok(result)
    }

    pub(crate) fn prevent_extensions(&self) -> ObjectResult<bool> {
        let result = self.handler.prevent_extensions(&self.target)?;
        if result && self.target.is_extensible()? {
            return Err(violation(
                "preventExtensions",
                "reported success but the target is still extensible",
            ));
        }
        Ok(result)
    }

    pub(crate) fn get_own_property(
        &self,
        key: &PropertyKey,
    ) -> ObjectResult<Option<PropertyDescriptor>> {
        let result = self.handler.get_own_property(&self.target, key)?;
        let target_desc = self.target.get_own_property(key)?;
        let extensible = self.target.is_extensible()?;

        let result = match result {
            Some(desc) => {
                desc.validate()?;
                desc.complete()
            }
            None => {
                if let Some(td) = target_desc {
                    if !td.is_configurable() {
                        return Err(violation(
                            "getOwnPropertyDescriptor",
                            format!("cannot report non-configurable '{}' as missing", key),
                        ));
                    }
                    if !extensible {
                        return Err(violation(
                            "getOwnPropertyDescriptor",
                            format!(
                                "cannot report '{}' as missing on a non-extensible target",
                                key
                            ),
                        ));
                    }
                }
                return Ok(None);
            }
        };

        if !is_compatible_descriptor(extensible, &result, target_desc.as_ref()) {
            return Err(violation(
                "getOwnPropertyDescriptor",
                format!("descriptor for '{}' is incompatible with the target", key),
            ));
        }
        if !result.is_configurable() {
            match &target_desc {
                Some(td) if !td.is_configurable() => {
                    if result.is_data() && !result.is_writable() && td.is_writable() {
                        return Err(violation(
                            "getOwnPropertyDescriptor",
                            format!("cannot report '{}' as non-writable", key),
                        ));
                    }
                }
                _ => {
                    return Err(violation(
                        "getOwnPropertyDescriptor",
                        format!(
                            "cannot report '{}' as non-configurable when the target's is configurable or missing",
                            key
                        ),
                    ));
                }
            }
        }
        Ok(Some(result))
    }

    pub(crate) fn define_own_property(
        &self,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> ObjectResult<bool> {
        let setting_config_false = desc.configurable == Some(false);
        let sets_non_writable = desc.writable == Some(false);
        let result = self
            .handler
            .define_own_property(&self.target, key, desc.clone())?;
        if !result {
            return Ok(false);
        }

        let target_desc = self.target.get_own_property(key)?;
        let extensible = self.target.is_extensible()?;
        match target_desc {
            None => {
                if !extensible {
                    return Err(violation(
                        "defineProperty",
                        format!("cannot add '{}' to a non-extensible target", key),
                    ));
                }
                if setting_config_false {
                    return Err(violation(
                        "defineProperty",
                        format!("cannot define non-configurable '{}' missing on the target", key),
                    ));
                }
            }
            Some(td) => {
                if !is_compatible_descriptor(extensible, &desc, Some(&td)) {
                    return Err(violation(
                        "defineProperty",
                        format!("descriptor for '{}' is incompatible with the target", key),
                    ));
                }
                if setting_config_false && td.is_configurable() {
                    return Err(violation(
                        "defineProperty",
                        format!("'{}' is configurable on the target", key),
                    ));
                }
                if td.is_data() && !td.is_configurable() && td.is_writable() && sets_non_writable {
                    return Err(violation(
                        "defineProperty",
                        format!("'{}' is writable on the target", key),
                    ));
                }
            }
        }
        Ok(true)
    }

    pub(crate) fn has(&self, key: &PropertyKey) -> ObjectResult<bool> {
        let result = self.handler.has(&self.target, key)?;
        if !result {
            if let Some(td) = self.target.get_own_property(key)? {
                if !td.is_configurable() {
                    return Err(violation(
                        "has",
                        format!("cannot hide non-configurable '{}'", key),
                    ));
                }
                if !self.target.is_extensible()? {
                    return Err(violation(
                        "has",
                        format!("cannot hide '{}' on a non-extensible target", key),
                    ));
                }
            }
        }
        Ok(result)
    }

    pub(crate) fn get(&self, key: &PropertyKey, receiver: &Value) -> ObjectResult<Value> {
        let result = self.handler.get(&self.target, key, receiver)?;
        if let Some(td) = self.target.get_own_property(key)? {
            if !td.is_configurable() {
                if td.is_data() && !td.is_writable() {
                    let expected = td.value.clone().unwrap_or_default();
                    if !result.same_value(&expected) {
                        return Err(violation(
                            "get",
                            format!("must report the value of non-writable '{}'", key),
                        ));
                    }
                } else if td.is_accessor() && td.getter().is_none() && !result.is_undefined() {
                    return Err(violation(
                        "get",
                        format!("'{}' has no getter and must read as undefined", key),
                    ));
                }
            }
        }
        Ok(result)
    }

    pub(crate) fn set(&self, key: &PropertyKey, value: Value, receiver: &Value) -> ObjectResult<bool> {
        let result = self
            .handler
            .set(&self.target, key, value.clone(), receiver)?;
        if result {
            if let Some(td) = self.target.get_own_property(key)? {
                if !td.is_configurable() {
                    if td.is_data() && !td.is_writable() {
                        let current = td.value.clone().unwrap_or_default();
                        if !value.same_value(&current) {
                            return Err(violation(
                                "set",
                                format!("cannot change non-writable '{}'", key),
                            ));
                        }
                    } else if td.is_accessor() && td.setter().is_none() {
                        return Err(violation(
                            "set",
                            format!("'{}' has no setter", key),
                        ));
                    }
                }
            }
        }
        Ok(result)
    }

    pub(crate) fn delete(&self, key: &PropertyKey) -> ObjectResult<bool> {
        let result = self.handler.delete(&self.target, key)?;
        if result {
            if let Some(td) = self.target.get_own_property(key)? {
                if !td.is_configurable() {
                    return Err(violation(
                        "deleteProperty",
                        format!("cannot delete non-configurable '{}'", key),
                    ));
                }
                if !self.target.is_extensible()? {
                    return Err(violation(
                        "deleteProperty",
                        format!("cannot delete '{}' from a non-extensible target", key),
                    ));
                }
            }
        }
        Ok(result)
    }

    pub(crate) fn own_keys(&self) -> ObjectResult<Vec<PropertyKey>> {
        let result = self.handler.own_keys(&self.target)?;

        let mut reported: FxHashSet<&PropertyKey> = FxHashSet::default();
        for key in &result {
            if !reported.insert(key) {
                return Err(violation("ownKeys", format!("duplicate key '{}'", key)));
            }
        }

        let extensible = self.target.is_extensible()?;
        let target_keys = self.target.own_property_keys()?;
        for key in &target_keys {
            if reported.contains(key) {
                continue;
            }
            if !extensible {
                return Err(violation(
                    "ownKeys",
                    format!("must report '{}' of a non-extensible target", key),
                ));
            }
            if let Some(td) = self.target.get_own_property(key)? {
                if !td.is_configurable() {
                    return Err(violation(
                        "ownKeys",
                        format!("must report non-configurable '{}'", key),
                    ));
                }
            }
        }
        if !extensible && reported.len() != target_keys.len() {
            return Err(violation(
                "ownKeys",
                "cannot report extra keys for a non-extensible target",
            ));
        }
        Ok(result)
    }

    pub(crate) fn call(&self, this: &Value, args: &[Value]) -> ObjectResult<Value> {
        self.handler.call(&self.target, this, args)
    }
}

fn same_object(a: Option<&ObjectRef>, b: Option<&ObjectRef>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.ptr_eq(b),
        _ => false,
    }
}
