//! Proxy handler for membrane views
//!
//! One handler type serves every proxied view kind. The read path
//! (`get`, `has`, `own_keys`, `get_own_property`, `get_prototype_of`,
//! `is_extensible`) is shared; the mutating traps consult the kind's
//! capability table. The underlying value is always read and written
//! directly; the shadow target only mirrors what the proxy invariants
//! force it to: non-configurable properties, the identification key, and
//! everything once extensions are prevented.

use crate::kind::ViewKind;
use crate::membrane::MembraneInner;
use raya_object::{
    ObjectError, ObjectRef, ObjectResult, PropertyDescriptor, PropertyKey, ProxyHandler, Value,
};
use std::rc::Rc;

pub(crate) struct MembraneHandler {
    membrane: Rc<MembraneInner>,
    kind: ViewKind,
    raw: ObjectRef,
}

impl MembraneHandler {
    pub(crate) fn new(membrane: Rc<MembraneInner>, kind: ViewKind, raw: ObjectRef) -> Self {
        Self {
            membrane,
            kind,
            raw,
        }
    }

    fn raw_receiver(&self) -> Value {
        Value::Object(self.raw.clone())
    }

    fn read_only_violation(&self, action: &str) -> ObjectResult<bool> {
        self.membrane.reject(ObjectError::ReadOnlyViolation(format!(
            "cannot {} on {} view of object {}",
            action,
            self.kind,
            self.raw.id()
        )))
    }

    fn protocol_violation(&self, action: &str) -> ObjectResult<bool> {
        self.membrane.reject(ObjectError::ProtocolViolation(format!(
            "cannot {} on {} view of object {}",
            action,
            self.kind,
            self.raw.id()
        )))
    }

    /// Outbound descriptor: child value and accessors become view-side
    fn wrap_descriptor(&self, mut desc: PropertyDescriptor) -> PropertyDescriptor {
        if let Some(value) = desc.value.take() {
            desc.value = Some(self.membrane.transmit(self.kind.transmit(), value));
        }
        if let Some(getter) = desc.getter().cloned() {
            let wrapped = self.membrane.accessors.wrap_getter(&self.membrane, self.kind, &getter);
            desc.get = Some(Value::Object(wrapped));
        }
        if let Some(setter) = desc.setter().cloned() {
            let wrapped = self.membrane.accessors.wrap_setter(&self.membrane, self.kind, &setter);
            desc.set = Some(Value::Object(wrapped));
        }
        desc
    }

    /// Inbound descriptor: value and accessors become raw-side
    fn unwrap_descriptor(&self, mut desc: PropertyDescriptor) -> PropertyDescriptor {
        if let Some(value) = desc.value.take() {
            desc.value = Some(self.membrane.to_raw(value));
        }
        if let Some(getter) = desc.getter().cloned() {
            let raw_getter = self
                .membrane
                .accessors
                .unwrap_getter(&self.membrane, self.kind, &getter);
            desc.get = Some(Value::Object(raw_getter));
        }
        if let Some(setter) = desc.setter().cloned() {
            let raw_setter = self
                .membrane
                .accessors
                .unwrap_setter(&self.membrane, self.kind, &setter);
            desc.set = Some(Value::Object(raw_setter));
        }
        desc
    }

    /// Mirror the current raw descriptor of `key` onto the shadow
    fn sync_shadow(&self, shadow: &ObjectRef, key: &PropertyKey) -> ObjectResult<()> {
        if let Some(desc) = self.raw.get_own_property(key)? {
            shadow.define_property(key, self.wrap_descriptor(desc))?;
        }
        Ok(())
    }

    fn identification_descriptor() -> PropertyDescriptor {
        PropertyDescriptor::frozen(Value::Undefined)
    }

    /// Whether `key` is the identification key and exists only on views
    fn is_synthetic(&self, key: &PropertyKey) -> ObjectResult<bool> {
        Ok(self.membrane.is_identification(key) && !self.raw.has_own_property(key)?)
    }

    /// Copy every raw property (and the identification key) onto the
    /// shadow, then freeze its shape
    ///
    /// The sealed shadow is a snapshot. Configurable properties deleted or
    /// added on the raw object afterwards (bypassing the view) leave the
    /// two key sets disagreeing, and every key query on the view then fails
    /// with `InvariantViolation`.
    fn seal_shadow(&self, shadow: &ObjectRef) -> ObjectResult<()> {
        for key in self.raw.own_property_keys()? {
            self.sync_shadow(shadow, &key)?;
        }
        if let Some(identification) = self.membrane.identification() {
            if !shadow.has_own_property(identification)? {
                shadow.define_property(identification, Self::identification_descriptor())?;
            }
        }
        shadow.set_prototype(self.raw.get_prototype_of()?)?;
        shadow.prevent_extensions_strict()
    }
}

impl ProxyHandler for MembraneHandler {
    fn get_prototype_of(&self, _shadow: &ObjectRef) -> ObjectResult<Option<ObjectRef>> {
        self.raw.get_prototype_of()
    }

    fn set_prototype_of(
        &self,
        _shadow: &ObjectRef,
        _prototype: Option<ObjectRef>,
    ) -> ObjectResult<bool> {
        if self.kind.is_mutable() {
            self.protocol_violation("set a new prototype")
        } else {
            self.read_only_violation("set a new prototype")
        }
    }

    fn is_extensible(&self, shadow: &ObjectRef) -> ObjectResult<bool> {
        shadow.is_extensible()
    }

    fn prevent_extensions(&self, shadow: &ObjectRef) -> ObjectResult<bool> {
        if !self.kind.is_mutable() {
            return self.read_only_violation("prevent extensions");
        }
        if shadow.is_extensible()? {
            if !self.raw.prevent_extensions()? {
                return self.protocol_violation("prevent extensions");
            }
            self.seal_shadow(shadow)?;
        }
        Ok(true)
    }

    fn get_own_property(
        &self,
        shadow: &ObjectRef,
        key: &PropertyKey,
    ) -> ObjectResult<Option<PropertyDescriptor>> {
        self.membrane.observe_access(&self.raw, key);

        let desc = match self.raw.get_own_property(key)? {
            Some(desc) => desc,
            None if self.membrane.is_identification(key) => {
                let desc = Self::identification_descriptor();
                if !shadow.has_own_property(key)? {
                    shadow.define_property(key, desc.clone())?;
                }
                return Ok(Some(desc));
            }
            None => return Ok(None),
        };

        let wrapped = self.wrap_descriptor(desc);
        if !wrapped.is_configurable() {
            shadow.define_property(key, wrapped.clone())?;
        }
        Ok(Some(wrapped))
    }

    fn define_own_property(
        &self,
        shadow: &ObjectRef,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> ObjectResult<bool> {
        if !self.kind.is_mutable() {
            return self.read_only_violation(&format!("define '{}'", key));
        }
        if self.is_synthetic(key)? {
            return self.protocol_violation(&format!("redefine identification key '{}'", key));
        }

        let desc = self.unwrap_descriptor(desc);
        if !self.raw.define_own_property(key, desc)? {
            return self.protocol_violation(&format!("define '{}'", key));
        }
        if let Some(current) = self.raw.get_own_property(key)? {
            if !current.is_configurable() {
                shadow.define_property(key, self.wrap_descriptor(current))?;
            }
        }
        self.membrane.observe_mutation(&self.raw, key);
        Ok(true)
    }

    fn has(&self, _shadow: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
        self.membrane.observe_access(&self.raw, key);
        Ok(self.raw.has_property(key)? || self.membrane.is_identification(key))
    }

    fn get(&self, _shadow: &ObjectRef, key: &PropertyKey, _receiver: &Value) -> ObjectResult<Value> {
        let value = self.raw.get(key, &self.raw_receiver())?;
        self.membrane.observe_access(&self.raw, key);
        Ok(self.membrane.transmit(self.kind.transmit(), value))
    }

    fn set(
        &self,
        _shadow: &ObjectRef,
        key: &PropertyKey,
        value: Value,
        _receiver: &Value,
    ) -> ObjectResult<bool> {
        if !self.kind.is_mutable() {
            return self.read_only_violation(&format!("set '{}'", key));
        }
        if self.is_synthetic(key)? {
            return self.protocol_violation(&format!("assign identification key '{}'", key));
        }

        let value = self.membrane.to_raw(value);
        let receiver = self.raw_receiver();
        let current = self.raw.get(key, &receiver)?;
        if current.same_value(&value) {
            return Ok(true);
        }
        if !self.raw.set(key, value, &receiver)? {
            return self.protocol_violation(&format!("assign to read only property '{}'", key));
        }
        self.membrane.observe_mutation(&self.raw, key);
        Ok(true)
    }

    fn delete(&self, shadow: &ObjectRef, key: &PropertyKey) -> ObjectResult<bool> {
        if !self.kind.is_mutable() {
            return self.read_only_violation(&format!("delete '{}'", key));
        }
        if self.is_synthetic(key)? {
            return self.protocol_violation(&format!("delete identification key '{}'", key));
        }
        if !self.raw.delete(key)? {
            return self.protocol_violation(&format!("delete '{}'", key));
        }
        shadow.delete(key)?;
        self.membrane.observe_mutation(&self.raw, key);
        Ok(true)
    }

    fn own_keys(&self, _shadow: &ObjectRef) -> ObjectResult<Vec<PropertyKey>> {
        let mut keys = Vec::new();
        if let Some(identification) = self.membrane.identification() {
            if !self.raw.has_own_property(identification)? {
                keys.push(identification.clone());
            }
        }
        keys.extend(self.raw.own_property_keys()?);
        Ok(keys)
    }

    fn call(&self, _shadow: &ObjectRef, _this: &Value, _args: &[Value]) -> ObjectResult<Value> {
        Err(ObjectError::NotImplemented(format!(
            "calling a {} view of object {}",
            self.kind,
            self.raw.id()
        )))
    }
}
