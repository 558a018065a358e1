//! Property descriptors
//!
//! A descriptor crosses every boundary in partial form: each field is
//! optional, and a missing field means "leave as is" when defining and
//! "default" when creating. Descriptors stored on ordinary objects are
//! always complete.
//!
//! ## Kinds
//!
//! - **Data**: has `value` and/or `writable`
//! - **Accessor**: has `get` and/or `set`
//! - **Generic**: neither (only `enumerable`/`configurable`)

use crate::error::{ObjectError, ObjectResult};
use crate::object::ObjectRef;
use crate::value::Value;

/// Property descriptor with optional fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    /// Stored value (data descriptors)
    pub value: Option<Value>,
    /// Whether the value may change (data descriptors)
    pub writable: Option<bool>,
    /// Getter function or `undefined` (accessor descriptors)
    pub get: Option<Value>,
    /// Setter function or `undefined` (accessor descriptors)
    pub set: Option<Value>,
    /// Whether the key shows up in enumeration
    pub enumerable: Option<bool>,
    /// Whether the property may be deleted or reshaped
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// Create an empty (generic) descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writable, enumerable, configurable data descriptor
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(true),
            enumerable: Some(true),
            configurable: Some(true),
            ..Self::default()
        }
    }

    /// Create a non-writable, non-enumerable, non-configurable data descriptor
    pub fn frozen(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            writable: Some(false),
            enumerable: Some(false),
            configurable: Some(false),
            ..Self::default()
        }
    }

    /// Create an enumerable, configurable accessor descriptor
    pub fn accessor(get: Option<ObjectRef>, set: Option<ObjectRef>) -> Self {
        Self {
            get: Some(get.map(Value::Object).unwrap_or_default()),
            set: Some(set.map(Value::Object).unwrap_or_default()),
            enumerable: Some(true),
            configurable: Some(true),
            ..Self::default()
        }
    }

    /// Set the `value` field
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the `writable` field
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    /// Set the `get` field
    pub fn with_get(mut self, get: ObjectRef) -> Self {
        self.get = Some(Value::Object(get));
        self
    }

    /// Set the `set` field
    pub fn with_set(mut self, set: ObjectRef) -> Self {
        self.set = Some(Value::Object(set));
        self
    }

    /// Set the `enumerable` field
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    /// Set the `configurable` field
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    /// Check if this is a data descriptor
    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Check if this is an accessor descriptor
    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Check if this is a generic descriptor
    pub fn is_generic(&self) -> bool {
        !self.is_data() && !self.is_accessor()
    }

    /// Check if no field is present
    pub fn is_empty(&self) -> bool {
        self.is_generic() && self.enumerable.is_none() && self.configurable.is_none()
    }

    /// Configurable flag (absent counts as `false`)
    pub fn is_configurable(&self) -> bool {
        self.configurable == Some(true)
    }

    /// Enumerable flag (absent counts as `false`)
    pub fn is_enumerable(&self) -> bool {
        self.enumerable == Some(true)
    }

    /// Writable flag (absent counts as `false`)
    pub fn is_writable(&self) -> bool {
        self.writable == Some(true)
    }

    /// Getter function, if any
    pub fn getter(&self) -> Option<&ObjectRef> {
        self.get.as_ref().and_then(Value::as_object)
    }

    /// Setter function, if any
    pub fn setter(&self) -> Option<&ObjectRef> {
        self.set.as_ref().and_then(Value::as_object)
    }

    /// Reject descriptors that mix data and accessor fields or carry
    /// non-callable accessors
    pub fn validate(&self) -> ObjectResult<()> {
        if self.is_data() && self.is_accessor() {
            return Err(ObjectError::InvalidDescriptor(
                "descriptor cannot specify both accessors and a value or writable flag"
                    .to_string(),
            ));
        }
        for (name, field) in [("getter", &self.get), ("setter", &self.set)] {
            if let Some(f) = field {
                if !f.is_undefined() && !f.is_callable() {
                    return Err(ObjectError::InvalidDescriptor(format!(
                        "{} must be a function, got {}",
                        name,
                        f.type_name()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Fill every absent field with its default
    pub fn complete(mut self) -> Self {
        if self.is_generic() || self.is_data() {
            self.value.get_or_insert(Value::Undefined);
            self.writable.get_or_insert(false);
        } else {
            self.get.get_or_insert(Value::Undefined);
            self.set.get_or_insert(Value::Undefined);
        }
        self.enumerable.get_or_insert(false);
        self.configurable.get_or_insert(false);
        self
    }

    /// Apply the fields present in `patch` on top of this complete descriptor
    ///
    /// Switching between data and accessor keeps only `enumerable` and
    /// `configurable` from the current descriptor.
    pub(crate) fn merge(&self, patch: &PropertyDescriptor) -> PropertyDescriptor {
        let switches_kind = (patch.is_data() && self.is_accessor())
            || (patch.is_accessor() && self.is_data());
        let mut next = if switches_kind {
            PropertyDescriptor {
                enumerable: self.enumerable,
                configurable: self.configurable,
                ..PropertyDescriptor::default()
            }
        } else {
            self.clone()
        };
        if patch.value.is_some() {
            next.value = patch.value.clone();
        }
        if patch.writable.is_some() {
            next.writable = patch.writable;
        }
        if patch.get.is_some() {
            next.get = patch.get.clone();
        }
        if patch.set.is_some() {
            next.set = patch.set.clone();
        }
        if patch.enumerable.is_some() {
            next.enumerable = patch.enumerable;
        }
        if patch.configurable.is_some() {
            next.configurable = patch.configurable;
        }
        next.complete()
    }
}

fn same_optional(a: &Option<Value>, b: &Option<Value>) -> bool {
    let undefined = Value::Undefined;
    a.as_ref()
        .unwrap_or(&undefined)
        .same_value(b.as_ref().unwrap_or(&undefined))
}

/// Check whether `desc` may be applied over `current`
///
/// `current` is the complete descriptor already present (or `None` for a
/// new property) and `extensible` the owner's extensibility. This is the
/// validation half of defining a property; proxies reuse it to verify trap
/// results against their target.
pub fn is_compatible_descriptor(
    extensible: bool,
    desc: &PropertyDescriptor,
    current: Option<&PropertyDescriptor>,
) -> bool {
    let current = match current {
        Some(current) => current,
        None => return extensible,
    };
    if desc.is_empty() {
        return true;
    }
    if current.is_configurable() {
        return true;
    }

    // Non-configurable: no reshaping
    if desc.configurable == Some(true) {
        return false;
    }
    if let Some(enumerable) = desc.enumerable {
        if enumerable != current.is_enumerable() {
            return false;
        }
    }
    if !desc.is_generic() && desc.is_accessor() != current.is_accessor() {
        return false;
    }
    if current.is_accessor() {
        if desc.get.is_some() && !same_optional(&desc.get, &current.get) {
            return false;
        }
        if desc.set.is_some() && !same_optional(&desc.set, &current.set) {
            return false;
        }
    } else if !current.is_writable() {
        if desc.writable == Some(true) {
            return false;
        }
        if desc.value.is_some() && !same_optional(&desc.value, &current.value) {
            return false;
        }
    }
    true
}
