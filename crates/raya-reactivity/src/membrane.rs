//! Membrane facade
//!
//! Every entry point runs the same pipeline: unwrap a view back to its
//! underlying value, apply the distortion handler, ask the observability
//! predicate, then look up or create the view for the requested kind.

use crate::accessor::AccessorRewriter;
use crate::handler::MembraneHandler;
use crate::kind::{Transmit, ViewKind};
use crate::options::ReactivityOptions;
use crate::reference;
use crate::registry::IdentityRegistry;
use raya_object::{
    ObjectClass, ObjectError, ObjectRef, ObjectResult, PropertyKey, Value,
};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// State shared by a membrane, its views and its accessor wrappers
pub(crate) struct MembraneInner {
    options: ReactivityOptions,
    registry: RefCell<IdentityRegistry>,
    pub(crate) accessors: AccessorRewriter,
}

impl MembraneInner {
    pub(crate) fn new(options: ReactivityOptions) -> Self {
        Self {
            options,
            registry: RefCell::new(IdentityRegistry::new()),
            accessors: AccessorRewriter::new(),
        }
    }

    /// Wrap `value` as a view of `kind`
    pub(crate) fn wrap(self: &Rc<Self>, kind: ViewKind, value: Value) -> Value {
        if !kind.is_proxied() {
            return Value::Object(self.make_ref(value));
        }

        let distorted = self.enter(value);
        if !(self.options.is_value_observable)(&distorted) {
            return distorted;
        }
        let raw = match distorted {
            Value::Object(raw) => raw,
            other => return other,
        };

        let cached = self.registry.borrow().view_for(kind, &raw);
        if let Some(view) = cached {
            tracing::trace!(%kind, raw = %raw.id(), view = %view.id(), "view cache hit");
            return Value::Object(view);
        }
        Value::Object(self.create_view(kind, raw))
    }

    /// Apply a child-wrapping policy
    pub(crate) fn transmit(self: &Rc<Self>, transmit: Transmit, value: Value) -> Value {
        match transmit {
            Transmit::Reactive => self.wrap(ViewKind::Reactive, value),
            Transmit::ReadOnly => self.wrap(ViewKind::ReadOnly, value),
            Transmit::Raw => value,
        }
    }

    /// Replace a view of this membrane with its underlying value
    pub(crate) fn to_raw(&self, value: Value) -> Value {
        let raw = match &value {
            Value::Object(obj) => self.registry.borrow().raw_for(obj).map(|(raw, _)| raw),
            _ => None,
        };
        raw.map(Value::Object).unwrap_or(value)
    }

    pub(crate) fn kind_of(&self, value: &Value) -> Option<ViewKind> {
        let obj = value.as_object()?;
        let registry = self.registry.borrow();
        match registry.raw_for(obj) {
            Some((_, kind)) => Some(kind),
            None if registry.is_ref(obj) => Some(ViewKind::Ref),
            None => None,
        }
    }

    pub(crate) fn observe_access(&self, target: &ObjectRef, key: &PropertyKey) {
        (self.options.access_observer)(target, key);
    }

    pub(crate) fn observe_mutation(&self, target: &ObjectRef, key: &PropertyKey) {
        (self.options.mutation_observer)(target, key);
    }

    pub(crate) fn identification(&self) -> Option<&PropertyKey> {
        self.options.identification.as_ref()
    }

    pub(crate) fn is_identification(&self, key: &PropertyKey) -> bool {
        self.options.identification.as_ref() == Some(key)
    }

    /// Apply the configured violation policy
    pub(crate) fn reject(&self, error: ObjectError) -> ObjectResult<bool> {
        self.options.on_violation.reject(error)
    }

    fn enter(&self, value: Value) -> Value {
        let value = self.to_raw(value);
        let distorted = (self.options.distortion_handler)(value);
        // The handler may hand back one of our own views
        self.to_raw(distorted)
    }

    fn create_view(self: &Rc<Self>, kind: ViewKind, raw: ObjectRef) -> ObjectRef {
        let shadow = shadow_target(&raw);
        let handler = MembraneHandler::new(Rc::clone(self), kind, raw.clone());
        let view = ObjectRef::proxy(shadow, Rc::new(handler));
        self.registry.borrow_mut().register(kind, &raw, &view);
        tracing::trace!(%kind, raw = %raw.id(), view = %view.id(), "created view");
        view
    }

    fn make_ref(self: &Rc<Self>, value: Value) -> ObjectRef {
        let value = self.enter(value);
        if let Value::Object(obj) = &value {
            if self.registry.borrow().is_ref(obj) {
                tracing::trace!(reference = %obj.id(), "value is already a ref");
                return obj.clone();
            }
        }
        let reference = reference::create_ref(self, value);
        self.registry.borrow_mut().register_ref(&reference);
        reference
    }
}

/// Empty stand-in the proxy mechanics validate trap results against
fn shadow_target(raw: &ObjectRef) -> ObjectRef {
    if raw.is_callable() {
        ObjectRef::function(|_, _| Ok(Value::Undefined))
    } else if raw.is_array() {
        ObjectRef::with_class(ObjectClass::Array, None)
    } else {
        ObjectRef::new()
    }
}

/// Producer and registry of views over underlying values
///
/// Clones share registries, so a clone hands out the same views.
#[derive(Clone)]
pub struct Membrane {
    inner: Rc<MembraneInner>,
}

impl Membrane {
    /// Create a membrane with its own identity registries
    pub fn new(options: ReactivityOptions) -> Self {
        Self {
            inner: Rc::new(MembraneInner::new(options)),
        }
    }

    /// Configuration this membrane was built with
    pub fn options(&self) -> &ReactivityOptions {
        &self.inner.options
    }

    /// Deep, mutable view
    pub fn reactive(&self, value: impl Into<Value>) -> Value {
        self.inner.wrap(ViewKind::Reactive, value.into())
    }

    /// Deep, immutable view
    pub fn readonly(&self, value: impl Into<Value>) -> Value {
        self.inner.wrap(ViewKind::ReadOnly, value.into())
    }

    /// Mutable view that hands nested values back raw
    pub fn shallow_reactive(&self, value: impl Into<Value>) -> Value {
        self.inner.wrap(ViewKind::ShallowReactive, value.into())
    }

    /// Immutable view that hands nested values back raw
    pub fn shallow_readonly(&self, value: impl Into<Value>) -> Value {
        self.inner.wrap(ViewKind::ShallowReadOnly, value.into())
    }

    /// Single-value accessor object with an observed `value` property
    ///
    /// Passing an existing ref of this membrane returns it unchanged.
    pub fn ref_value(&self, value: impl Into<Value>) -> ObjectRef {
        self.inner.make_ref(value.into())
    }

    /// Wrap `value` as a view of `kind`
    pub fn wrap(&self, kind: ViewKind, value: impl Into<Value>) -> Value {
        self.inner.wrap(kind, value.into())
    }

    /// Underlying value of a view of this membrane; anything else is
    /// returned unchanged
    pub fn to_raw(&self, value: impl Into<Value>) -> Value {
        self.inner.to_raw(value.into())
    }

    /// Kind of `value` if it is a view or ref of this membrane
    pub fn kind_of(&self, value: &Value) -> Option<ViewKind> {
        self.inner.kind_of(value)
    }

    /// Whether `value` is a view or ref of this membrane
    pub fn is_view(&self, value: &Value) -> bool {
        self.kind_of(value).is_some()
    }

    /// Whether `value` is a mutable proxied view (deep or shallow)
    pub fn is_reactive(&self, value: &Value) -> bool {
        self.kind_of(value)
            .is_some_and(|kind| kind.is_proxied() && kind.is_mutable())
    }

    /// Whether `value` is an immutable view (deep or shallow)
    pub fn is_readonly(&self, value: &Value) -> bool {
        self.kind_of(value).is_some_and(|kind| !kind.is_mutable())
    }

    /// Whether `value` is a shallow view
    pub fn is_shallow(&self, value: &Value) -> bool {
        self.kind_of(value).is_some_and(ViewKind::is_shallow)
    }

    /// Whether `value` is a ref of this membrane
    pub fn is_ref(&self, value: &Value) -> bool {
        self.kind_of(value) == Some(ViewKind::Ref)
    }
}

impl Default for Membrane {
    fn default() -> Self {
        Self::new(ReactivityOptions::default())
    }
}

impl fmt::Debug for Membrane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Membrane")
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OnViolation;

    #[test]
    fn test_primitives_pass_through() {
        let membrane = Membrane::default();
        assert_eq!(membrane.reactive(1), Value::from(1));
        assert_eq!(membrane.readonly("a"), Value::from("a"));
        assert!(membrane.reactive(Value::Null).is_null());
    }

    #[test]
    fn test_idempotent_per_kind() {
        let membrane = Membrane::default();
        let raw = ObjectRef::from_entries([("a", 1)]);
        let reactive = membrane.reactive(&raw);
        assert_eq!(membrane.reactive(&raw), reactive);
        assert_eq!(membrane.reactive(&reactive), reactive);
        assert_ne!(membrane.readonly(&raw), reactive);
        assert_eq!(membrane.to_raw(&reactive), Value::from(&raw));
    }

    #[test]
    fn test_kind_queries() {
        let membrane = Membrane::default();
        let raw = ObjectRef::new();
        let view = membrane.shallow_readonly(&raw);
        assert_eq!(membrane.kind_of(&view), Some(ViewKind::ShallowReadOnly));
        assert!(membrane.is_readonly(&view));
        assert!(membrane.is_shallow(&view));
        assert!(!membrane.is_reactive(&view));
        assert!(!membrane.is_view(&Value::from(&raw)));

        let reference = Value::from(membrane.ref_value(1));
        assert!(membrane.is_ref(&reference));
        assert!(!membrane.is_readonly(&reference));
    }

    #[test]
    fn test_separate_membranes_do_not_share_views() {
        let raw = ObjectRef::new();
        let first = Membrane::default();
        let second = Membrane::new(ReactivityOptions::new().on_violation(OnViolation::Ignore));
        let a = first.reactive(&raw);
        let b = second.reactive(&raw);
        assert_ne!(a, b);
        // A foreign view is just another object
        assert_eq!(first.to_raw(&b), b);
    }

    #[test]
    fn test_array_view_is_array() {
        let membrane = Membrane::default();
        let raw = ObjectRef::array([1, 2]);
        let view = membrane.reactive(&raw);
        assert!(view.as_object().is_some_and(ObjectRef::is_array));
        assert_ne!(view, Value::from(&raw));
    }
}
