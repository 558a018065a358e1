//! Membrane configuration
//!
//! Every hook has a no-op default, so `ReactivityOptions::default()` gives a
//! working membrane. Options are frozen into the membrane at construction.

use raya_object::{ObjectError, ObjectRef, ObjectResult, PropertyKey, Value};
use std::fmt;
use std::rc::Rc;

/// Called with `(underlying object, key)` on every observed read
pub type AccessObserver = Rc<dyn Fn(&ObjectRef, &PropertyKey)>;

/// Called with `(underlying object, key)` on every effective write
pub type MutationObserver = Rc<dyn Fn(&ObjectRef, &PropertyKey)>;

/// Rewrites a value before it is considered for wrapping
pub type DistortionHandler = Rc<dyn Fn(Value) -> Value>;

/// Decides whether a (distorted) value gets wrapped at all
pub type ObservablePredicate = Rc<dyn Fn(&Value) -> bool>;

/// What a view does when an operation violates its policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnViolation {
    /// Fail the operation with the violation error
    #[default]
    Raise,
    /// Report a non-effecting `false` result instead
    Ignore,
}

impl OnViolation {
    /// Apply the policy to a violation raised at a trap boundary
    pub fn reject(self, error: ObjectError) -> ObjectResult<bool> {
        match self {
            OnViolation::Raise => {
                tracing::debug!(kind = error.kind_name(), %error, "raising violation");
                Err(error)
            }
            OnViolation::Ignore => {
                tracing::debug!(kind = error.kind_name(), %error, "ignoring violation");
                Ok(false)
            }
        }
    }
}

/// Default observability predicate: any non-callable object
pub fn is_plain_object(value: &Value) -> bool {
    match value {
        Value::Object(obj) => !obj.is_callable(),
        _ => false,
    }
}

/// Membrane configuration
#[derive(Clone)]
pub struct ReactivityOptions {
    /// Synthetic key every proxied view reports as present
    pub identification: Option<PropertyKey>,

    /// Read hook
    pub access_observer: AccessObserver,

    /// Write hook
    pub mutation_observer: MutationObserver,

    /// Input rewrite applied before wrapping
    pub distortion_handler: DistortionHandler,

    /// Wrapping eligibility
    pub is_value_observable: ObservablePredicate,

    /// Violation policy
    pub on_violation: OnViolation,
}

impl Default for ReactivityOptions {
    fn default() -> Self {
        Self {
            identification: None,
            access_observer: Rc::new(|_: &ObjectRef, _: &PropertyKey| {}),
            mutation_observer: Rc::new(|_: &ObjectRef, _: &PropertyKey| {}),
            distortion_handler: Rc::new(|value| value),
            is_value_observable: Rc::new(is_plain_object),
            on_violation: OnViolation::default(),
        }
    }
}

impl ReactivityOptions {
    /// Create options with every hook at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identification key
    pub fn identification(mut self, key: impl Into<PropertyKey>) -> Self {
        self.identification = Some(key.into());
        self
    }

    /// Set the access observer
    pub fn access_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ObjectRef, &PropertyKey) + 'static,
    {
        self.access_observer = Rc::new(observer);
        self
    }

    /// Set the mutation observer
    pub fn mutation_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ObjectRef, &PropertyKey) + 'static,
    {
        self.mutation_observer = Rc::new(observer);
        self
    }

    /// Set the distortion handler
    pub fn distortion_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Value) -> Value + 'static,
    {
        self.distortion_handler = Rc::new(handler);
        self
    }

    /// Set the observability predicate
    pub fn is_value_observable<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        self.is_value_observable = Rc::new(predicate);
        self
    }

    /// Set the violation policy
    pub fn on_violation(mut self, policy: OnViolation) -> Self {
        self.on_violation = policy;
        self
    }
}

impl fmt::Debug for ReactivityOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactivityOptions")
            .field("identification", &self.identification)
            .field("on_violation", &self.on_violation)
            .finish_non_exhaustive()
    }
}
